use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use murmur_chat::{ChatController, Clock};
use murmur_transport::ChatTransport;
use snafu::ResultExt;
use tokio::sync::{Mutex, OnceCell};

use crate::error::{AppResult, ChatSnafu};

type SessionSlot = Arc<OnceCell<Arc<ChatController>>>;

/// One chat controller per signed-in user, created on first use.
pub struct SessionRegistry {
    transport: Arc<dyn ChatTransport>,
    clock: Arc<dyn Clock>,
    cadence: Duration,
    sessions: Mutex<HashMap<String, SessionSlot>>,
}

impl SessionRegistry {
    pub fn new(transport: Arc<dyn ChatTransport>, clock: Arc<dyn Clock>, cadence: Duration) -> Self {
        Self {
            transport,
            clock,
            cadence,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the user's controller, loading its history the first time.
    ///
    /// The registry lock only covers the slot lookup; a slow first load blocks that user alone.
    pub async fn controller(&self, user_id: &str) -> AppResult<Arc<ChatController>> {
        let slot = {
            let mut sessions = self.sessions.lock().await;
            Arc::clone(sessions.entry(user_id.to_string()).or_default())
        };

        let controller = slot.get_or_try_init(|| self.open(user_id)).await?;
        Ok(Arc::clone(controller))
    }

    async fn open(&self, user_id: &str) -> AppResult<Arc<ChatController>> {
        let controller = Arc::new(ChatController::new(
            Arc::clone(&self.transport),
            Arc::clone(&self.clock),
            self.cadence,
        ));
        controller.load_history().await.context(ChatSnafu {
            stage: "open-session",
        })?;

        tracing::info!(user_id, "opened chat session");
        Ok(controller)
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions
            .lock()
            .await
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use murmur_chat::SystemClock;
    use murmur_storage::MemoryStorage;
    use murmur_transport::{
        BoxFuture, CannedResponder, ChatBackend, ConversationId, ConversationPayload, LocalTransport,
        SendReply, TransportResult,
    };

    use super::*;

    /// The first history fetch hangs like an unresponsive remote API.
    struct StallFirstHistory {
        inner: LocalTransport,
        calls: AtomicUsize,
    }

    impl ChatTransport for StallFirstHistory {
        fn fetch_history<'a>(&'a self) -> BoxFuture<'a, TransportResult<Vec<ConversationPayload>>> {
            Box::pin(async move {
                if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                }
                self.inner.fetch_history().await
            })
        }

        fn fetch_conversation<'a>(
            &'a self,
            id: ConversationId,
        ) -> BoxFuture<'a, TransportResult<ConversationPayload>> {
            self.inner.fetch_conversation(id)
        }

        fn create_conversation<'a>(&'a self) -> BoxFuture<'a, TransportResult<ConversationPayload>> {
            self.inner.create_conversation()
        }

        fn send_message<'a>(
            &'a self,
            id: ConversationId,
            text: &'a str,
        ) -> BoxFuture<'a, TransportResult<SendReply>> {
            self.inner.send_message(id, text)
        }
    }

    fn registry() -> Arc<SessionRegistry> {
        let backend = Arc::new(ChatBackend::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(CannedResponder),
        ));
        let transport = StallFirstHistory {
            inner: LocalTransport::new(backend),
            calls: AtomicUsize::new(0),
        };
        Arc::new(SessionRegistry::new(
            Arc::new(transport),
            Arc::new(SystemClock),
            Duration::from_millis(24),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn slow_first_load_does_not_block_other_users() {
        let registry = registry();

        let slow = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.controller("admin").await.map(|_| ()) })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        tokio::time::timeout(Duration::from_secs(1), registry.controller("user"))
            .await
            .expect("second user waited on the first user's load")
            .expect("open session");
        assert_eq!(registry.active_sessions().await, 1);

        slow.await.expect("join").expect("open slow session");
        assert_eq!(registry.active_sessions().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn same_user_shares_one_controller() {
        let registry = registry();

        let (first, second) = tokio::join!(registry.controller("admin"), registry.controller("admin"));
        let first = first.expect("first");
        let second = second.expect("second");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.active_sessions().await, 1);
    }
}
