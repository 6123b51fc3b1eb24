use std::sync::Arc;

use murmur_storage::ConversationId;

use super::backend::ChatBackend;
use super::client::{BoxFuture, ChatTransport};
use super::error::TransportResult;
use super::wire::{ConversationPayload, SendReply};

/// Talks to a [`ChatBackend`] in the same process.
#[derive(Clone)]
pub struct LocalTransport {
    backend: Arc<ChatBackend>,
}

impl LocalTransport {
    pub fn new(backend: Arc<ChatBackend>) -> Self {
        Self { backend }
    }
}

impl ChatTransport for LocalTransport {
    fn fetch_history<'a>(&'a self) -> BoxFuture<'a, TransportResult<Vec<ConversationPayload>>> {
        Box::pin(async move { self.backend.history() })
    }

    fn fetch_conversation<'a>(
        &'a self,
        id: ConversationId,
    ) -> BoxFuture<'a, TransportResult<ConversationPayload>> {
        Box::pin(async move { self.backend.conversation(id) })
    }

    fn create_conversation<'a>(&'a self) -> BoxFuture<'a, TransportResult<ConversationPayload>> {
        Box::pin(async move { self.backend.create() })
    }

    fn send_message<'a>(
        &'a self,
        id: ConversationId,
        text: &'a str,
    ) -> BoxFuture<'a, TransportResult<SendReply>> {
        Box::pin(async move { self.backend.send(id, text) })
    }
}

#[cfg(test)]
mod tests {
    use murmur_storage::MemoryStorage;

    use super::*;
    use crate::CannedResponder;

    #[tokio::test]
    async fn local_round_trip_through_trait_object() {
        let backend = Arc::new(ChatBackend::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(CannedResponder),
        ));
        let transport: Arc<dyn ChatTransport> = Arc::new(LocalTransport::new(backend));

        let created = transport.create_conversation().await.expect("create");
        let reply = transport
            .send_message(created.conversation_id(), "hi there")
            .await
            .expect("send");
        assert!(!reply.reply_text.is_empty());

        let history = transport.fetch_history().await.expect("history");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].messages.len(), 2);
    }
}
