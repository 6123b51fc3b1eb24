use std::sync::Arc;
use std::time::Duration;

use murmur_transport::ChatTransport;
use snafu::ResultExt;
use tokio::sync::{Mutex, watch};

use crate::clock::Clock;
use crate::error::{BusySnafu, ChatResult, RevealSnafu, TransportSnafu};
use crate::events::ChatCommand;
use crate::message::{Conversation, ConversationId, Message};
use crate::reveal::{RevealEngine, RevealId, TickOutcome};
use crate::store::{ChatSnapshot, SessionStore};
use crate::ticker::RevealTicker;

/// What happened to a submitted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input or no active conversation.
    Ignored,
    /// The reply is being revealed.
    Revealing(RevealId),
    /// The backend answered with an empty reply.
    NoReply,
    /// The user switched conversations before the reply arrived.
    Dropped,
}

/// Everything one tick or one user action mutates, guarded by a single lock.
struct SessionCore {
    store: SessionStore,
    engine: RevealEngine,
    ticker: Option<RevealTicker>,
    /// Number of the send whose reply is still outstanding.
    pending_send: Option<u64>,
    next_send: u64,
    revision: u64,
}

impl SessionCore {
    fn snapshot(&mut self) -> ChatSnapshot {
        self.revision = self.revision.saturating_add(1);
        self.store.snapshot(self.revision)
    }

    fn discard_reveal(&mut self) {
        self.ticker = None;
        if let Some(id) = self.engine.discard(&mut self.store) {
            tracing::info!(reveal_id = %id, "dropped partial reply on conversation change");
        }
    }

    fn begin_send(&mut self) -> u64 {
        self.next_send = self.next_send.wrapping_add(1);
        self.pending_send = Some(self.next_send);
        self.store.set_loading(true);
        self.next_send
    }

    /// Releases the busy flag if `send` still owns it.
    fn finish_send(&mut self, send: u64) -> bool {
        if self.pending_send != Some(send) {
            return false;
        }
        self.pending_send = None;
        self.sync_loading();
        true
    }

    /// Forgets the outstanding send so its reply is dropped when it lands.
    fn abandon_send(&mut self) {
        if let Some(send) = self.pending_send.take() {
            tracing::info!(send, "abandoned pending reply on conversation change");
        }
        self.sync_loading();
    }

    fn sync_loading(&mut self) {
        let busy = self.pending_send.is_some() || self.engine.is_streaming();
        self.store.set_loading(busy);
    }
}

/// Wires chat page actions to the transport and the reveal engine for one user.
pub struct ChatController {
    transport: Arc<dyn ChatTransport>,
    clock: Arc<dyn Clock>,
    core: Arc<Mutex<SessionCore>>,
    snapshots: watch::Sender<ChatSnapshot>,
}

impl ChatController {
    pub fn new(transport: Arc<dyn ChatTransport>, clock: Arc<dyn Clock>, cadence: Duration) -> Self {
        let core = SessionCore {
            store: SessionStore::new(),
            engine: RevealEngine::new(cadence),
            ticker: None,
            pending_send: None,
            next_send: 0,
            revision: 0,
        };
        let (snapshots, _) = watch::channel(ChatSnapshot::default());

        Self {
            transport,
            clock,
            core: Arc::new(Mutex::new(core)),
            snapshots,
        }
    }

    /// Receives a fresh snapshot after every state change, including every tick.
    pub fn subscribe(&self) -> watch::Receiver<ChatSnapshot> {
        self.snapshots.subscribe()
    }

    pub async fn snapshot(&self) -> ChatSnapshot {
        let core = self.core.lock().await;
        core.store.snapshot(core.revision)
    }

    pub async fn dispatch(&self, command: ChatCommand) -> ChatResult<()> {
        tracing::debug!(command = command.name(), "chat command");
        match command {
            ChatCommand::UpdateInput(text) => self.set_input(text).await,
            ChatCommand::Submit(text) => self.send(text).await.map(|_| ())?,
            ChatCommand::Stop => {
                self.stop().await;
            }
            ChatCommand::SelectConversation(id) => self.select_conversation(id).await?,
            ChatCommand::NewChat => self.new_chat().await?,
            ChatCommand::Refresh => self.load_history().await?,
        }
        Ok(())
    }

    /// Fetches the history list and opens the first conversation when none is active.
    pub async fn load_history(&self) -> ChatResult<()> {
        let history = self
            .transport
            .fetch_history()
            .await
            .context(TransportSnafu {
                stage: "load-history",
            })?;

        let open = {
            let mut core = self.core.lock().await;
            let history = history.into_iter().map(Conversation::from).collect::<Vec<_>>();
            let current = core
                .store
                .current_id()
                .filter(|id| history.iter().any(|conversation| conversation.id == *id))
                .or_else(|| history.first().map(|conversation| conversation.id));
            let changed = current != core.store.current_id();

            core.store.set_history(history);
            core.store.set_current_id(current);
            self.publish(&mut core);
            current.filter(|_| changed)
        };

        if let Some(id) = open {
            self.fetch_messages(id).await?;
        }
        Ok(())
    }

    /// Switches the active conversation, abandoning any running reveal or pending reply.
    pub async fn select_conversation(&self, id: ConversationId) -> ChatResult<()> {
        {
            let mut core = self.core.lock().await;
            core.store.set_current_id(Some(id));
            core.discard_reveal();
            core.abandon_send();
            self.publish(&mut core);
        }

        self.fetch_messages(id).await
    }

    /// Creates a conversation and makes it active, abandoning any running reveal or pending reply.
    pub async fn new_chat(&self) -> ChatResult<()> {
        {
            let mut core = self.core.lock().await;
            core.store.set_loading(true);
            self.publish(&mut core);
        }

        let created = self.transport.create_conversation().await;

        let mut core = self.core.lock().await;
        let result = match created {
            Ok(payload) => {
                let conversation = Conversation::from(payload);
                tracing::info!(conversation_id = %conversation.id, "created conversation");

                core.store.set_current_id(Some(conversation.id));
                core.store.set_messages(conversation.messages.clone());
                core.store.prepend_history(conversation);
                core.discard_reveal();
                core.abandon_send();
                Ok(())
            }
            Err(source) => Err(source).context(TransportSnafu { stage: "new-chat" }),
        };
        // On failure a send still waiting on its reply keeps the flag.
        core.sync_loading();
        self.publish(&mut core);
        result
    }

    pub async fn set_input(&self, text: impl Into<String>) {
        let mut core = self.core.lock().await;
        core.store.set_input(text);
        self.publish(&mut core);
    }

    /// Sends `text` (or the input buffer) and reveals the reply once it arrives.
    pub async fn send(&self, text: Option<String>) -> ChatResult<SendOutcome> {
        let (conversation_id, text, send) = {
            let mut core = self.core.lock().await;
            let text = text.unwrap_or_else(|| core.store.input().to_string());
            let Some(conversation_id) = core.store.current_id() else {
                return Ok(SendOutcome::Ignored);
            };
            if text.trim().is_empty() {
                return Ok(SendOutcome::Ignored);
            }
            if core.store.loading() || core.pending_send.is_some() || core.engine.is_streaming() {
                return BusySnafu { stage: "send" }.fail();
            }

            let send = core.begin_send();
            core.store
                .push_message(Message::user(text.clone(), self.clock.timestamp()));
            core.store.set_input("");
            self.publish(&mut core);
            (conversation_id, text, send)
        };

        let reply = self
            .transport
            .send_message(conversation_id, &text)
            .await;

        let mut core = self.core.lock().await;
        let reply = match reply {
            Ok(reply) => reply,
            Err(source) => {
                tracing::error!(conversation_id = %conversation_id, "send failed: {source}");
                core.finish_send(send);
                self.publish(&mut core);
                return Err(source).context(TransportSnafu { stage: "send" });
            }
        };

        let owned = core.finish_send(send);
        if !owned || core.store.current_id() != Some(conversation_id) {
            tracing::info!(conversation_id = %conversation_id, send, "dropping reply for inactive conversation");
            self.publish(&mut core);
            return Ok(SendOutcome::Dropped);
        }

        if reply.reply_text.is_empty() {
            self.publish(&mut core);
            return Ok(SendOutcome::NoReply);
        }

        let core = &mut *core;
        let id = core
            .engine
            .start(&mut core.store, &reply.reply_text, self.clock.as_ref())
            .context(RevealSnafu { stage: "send" })?;
        core.ticker = Some(self.spawn_ticker(id, core.engine.cadence()));
        self.publish(core);

        Ok(SendOutcome::Revealing(id))
    }

    /// Stops the running reveal, keeping the revealed prefix as a message.
    pub async fn stop(&self) -> Option<Message> {
        let mut core = self.core.lock().await;
        core.ticker = None;
        let core = &mut *core;
        let message = core.engine.cancel(&mut core.store, self.clock.as_ref());
        if message.is_some() {
            self.publish(core);
        }
        message
    }

    async fn fetch_messages(&self, id: ConversationId) -> ChatResult<()> {
        let conversation = self
            .transport
            .fetch_conversation(id)
            .await
            .context(TransportSnafu {
                stage: "fetch-messages",
            })?;

        let mut core = self.core.lock().await;
        if core.store.current_id() == Some(id) {
            let conversation = Conversation::from(conversation);
            core.store.set_messages(conversation.messages);
            self.publish(&mut core);
        }
        Ok(())
    }

    fn spawn_ticker(&self, id: RevealId, cadence: Duration) -> RevealTicker {
        let core = Arc::clone(&self.core);
        let clock = Arc::clone(&self.clock);
        let snapshots = self.snapshots.clone();

        RevealTicker::spawn(id, cadence, move || {
            let core = Arc::clone(&core);
            let clock = Arc::clone(&clock);
            let snapshots = snapshots.clone();
            async move {
                let mut guard = core.lock().await;
                let core = &mut *guard;
                let outcome = core.engine.tick(&mut core.store, id, clock.as_ref());
                if outcome != TickOutcome::Stale {
                    snapshots.send_replace(core.snapshot());
                }
                outcome
            }
        })
    }

    fn publish(&self, core: &mut SessionCore) {
        self.snapshots.send_replace(core.snapshot());
    }
}

#[cfg(test)]
mod tests {
    use murmur_storage::{ConversationRecord, MemoryStorage};
    use murmur_transport::{
        BoxFuture, ChatBackend, ConversationPayload, LocalTransport, Responder, SendReply,
        TransportResult,
    };
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::clock::testing::StepClock;
    use crate::message::Role;
    use crate::reveal::DEFAULT_REVEAL_CADENCE;

    struct FixedResponder(&'static str);

    impl Responder for FixedResponder {
        fn respond(&self, _conversation: &ConversationRecord, _prompt: &str) -> String {
            self.0.to_string()
        }
    }

    /// Delays `send_message` per prompt text.
    struct DelayedTransport {
        inner: LocalTransport,
        delays: Vec<(&'static str, Duration)>,
    }

    impl ChatTransport for DelayedTransport {
        fn fetch_history<'a>(&'a self) -> BoxFuture<'a, TransportResult<Vec<ConversationPayload>>> {
            self.inner.fetch_history()
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
            Box::pin(async move {
                let delay = self
                    .delays
                    .iter()
                    .find(|(prompt, _)| *prompt == text)
                    .map(|(_, delay)| *delay)
                    .unwrap_or_default();
                tokio::time::sleep(delay).await;
                self.inner.send_message(id, text).await
            })
        }
    }

    fn seeded_backend(reply: &'static str, conversations: usize) -> Arc<ChatBackend> {
        let backend = Arc::new(ChatBackend::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(FixedResponder(reply)),
        ));
        for _ in 0..conversations {
            backend.create().expect("seed conversation");
        }
        backend
    }

    async fn controller_over(transport: Arc<dyn ChatTransport>) -> ChatController {
        let controller = ChatController::new(
            transport,
            Arc::new(StepClock::default()),
            DEFAULT_REVEAL_CADENCE,
        );
        controller.load_history().await.expect("load history");
        controller
    }

    async fn controller_with_reply(reply: &'static str) -> ChatController {
        let backend = seeded_backend(reply, 1);
        controller_over(Arc::new(LocalTransport::new(backend))).await
    }

    fn spawn_send(
        controller: &Arc<ChatController>,
        text: &str,
    ) -> tokio::task::JoinHandle<ChatResult<SendOutcome>> {
        let controller = Arc::clone(controller);
        let text = text.to_string();
        tokio::spawn(async move { controller.send(Some(text)).await })
    }

    fn cadence_times(ticks: u32) -> Duration {
        // Land between two ticks so no timer fires at the same instant as the check.
        DEFAULT_REVEAL_CADENCE * ticks + DEFAULT_REVEAL_CADENCE / 2
    }

    fn assistant_texts(snapshot: &ChatSnapshot) -> Vec<String> {
        snapshot
            .messages
            .iter()
            .filter(|message| message.role == Role::Assistant)
            .map(|message| message.text.clone())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn reply_is_revealed_then_committed_once() {
        let controller = controller_with_reply("Hi!").await;

        let outcome = controller
            .send(Some("hello".to_string()))
            .await
            .expect("send");
        assert!(matches!(outcome, SendOutcome::Revealing(_)));

        tokio::time::sleep(cadence_times(1)).await;
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.streaming_text.as_deref(), Some("H"));
        assert!(snapshot.loading);

        tokio::time::sleep(cadence_times(5)).await;
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.streaming_text, None);
        assert!(!snapshot.loading);
        assert_eq!(assistant_texts(&snapshot), vec!["Hi!".to_string()]);
        assert_eq!(snapshot.messages[0].role, Role::User);
        assert_eq!(snapshot.messages[0].text, "hello");
    }

    #[tokio::test(start_paused = true)]
    async fn stop_keeps_revealed_prefix() {
        let controller = controller_with_reply("Hello there").await;
        controller
            .send(Some("hi".to_string()))
            .await
            .expect("send");

        tokio::time::sleep(cadence_times(2)).await;
        let message = controller.stop().await.expect("stopped message");
        assert_eq!(message.text, "He");

        tokio::time::sleep(cadence_times(20)).await;
        let snapshot = controller.snapshot().await;
        assert_eq!(assistant_texts(&snapshot), vec!["He".to_string()]);
        assert_eq!(snapshot.streaming_text, None);
        assert!(!snapshot.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_while_idle_changes_nothing() {
        let controller = controller_with_reply("unused").await;
        let before = controller.snapshot().await;

        assert_eq!(controller.stop().await, None);
        assert_eq!(controller.snapshot().await, before);
    }

    #[tokio::test(start_paused = true)]
    async fn new_chat_discards_partial_reply() {
        let controller = controller_with_reply("Partial reply").await;
        controller
            .send(Some("go".to_string()))
            .await
            .expect("send");

        tokio::time::sleep(cadence_times(3)).await;
        assert_eq!(
            controller.snapshot().await.streaming_text.as_deref(),
            Some("Par")
        );

        controller.new_chat().await.expect("new chat");
        tokio::time::sleep(cadence_times(20)).await;

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.streaming_text, None);
        assert!(snapshot.messages.is_empty());
        assert!(!snapshot.loading);
        assert_eq!(snapshot.history.len(), 2);
        assert!(snapshot.history[0].active);
    }

    #[tokio::test(start_paused = true)]
    async fn switching_back_shows_backend_copy_not_partial() {
        let controller = controller_with_reply("Partial reply").await;
        let first = controller.snapshot().await.current_id.expect("active");
        controller
            .send(Some("go".to_string()))
            .await
            .expect("send");
        tokio::time::sleep(cadence_times(3)).await;

        controller.new_chat().await.expect("new chat");
        controller
            .select_conversation(ConversationId::new(first))
            .await
            .expect("select");

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.current_id, Some(first));
        assert_eq!(snapshot.streaming_text, None);
        // The backend stored the full reply; the abandoned reveal added nothing locally.
        assert_eq!(assistant_texts(&snapshot), vec!["Partial reply".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn send_while_revealing_is_busy() {
        let controller = controller_with_reply("a long enough reply").await;
        controller
            .send(Some("one".to_string()))
            .await
            .expect("send");

        let error = controller
            .send(Some("two".to_string()))
            .await
            .expect_err("busy");
        assert!(matches!(error, crate::ChatError::Busy { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn blank_input_is_ignored() {
        let controller = controller_with_reply("x").await;
        controller.set_input("   ").await;

        assert_eq!(controller.send(None).await.expect("send"), SendOutcome::Ignored);
        assert!(controller.snapshot().await.messages.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn empty_reply_clears_busy_without_reveal() {
        let controller = controller_with_reply("").await;
        controller.set_input("question").await;

        assert_eq!(controller.send(None).await.expect("send"), SendOutcome::NoReply);
        let snapshot = controller.snapshot().await;
        assert!(!snapshot.loading);
        assert_eq!(snapshot.input, "");
        assert_eq!(snapshot.messages.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_observe_each_tick() {
        let controller = controller_with_reply("abc").await;
        let mut updates = controller.subscribe();
        controller
            .send(Some("go".to_string()))
            .await
            .expect("send");

        let mut seen = Vec::new();
        loop {
            updates.changed().await.expect("controller alive");
            let text = updates.borrow_and_update().streaming_text.clone();
            let done = text.is_none();
            seen.push(text);
            if done {
                break;
            }
        }

        let expected = ["", "a", "ab"]
            .into_iter()
            .map(|text| Some(text.to_string()))
            .chain([None])
            .collect::<Vec<_>>();
        assert_eq!(seen, expected);
        assert_eq!(
            assistant_texts(&controller.snapshot().await),
            vec!["abc".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn selecting_during_reveal_drops_partial_and_stops_ticks() {
        let backend = seeded_backend("Partial reply", 2);
        let controller = controller_over(Arc::new(LocalTransport::new(backend))).await;
        let other = controller.snapshot().await.history[1].id;
        controller
            .send(Some("go".to_string()))
            .await
            .expect("send");

        tokio::time::sleep(cadence_times(3)).await;
        assert_eq!(
            controller.snapshot().await.streaming_text.as_deref(),
            Some("Par")
        );

        controller
            .select_conversation(ConversationId::new(other))
            .await
            .expect("select");
        let updates = controller.subscribe();

        tokio::time::sleep(cadence_times(20)).await;
        assert!(!updates.has_changed().expect("controller alive"));

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.current_id, Some(other));
        assert_eq!(snapshot.streaming_text, None);
        assert!(snapshot.messages.is_empty());
        assert!(!snapshot.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn late_reply_for_abandoned_send_leaves_newer_send_busy() {
        let transport = DelayedTransport {
            inner: LocalTransport::new(seeded_backend("Hello", 1)),
            delays: vec![
                ("first", Duration::from_millis(100)),
                ("second", Duration::from_millis(1000)),
            ],
        };
        let controller = Arc::new(controller_over(Arc::new(transport)).await);

        let first = spawn_send(&controller, "first");
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(controller.snapshot().await.loading);

        controller.new_chat().await.expect("new chat");
        assert!(!controller.snapshot().await.loading);

        let second = spawn_send(&controller, "second");
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(controller.snapshot().await.loading);

        let outcome = first.await.expect("join first").expect("first");
        assert_eq!(outcome, SendOutcome::Dropped);
        assert!(controller.snapshot().await.loading);

        let error = controller
            .send(Some("third".to_string()))
            .await
            .expect_err("second still in flight");
        assert!(matches!(error, crate::ChatError::Busy { .. }));

        let outcome = second.await.expect("join second").expect("second");
        assert!(matches!(outcome, SendOutcome::Revealing(_)));

        tokio::time::sleep(cadence_times(10)).await;
        let snapshot = controller.snapshot().await;
        let texts = snapshot
            .messages
            .iter()
            .map(|message| message.text.as_str())
            .collect::<Vec<_>>();
        assert_eq!(texts, vec!["second", "Hello"]);
        assert!(!snapshot.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn new_chat_releases_busy_held_by_pending_send() {
        let transport = DelayedTransport {
            inner: LocalTransport::new(seeded_backend("Hello", 1)),
            delays: vec![("slow", Duration::from_millis(500))],
        };
        let controller = Arc::new(controller_over(Arc::new(transport)).await);

        let pending = spawn_send(&controller, "slow");
        tokio::time::sleep(Duration::from_millis(10)).await;
        controller.new_chat().await.expect("new chat");
        assert!(!controller.snapshot().await.loading);

        let outcome = pending.await.expect("join").expect("slow");
        assert_eq!(outcome, SendOutcome::Dropped);
        assert!(!controller.snapshot().await.loading);
    }
}
