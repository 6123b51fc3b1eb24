use std::sync::Arc;

use murmur_storage::{
    ConversationId, ConversationRecord, HistoryStore, MessageRole, StoredMessage,
};
use snafu::ResultExt;

use super::error::{BackendSnafu, TransportResult};
use super::wire::{ConversationPayload, SendReply};

/// Formats a wall-clock display time the way the chat page shows it.
pub fn display_time() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

/// Produces the complete assistant reply for one user turn.
pub trait Responder: Send + Sync {
    fn respond(&self, conversation: &ConversationRecord, prompt: &str) -> String;
}

/// Deterministic responder used when no model is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct CannedResponder;

impl Responder for CannedResponder {
    fn respond(&self, conversation: &ConversationRecord, prompt: &str) -> String {
        let turn = conversation
            .messages
            .iter()
            .filter(|message| message.role == MessageRole::User)
            .count();

        format!(
            "You said: \"{}\". That is message {turn} in \"{}\". Ask me anything else!",
            prompt.trim(),
            conversation.title
        )
    }
}

/// Server side of the history API: storage plus a reply producer.
pub struct ChatBackend {
    store: Arc<dyn HistoryStore>,
    responder: Arc<dyn Responder>,
}

impl ChatBackend {
    pub fn new(store: Arc<dyn HistoryStore>, responder: Arc<dyn Responder>) -> Self {
        Self { store, responder }
    }

    pub fn history(&self) -> TransportResult<Vec<ConversationPayload>> {
        let records = self.store.list_conversations().context(BackendSnafu {
            stage: "backend-history",
        })?;
        Ok(records.into_iter().map(ConversationPayload::from).collect())
    }

    pub fn conversation(&self, id: ConversationId) -> TransportResult<ConversationPayload> {
        self.store
            .get_conversation(id)
            .map(ConversationPayload::from)
            .context(BackendSnafu {
                stage: "backend-conversation",
            })
    }

    pub fn create(&self) -> TransportResult<ConversationPayload> {
        self.store
            .create_conversation("")
            .map(ConversationPayload::from)
            .context(BackendSnafu {
                stage: "backend-create",
            })
    }

    /// Records the user turn, asks the responder, then records and returns the reply.
    pub fn send(&self, id: ConversationId, text: &str) -> TransportResult<SendReply> {
        let conversation = self
            .store
            .append_message(
                id,
                StoredMessage::new(MessageRole::User, text, display_time()),
            )
            .context(BackendSnafu {
                stage: "backend-send-user",
            })?;

        let reply_text = self.responder.respond(&conversation, text);
        if !reply_text.is_empty() {
            self.store
                .append_message(
                    id,
                    StoredMessage::new(MessageRole::Assistant, reply_text.clone(), display_time()),
                )
                .context(BackendSnafu {
                    stage: "backend-send-reply",
                })?;
        }

        tracing::debug!(conversation_id = %id, reply_chars = reply_text.chars().count(), "produced reply");
        Ok(SendReply { reply_text })
    }
}
