pub mod error;
pub mod ids;
pub mod memory;
pub mod types;

pub use error::{StorageError, StorageResult};
pub use ids::ConversationId;
pub use memory::MemoryStorage;
pub use types::{
    ConversationRecord, DEFAULT_CONVERSATION_TITLE, MessageRole, StoredMessage, TITLE_MAX_CHARS,
};

/// History backend for conversations and their messages.
pub trait HistoryStore: Send + Sync {
    /// Lists every conversation, most recently active first.
    fn list_conversations(&self) -> StorageResult<Vec<ConversationRecord>>;
    fn get_conversation(&self, id: ConversationId) -> StorageResult<ConversationRecord>;
    fn create_conversation(&self, title: &str) -> StorageResult<ConversationRecord>;
    /// Appends one message and bumps the conversation's last activity time.
    fn append_message(
        &self,
        id: ConversationId,
        message: StoredMessage,
    ) -> StorageResult<ConversationRecord>;
}
