pub use murmur_transport::ConversationId;
use murmur_transport::{ConversationPayload, MessagePayload, WireRole};
use serde::Serialize;

/// Chat speaker role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of a conversation. Never edited after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
    pub time: String,
}

impl Message {
    pub fn new(role: Role, text: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            time: time.into(),
        }
    }

    pub fn user(text: impl Into<String>, time: impl Into<String>) -> Self {
        Self::new(Role::User, text, time)
    }

    pub fn assistant(text: impl Into<String>, time: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text, time)
    }
}

impl From<MessagePayload> for Message {
    fn from(payload: MessagePayload) -> Self {
        let role = match payload.role {
            WireRole::User => Role::User,
            WireRole::Ai => Role::Assistant,
        };
        Self::new(role, payload.text, payload.time)
    }
}

/// Conversation as listed in the history sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: ConversationId,
    pub title: String,
    pub messages: Vec<Message>,
    pub last_time: String,
}

impl Conversation {
    pub fn new(id: ConversationId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            messages: Vec::new(),
            last_time: String::new(),
        }
    }
}

impl From<ConversationPayload> for Conversation {
    fn from(payload: ConversationPayload) -> Self {
        Self {
            id: payload.conversation_id(),
            title: payload.title,
            messages: payload.messages.into_iter().map(Message::from).collect(),
            last_time: payload.last_time,
        }
    }
}

/// In-flight reveal as observers see it.
///
/// `text` is present exactly while a reveal runs and is always a prefix of the reply being revealed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamingState {
    pub text: Option<String>,
    pub started_at: Option<String>,
}

impl StreamingState {
    pub fn started(started_at: impl Into<String>) -> Self {
        Self {
            text: Some(String::new()),
            started_at: Some(started_at.into()),
        }
    }

    pub fn is_active(&self) -> bool {
        self.text.is_some()
    }

    pub fn clear(&mut self) {
        self.text = None;
        self.started_at = None;
    }
}
