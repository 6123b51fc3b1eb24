use super::ids::ConversationId;

/// Title given to conversations until their first user message arrives.
pub const DEFAULT_CONVERSATION_TITLE: &str = "New Chat";

/// Upper bound, in characters, for titles derived from a first message.
pub const TITLE_MAX_CHARS: usize = 24;

/// Storage-local message role, intentionally decoupled from chat-layer role enums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    pub role: MessageRole,
    pub text: String,
    pub time: String,
}

impl StoredMessage {
    pub fn new(role: MessageRole, text: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            time: time.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationRecord {
    pub id: ConversationId,
    pub title: String,
    pub messages: Vec<StoredMessage>,
    pub last_time: String,
}

impl ConversationRecord {
    pub fn new(id: ConversationId, title: impl Into<String>, last_time: impl Into<String>) -> Self {
        let mut title = title.into();
        if title.trim().is_empty() {
            title = DEFAULT_CONVERSATION_TITLE.to_string();
        }

        Self {
            id,
            title,
            messages: Vec::new(),
            last_time: last_time.into(),
        }
    }

    pub fn has_default_title(&self) -> bool {
        self.title == DEFAULT_CONVERSATION_TITLE
    }
}

/// Builds a sidebar title from the first line of a user prompt.
pub fn title_from_prompt(prompt: &str) -> Option<String> {
    let first_line = prompt.lines().map(str::trim).find(|line| !line.is_empty())?;
    Some(first_line.chars().take(TITLE_MAX_CHARS).collect())
}
