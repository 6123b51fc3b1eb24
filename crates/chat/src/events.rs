use crate::message::ConversationId;

/// One user action on the chat page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Replace the input buffer.
    UpdateInput(String),
    /// Send the given text, or the input buffer when `None`.
    Submit(Option<String>),
    /// Stop the in-flight reveal and keep what was shown so far.
    Stop,
    SelectConversation(ConversationId),
    NewChat,
    /// Reload the history list from the backend.
    Refresh,
}

impl ChatCommand {
    pub fn submit(text: impl Into<String>) -> Self {
        Self::Submit(Some(text.into()))
    }

    /// Name used in logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::UpdateInput(_) => "update-input",
            Self::Submit(_) => "submit",
            Self::Stop => "stop",
            Self::SelectConversation(_) => "select-conversation",
            Self::NewChat => "new-chat",
            Self::Refresh => "refresh",
        }
    }
}
