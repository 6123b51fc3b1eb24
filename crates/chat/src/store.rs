use serde::Serialize;

use crate::message::{Conversation, ConversationId, Message, StreamingState};

const PREVIEW_CHARS: usize = 24;
const EMPTY_PREVIEW: &str = "No messages yet";

/// Per-user chat page state.
///
/// A plain container: setters never validate. Keeping [`StreamingState`] consistent is the
/// reveal engine's job.
#[derive(Debug, Default)]
pub struct SessionStore {
    history: Vec<Conversation>,
    current_id: Option<ConversationId>,
    messages: Vec<Message>,
    input: String,
    loading: bool,
    streaming: StreamingState,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[Conversation] {
        &self.history
    }

    pub fn set_history(&mut self, history: Vec<Conversation>) {
        self.history = history;
    }

    pub fn prepend_history(&mut self, conversation: Conversation) {
        self.history.retain(|entry| entry.id != conversation.id);
        self.history.insert(0, conversation);
    }

    pub fn current_id(&self) -> Option<ConversationId> {
        self.current_id
    }

    pub fn set_current_id(&mut self, id: Option<ConversationId>) {
        self.current_id = id;
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn set_messages(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn streaming(&self) -> &StreamingState {
        &self.streaming
    }

    pub fn streaming_text(&self) -> Option<&str> {
        self.streaming.text.as_deref()
    }

    pub fn set_streaming_text(&mut self, text: Option<String>) {
        self.streaming.text = text;
    }

    pub fn set_streaming_started_at(&mut self, started_at: Option<String>) {
        self.streaming.started_at = started_at;
    }

    pub fn set_streaming(&mut self, streaming: StreamingState) {
        self.streaming = streaming;
    }

    pub fn clear_streaming(&mut self) {
        self.streaming.clear();
    }

    /// Serialisable view for templates and the event stream.
    pub fn snapshot(&self, revision: u64) -> ChatSnapshot {
        let history = self
            .history
            .iter()
            .map(|conversation| {
                let active = Some(conversation.id) == self.current_id;
                // The active conversation's list is fresher than the copy fetched with the history.
                let last_message = if active {
                    self.messages.last()
                } else {
                    conversation.messages.last()
                };

                HistoryEntry {
                    id: conversation.id.get(),
                    title: conversation.title.clone(),
                    preview: last_message
                        .map(|message| message.text.chars().take(PREVIEW_CHARS).collect())
                        .unwrap_or_else(|| EMPTY_PREVIEW.to_string()),
                    last_time: last_message
                        .map(|message| message.time.clone())
                        .unwrap_or_else(|| conversation.last_time.clone()),
                    active,
                }
            })
            .collect();

        ChatSnapshot {
            revision,
            history,
            current_id: self.current_id.map(ConversationId::get),
            messages: self.messages.clone(),
            input: self.input.clone(),
            loading: self.loading,
            streaming_text: self.streaming.text.clone(),
            streaming_started_at: self.streaming.started_at.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: u64,
    pub title: String,
    pub preview: String,
    pub last_time: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSnapshot {
    pub revision: u64,
    pub history: Vec<HistoryEntry>,
    pub current_id: Option<u64>,
    pub messages: Vec<Message>,
    pub input: String,
    pub loading: bool,
    pub streaming_text: Option<String>,
    pub streaming_started_at: Option<String>,
}

impl ChatSnapshot {
    pub fn is_streaming(&self) -> bool {
        self.streaming_text.is_some()
    }

    /// The page shows a "typing" placeholder while a request is pending and nothing is revealed yet.
    pub fn is_waiting_for_reply(&self) -> bool {
        self.loading && !self.is_streaming()
    }

    pub fn has_messages(&self) -> bool {
        !self.messages.is_empty() || self.is_streaming()
    }
}
