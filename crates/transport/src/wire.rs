use murmur_storage::{ConversationId, ConversationRecord, MessageRole, StoredMessage};
use serde::{Deserialize, Serialize};

/// Role names as the history API spells them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    User,
    #[serde(alias = "assistant")]
    Ai,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePayload {
    pub role: WireRole,
    pub text: String,
    #[serde(default)]
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationPayload {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<MessagePayload>,
    #[serde(default)]
    pub last_time: String,
}

impl ConversationPayload {
    pub fn conversation_id(&self) -> ConversationId {
        ConversationId::new(self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub chat_id: u64,
    pub text: String,
}

/// Reply to one submitted user message. An empty `reply_text` means the backend had nothing to say.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReply {
    #[serde(rename = "aiText", default)]
    pub reply_text: String,
}

impl From<&StoredMessage> for MessagePayload {
    fn from(message: &StoredMessage) -> Self {
        let role = match message.role {
            MessageRole::User => WireRole::User,
            MessageRole::Assistant => WireRole::Ai,
        };

        Self {
            role,
            text: message.text.clone(),
            time: message.time.clone(),
        }
    }
}

impl From<ConversationRecord> for ConversationPayload {
    fn from(record: ConversationRecord) -> Self {
        Self {
            id: record.id.get(),
            title: record.title,
            messages: record.messages.iter().map(MessagePayload::from).collect(),
            last_time: record.last_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn conversation_payload_uses_history_api_field_names() {
        let payload = ConversationPayload {
            id: 7,
            title: "Greeting".to_string(),
            messages: vec![MessagePayload {
                role: WireRole::Ai,
                text: "hello".to_string(),
                time: "12:00:00".to_string(),
            }],
            last_time: "12:00:00".to_string(),
        };

        assert_eq!(
            serde_json::to_value(&payload).expect("serialize"),
            json!({
                "id": 7,
                "title": "Greeting",
                "messages": [{ "role": "ai", "text": "hello", "time": "12:00:00" }],
                "lastTime": "12:00:00",
            })
        );
    }

    #[test]
    fn missing_reply_text_decodes_as_empty() {
        let reply: SendReply = serde_json::from_value(json!({})).expect("decode");
        assert!(reply.reply_text.is_empty());

        let reply: SendReply = serde_json::from_value(json!({ "aiText": "hi" })).expect("decode");
        assert_eq!(reply.reply_text, "hi");
    }

    #[test]
    fn assistant_role_alias_is_accepted() {
        let message: MessagePayload =
            serde_json::from_value(json!({ "role": "assistant", "text": "x" })).expect("decode");
        assert_eq!(message.role, WireRole::Ai);
        assert_eq!(message.time, "");
    }
}
