use std::sync::RwLock;

use snafu::{OptionExt, ensure};

use super::error::{EmptyMessageSnafu, LockPoisonedSnafu, NotFoundSnafu, StorageResult};
use super::ids::ConversationId;
use super::types::{ConversationRecord, MessageRole, StoredMessage, title_from_prompt};
use super::HistoryStore;

#[derive(Debug)]
struct Entry {
    record: ConversationRecord,
    // Display times are wall-clock strings, so recency ordering uses a counter instead.
    activity: u64,
}

#[derive(Debug, Default)]
struct Inner {
    entries: Vec<Entry>,
    next_id: u64,
    activity_clock: u64,
}

impl Inner {
    fn tick(&mut self) -> u64 {
        self.activity_clock = self.activity_clock.saturating_add(1);
        self.activity_clock
    }

    fn entry_mut(&mut self, id: ConversationId, stage: &'static str) -> StorageResult<&mut Entry> {
        self.entries
            .iter_mut()
            .find(|entry| entry.record.id == id)
            .context(NotFoundSnafu { stage, id })
    }
}

/// Process-local history store. Contents do not survive a restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    inner: RwLock<Inner>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for MemoryStorage {
    fn list_conversations(&self) -> StorageResult<Vec<ConversationRecord>> {
        let inner = self.inner.read().ok().context(LockPoisonedSnafu {
            stage: "list-conversations",
        })?;

        let mut entries = inner.entries.iter().collect::<Vec<_>>();
        entries.sort_by(|left, right| right.activity.cmp(&left.activity));
        Ok(entries.into_iter().map(|entry| entry.record.clone()).collect())
    }

    fn get_conversation(&self, id: ConversationId) -> StorageResult<ConversationRecord> {
        let inner = self.inner.read().ok().context(LockPoisonedSnafu {
            stage: "get-conversation",
        })?;

        inner
            .entries
            .iter()
            .find(|entry| entry.record.id == id)
            .map(|entry| entry.record.clone())
            .context(NotFoundSnafu {
                stage: "get-conversation",
                id,
            })
    }

    fn create_conversation(&self, title: &str) -> StorageResult<ConversationRecord> {
        let mut inner = self.inner.write().ok().context(LockPoisonedSnafu {
            stage: "create-conversation",
        })?;

        inner.next_id = inner.next_id.saturating_add(1);
        let id = ConversationId::new(inner.next_id);
        let record = ConversationRecord::new(id, title, "");
        let activity = inner.tick();
        inner.entries.push(Entry {
            record: record.clone(),
            activity,
        });

        tracing::debug!(conversation_id = %id, "created conversation");
        Ok(record)
    }

    fn append_message(
        &self,
        id: ConversationId,
        message: StoredMessage,
    ) -> StorageResult<ConversationRecord> {
        ensure!(
            !(message.role == MessageRole::User && message.text.trim().is_empty()),
            EmptyMessageSnafu {
                stage: "append-message",
                id,
                role: message.role.as_str(),
            }
        );

        let mut inner = self.inner.write().ok().context(LockPoisonedSnafu {
            stage: "append-message",
        })?;
        let activity = inner.tick();
        let entry = inner.entry_mut(id, "append-message")?;

        if message.role == MessageRole::User
            && entry.record.has_default_title()
            && let Some(title) = title_from_prompt(&message.text)
        {
            entry.record.title = title;
        }

        entry.record.last_time = message.time.clone();
        entry.record.messages.push(message);
        entry.activity = activity;

        Ok(entry.record.clone())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::StorageError;
    use crate::types::DEFAULT_CONVERSATION_TITLE;

    #[test]
    fn ids_are_sequential_from_one() {
        let storage = MemoryStorage::new();
        let first = storage.create_conversation("").expect("create first");
        let second = storage.create_conversation("Named").expect("create second");

        assert_eq!(first.id, ConversationId::new(1));
        assert_eq!(second.id, ConversationId::new(2));
        assert_eq!(first.title, DEFAULT_CONVERSATION_TITLE);
        assert_eq!(second.title, "Named");
    }

    #[test]
    fn listing_is_most_recent_first() {
        let storage = MemoryStorage::new();
        let older = storage.create_conversation("").expect("create older");
        let newer = storage.create_conversation("").expect("create newer");

        let ids = storage
            .list_conversations()
            .expect("list")
            .into_iter()
            .map(|record| record.id)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![newer.id, older.id]);

        storage
            .append_message(
                older.id,
                StoredMessage::new(MessageRole::User, "bump", "09:00:00"),
            )
            .expect("append");
        let ids = storage
            .list_conversations()
            .expect("list")
            .into_iter()
            .map(|record| record.id)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![older.id, newer.id]);
    }

    #[test]
    fn first_user_message_retitles_default_conversation() {
        let storage = MemoryStorage::new();
        let created = storage.create_conversation("").expect("create");

        let updated = storage
            .append_message(
                created.id,
                StoredMessage::new(MessageRole::User, "How do lifetimes work?", "10:01:02"),
            )
            .expect("append user");
        assert_eq!(updated.title, "How do lifetimes work?");
        assert_eq!(updated.last_time, "10:01:02");

        let updated = storage
            .append_message(
                created.id,
                StoredMessage::new(MessageRole::User, "second question", "10:02:00"),
            )
            .expect("append second");
        assert_eq!(updated.title, "How do lifetimes work?");
        assert_eq!(updated.messages.len(), 2);
    }

    #[test]
    fn unknown_conversation_is_not_found() {
        let storage = MemoryStorage::new();
        let error = storage
            .get_conversation(ConversationId::new(42))
            .expect_err("missing conversation");
        assert!(matches!(error, StorageError::NotFound { .. }));
    }

    #[test]
    fn blank_user_message_is_rejected() {
        let storage = MemoryStorage::new();
        let created = storage.create_conversation("").expect("create");
        let error = storage
            .append_message(
                created.id,
                StoredMessage::new(MessageRole::User, "  ", "10:00:00"),
            )
            .expect_err("blank message");
        assert!(matches!(error, StorageError::EmptyMessage { .. }));
    }
}
