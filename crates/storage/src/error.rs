use snafu::Snafu;

use super::ids::ConversationId;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StorageError {
    #[snafu(display("conversation '{id}' was not found"))]
    NotFound {
        stage: &'static str,
        id: ConversationId,
    },
    #[snafu(display("history lock was poisoned on `{stage}`"))]
    LockPoisoned { stage: &'static str },
    #[snafu(display("refusing to store an empty {role} message in conversation '{id}'"))]
    EmptyMessage {
        stage: &'static str,
        id: ConversationId,
        role: &'static str,
    },
}

pub type StorageResult<T> = Result<T, StorageError>;
