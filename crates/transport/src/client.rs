use std::future::Future;
use std::pin::Pin;

use murmur_storage::ConversationId;

use super::error::TransportResult;
use super::wire::{ConversationPayload, SendReply};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Request/response boundary between the chat page and whatever backend produces replies.
///
/// Replies arrive atomically: `send_message` resolves once the whole reply text is known.
pub trait ChatTransport: Send + Sync {
    fn fetch_history<'a>(&'a self) -> BoxFuture<'a, TransportResult<Vec<ConversationPayload>>>;
    fn fetch_conversation<'a>(
        &'a self,
        id: ConversationId,
    ) -> BoxFuture<'a, TransportResult<ConversationPayload>>;
    fn create_conversation<'a>(&'a self) -> BoxFuture<'a, TransportResult<ConversationPayload>>;
    fn send_message<'a>(
        &'a self,
        id: ConversationId,
        text: &'a str,
    ) -> BoxFuture<'a, TransportResult<SendReply>>;
}
