use std::sync::Arc;

mod backend;
mod client;
mod error;
mod http;
mod local;
mod wire;

pub use backend::{CannedResponder, ChatBackend, Responder, display_time};
pub use client::{BoxFuture, ChatTransport};
pub use error::{TransportError, TransportResult};
pub use http::HttpTransport;
pub use local::LocalTransport;
pub use murmur_storage::ConversationId;
pub use wire::{ConversationPayload, MessagePayload, SendMessageRequest, SendReply, WireRole};

/// Picks the HTTP client when a remote API base is configured, the in-process backend otherwise.
pub fn create_transport(
    api_base: Option<&str>,
    backend: Arc<ChatBackend>,
) -> TransportResult<Arc<dyn ChatTransport>> {
    match api_base.map(str::trim).filter(|base| !base.is_empty()) {
        Some(base) => {
            tracing::info!(api_base = base, "using remote chat backend");
            Ok(Arc::new(HttpTransport::new(base)?))
        }
        None => {
            tracing::info!("using in-process chat backend");
            Ok(Arc::new(LocalTransport::new(backend)))
        }
    }
}
