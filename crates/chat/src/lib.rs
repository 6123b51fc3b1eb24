#![deny(unsafe_code)]

/// Display-time source shared by the store and the reveal engine.
pub mod clock;
pub mod controller;
pub mod error;
/// Commands the chat page can issue against a controller.
pub mod events;
/// Chat domain entities.
pub mod message;
/// Incremental reveal of an already-complete reply.
pub mod reveal;
pub mod store;
pub mod ticker;

pub use clock::{Clock, SystemClock};
pub use controller::{ChatController, SendOutcome};
pub use error::{ChatError, ChatResult};
pub use events::ChatCommand;
pub use message::{Conversation, ConversationId, Message, Role, StreamingState};
pub use reveal::{
    DEFAULT_REVEAL_CADENCE, RevealEngine, RevealError, RevealId, RevealPhase, TickOutcome,
};
pub use store::{ChatSnapshot, HistoryEntry, SessionStore};
pub use ticker::RevealTicker;
