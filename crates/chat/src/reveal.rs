use std::fmt;
use std::time::Duration;

use snafu::{Snafu, ensure};

use crate::clock::Clock;
use crate::message::{Message, StreamingState};
use crate::store::SessionStore;

/// Delay between two revealed characters.
pub const DEFAULT_REVEAL_CADENCE: Duration = Duration::from_millis(24);

/// Identifier for one reveal run.
///
/// A fresh id is minted on every start so ticks scheduled for an earlier run can be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RevealId(pub u64);

impl RevealId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for RevealId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealPhase {
    Idle,
    Streaming(RevealId),
}

/// Result of applying one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// One more character is visible; another tick is due.
    Advanced { revealed_chars: usize },
    /// The last character was revealed and the reply was committed.
    Finished(Message),
    /// The tick belongs to a reveal that already ended. Nothing changed.
    Stale,
}

impl TickOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Advanced { .. })
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RevealError {
    #[snafu(display("reveal {active} is still running; cancel it before starting another"))]
    AlreadyRevealing {
        stage: &'static str,
        active: RevealId,
    },
    #[snafu(display("cannot reveal an empty reply"))]
    EmptyReply { stage: &'static str },
}

#[derive(Debug)]
struct ActiveReveal {
    id: RevealId,
    target: String,
    // Byte offset of the revealed prefix; always on a char boundary.
    cursor: usize,
    revealed_chars: usize,
}

impl ActiveReveal {
    fn revealed(&self) -> &str {
        &self.target[..self.cursor]
    }

    fn is_complete(&self) -> bool {
        self.cursor == self.target.len()
    }
}

/// Exposes an already-complete reply one character per tick and commits it exactly once.
///
/// The engine never schedules anything itself; a [`crate::RevealTicker`] calls [`Self::tick`]
/// on a fixed cadence. Every operation takes the [`SessionStore`] it writes to explicitly.
///
/// `Idle --start--> Streaming`, `Streaming --tick--> Streaming` until the last character, whose
/// tick finalizes back to `Idle`. `cancel` finalizes the revealed prefix; `discard` drops it.
#[derive(Debug)]
pub struct RevealEngine {
    cadence: Duration,
    last_id: u64,
    active: Option<ActiveReveal>,
}

impl Default for RevealEngine {
    fn default() -> Self {
        Self::new(DEFAULT_REVEAL_CADENCE)
    }
}

impl RevealEngine {
    pub fn new(cadence: Duration) -> Self {
        Self {
            cadence,
            last_id: 0,
            active: None,
        }
    }

    pub fn cadence(&self) -> Duration {
        self.cadence
    }

    pub fn phase(&self) -> RevealPhase {
        match &self.active {
            Some(active) => RevealPhase::Streaming(active.id),
            None => RevealPhase::Idle,
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.active.is_some()
    }

    /// Begins revealing `full_text`.
    ///
    /// Starting while another reveal runs is rejected; callers cancel or discard first.
    pub fn start(
        &mut self,
        store: &mut SessionStore,
        full_text: &str,
        clock: &dyn Clock,
    ) -> Result<RevealId, RevealError> {
        if let Some(active) = &self.active {
            tracing::warn!(active = %active.id, "rejected re-entrant reveal start");
            return AlreadyRevealingSnafu {
                stage: "reveal-start",
                active: active.id,
            }
            .fail();
        }
        ensure!(
            !full_text.is_empty(),
            EmptyReplySnafu {
                stage: "reveal-start"
            }
        );

        self.last_id = self.last_id.saturating_add(1);
        let id = RevealId::new(self.last_id);
        self.active = Some(ActiveReveal {
            id,
            target: full_text.to_string(),
            cursor: 0,
            revealed_chars: 0,
        });

        store.set_streaming(StreamingState::started(clock.timestamp()));
        store.set_loading(true);

        tracing::debug!(reveal_id = %id, chars = full_text.chars().count(), "reveal started");
        Ok(id)
    }

    /// Reveals exactly one more character of reveal `id`.
    pub fn tick(
        &mut self,
        store: &mut SessionStore,
        id: RevealId,
        clock: &dyn Clock,
    ) -> TickOutcome {
        let Some(active) = self.active.as_mut().filter(|active| active.id == id) else {
            return TickOutcome::Stale;
        };

        let Some(next) = active.target[active.cursor..].chars().next() else {
            // Unreachable for non-empty targets: completion finalizes on the last character.
            return TickOutcome::Stale;
        };
        active.cursor += next.len_utf8();
        active.revealed_chars += 1;
        store.set_streaming_text(Some(active.revealed().to_string()));

        if !active.is_complete() {
            return TickOutcome::Advanced {
                revealed_chars: active.revealed_chars,
            };
        }

        let message = self.finalize(store, clock.timestamp());
        tracing::debug!(reveal_id = %id, "reveal completed");
        message.map_or(TickOutcome::Stale, TickOutcome::Finished)
    }

    /// Stops the running reveal and commits whatever prefix is visible.
    ///
    /// Returns `None` when idle. The message time is the reveal's start time.
    pub fn cancel(&mut self, store: &mut SessionStore, clock: &dyn Clock) -> Option<Message> {
        let id = self.active.as_ref()?.id;
        let time = store
            .streaming()
            .started_at
            .clone()
            .unwrap_or_else(|| clock.timestamp());

        let message = self.finalize(store, time);
        tracing::debug!(reveal_id = %id, "reveal cancelled");
        message
    }

    /// Abandons the running reveal without committing anything.
    ///
    /// Used when the active conversation changes under a running reveal.
    pub fn discard(&mut self, store: &mut SessionStore) -> Option<RevealId> {
        let active = self.active.take()?;
        store.clear_streaming();
        store.set_loading(false);

        tracing::debug!(
            reveal_id = %active.id,
            dropped_chars = active.revealed_chars,
            "reveal discarded"
        );
        Some(active.id)
    }

    // Taking `active` makes a second finalize for the same reveal impossible.
    fn finalize(&mut self, store: &mut SessionStore, time: String) -> Option<Message> {
        let active = self.active.take()?;
        let message = Message::assistant(active.revealed(), time);

        store.push_message(message.clone());
        store.clear_streaming();
        store.set_loading(false);
        Some(message)
    }
}
