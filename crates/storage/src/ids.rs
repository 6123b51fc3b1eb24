use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Integer conversation identifier, assigned by the history store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConversationId(pub u64);

impl ConversationId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl From<u64> for ConversationId {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl From<ConversationId> for u64 {
    fn from(value: ConversationId) -> Self {
        value.0
    }
}

impl FromStr for ConversationId {
    type Err = ParseIntError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        raw.trim().parse::<u64>().map(Self)
    }
}
