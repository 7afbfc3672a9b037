//! Propagation direction of an operation.

use std::fmt;

/// The side of the chain an operation travels toward.
///
/// Direction is a fixed property of an operation, never computed at runtime.
/// A context routes a [`Forward`](Direction::Forward) operation to its `next`
/// neighbor and a [`Reverse`](Direction::Reverse) operation to its `prev`
/// neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Travels from the head toward the tail (inbound events).
    Forward,
    /// Travels from the tail toward the head (outbound events).
    Reverse,
}

impl Direction {
    /// The other direction.
    pub const fn opposite(self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }

    /// Whether this is [`Direction::Forward`].
    pub const fn is_forward(self) -> bool {
        matches!(self, Direction::Forward)
    }

    /// Lowercase label used in signatures and log fields.
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Reverse => "reverse",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
