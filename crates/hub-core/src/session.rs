//! Per-connection session lifecycle.

use std::fmt;

/// Lifecycle state of one connected peer.
///
/// Transitions are one-way: `Negotiating → Active → Closed`, with
/// `Negotiating → Closed` for peers that disconnect before admission.
/// `Closed` is terminal and idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connected, no name admitted yet; every inbound line is a
    /// name candidate.
    Negotiating,

    /// Name admitted; inbound lines are chat commands.
    Active,

    /// Terminal: read failure, end-of-stream, or shutdown.
    Closed,
}

impl SessionState {
    /// Whether the session holds an admitted name.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Whether the session has terminated.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Negotiating => "negotiating",
            Self::Active => "active",
            Self::Closed => "closed",
        };
        write!(f, "{label}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_predicates() {
        assert!(!SessionState::Negotiating.is_active());
        assert!(SessionState::Active.is_active());
        assert!(SessionState::Closed.is_closed());
        assert!(!SessionState::Active.is_closed());
    }

    #[test]
    fn test_state_labels() {
        assert_eq!(SessionState::Negotiating.to_string(), "negotiating");
        assert_eq!(SessionState::Active.to_string(), "active");
        assert_eq!(SessionState::Closed.to_string(), "closed");
    }
}
