//! Membership change events published by the registry.

use crate::name::PeerName;

/// A registry membership change, announced to connected peers and
/// published to observers. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipEvent {
    /// A peer was admitted under `name`.
    Joined(PeerName),

    /// A peer's name was evicted.
    Left(PeerName),

    /// Point-in-time view of all admitted names, sorted.
    Snapshot(Vec<PeerName>),
}

impl MembershipEvent {
    /// The single name this event concerns, if any.
    pub fn name(&self) -> Option<&PeerName> {
        match self {
            Self::Joined(name) | Self::Left(name) => Some(name),
            Self::Snapshot(_) => None,
        }
    }
}
