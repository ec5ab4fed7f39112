//! Registry actor commands and errors.
//!
//! Message types for communicating with the `RegistryActor`:
//! - `RegistryCommand`: commands sent to the actor
//! - `RegistryError`: errors from registry operations
//!
//! Membership events published by the actor are the shared
//! [`MembershipEvent`] type from hub-core.

use hub_core::{Dispatch, NameError, PeerName};
use hub_protocol::ServerFrame;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

/// Sending side of one peer's outbound queue.
///
/// The queue is unbounded so the actor never blocks on delivery; a
/// peer that stops reading only grows its own queue.
pub type Outbound = mpsc::UnboundedSender<ServerFrame>;

/// Commands sent to the registry actor.
///
/// Request-response commands carry a oneshot `respond_to`; dispatch is
/// fire-and-forget because delivery is best-effort by contract.
#[derive(Debug)]
pub enum RegistryCommand {
    /// Atomically validate a candidate name and admit the peer.
    ///
    /// On success the actor also enqueues `NAMEACCEPTED` and the
    /// membership snapshot to the new peer and announces the join to
    /// everyone else, all within the same critical section.
    TryAdmit {
        /// Raw candidate line from the negotiating peer
        candidate: String,
        /// The peer's outbound queue, registered on success
        outbound: Outbound,
        /// Channel for the admission result
        respond_to: oneshot::Sender<Result<PeerName, RegistryError>>,
    },

    /// Remove a name if present; announce the departure when it was.
    ///
    /// Absent names are a no-op so racing cleanup paths are safe.
    Evict {
        /// Name to remove
        name: PeerName,
        /// Whether the name was present
        respond_to: oneshot::Sender<bool>,
    },

    /// Point-in-time sorted view of all admitted names.
    Snapshot {
        respond_to: oneshot::Sender<Vec<PeerName>>,
    },

    /// Resolve and deliver one chat message.
    Dispatch {
        /// The broadcast or private request
        request: Dispatch,
    },
}

/// Errors that can occur during registry operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Candidate failed name validation
    #[error(transparent)]
    InvalidName(#[from] NameError),

    /// Another active peer already holds this name
    #[error("name already taken: {0}")]
    NameTaken(PeerName),

    /// The actor has shut down
    #[error("registry channel closed")]
    ChannelClosed,
}
