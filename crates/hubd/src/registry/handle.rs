//! Client interface for interacting with the RegistryActor.
//!
//! The `RegistryHandle` is a cheap-to-clone interface for sending
//! commands to the registry actor and subscribing to membership
//! events. Channel errors map to `RegistryError::ChannelClosed` or,
//! on the cleanup paths, degrade to harmless no-ops.

use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::debug;

use hub_core::{Dispatch, MembershipEvent, PeerName};

use super::commands::{Outbound, RegistryCommand, RegistryError};

/// Handle for interacting with the registry actor.
///
/// Clone freely; every session task holds one.
#[derive(Clone)]
pub struct RegistryHandle {
    /// Command sender to the actor
    sender: mpsc::Sender<RegistryCommand>,

    /// Event broadcaster for subscribing to membership changes
    event_sender: broadcast::Sender<MembershipEvent>,
}

impl RegistryHandle {
    /// Creates a new registry handle.
    pub fn new(
        sender: mpsc::Sender<RegistryCommand>,
        event_sender: broadcast::Sender<MembershipEvent>,
    ) -> Self {
        Self {
            sender,
            event_sender,
        }
    }

    /// Attempts to admit a peer under a candidate name.
    ///
    /// On success the actor has already queued `NAMEACCEPTED` and the
    /// membership snapshot on `outbound` and announced the join to the
    /// other peers.
    ///
    /// # Errors
    ///
    /// - `RegistryError::InvalidName` if the candidate fails validation
    /// - `RegistryError::NameTaken` if another peer holds the name
    /// - `RegistryError::ChannelClosed` if the actor has shut down
    pub async fn try_admit(
        &self,
        candidate: impl Into<String>,
        outbound: Outbound,
    ) -> Result<PeerName, RegistryError> {
        let (tx, rx) = oneshot::channel();

        self.sender
            .send(RegistryCommand::TryAdmit {
                candidate: candidate.into(),
                outbound,
                respond_to: tx,
            })
            .await
            .map_err(|_| RegistryError::ChannelClosed)?;

        rx.await.map_err(|_| RegistryError::ChannelClosed)?
    }

    /// Evicts a name from the registry.
    ///
    /// Returns whether the name was present. Infallible by design:
    /// this runs on session cleanup paths, where an already-stopped
    /// actor means there is nothing left to clean up.
    pub async fn evict(&self, name: &PeerName) -> bool {
        let (tx, rx) = oneshot::channel();

        let sent = self
            .sender
            .send(RegistryCommand::Evict {
                name: name.clone(),
                respond_to: tx,
            })
            .await;

        if sent.is_err() {
            debug!(peer = %name, "evict skipped: registry stopped");
            return false;
        }

        rx.await.unwrap_or(false)
    }

    /// Returns a sorted point-in-time view of all admitted names.
    ///
    /// Returns an empty vector if the actor has shut down.
    pub async fn snapshot(&self) -> Vec<PeerName> {
        let (tx, rx) = oneshot::channel();

        if self
            .sender
            .send(RegistryCommand::Snapshot { respond_to: tx })
            .await
            .is_err()
        {
            return Vec::new();
        }

        rx.await.unwrap_or_default()
    }

    /// Hands one chat message to the router. Fire-and-forget:
    /// delivery is best-effort by contract.
    pub async fn dispatch(&self, request: Dispatch) {
        if self
            .sender
            .send(RegistryCommand::Dispatch { request })
            .await
            .is_err()
        {
            debug!("dispatch dropped: registry stopped");
        }
    }

    /// Subscribes to membership events.
    pub fn subscribe(&self) -> broadcast::Receiver<MembershipEvent> {
        self.event_sender.subscribe()
    }

    /// Whether the actor is still accepting commands.
    pub fn is_connected(&self) -> bool {
        !self.sender.is_closed()
    }
}
