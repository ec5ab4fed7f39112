//! Registry actor - owns the name map and processes commands.
//!
//! The actor is the single owner of the `name → peer` map. It receives
//! commands via an mpsc channel and processes them sequentially, so
//! every operation - and the announcements it triggers - executes
//! inside one critical section. No two concurrent admissions of the
//! same name can both succeed, and a snapshot can never contain a name
//! whose eviction has already committed.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info};

use hub_core::{Dispatch, MembershipEvent, PeerName};

use super::commands::{Outbound, RegistryCommand, RegistryError};
use crate::router;

/// One admitted peer as the registry sees it.
#[derive(Debug)]
pub(crate) struct PeerEntry {
    /// The peer's outbound queue; the only way to reach its stream.
    pub(crate) outbound: Outbound,

    /// When the peer was admitted, for departure logging.
    pub(crate) joined_at: DateTime<Utc>,
}

/// The map the actor owns and the router reads.
pub(crate) type PeerMap = HashMap<PeerName, PeerEntry>;

/// The registry actor - owns all membership state.
///
/// # Thread Safety
///
/// The actor runs in a single task and processes commands
/// sequentially. All state mutations happen within this single task.
pub struct RegistryActor {
    /// Command receiver
    receiver: mpsc::Receiver<RegistryCommand>,

    /// Admitted peers keyed by display name
    peers: PeerMap,

    /// Event publisher for observers (tests, future surfaces)
    event_publisher: broadcast::Sender<MembershipEvent>,
}

impl RegistryActor {
    /// Creates a new registry actor.
    pub fn new(
        receiver: mpsc::Receiver<RegistryCommand>,
        event_publisher: broadcast::Sender<MembershipEvent>,
    ) -> Self {
        Self {
            receiver,
            peers: HashMap::new(),
            event_publisher,
        }
    }

    /// Runs the actor event loop.
    ///
    /// Processes commands until the channel closes (all senders
    /// dropped). Call this in a spawned task.
    pub async fn run(mut self) {
        info!("registry actor starting");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd);
        }

        info!(peers = self.peers.len(), "registry actor stopped");
    }

    /// Dispatches a command to the appropriate handler.
    fn handle_command(&mut self, cmd: RegistryCommand) {
        match cmd {
            RegistryCommand::TryAdmit {
                candidate,
                outbound,
                respond_to,
            } => {
                let result = self.handle_try_admit(&candidate, outbound);
                // Ignore send error - the session may have dropped the receiver
                let _ = respond_to.send(result);
            }
            RegistryCommand::Evict { name, respond_to } => {
                let was_present = self.handle_evict(&name);
                let _ = respond_to.send(was_present);
            }
            RegistryCommand::Snapshot { respond_to } => {
                let _ = respond_to.send(self.snapshot());
            }
            RegistryCommand::Dispatch { request } => {
                self.handle_dispatch(request);
            }
        }
    }

    // ========================================================================
    // Command Handlers
    // ========================================================================

    /// Handles an admission attempt.
    ///
    /// Validation failure and collision leave the registry untouched;
    /// the session re-prompts the peer. On success the new peer gets
    /// its acknowledgement and snapshot, and everyone else gets the
    /// join announcement, before any later command can interleave.
    fn handle_try_admit(
        &mut self,
        candidate: &str,
        outbound: Outbound,
    ) -> Result<PeerName, RegistryError> {
        let name = PeerName::parse(candidate)?;

        if self.peers.contains_key(&name) {
            debug!(peer = %name, "admission rejected: name taken");
            return Err(RegistryError::NameTaken(name));
        }

        self.peers.insert(
            name.clone(),
            PeerEntry {
                outbound,
                joined_at: Utc::now(),
            },
        );

        router::announce_admission(&self.peers, &name);

        info!(
            peer = %name,
            total_peers = self.peers.len(),
            "peer admitted"
        );

        // Publish for observers (ignore if no subscribers)
        let _ = self
            .event_publisher
            .send(MembershipEvent::Joined(name.clone()));

        Ok(name)
    }

    /// Handles an eviction. No-op when the name is absent.
    fn handle_evict(&mut self, name: &PeerName) -> bool {
        let Some(entry) = self.peers.remove(name) else {
            debug!(peer = %name, "evict of absent name ignored");
            return false;
        };

        router::announce_departure(&self.peers, name);

        let online = Utc::now().signed_duration_since(entry.joined_at);
        info!(
            peer = %name,
            seconds_online = online.num_seconds(),
            total_peers = self.peers.len(),
            "peer evicted"
        );

        let _ = self.event_publisher.send(MembershipEvent::Left(name.clone()));

        true
    }

    /// Returns a sorted point-in-time view of admitted names.
    fn snapshot(&self) -> Vec<PeerName> {
        let mut names: Vec<PeerName> = self.peers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Resolves and delivers one chat message.
    fn handle_dispatch(&mut self, request: Dispatch) {
        match request {
            Dispatch::Broadcast { sender, text } => {
                router::broadcast(&self.peers, &sender, &text);
            }
            Dispatch::Private {
                sender,
                recipients,
                text,
            } => {
                router::private(&self.peers, &sender, &recipients, &text);
            }
        }
    }
}
