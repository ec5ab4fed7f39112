//! Peer registry using the Actor pattern.
//!
//! The registry is the sole authority for "who is online". It receives
//! commands via a tokio mpsc channel and owns the canonical map from
//! display name to the peer's outbound queue.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌──────────────────┐
//! │     Session     │────▶│  RegistryActor  │────▶│ per-peer queues  │
//! └─────────────────┘     └─────────────────┘     └──────────────────┘
//!         │                       │                        │
//!         │   RegistryCommand     │   MembershipEvent      │
//!         │   (mpsc channel)      │   (broadcast)          ▼
//!         ▼                       ▼                  writer tasks
//!    admit/evict/dispatch    observers/tests      (serialized output)
//! ```
//!
//! Because the actor processes commands one at a time, admission and
//! eviction are linearizable, and the membership announcements each
//! one triggers can never race with a later admission or eviction.

use tokio::sync::{broadcast, mpsc};

mod actor;
mod commands;
mod handle;

pub use actor::RegistryActor;
pub(crate) use actor::{PeerEntry, PeerMap};
pub use commands::{Outbound, RegistryCommand, RegistryError};
pub use handle::RegistryHandle;

/// Channel buffer sizes
const COMMAND_BUFFER: usize = 100;
const EVENT_BUFFER: usize = 100;

/// Spawns the registry actor and returns a handle for interaction.
///
/// # Example
///
/// ```no_run
/// use hubd::registry::spawn_registry;
///
/// #[tokio::main]
/// async fn main() {
///     let handle = spawn_registry();
///
///     let names = handle.snapshot().await;
///     assert!(names.is_empty());
/// }
/// ```
pub fn spawn_registry() -> RegistryHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);
    let (event_tx, _) = broadcast::channel(EVENT_BUFFER);

    let actor = RegistryActor::new(cmd_rx, event_tx.clone());
    tokio::spawn(actor.run());

    RegistryHandle::new(cmd_tx, event_tx)
}
