//! Message dispatch over the registry's peer map.
//!
//! The router is stateless: every function takes the peer map owned by
//! the registry actor and is only ever called from inside the actor's
//! command loop, so resolution and delivery happen within the
//! registry's critical section.
//!
//! Delivery is a non-blocking push onto the recipient's unbounded
//! outbound queue. A send can only fail when the peer's writer task is
//! already gone (mid-disconnect); that loss is best-effort by contract
//! and never affects other recipients.

use tracing::debug;

use hub_core::PeerName;
use hub_protocol::ServerFrame;

use crate::registry::{PeerEntry, PeerMap};

/// Delivers a broadcast to every admitted peer, the sender included.
pub(crate) fn broadcast(peers: &PeerMap, sender: &PeerName, text: &str) {
    let frame = ServerFrame::broadcast(sender, text);
    for (name, entry) in peers {
        deliver(name, entry, frame.clone());
    }
    debug!(sender = %sender, recipients = peers.len(), "broadcast dispatched");
}

/// Delivers a private message to each named recipient.
///
/// Recipients are resolved independently; names that are not admitted
/// (or could never be valid names) are skipped without surfacing an
/// error to the sender.
pub(crate) fn private(peers: &PeerMap, sender: &PeerName, recipients: &[String], text: &str) {
    let frame = ServerFrame::private(sender, text);
    let mut delivered = 0usize;

    for recipient in recipients {
        let Ok(name) = PeerName::parse(recipient) else {
            debug!(sender = %sender, recipient = %recipient, "skipping unaddressable recipient");
            continue;
        };
        match peers.get(&name) {
            Some(entry) => {
                deliver(&name, entry, frame.clone());
                delivered += 1;
            }
            None => {
                debug!(sender = %sender, recipient = %name, "skipping unknown recipient");
            }
        }
    }

    debug!(
        sender = %sender,
        requested = recipients.len(),
        delivered,
        "private dispatched"
    );
}

/// Announces a fresh admission.
///
/// The new peer receives `NAMEACCEPTED` followed by the full
/// membership snapshot (which includes itself); every other peer
/// receives the incremental `USERJOINED`. Called with the map already
/// containing the new peer.
pub(crate) fn announce_admission(peers: &PeerMap, joined: &PeerName) {
    let mut names: Vec<&PeerName> = peers.keys().collect();
    names.sort();
    let snapshot = ServerFrame::user_list(names);
    let announcement = ServerFrame::user_joined(joined);

    for (name, entry) in peers {
        if name == joined {
            deliver(name, entry, ServerFrame::NameAccepted);
            deliver(name, entry, snapshot.clone());
        } else {
            deliver(name, entry, announcement.clone());
        }
    }
}

/// Announces a departure to every remaining peer.
///
/// Each remaining peer receives `USERLEFT` plus a human-readable chat
/// line from the hub. Called with the map already missing the peer.
pub(crate) fn announce_departure(peers: &PeerMap, departed: &PeerName) {
    let announcement = ServerFrame::user_left(departed);
    let notice = ServerFrame::server_notice(format!("{departed} has left the chat."));

    for (name, entry) in peers {
        deliver(name, entry, announcement.clone());
        deliver(name, entry, notice.clone());
    }
}

/// Pushes one frame onto a peer's outbound queue.
fn deliver(name: &PeerName, entry: &PeerEntry, frame: ServerFrame) {
    if entry.outbound.send(frame).is_err() {
        // Writer task already gone - the peer is mid-disconnect and
        // its eviction will arrive shortly.
        debug!(peer = %name, "dropped frame for departing peer");
    }
}
