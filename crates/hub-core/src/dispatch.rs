//! Dispatch requests produced from inbound chat commands.

use crate::name::PeerName;

/// One inbound line from an active peer, resolved into a delivery
/// request for the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Deliver `text` to every admitted peer, sender included.
    Broadcast { sender: PeerName, text: String },

    /// Deliver `text` only to the named recipients. Recipients that
    /// are not admitted are skipped silently.
    Private {
        sender: PeerName,
        recipients: Vec<String>,
        text: String,
    },
}

impl Dispatch {
    /// The peer that produced this request.
    pub fn sender(&self) -> &PeerName {
        match self {
            Self::Broadcast { sender, .. } | Self::Private { sender, .. } => sender,
        }
    }
}
