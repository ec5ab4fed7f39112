//! Server-to-client frames.

use hub_core::PeerName;
use std::fmt;
use thiserror::Error;

/// Sender name used for hub-originated chat lines (e.g. departure
/// notices).
pub const SERVER_SENDER: &str = "Server";

/// Whether a delivered `MESSAGE` frame was broadcast or directed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageScope {
    Broadcast,
    Private,
}

/// One frame sent from the hub to a peer.
///
/// Fields hold plain strings because this is the wire representation;
/// constructors taking [`PeerName`] are provided for the daemon side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerFrame {
    /// Request a candidate display name.
    SubmitName,

    /// Admission succeeded; the peer may now send commands.
    NameAccepted,

    /// Full membership snapshot.
    UserList { names: Vec<String> },

    /// Incremental join announcement.
    UserJoined { name: String },

    /// Incremental departure announcement.
    UserLeft { name: String },

    /// Delivered chat text.
    Message {
        scope: MessageScope,
        sender: String,
        text: String,
    },
}

impl ServerFrame {
    /// Creates a `USERLIST` frame from admitted names.
    pub fn user_list<'a>(names: impl IntoIterator<Item = &'a PeerName>) -> Self {
        Self::UserList {
            names: names.into_iter().map(|n| n.as_str().to_string()).collect(),
        }
    }

    /// Creates a `USERJOINED` announcement.
    pub fn user_joined(name: &PeerName) -> Self {
        Self::UserJoined {
            name: name.as_str().to_string(),
        }
    }

    /// Creates a `USERLEFT` announcement.
    pub fn user_left(name: &PeerName) -> Self {
        Self::UserLeft {
            name: name.as_str().to_string(),
        }
    }

    /// Creates a broadcast delivery frame.
    pub fn broadcast(sender: &PeerName, text: impl Into<String>) -> Self {
        Self::Message {
            scope: MessageScope::Broadcast,
            sender: sender.as_str().to_string(),
            text: text.into(),
        }
    }

    /// Creates a private delivery frame.
    pub fn private(sender: &PeerName, text: impl Into<String>) -> Self {
        Self::Message {
            scope: MessageScope::Private,
            sender: sender.as_str().to_string(),
            text: text.into(),
        }
    }

    /// Creates a hub-originated chat line (sender `Server`).
    pub fn server_notice(text: impl Into<String>) -> Self {
        Self::Message {
            scope: MessageScope::Broadcast,
            sender: SERVER_SENDER.to_string(),
            text: text.into(),
        }
    }

    /// Parses one line (without its terminator) into a frame.
    ///
    /// Used by clients and tests; the daemon only formats frames.
    pub fn parse(line: &str) -> Result<Self, FrameError> {
        if line == "SUBMITNAME" {
            return Ok(Self::SubmitName);
        }
        if line == "NAMEACCEPTED" {
            return Ok(Self::NameAccepted);
        }
        if let Some(rest) = line.strip_prefix("USERLIST ") {
            let names = rest
                .split(',')
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .collect();
            return Ok(Self::UserList { names });
        }
        if let Some(name) = line.strip_prefix("USERJOINED ") {
            return Ok(Self::UserJoined {
                name: name.to_string(),
            });
        }
        if let Some(name) = line.strip_prefix("USERLEFT ") {
            return Ok(Self::UserLeft {
                name: name.to_string(),
            });
        }
        if let Some(rest) = line.strip_prefix("MESSAGE ") {
            let (scope, rest) = match rest.strip_prefix("(Private) ") {
                Some(rest) => (MessageScope::Private, rest),
                None => (MessageScope::Broadcast, rest),
            };
            let (sender, text) = rest
                .split_once(": ")
                .ok_or_else(|| FrameError::Malformed(line.to_string()))?;
            return Ok(Self::Message {
                scope,
                sender: sender.to_string(),
                text: text.to_string(),
            });
        }
        Err(FrameError::UnknownFrame(line.to_string()))
    }
}

impl fmt::Display for ServerFrame {
    /// Formats the frame as one wire line, without the terminator.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SubmitName => write!(f, "SUBMITNAME"),
            Self::NameAccepted => write!(f, "NAMEACCEPTED"),
            Self::UserList { names } => write!(f, "USERLIST {}", names.join(",")),
            Self::UserJoined { name } => write!(f, "USERJOINED {name}"),
            Self::UserLeft { name } => write!(f, "USERLEFT {name}"),
            Self::Message {
                scope: MessageScope::Broadcast,
                sender,
                text,
            } => write!(f, "MESSAGE {sender}: {text}"),
            Self::Message {
                scope: MessageScope::Private,
                sender,
                text,
            } => write!(f, "MESSAGE (Private) {sender}: {text}"),
        }
    }
}

/// Errors from parsing a server frame.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Line does not start with any known frame prefix
    #[error("unknown frame: {0:?}")]
    UnknownFrame(String),

    /// Known prefix but the payload does not match the frame shape
    #[error("malformed frame: {0:?}")]
    Malformed(String),
}
