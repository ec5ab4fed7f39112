//! Hub Protocol - Line-oriented wire protocol for the chat hub
//!
//! This crate defines both directions of the newline-terminated UTF-8
//! text protocol:
//!
//! - [`ServerFrame`] - frames the hub sends to peers (`SUBMITNAME`,
//!   `NAMEACCEPTED`, `USERLIST`, `USERJOINED`, `USERLEFT`, `MESSAGE`)
//! - [`ClientCommand`] - commands peers send while active
//!   (`BROADCAST`, `PRIVATE`)
//!
//! A line is one frame; a message must not itself contain the line
//! terminator. Unknown or malformed client input parses to `None` and
//! is dropped by the session without closing the connection.

pub mod command;
pub mod frame;

pub use command::ClientCommand;
pub use frame::{FrameError, MessageScope, ServerFrame, SERVER_SENDER};
