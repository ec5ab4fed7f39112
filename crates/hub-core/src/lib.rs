//! Hub Core - Shared domain types for the chat hub
//!
//! This crate provides the types shared between the wire protocol
//! (hub-protocol) and the daemon (hubd): validated peer names, the
//! per-connection session state machine, membership events, and
//! dispatch requests.
//!
//! All code follows the panic-free policy: no `.unwrap()`, `.expect()`,
//! `panic!()`, `unreachable!()`, `todo!()`, or direct indexing `[i]`.

pub mod dispatch;
pub mod error;
pub mod event;
pub mod name;
pub mod session;

// Re-exports for convenience
pub use dispatch::Dispatch;
pub use error::NameError;
pub use event::MembershipEvent;
pub use name::PeerName;
pub use session::SessionState;
