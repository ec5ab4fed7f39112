//! Hub Daemon - session registry and broadcast server
//!
//! This crate provides the server side of the chat hub:
//! - `registry` - registry actor arbitrating name uniqueness and
//!   owning every peer's outbound queue
//! - `router` - stateless dispatch of broadcast/private messages and
//!   membership announcements
//! - `server` - TCP acceptor and per-connection session handlers
//! - `config` - layered daemon configuration
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      hubd daemon                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                             │
//! │  ┌─────────────────┐     ┌─────────────────────────────┐   │
//! │  │    HubServer    │────▶│       RegistryActor         │   │
//! │  │ (TCP acceptor)  │     │ (name map + outbound queues)│   │
//! │  └────────┬────────┘     └──────────────┬──────────────┘   │
//! │           │ accept()                    │ router::deliver   │
//! │           ▼                             ▼                   │
//! │  ┌─────────────────┐     ┌─────────────────────────────┐   │
//! │  │     Session     │     │   per-peer writer tasks     │   │
//! │  │ (per connection)│     │ (serialized stream writes)  │   │
//! │  └─────────────────┘     └─────────────────────────────┘   │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every cross-session write goes through the owning session's
//! outbound queue, so delivered lines are never interleaved. The
//! registry actor processes commands sequentially, which makes
//! admission, eviction, snapshots, and the announcements they trigger
//! a single critical section.
//!
//! # Panic-Free Guarantees
//!
//! All production code in this crate follows the panic-free policy:
//! - No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, `todo!()`
//! - All fallible operations return `Result` or `Option`
//! - Channel operations handle closure gracefully

pub mod config;
pub mod registry;
pub(crate) mod router;
pub mod server;
