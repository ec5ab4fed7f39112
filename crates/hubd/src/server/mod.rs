//! TCP server for the chat hub.
//!
//! The server:
//! - Listens on a TCP endpoint for peer connections
//! - Spawns a Session for each connection
//! - Supports graceful shutdown via CancellationToken
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │    HubServer    │
//! │                 │
//! │   TcpListener   │
//! └───────┬─────────┘
//!         │ accept()
//!         ▼
//! ┌─────────────────┐     ┌─────────────────┐
//! │     Session     │────▶│  RegistryHandle │
//! │ (per connection)│     │                 │
//! └─────────────────┘     └─────────────────┘
//!         │
//!         │ outbound queue
//!         ▼
//! ┌─────────────────┐
//! │   writer task   │
//! │ (one per peer)  │
//! └─────────────────┘
//! ```
//!
//! Bind and accept failures are fatal to the server; a failing peer
//! connection only terminates its own session.

mod session;

pub use session::{Session, SessionError};

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::registry::RegistryHandle;

/// TCP server for the chat hub.
///
/// Owns the listener and spawns one session task per connection; the
/// only state shared between sessions is the registry handle.
pub struct HubServer {
    /// Bound listener
    listener: TcpListener,

    /// Address the listener actually bound (resolves port 0)
    local_addr: SocketAddr,

    /// Handle to the peer registry
    registry: RegistryHandle,

    /// Cancellation token for graceful shutdown
    cancel_token: CancellationToken,

    /// Connection counter for log correlation
    connection_counter: AtomicU64,

    /// Per-line read cap handed to each session
    max_line_len: usize,
}

impl HubServer {
    /// Binds the listener and creates the server.
    ///
    /// # Errors
    ///
    /// `ServerError::Bind` when the endpoint cannot be bound; this is
    /// fatal to the process.
    pub async fn bind(
        addr: SocketAddr,
        max_line_len: usize,
        registry: RegistryHandle,
        cancel_token: CancellationToken,
    ) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr).await.map_err(|e| ServerError::Bind {
            addr,
            error: e.to_string(),
        })?;

        let local_addr = listener.local_addr().map_err(|e| ServerError::Bind {
            addr,
            error: e.to_string(),
        })?;

        Ok(Self {
            listener,
            local_addr,
            registry,
            cancel_token,
            connection_counter: AtomicU64::new(0),
            max_line_len,
        })
    }

    /// The address the listener bound.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Runs the accept loop.
    ///
    /// Accepts connections until the cancellation token is triggered.
    /// An accept failure is fatal and tears the server down; sessions
    /// already running are cancelled through the token hierarchy.
    pub async fn run(&self) -> Result<(), ServerError> {
        info!(addr = %self.local_addr, "hub server listening");

        loop {
            tokio::select! {
                _ = self.cancel_token.cancelled() => {
                    info!("server shutdown requested");
                    break;
                }

                result = self.listener.accept() => {
                    match result {
                        Ok((stream, peer_addr)) => {
                            self.handle_connection(stream, peer_addr);
                        }
                        Err(e) => {
                            error!(error = %e, "accept failed, stopping server");
                            self.cancel_token.cancel();
                            return Err(ServerError::Accept(e.to_string()));
                        }
                    }
                }
            }
        }

        info!("server stopped");
        Ok(())
    }

    /// Spawns a session task for a new connection.
    fn handle_connection(&self, stream: TcpStream, peer_addr: SocketAddr) {
        let connection = self.connection_counter.fetch_add(1, Ordering::Relaxed);
        debug!(connection, peer = %peer_addr, "connection accepted");

        let session = Session::new(
            stream,
            peer_addr,
            self.registry.clone(),
            // Child token: server shutdown cancels every session, a
            // session failure cancels only itself.
            self.cancel_token.child_token(),
            connection,
            self.max_line_len,
        );

        tokio::spawn(session.run());
    }
}

/// Errors that can occur in server operations.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {error}")]
    Bind { addr: SocketAddr, error: String },

    #[error("accept failed: {0}")]
    Accept(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_error_display() {
        let err = ServerError::Bind {
            addr: "127.0.0.1:9001".parse().expect("valid addr"),
            error: "address in use".to_string(),
        };
        assert!(err.to_string().contains("127.0.0.1:9001"));
        assert!(err.to_string().contains("address in use"));
    }

    #[test]
    fn test_accept_error_display() {
        let err = ServerError::Accept("too many open files".to_string());
        assert!(err.to_string().contains("too many open files"));
    }
}
