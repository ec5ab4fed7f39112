//! Per-connection session handler.
//!
//! Each accepted connection gets a `Session` that:
//! - Negotiates a unique display name against the registry
//! - Parses inbound chat commands and hands them to the router
//! - Evicts itself from the registry on any exit path
//!
//! The session owns the read half of the stream. The write half lives
//! in a dedicated writer task that drains the peer's outbound queue,
//! so every frame reaches the wire as one complete line and no other
//! task ever touches the peer's stream.

use std::net::SocketAddr;

use chrono::{DateTime, Utc};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use hub_core::{Dispatch, PeerName, SessionState};
use hub_protocol::{ClientCommand, ServerFrame};

use crate::registry::{RegistryError, RegistryHandle};

/// Session handler for a single peer.
pub struct Session {
    /// Buffered reader over the read half of the stream
    reader: BufReader<OwnedReadHalf>,

    /// Sending side of this peer's outbound queue
    outbound: mpsc::UnboundedSender<ServerFrame>,

    /// Handle to the peer registry
    registry: RegistryHandle,

    /// Session-scoped token; child of the server token
    cancel: CancellationToken,

    /// Connection number for log correlation
    connection: u64,

    /// Remote address, for pre-admission logging
    peer_addr: SocketAddr,

    /// Maximum accepted inbound line length in bytes
    max_line_len: usize,

    /// Lifecycle state
    state: SessionState,

    /// Admitted name, once negotiation succeeds
    name: Option<PeerName>,

    /// When the connection was accepted
    connected_at: DateTime<Utc>,
}

impl Session {
    /// Creates the session and spawns its writer task.
    pub fn new(
        stream: TcpStream,
        peer_addr: SocketAddr,
        registry: RegistryHandle,
        cancel: CancellationToken,
        connection: u64,
        max_line_len: usize,
    ) -> Self {
        let (read_half, write_half) = stream.into_split();
        let (outbound, outbound_rx) = mpsc::unbounded_channel();

        spawn_writer(write_half, outbound_rx, cancel.clone(), connection);

        Self {
            reader: BufReader::new(read_half),
            outbound,
            registry,
            cancel,
            connection,
            peer_addr,
            max_line_len,
            state: SessionState::Negotiating,
            name: None,
            connected_at: Utc::now(),
        }
    }

    /// Runs the session to completion.
    ///
    /// This is the main entry point - negotiates a name, then processes
    /// chat commands until the peer disconnects, an I/O error occurs,
    /// or the session is cancelled. Cleanup runs on every exit path.
    pub async fn run(mut self) {
        debug!(
            connection = self.connection,
            peer = %self.peer_addr,
            "peer connected"
        );

        match self.serve().await {
            Ok(()) | Err(SessionError::Eof) => {
                debug!(connection = self.connection, "peer closed the stream");
            }
            Err(SessionError::Shutdown) => {
                debug!(connection = self.connection, "session cancelled");
            }
            Err(e) => {
                debug!(connection = self.connection, error = %e, "session ended");
            }
        }

        self.close().await;
    }

    /// Negotiation followed by the chat loop.
    async fn serve(&mut self) -> Result<(), SessionError> {
        self.send(ServerFrame::SubmitName)?;
        let name = self.negotiate().await?;
        self.chat_loop(name).await
    }

    /// Repeatedly prompts for a name until the registry admits one.
    ///
    /// Rejection (empty, invalid, or taken name) re-prompts with
    /// `SUBMITNAME`; there is no bound on attempts. Only I/O failure,
    /// end-of-stream, or shutdown ends negotiation.
    async fn negotiate(&mut self) -> Result<PeerName, SessionError> {
        loop {
            let candidate = self.next_line().await?;

            match self
                .registry
                .try_admit(candidate, self.outbound.clone())
                .await
            {
                Ok(name) => {
                    // The registry has already queued NAMEACCEPTED and
                    // the membership snapshot for this peer.
                    self.state = SessionState::Active;
                    self.name = Some(name.clone());
                    info!(
                        connection = self.connection,
                        peer = %name,
                        "negotiation complete"
                    );
                    return Ok(name);
                }
                Err(RegistryError::ChannelClosed) => return Err(SessionError::Shutdown),
                Err(e) => {
                    debug!(
                        connection = self.connection,
                        reason = %e,
                        "name rejected, re-prompting"
                    );
                    self.send(ServerFrame::SubmitName)?;
                }
            }
        }
    }

    /// Processes chat commands until the session ends.
    ///
    /// Unknown and malformed lines are dropped without acknowledgment
    /// and never close the connection.
    async fn chat_loop(&mut self, name: PeerName) -> Result<(), SessionError> {
        loop {
            let line = self.next_line().await?;

            match ClientCommand::parse(&line) {
                Some(ClientCommand::Broadcast { text }) => {
                    self.registry
                        .dispatch(Dispatch::Broadcast {
                            sender: name.clone(),
                            text,
                        })
                        .await;
                }
                Some(ClientCommand::Private { recipients, text }) => {
                    self.registry
                        .dispatch(Dispatch::Private {
                            sender: name.clone(),
                            recipients,
                            text,
                        })
                        .await;
                }
                None => {
                    debug!(
                        connection = self.connection,
                        peer = %name,
                        "ignoring unrecognized line"
                    );
                }
            }
        }
    }

    /// Reads the next inbound line, stripped of its terminator.
    async fn next_line(&mut self) -> Result<String, SessionError> {
        let mut line = String::new();

        let bytes_read = tokio::select! {
            _ = self.cancel.cancelled() => return Err(SessionError::Shutdown),
            result = self.reader.read_line(&mut line) => {
                result.map_err(|e| SessionError::Io(e.to_string()))?
            }
        };

        if bytes_read == 0 {
            return Err(SessionError::Eof);
        }

        if line.len() > self.max_line_len {
            return Err(SessionError::LineTooLong {
                len: line.len(),
                max: self.max_line_len,
            });
        }

        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }

        Ok(line)
    }

    /// Queues one frame for the peer.
    fn send(&self, frame: ServerFrame) -> Result<(), SessionError> {
        self.outbound
            .send(frame)
            .map_err(|_| SessionError::Shutdown)
    }

    /// Tears the session down. Idempotent.
    ///
    /// Evicts the admitted name (the registry announces the departure
    /// to the remaining peers) and stops the writer task.
    async fn close(&mut self) {
        if self.state.is_closed() {
            return;
        }
        self.state = SessionState::Closed;

        if let Some(name) = self.name.take() {
            self.registry.evict(&name).await;
        }

        self.cancel.cancel();

        let online = Utc::now().signed_duration_since(self.connected_at);
        debug!(
            connection = self.connection,
            seconds_online = online.num_seconds(),
            "session closed"
        );
    }
}

/// Spawns the writer task owning the write half of the stream.
///
/// The task drains the outbound queue and writes each frame as one
/// newline-terminated line. A write failure cancels the session token,
/// which in turn ends the read loop.
fn spawn_writer(
    write_half: OwnedWriteHalf,
    mut outbound_rx: mpsc::UnboundedReceiver<ServerFrame>,
    cancel: CancellationToken,
    connection: u64,
) {
    tokio::spawn(async move {
        let mut writer = BufWriter::new(write_half);

        loop {
            let frame = tokio::select! {
                _ = cancel.cancelled() => break,
                frame = outbound_rx.recv() => match frame {
                    Some(frame) => frame,
                    None => break,
                }
            };

            let line = frame.to_string();
            let result = async {
                writer.write_all(line.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
                Ok::<(), std::io::Error>(())
            }
            .await;

            if let Err(e) = result {
                debug!(connection, error = %e, "write failed, closing session");
                cancel.cancel();
                break;
            }
        }

        let _ = writer.shutdown().await;
    });
}

/// Errors that can occur during session handling.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("i/o error: {0}")]
    Io(String),

    #[error("peer closed the stream")]
    Eof,

    #[error("line too long: {len} bytes (max: {max})")]
    LineTooLong { len: usize, max: usize },

    #[error("session cancelled")]
    Shutdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_too_long_display() {
        let err = SessionError::LineTooLong {
            len: 100_000,
            max: 65_536,
        };
        assert!(err.to_string().contains("100000"));
        assert!(err.to_string().contains("65536"));
    }

    #[test]
    fn test_io_error_display() {
        let err = SessionError::Io("connection reset by peer".to_string());
        assert!(err.to_string().contains("connection reset"));
    }
}
