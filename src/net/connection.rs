//! A single console session.
//!
//! # Responsibilities
//! - Generate unique connection IDs for tracing
//! - Write queued lines to the console, each terminated by CRLF
//! - Detect the console hanging up, the queue closing, or shutdown
//! - Collect per-connection metrics

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc};

use crate::observability::metrics;

/// Relaxed ordering is sufficient since IDs only need to be unique.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Line terminator written after every forwarded line.
pub const LINE_TERMINATOR: &[u8] = b"\r\n";

/// Unique identifier for a console connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "console-{}", self.0)
    }
}

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The console closed its side or a write failed. The forwarder accepts again.
    ClientGone,
    /// Shutdown was requested.
    Shutdown,
    /// Every queue sender was dropped.
    QueueClosed,
}

/// An attached console.
#[derive(Debug)]
pub struct ClientSession {
    id: ConnectionId,
    peer: SocketAddr,
    reader: OwnedReadHalf,
    writer: BufWriter<OwnedWriteHalf>,
}

impl ClientSession {
    pub fn new(stream: TcpStream, peer: SocketAddr) -> Self {
        let (reader, writer) = stream.into_split();
        Self {
            id: ConnectionId::new(),
            peer,
            reader,
            writer: BufWriter::new(writer),
        }
    }

    /// Forward lines until the console leaves, the queue closes, or shutdown fires.
    ///
    /// A line taken from the queue is lost if writing it fails.
    pub async fn run(
        mut self,
        queue: &mut mpsc::Receiver<String>,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> SessionEnd {
        metrics::record_client_connected(true);
        tracing::info!(connection_id = %self.id, peer_addr = %self.peer, "Console attached");

        let mut discard = [0u8; 512];
        let end = loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => break SessionEnd::Shutdown,
                read = self.reader.read(&mut discard) => match read {
                    Ok(0) => break SessionEnd::ClientGone,
                    Ok(_) => continue,
                    Err(e) => {
                        tracing::debug!(connection_id = %self.id, error = %e, "Console read failed");
                        break SessionEnd::ClientGone;
                    }
                },
                line = queue.recv() => match line {
                    Some(line) => {
                        if let Err(e) = write_line(&mut self.writer, &line).await {
                            tracing::debug!(connection_id = %self.id, error = %e, "Console write failed");
                            break SessionEnd::ClientGone;
                        }
                        metrics::record_line_sent();
                    }
                    None => break SessionEnd::QueueClosed,
                },
            }
        };

        let _ = self.writer.shutdown().await;
        metrics::record_client_connected(false);
        tracing::info!(connection_id = %self.id, reason = ?end, "Console detached");
        end
    }
}

async fn write_line(writer: &mut BufWriter<OwnedWriteHalf>, line: &str) -> std::io::Result<()> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(LINE_TERMINATOR).await?;
    writer.flush().await
}
