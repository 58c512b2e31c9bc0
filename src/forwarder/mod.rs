//! Remote console forwarder.
//!
//! # Data Flow
//! ```text
//! caller threads ──offer──▶ LineQueue (bounded, drop-on-full)
//!                                │
//!                                ▼
//!             forwarder task: bind → accept one console → drain queue (CRLF)
//!                                │                 ▲
//!                                └──console gone───┘
//! ```
//!
//! # States
//! `Idle → Listening → (Connected ⇄ Listening) → Closing → Closed`, or `Failed`
//! when the port cannot be bound. After a bind failure lines are still accepted
//! until the queue is full and then silently dropped.
//!
//! # Design Decisions
//! - The shutdown token is a broadcast signal, never a line on the queue
//! - Accept is cancelled by the same signal, so no self-connect is needed
//! - `close` waits a bounded time and then aborts the task

pub mod writer;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::{Handle, TryCurrentError};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::RemoteConsoleConfig;
use crate::lifecycle::Shutdown;
use crate::net::{ClientSession, ConsoleListener, ListenerError, SessionEnd};
use crate::observability::metrics;

pub use writer::ConsoleWriter;

const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Observable lifecycle of the forwarder task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwarderState {
    /// Task spawned, listener not bound yet.
    Idle,
    /// Waiting for a console.
    Listening(SocketAddr),
    /// Draining the queue into a console.
    Connected { local: SocketAddr, peer: SocketAddr },
    /// `close` has been called.
    Closing,
    /// Task finished.
    Closed,
    /// The listener could not be bound.
    Failed,
}

impl ForwarderState {
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match self {
            ForwarderState::Listening(local) | ForwarderState::Connected { local, .. } => {
                Some(*local)
            }
            _ => None,
        }
    }
}

/// Producer side of the pending queue.
#[derive(Debug, Clone)]
pub struct LineQueue {
    tx: mpsc::Sender<String>,
}

impl LineQueue {
    /// Offer a line without blocking. Returns false if it was dropped.
    pub fn offer(&self, line: impl Into<String>) -> bool {
        match self.tx.try_send(line.into()) {
            Ok(()) => {
                metrics::record_line_queued();
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                metrics::record_line_dropped("full");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                metrics::record_line_dropped("closed");
                false
            }
        }
    }

    /// Lines waiting for a console.
    pub fn pending(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }
}

/// Owns the pending queue and the background task serving one console at a time.
#[derive(Debug)]
pub struct RemoteForwarder {
    queue: LineQueue,
    shutdown: Shutdown,
    state: Arc<watch::Sender<ForwarderState>>,
    task: Mutex<Option<JoinHandle<()>>>,
    shutdown_timeout: Duration,
}

impl RemoteForwarder {
    /// Start on the current tokio runtime.
    pub fn start(config: &RemoteConsoleConfig) -> Result<Self, TryCurrentError> {
        let handle = Handle::try_current()?;
        Ok(Self::start_on(&handle, config))
    }

    /// Start with the task spawned on `handle`.
    pub fn start_on(handle: &Handle, config: &RemoteConsoleConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let shutdown = Shutdown::new();
        let (state, _) = watch::channel(ForwarderState::Idle);
        let state = Arc::new(state);

        let task = handle.spawn(serve(
            config.clone(),
            rx,
            shutdown.subscribe(),
            Arc::clone(&state),
        ));

        Self {
            queue: LineQueue { tx },
            shutdown,
            state,
            task: Mutex::new(Some(task)),
            shutdown_timeout: Duration::from_millis(config.shutdown_timeout_ms),
        }
    }

    /// Non-blocking offer; drop-on-full is silent.
    pub fn enqueue(&self, line: impl Into<String>) {
        self.queue.offer(line);
    }

    pub fn pending(&self) -> usize {
        self.queue.pending()
    }

    /// A producer handle sharing this forwarder's queue.
    pub fn queue(&self) -> LineQueue {
        self.queue.clone()
    }

    pub fn state(&self) -> ForwarderState {
        *self.state.borrow()
    }

    /// Wait until the state satisfies `predicate` and return that state.
    pub async fn wait_for_state(
        &self,
        mut predicate: impl FnMut(&ForwarderState) -> bool,
    ) -> ForwarderState {
        let mut rx = self.state.subscribe();
        let reached = match rx.wait_for(|state| predicate(state)).await {
            Ok(state) => *state,
            Err(_) => self.state(),
        };
        reached
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.state().local_addr()
    }

    /// Stop the task, waiting at most the configured shutdown timeout.
    ///
    /// Calling `close` more than once is a no-op.
    pub async fn close(&self) {
        let task = match self.task.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        let Some(mut task) = task else {
            return;
        };

        self.state.send_replace(ForwarderState::Closing);
        self.shutdown.trigger();

        match tokio::time::timeout(self.shutdown_timeout, &mut task).await {
            Ok(_) => tracing::debug!("Remote console forwarder stopped"),
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.shutdown_timeout.as_millis() as u64,
                    "Remote console forwarder did not stop in time, aborting"
                );
                task.abort();
                self.state.send_replace(ForwarderState::Closed);
            }
        }
    }
}

impl Drop for RemoteForwarder {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

fn bind(config: &RemoteConsoleConfig) -> Result<(ConsoleListener, SocketAddr), ListenerError> {
    let listener = ConsoleListener::bind(config)?;
    let local = listener.local_addr().map_err(ListenerError::Bind)?;
    Ok((listener, local))
}

async fn serve(
    config: RemoteConsoleConfig,
    mut queue: mpsc::Receiver<String>,
    mut shutdown: broadcast::Receiver<()>,
    state: Arc<watch::Sender<ForwarderState>>,
) {
    let (listener, local) = match bind(&config) {
        Ok(bound) => bound,
        Err(e) => {
            tracing::error!(
                error = %e,
                bind_address = %config.bind_address,
                port = config.port,
                "Remote console unavailable"
            );
            state.send_replace(ForwarderState::Failed);
            // Keep the receiver alive so producers see a full queue rather than a closed one.
            let _ = shutdown.recv().await;
            state.send_replace(ForwarderState::Closed);
            return;
        }
    };

    loop {
        state.send_replace(ForwarderState::Listening(local));

        let accepted = tokio::select! {
            biased;
            _ = shutdown.recv() => break,
            accepted = listener.accept() => accepted,
        };
        let (stream, peer) = match accepted {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!(error = %e, "Remote console accept failed");
                tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                continue;
            }
        };

        state.send_replace(ForwarderState::Connected { local, peer });
        match ClientSession::new(stream, peer).run(&mut queue, &mut shutdown).await {
            SessionEnd::ClientGone => continue,
            SessionEnd::Shutdown | SessionEnd::QueueClosed => break,
        }
    }

    drop(listener);
    state.send_replace(ForwarderState::Closed);
    tracing::info!(address = %local, "Remote console listener closed");
}
