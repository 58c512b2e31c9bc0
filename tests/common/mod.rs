//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;

use log_relay::config::RemoteConsoleConfig;
use log_relay::forwarder::{ForwarderState, RemoteForwarder};

/// Upper bound for anything a test waits on.
pub const WAIT: Duration = Duration::from_secs(5);

/// Remote console settings on an ephemeral loopback port.
pub fn loopback_config(queue_capacity: usize) -> RemoteConsoleConfig {
    RemoteConsoleConfig {
        bind_address: "127.0.0.1".into(),
        port: 0,
        queue_capacity,
        ..RemoteConsoleConfig::default()
    }
}

/// Wait until the forwarder accepts connections and return its address.
pub async fn listening(forwarder: &RemoteForwarder) -> SocketAddr {
    let state = tokio::time::timeout(
        WAIT,
        forwarder.wait_for_state(|s| matches!(s, ForwarderState::Listening(_))),
    )
    .await
    .expect("forwarder never listened");
    state.local_addr().expect("listening state carries an address")
}

pub async fn connected(forwarder: &RemoteForwarder) {
    tokio::time::timeout(
        WAIT,
        forwarder.wait_for_state(|s| matches!(s, ForwarderState::Connected { .. })),
    )
    .await
    .expect("forwarder never saw the console");
}

/// Wait until the forwarder is serving the console whose local address is `console`.
pub async fn connected_to(forwarder: &RemoteForwarder, console: SocketAddr) {
    tokio::time::timeout(
        WAIT,
        forwarder.wait_for_state(
            |s| matches!(s, ForwarderState::Connected { peer, .. } if *peer == console),
        ),
    )
    .await
    .expect("forwarder never served this console");
}

/// A test console reading CRLF-terminated lines.
pub struct Console {
    reader: BufReader<TcpStream>,
}

impl Console {
    pub async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("console connect");
        Self {
            reader: BufReader::new(stream),
        }
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.reader.get_ref().local_addr().expect("console address")
    }

    /// Next line without its terminator. Panics if the line is not CRLF-terminated.
    /// Returns `None` when the relay closed the connection.
    pub async fn next_line(&mut self) -> Option<String> {
        let mut line = String::new();
        let read = tokio::time::timeout(WAIT, self.reader.read_line(&mut line))
            .await
            .expect("timed out waiting for a line")
            .expect("console read");
        if read == 0 {
            return None;
        }
        let stripped = line
            .strip_suffix("\r\n")
            .unwrap_or_else(|| panic!("line not CRLF terminated: {line:?}"));
        Some(stripped.to_string())
    }

    pub async fn lines(&mut self, count: usize) -> Vec<String> {
        let mut lines = Vec::with_capacity(count);
        for _ in 0..count {
            lines.push(self.next_line().await.expect("connection closed early"));
        }
        lines
    }

    /// True if nothing arrives within `window`.
    pub async fn is_silent_for(&mut self, window: Duration) -> bool {
        let mut line = String::new();
        tokio::time::timeout(window, self.reader.read_line(&mut line))
            .await
            .is_err()
    }
}
