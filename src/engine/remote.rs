//! Appender forwarding laid-out records to a remote console.

use std::io::Write;
use std::sync::{Mutex, OnceLock};

use async_trait::async_trait;
use tokio::runtime::Handle;

use super::layout;
use super::{Appender, Record};
use crate::config::{RemoteConsoleConfig, REMOTE_DESTINATION};
use crate::forwarder::{ConsoleWriter, RemoteForwarder};

#[derive(Debug)]
struct Remote {
    forwarder: RemoteForwarder,
    writer: Mutex<ConsoleWriter>,
}

/// Lays out each record and hands its lines to a [`RemoteForwarder`].
///
/// The forwarder, and with it the listening socket, is created on the first
/// appended record.
#[derive(Debug)]
pub struct RemoteConsoleAppender {
    config: RemoteConsoleConfig,
    runtime: Handle,
    remote: OnceLock<Remote>,
}

impl RemoteConsoleAppender {
    pub fn new(config: RemoteConsoleConfig, runtime: Handle) -> Self {
        Self {
            config,
            runtime,
            remote: OnceLock::new(),
        }
    }

    /// The forwarder, if a record has been appended yet.
    pub fn forwarder(&self) -> Option<&RemoteForwarder> {
        self.remote.get().map(|remote| &remote.forwarder)
    }

    fn remote(&self) -> &Remote {
        self.remote.get_or_init(|| {
            tracing::debug!(port = self.config.port, "Starting remote console forwarder");
            let forwarder = RemoteForwarder::start_on(&self.runtime, &self.config);
            let writer = Mutex::new(ConsoleWriter::new(forwarder.queue()));
            Remote { forwarder, writer }
        })
    }
}

#[async_trait]
impl Appender for RemoteConsoleAppender {
    fn name(&self) -> &str {
        REMOTE_DESTINATION
    }

    fn append(&self, record: &Record) {
        let text = layout::render(self.config.layout, record);
        let remote = self.remote();
        let mut writer = match remote.writer.lock() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        };
        // The writer only buffers and queues; neither step can fail.
        let _ = writer.write_all(text.as_bytes());
        let _ = writer.flush();
    }

    async fn close(&self) {
        if let Some(remote) = self.remote.get() {
            remote.forwarder.close().await;
        }
    }
}
