//! log-relay
//!
//! Reads lines from stdin and logs each one through the facade, so any process
//! output can be watched from a remote console.
//!
//! ```text
//!   stdin ──▶ Logger ──▶ Dispatcher ──┬──▶ tracing (stderr)
//!                                     └──▶ remote console ──TCP──▶ console-tail
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Handle;

use log_relay::config::{load_config, watcher::ConfigWatcher, RelayConfig};
use log_relay::engine::LogLevel;
use log_relay::forwarder::ForwarderState;
use log_relay::lifecycle::{signals, Shutdown};
use log_relay::observability::logging::init_tracing;
use log_relay::LogProvider;

const DRAIN_POLL: Duration = Duration::from_millis(50);

#[derive(Parser)]
#[command(name = "log-relay")]
#[command(about = "Relay stdin lines to tracing and a remote console", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Logger name used for every line
    #[arg(short, long, default_value = "stdin")]
    logger: String,

    /// Level used for every line
    #[arg(long, default_value = "info")]
    level: LogLevel,

    /// Reload logger levels when the configuration file changes
    #[arg(long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };
    init_tracing(&config.observability);

    tracing::info!(
        destinations = ?config.logging.destinations,
        root_level = %config.logging.root_level,
        remote_port = config.remote_console.port,
        "log-relay v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let provider = Arc::new(LogProvider::from_config(&config, Handle::current()));

    let _watcher = match (&cli.config, cli.watch) {
        (Some(path), true) => {
            let (watcher, mut updates) = ConfigWatcher::new(path);
            let watcher = watcher.run()?;
            let provider = Arc::clone(&provider);
            tokio::spawn(async move {
                while let Some(config) = updates.recv().await {
                    provider.reload(&config.logging);
                }
            });
            Some(watcher)
        }
        _ => None,
    };

    let shutdown = Shutdown::new();
    let mut stop = shutdown.subscribe();
    signals::forward_to(shutdown);

    let logger = provider.logger(&cli.logger);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let interrupted = loop {
        tokio::select! {
            _ = stop.recv() => break true,
            line = lines.next_line() => match line {
                Ok(Some(line)) => logger.log(cli.level, Some(&line), &[]),
                Ok(None) => break false,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read stdin");
                    break false;
                }
            },
        }
    };

    if !interrupted {
        drain(&provider, Duration::from_millis(config.remote_console.shutdown_timeout_ms)).await;
    }
    provider.close().await;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Give a connected console a bounded chance to receive queued lines.
async fn drain(provider: &LogProvider, limit: Duration) {
    let Some(forwarder) = provider.remote_forwarder() else {
        return;
    };
    let drained = tokio::time::timeout(limit, async {
        while forwarder.pending() > 0
            && matches!(forwarder.state(), ForwarderState::Connected { .. })
        {
            tokio::time::sleep(DRAIN_POLL).await;
        }
    })
    .await;
    if drained.is_err() {
        tracing::warn!(pending = forwarder.pending(), "Remote console did not drain in time");
    }
}
