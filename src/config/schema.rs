//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files, and every
//! field has a default so an empty file is a valid configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::LogLevel;

/// Destination name for the `tracing` appender.
pub const TRACING_DESTINATION: &str = "tracing";
/// Destination name for the remote console appender.
pub const REMOTE_DESTINATION: &str = "remote";

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Level thresholds, destinations and message bounds.
    pub logging: LoggingConfig,

    /// Remote console forwarder settings.
    pub remote_console: RemoteConsoleConfig,

    /// Settings for the relay's own diagnostics.
    pub observability: ObservabilityConfig,
}

/// Facade configuration: which records pass and where they go.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level applied to loggers without an explicit level.
    pub root_level: LogLevel,

    /// Per-logger levels keyed by logger name (`a::b` or `a.b`).
    pub loggers: BTreeMap<String, LogLevel>,

    /// Named destinations receiving every enabled record.
    pub destinations: Vec<String>,

    /// Messages are cut with an ellipsis at this many characters.
    pub max_message_length: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            root_level: LogLevel::Info,
            loggers: BTreeMap::new(),
            destinations: vec![TRACING_DESTINATION.to_string()],
            max_message_length: 2048,
        }
    }
}

/// Remote console forwarder configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RemoteConsoleConfig {
    /// Interface to listen on (e.g., "0.0.0.0").
    pub bind_address: String,

    /// Listening port. Zero picks an ephemeral port.
    pub port: u16,

    /// Lines kept while no console is connected; newer lines are dropped.
    pub queue_capacity: usize,

    /// How long `close` waits for the forwarder task before aborting it.
    pub shutdown_timeout_ms: u64,

    /// Line layout sent to the console.
    pub layout: LayoutKind,
}

impl Default for RemoteConsoleConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8001,
            queue_capacity: 1000,
            shutdown_timeout_ms: 2000,
            layout: LayoutKind::Text,
        }
    }
}

/// Record layouts understood by the remote console appender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    /// `dd HH:MM:SS,mmm LEVEL logger context- message`
    #[default]
    Text,
    /// One JSON object per record.
    Json,
}

/// Observability configuration for the relay itself.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Filter directive for the relay's own tracing output (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
