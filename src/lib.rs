//! Logging facade with a remote console forwarder.
//!
//! Records flow from named [`Logger`]s through a level-filtering
//! [`engine::Dispatcher`] to the configured destinations. The remote console
//! destination serves one TCP client at a time with every record line,
//! terminated by CRLF.

pub mod config;
pub mod engine;
pub mod format;
pub mod forwarder;
pub mod lifecycle;
pub mod logger;
pub mod net;
pub mod observability;
pub mod provider;

pub use config::RelayConfig;
pub use engine::{LogContext, LogLevel};
pub use format::{Argument, Failure};
pub use forwarder::{ForwarderState, RemoteForwarder};
pub use lifecycle::Shutdown;
pub use logger::Logger;
pub use provider::LogProvider;
