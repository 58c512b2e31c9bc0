//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → build provider → first remote record starts the forwarder
//!
//! Shutdown (shutdown.rs):
//!     Trigger → forwarder stops accepting and sending → task acknowledges → Closed
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Shutdown has a timeout: the forwarder task is aborted after the deadline

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
