//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (the relay's own structured diagnostics via `tracing`)
//!     → metrics.rs (counters and gauges through the `metrics` facade)
//!
//! Consumers:
//!     → stderr through tracing-subscriber's fmt layer
//!     → whichever `metrics` recorder the embedding process installs
//! ```
//!
//! # Design Decisions
//! - Metric updates are no-ops until a recorder is installed
//! - Diagnostics about the forwarder never go through the facade itself

pub mod logging;
pub mod metrics;
