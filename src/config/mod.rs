//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!     → provider builds the dispatcher and appenders from it
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → level table is swapped atomically; appenders are kept
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Only levels are hot-reloadable; destinations and the listener are fixed at startup

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    LayoutKind, LoggingConfig, ObservabilityConfig, RelayConfig, RemoteConsoleConfig,
    REMOTE_DESTINATION, TRACING_DESTINATION,
};
pub use validation::ValidationError;
