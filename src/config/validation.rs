//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (capacity > 0, timeouts > 0, length budget fits the ellipsis)
//! - Check destination names and bind address
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: RelayConfig → Result<(), Vec<ValidationError>>

use std::net::IpAddr;

use crate::config::schema::{RelayConfig, REMOTE_DESTINATION, TRACING_DESTINATION};
use crate::format::ELLIPSIS;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("unknown destination '{0}'")]
    UnknownDestination(String),
    #[error("logger names must not be empty")]
    EmptyLoggerName,
    #[error("max_message_length must be greater than {min}, got {actual}")]
    MessageLengthTooSmall { min: usize, actual: usize },
    #[error("remote_console.bind_address '{0}' is not an IP address")]
    BindAddress(String),
    #[error("remote_console.queue_capacity must be positive")]
    EmptyQueue,
    #[error("remote_console.shutdown_timeout_ms must be positive")]
    ZeroShutdownTimeout,
}

pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for destination in &config.logging.destinations {
        if destination != TRACING_DESTINATION && destination != REMOTE_DESTINATION {
            errors.push(ValidationError::UnknownDestination(destination.clone()));
        }
    }
    if config.logging.loggers.keys().any(|name| name.trim().is_empty()) {
        errors.push(ValidationError::EmptyLoggerName);
    }
    if config.logging.max_message_length <= ELLIPSIS.len() {
        errors.push(ValidationError::MessageLengthTooSmall {
            min: ELLIPSIS.len(),
            actual: config.logging.max_message_length,
        });
    }

    let remote = &config.remote_console;
    if remote.bind_address.parse::<IpAddr>().is_err() {
        errors.push(ValidationError::BindAddress(remote.bind_address.clone()));
    }
    if remote.queue_capacity == 0 {
        errors.push(ValidationError::EmptyQueue);
    }
    if remote.shutdown_timeout_ms == 0 {
        errors.push(ValidationError::ZeroShutdownTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(validate_config(&RelayConfig::default()), Ok(()));
    }

    #[test]
    fn reports_every_problem() {
        let mut config = RelayConfig::default();
        config.logging.destinations.push("syslog".into());
        config.logging.max_message_length = 3;
        config.remote_console.bind_address = "localhost".into();
        config.remote_console.queue_capacity = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::UnknownDestination("syslog".into()),
                ValidationError::MessageLengthTooSmall { min: 3, actual: 3 },
                ValidationError::BindAddress("localhost".into()),
                ValidationError::EmptyQueue,
            ]
        );
    }

    #[test]
    fn rejects_blank_logger_names() {
        let mut config = RelayConfig::default();
        config.logging.loggers.insert(" ".into(), crate::engine::LogLevel::Debug);
        assert_eq!(validate_config(&config), Err(vec![ValidationError::EmptyLoggerName]));
    }
}
