//! Severity levels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Ordered severity. `Off` disables a logger entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Fatal,
    Bug,
    Off,
}

/// Returned when a level name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level '{0}'")]
pub struct UnknownLevel(pub String);

impl LogLevel {
    pub const ALL: [LogLevel; 8] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
        LogLevel::Bug,
        LogLevel::Off,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
            LogLevel::Bug => "BUG",
            LogLevel::Off => "OFF",
        }
    }

    /// The `tracing` level used when re-emitting a record. `Off` has none.
    pub fn to_tracing(&self) -> Option<tracing::Level> {
        match self {
            LogLevel::Trace => Some(tracing::Level::TRACE),
            LogLevel::Debug => Some(tracing::Level::DEBUG),
            LogLevel::Info => Some(tracing::Level::INFO),
            LogLevel::Warn => Some(tracing::Level::WARN),
            LogLevel::Error | LogLevel::Fatal | LogLevel::Bug => Some(tracing::Level::ERROR),
            LogLevel::Off => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownLevel(s.to_string()))
    }
}

impl TryFrom<String> for LogLevel {
    type Error = UnknownLevel;

    fn try_from(value: String) -> Result<Self, UnknownLevel> {
        value.parse()
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        level.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_by_severity() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Error < LogLevel::Fatal);
        assert!(LogLevel::Fatal < LogLevel::Bug);
        assert!(LogLevel::Bug < LogLevel::Off);
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("warn".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("Fatal".parse::<LogLevel>(), Ok(LogLevel::Fatal));
        assert_eq!(" BUG ".parse::<LogLevel>(), Ok(LogLevel::Bug));
        assert_eq!(
            "verbose".parse::<LogLevel>(),
            Err(UnknownLevel("verbose".into()))
        );
    }

    #[test]
    fn converts_from_owned_names() {
        assert_eq!(LogLevel::try_from(String::from("error")), Ok(LogLevel::Error));
        assert_eq!(
            LogLevel::try_from(String::from("noisy")),
            Err(UnknownLevel("noisy".into()))
        );
        assert_eq!(String::from(LogLevel::Bug), "BUG");
    }

    #[test]
    fn display_round_trips_through_parse() {
        for level in LogLevel::ALL {
            assert_eq!(level.to_string().parse::<LogLevel>(), Ok(level));
        }
    }

    #[test]
    fn severe_levels_map_to_tracing_error() {
        assert_eq!(LogLevel::Bug.to_tracing(), Some(tracing::Level::ERROR));
        assert_eq!(LogLevel::Fatal.to_tracing(), Some(tracing::Level::ERROR));
        assert_eq!(LogLevel::Off.to_tracing(), None);
    }
}
