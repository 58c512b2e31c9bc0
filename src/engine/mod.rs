//! Logging engine: level resolution and record dispatch.
//!
//! # Data Flow
//! ```text
//! Logger ──is_enabled?──▶ Dispatcher ──▶ LevelTable (ArcSwap, hot-swappable)
//!        ──write────────▶ Dispatcher ──Record──▶ every Appender
//! ```
//!
//! # Design Decisions
//! - The level table is replaced wholesale on every change; readers never lock
//! - Effective level is the nearest configured ancestor, then the root level
//! - Appenders never report errors back to the caller

pub mod appender;
pub mod context;
pub mod layout;
pub mod level;
pub mod remote;

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Local};

use crate::config::LoggingConfig;
use crate::format::Failure;
use crate::observability::metrics;

pub use appender::{Appender, TracingAppender};
pub use context::LogContext;
pub use level::{LogLevel, UnknownLevel};
pub use remote::RemoteConsoleAppender;

/// One enabled log event as seen by appenders.
#[derive(Debug, Clone)]
pub struct Record {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub logger: String,
    /// Diagnostic context of the writing thread, possibly empty.
    pub context: String,
    pub message: String,
    pub cause: Option<Failure>,
}

impl Record {
    /// Stamp a record with the current time and the calling thread's context.
    pub fn new(level: LogLevel, logger: &str, message: &str, cause: Option<&Failure>) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            logger: logger.to_string(),
            context: LogContext.current(),
            message: message.to_string(),
            cause: cause.cloned(),
        }
    }
}

/// The backend a `Logger` writes through.
pub trait LogEngine: Send + Sync {
    fn is_enabled(&self, level: LogLevel, logger: &str) -> bool;

    fn write(&self, level: LogLevel, logger: &str, message: &str);

    fn write_with_cause(&self, level: LogLevel, logger: &str, message: &str, cause: &Failure);
}

/// Immutable snapshot of configured levels.
#[derive(Debug, Clone, Default)]
pub struct LevelTable {
    root: LogLevel,
    loggers: HashMap<String, LogLevel>,
}

impl LevelTable {
    pub fn from_config(config: &LoggingConfig) -> Self {
        Self {
            root: config.root_level,
            loggers: config
                .loggers
                .iter()
                .map(|(name, level)| (name.clone(), *level))
                .collect(),
        }
    }

    /// Level of the nearest configured ancestor of `logger`, else the root level.
    pub fn effective(&self, logger: &str) -> LogLevel {
        let mut name = Some(logger);
        while let Some(current) = name {
            if let Some(level) = self.loggers.get(current) {
                return *level;
            }
            name = parent(current);
        }
        self.root
    }
}

/// `a::b::c` → `a::b`, `a.b` → `a`, `a` → none.
fn parent(name: &str) -> Option<&str> {
    let cut = match (name.rfind("::"), name.rfind('.')) {
        (Some(colons), Some(dot)) => colons.max(dot),
        (colons, dot) => colons.or(dot)?,
    };
    Some(&name[..cut])
}

/// Management surface for levels. Clones share the same table.
///
/// Setters take level names and silently ignore names that do not parse.
#[derive(Debug, Clone)]
pub struct LevelManager {
    table: Arc<ArcSwap<LevelTable>>,
}

impl LevelManager {
    pub fn new(table: LevelTable) -> Self {
        Self {
            table: Arc::new(ArcSwap::from_pointee(table)),
        }
    }

    pub fn from_config(config: &LoggingConfig) -> Self {
        Self::new(LevelTable::from_config(config))
    }

    pub fn set_root_level(&self, name: &str) {
        let Ok(level) = name.parse::<LogLevel>() else {
            tracing::debug!(level = name, "Ignoring unknown root level");
            return;
        };
        self.table.rcu(|table| LevelTable {
            root: level,
            loggers: table.loggers.clone(),
        });
    }

    pub fn root_level(&self) -> LogLevel {
        self.table.load().root
    }

    pub fn set_level(&self, logger: &str, name: &str) {
        let Ok(level) = name.parse::<LogLevel>() else {
            tracing::debug!(logger, level = name, "Ignoring unknown logger level");
            return;
        };
        self.table.rcu(|table| {
            let mut next = LevelTable::clone(table);
            next.loggers.insert(logger.to_string(), level);
            next
        });
    }

    /// The level set on `logger` itself; inherited levels are not reported.
    pub fn level(&self, logger: &str) -> Option<LogLevel> {
        self.table.load().loggers.get(logger).copied()
    }

    pub fn effective_level(&self, logger: &str) -> LogLevel {
        self.table.load().effective(logger)
    }

    /// Replace every level with those from a reloaded configuration.
    pub fn apply(&self, config: &LoggingConfig) {
        self.table.store(Arc::new(LevelTable::from_config(config)));
        tracing::info!(
            root_level = %config.root_level,
            loggers = config.loggers.len(),
            "Logger levels reloaded"
        );
    }
}

/// Level-filtering fan-out to the configured appenders.
#[derive(Debug)]
pub struct Dispatcher {
    levels: LevelManager,
    appenders: Vec<Box<dyn Appender>>,
}

impl Dispatcher {
    pub fn new(levels: LevelManager) -> Self {
        Self {
            levels,
            appenders: Vec::new(),
        }
    }

    pub fn with_appender(mut self, appender: impl Appender + 'static) -> Self {
        self.appenders.push(Box::new(appender));
        self
    }

    pub fn levels(&self) -> &LevelManager {
        &self.levels
    }

    pub fn appenders(&self) -> impl Iterator<Item = &dyn Appender> {
        self.appenders.iter().map(|appender| appender.as_ref())
    }

    /// Close every appender in registration order.
    pub async fn close(&self) {
        for appender in &self.appenders {
            appender.close().await;
        }
    }

    fn dispatch(&self, record: Record) {
        metrics::record_log_record(record.level);
        for appender in &self.appenders {
            appender.append(&record);
        }
    }
}

impl LogEngine for Dispatcher {
    fn is_enabled(&self, level: LogLevel, logger: &str) -> bool {
        level != LogLevel::Off && level >= self.levels.effective_level(logger)
    }

    fn write(&self, level: LogLevel, logger: &str, message: &str) {
        if self.is_enabled(level, logger) {
            self.dispatch(Record::new(level, logger, message, None));
        }
    }

    fn write_with_cause(&self, level: LogLevel, logger: &str, message: &str, cause: &Failure) {
        if self.is_enabled(level, logger) {
            self.dispatch(Record::new(level, logger, message, Some(cause)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct Capture {
        records: Arc<Mutex<Vec<Record>>>,
    }

    #[async_trait::async_trait]
    impl Appender for Capture {
        fn name(&self) -> &str {
            "capture"
        }

        fn append(&self, record: &Record) {
            self.records.lock().unwrap().push(record.clone());
        }
    }

    fn levels(root: LogLevel, loggers: &[(&str, LogLevel)]) -> LevelManager {
        let mut config = LoggingConfig {
            root_level: root,
            ..LoggingConfig::default()
        };
        for (name, level) in loggers {
            config.loggers.insert(name.to_string(), *level);
        }
        LevelManager::from_config(&config)
    }

    #[test]
    fn parent_strips_last_segment() {
        assert_eq!(parent("a::b::c"), Some("a::b"));
        assert_eq!(parent("a.b.c"), Some("a.b"));
        assert_eq!(parent("a::b.c"), Some("a::b"));
        assert_eq!(parent("a.b::c"), Some("a.b"));
        assert_eq!(parent("a"), None);
    }

    #[test]
    fn effective_level_uses_nearest_ancestor() {
        let levels = levels(
            LogLevel::Warn,
            &[("app", LogLevel::Info), ("app::db", LogLevel::Trace)],
        );
        assert_eq!(levels.effective_level("app::db::pool"), LogLevel::Trace);
        assert_eq!(levels.effective_level("app::http"), LogLevel::Info);
        assert_eq!(levels.effective_level("other"), LogLevel::Warn);
    }

    #[test]
    fn invalid_level_names_are_ignored() {
        let levels = levels(LogLevel::Info, &[]);
        levels.set_root_level("chatty");
        levels.set_level("app", "loudest");
        assert_eq!(levels.root_level(), LogLevel::Info);
        assert_eq!(levels.level("app"), None);

        levels.set_root_level("error");
        levels.set_level("app", "DEBUG");
        assert_eq!(levels.root_level(), LogLevel::Error);
        assert_eq!(levels.level("app"), Some(LogLevel::Debug));
        assert_eq!(levels.level("app::child"), None);
        assert_eq!(levels.effective_level("app::child"), LogLevel::Debug);
    }

    #[test]
    fn clones_share_the_table() {
        let levels = levels(LogLevel::Info, &[]);
        let other = levels.clone();
        other.set_root_level("BUG");
        assert_eq!(levels.root_level(), LogLevel::Bug);
    }

    #[test]
    fn dispatcher_filters_by_level() {
        let capture = Capture::default();
        let records = Arc::clone(&capture.records);
        let dispatcher =
            Dispatcher::new(levels(LogLevel::Info, &[("noisy", LogLevel::Off)])).with_appender(capture);

        dispatcher.write(LogLevel::Debug, "app", "hidden");
        dispatcher.write(LogLevel::Info, "app", "shown");
        dispatcher.write(LogLevel::Off, "app", "never");
        dispatcher.write(LogLevel::Bug, "noisy", "muted");
        dispatcher.write_with_cause(
            LogLevel::Error,
            "app",
            "failed",
            &Failure::new("IoError", Some("disk".into())),
        );

        let records = records.lock().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].message, "shown");
        assert!(records[0].cause.is_none());
        assert_eq!(records[1].level, LogLevel::Error);
        assert_eq!(records[1].cause.as_ref().unwrap().short_message(), "disk");
        assert_eq!(
            dispatcher.appenders().map(|a| a.name()).collect::<Vec<_>>(),
            vec!["capture"]
        );
    }

    #[test]
    fn record_captures_thread_context() {
        LogContext.push("req-7");
        let record = Record::new(LogLevel::Info, "app", "hello", None);
        LogContext.pop();
        assert_eq!(record.context, "req-7");
    }

    #[test]
    fn apply_replaces_all_levels() {
        let levels = levels(LogLevel::Info, &[("app", LogLevel::Trace)]);
        let mut config = LoggingConfig::default();
        config.root_level = LogLevel::Error;
        levels.apply(&config);
        assert_eq!(levels.root_level(), LogLevel::Error);
        assert_eq!(levels.level("app"), None);
    }
}
