//! Named logger facade.
//!
//! A [`Logger`] checks the level first, then resolves the template, bounds the
//! message length and hands the text to its [`LogEngine`]. Nothing on this path
//! returns an error.

use std::fmt;
use std::sync::Arc;

use crate::engine::{LogEngine, LogLevel};
use crate::format::{self, ellipsis, summarize, Argument, Failure};

/// Message used by [`Logger::dump_failure`].
pub const DUMP_MESSAGE: &str = "Stack trace dump:";

#[derive(Clone)]
pub struct Logger {
    name: Arc<str>,
    engine: Arc<dyn LogEngine>,
    max_message_length: usize,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("max_message_length", &self.max_message_length)
            .finish_non_exhaustive()
    }
}

impl Logger {
    pub fn new(name: &str, engine: Arc<dyn LogEngine>, max_message_length: usize) -> Self {
        Self {
            name: Arc::from(name),
            engine,
            max_message_length,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.engine.is_enabled(level, &self.name)
    }

    /// Log at `level`. An absent template produces no output.
    pub fn log(&self, level: LogLevel, template: Option<&str>, args: &[Argument]) {
        if !self.is_enabled(level) {
            return;
        }
        let Some(message) = format::format_opt(template, args) else {
            return;
        };
        let message = ellipsis(Some(&message), self.max_message_length);
        self.engine.write(level, &self.name, &message);
    }

    pub fn trace(&self, template: &str, args: &[Argument]) {
        self.log(LogLevel::Trace, Some(template), args);
    }

    pub fn debug(&self, template: &str, args: &[Argument]) {
        self.log(LogLevel::Debug, Some(template), args);
    }

    pub fn info(&self, template: &str, args: &[Argument]) {
        self.log(LogLevel::Info, Some(template), args);
    }

    pub fn warn(&self, template: &str, args: &[Argument]) {
        self.log(LogLevel::Warn, Some(template), args);
    }

    pub fn error(&self, template: &str, args: &[Argument]) {
        self.log(LogLevel::Error, Some(template), args);
    }

    pub fn fatal(&self, template: &str, args: &[Argument]) {
        self.log(LogLevel::Fatal, Some(template), args);
    }

    /// Log the summarized cause chain of `failure` as the message.
    pub fn warn_failure(&self, failure: &Failure) {
        self.log_failure(LogLevel::Warn, failure);
    }

    pub fn error_failure(&self, failure: &Failure) {
        self.log_failure(LogLevel::Error, failure);
    }

    pub fn fatal_failure(&self, failure: &Failure) {
        self.log_failure(LogLevel::Fatal, failure);
    }

    /// Log `message` at FATAL with the full failure attached.
    pub fn dump(&self, message: &str, failure: &Failure) {
        if !self.is_enabled(LogLevel::Fatal) {
            return;
        }
        let message = ellipsis(Some(message), self.max_message_length);
        self.engine
            .write_with_cause(LogLevel::Fatal, &self.name, &message, failure);
    }

    pub fn dump_failure(&self, failure: &Failure) {
        self.dump(DUMP_MESSAGE, failure);
    }

    fn log_failure(&self, level: LogLevel, failure: &Failure) {
        if !self.is_enabled(level) {
            return;
        }
        let summary = summarize(failure);
        let message = ellipsis(Some(&summary), self.max_message_length);
        self.engine.write(level, &self.name, &message);
    }
}
