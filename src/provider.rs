//! Entry point tying configuration, engine and appenders together.

use std::sync::Arc;

use tokio::runtime::Handle;

use crate::config::{LoggingConfig, RelayConfig, REMOTE_DESTINATION, TRACING_DESTINATION};
use crate::engine::{
    Dispatcher, LevelManager, LogContext, RemoteConsoleAppender, TracingAppender,
};
use crate::forwarder::RemoteForwarder;
use crate::logger::Logger;

/// Hands out loggers sharing one dispatcher.
#[derive(Debug)]
pub struct LogProvider {
    dispatcher: Arc<Dispatcher>,
    remote: Option<Arc<RemoteConsoleAppender>>,
    max_message_length: usize,
}

impl LogProvider {
    /// Build the dispatcher with the configured destinations, in order.
    ///
    /// The remote console forwarder is spawned on `runtime` when its first
    /// record arrives.
    pub fn from_config(config: &RelayConfig, runtime: Handle) -> Self {
        let logging = &config.logging;
        let mut dispatcher = Dispatcher::new(LevelManager::from_config(logging));
        let mut remote = None;

        for (index, destination) in logging.destinations.iter().enumerate() {
            if logging.destinations[..index].contains(destination) {
                continue;
            }
            match destination.as_str() {
                TRACING_DESTINATION => dispatcher = dispatcher.with_appender(TracingAppender),
                REMOTE_DESTINATION => {
                    let appender = Arc::new(RemoteConsoleAppender::new(
                        config.remote_console.clone(),
                        runtime.clone(),
                    ));
                    remote = Some(Arc::clone(&appender));
                    dispatcher = dispatcher.with_appender(appender);
                }
                other => tracing::warn!(destination = other, "Ignoring unknown destination"),
            }
        }

        tracing::debug!(destinations = ?logging.destinations, "Log provider ready");
        Self {
            dispatcher: Arc::new(dispatcher),
            remote,
            max_message_length: logging.max_message_length,
        }
    }

    /// Provider over a prepared dispatcher.
    pub fn new(dispatcher: Dispatcher, max_message_length: usize) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            remote: None,
            max_message_length,
        }
    }

    pub fn logger(&self, name: &str) -> Logger {
        Logger::new(name, self.dispatcher.clone(), self.max_message_length)
    }

    pub fn context(&self) -> LogContext {
        LogContext
    }

    pub fn levels(&self) -> &LevelManager {
        self.dispatcher.levels()
    }

    /// Apply the levels of a reloaded configuration.
    pub fn reload(&self, config: &LoggingConfig) {
        self.levels().apply(config);
    }

    /// The remote console forwarder, once the remote destination has received a record.
    pub fn remote_forwarder(&self) -> Option<&RemoteForwarder> {
        self.remote.as_ref().and_then(|remote| remote.forwarder())
    }

    /// Close every appender. The remote forwarder gets its bounded grace period.
    pub async fn close(&self) {
        self.dispatcher.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::engine::LogLevel;

    #[tokio::test]
    async fn builds_configured_destinations_once() {
        let mut config = RelayConfig::default();
        config.logging.destinations = vec!["tracing".into(), "remote".into(), "tracing".into()];
        config.remote_console.bind_address = "127.0.0.1".into();
        config.remote_console.port = 0;

        let provider = LogProvider::from_config(&config, Handle::current());
        let names: Vec<_> = provider.dispatcher.appenders().map(|a| a.name().to_string()).collect();
        assert_eq!(names, vec!["tracing", "remote"]);
        assert!(provider.remote_forwarder().is_none());

        provider.logger("app").info("hello {}", &args!["world"]);
        assert!(provider.remote_forwarder().is_some());
        provider.close().await;
    }

    #[tokio::test]
    async fn levels_are_shared_with_loggers() {
        let provider = LogProvider::from_config(&RelayConfig::default(), Handle::current());
        let logger = provider.logger("app::db");
        assert!(!logger.is_enabled(LogLevel::Debug));

        provider.levels().set_level("app", "debug");
        assert!(logger.is_enabled(LogLevel::Debug));

        let mut reloaded = LoggingConfig::default();
        reloaded.root_level = LogLevel::Error;
        provider.reload(&reloaded);
        assert!(!logger.is_enabled(LogLevel::Warn));
        assert!(logger.is_enabled(LogLevel::Error));
    }
}
