//! Record destinations.

use async_trait::async_trait;
use tracing::Level;

use super::Record;
use crate::format::summarize;

/// A named sink receiving every record the dispatcher lets through.
#[async_trait]
pub trait Appender: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    /// Must not block on I/O and must not fail.
    fn append(&self, record: &Record);

    /// Release resources. Records appended afterwards may be lost.
    async fn close(&self) {}
}

/// Re-emits records as `tracing` events under the `log_relay::record` target.
#[derive(Debug, Default)]
pub struct TracingAppender;

macro_rules! emit {
    ($level:expr, $record:expr, $cause:expr) => {
        tracing::event!(
            target: "log_relay::record",
            $level,
            logger = %$record.logger,
            severity = $record.level.as_str(),
            context = $record.context.as_str(),
            cause = $cause,
            "{}",
            $record.message
        )
    };
}

#[async_trait]
impl Appender for TracingAppender {
    fn name(&self) -> &str {
        crate::config::TRACING_DESTINATION
    }

    fn append(&self, record: &Record) {
        let cause = record.cause.as_ref().map(summarize);
        let cause = cause.as_deref();
        match record.level.to_tracing() {
            Some(Level::TRACE) => emit!(Level::TRACE, record, cause),
            Some(Level::DEBUG) => emit!(Level::DEBUG, record, cause),
            Some(Level::INFO) => emit!(Level::INFO, record, cause),
            Some(Level::WARN) => emit!(Level::WARN, record, cause),
            Some(Level::ERROR) => emit!(Level::ERROR, record, cause),
            Some(_) | None => {}
        }
    }
}

#[async_trait]
impl<A: Appender + ?Sized> Appender for std::sync::Arc<A> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn append(&self, record: &Record) {
        (**self).append(record);
    }

    async fn close(&self) {
        (**self).close().await;
    }
}
