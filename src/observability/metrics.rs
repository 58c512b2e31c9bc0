//! Metrics collection.
//!
//! # Metrics
//! - `log_records_total` (counter): records accepted by the dispatcher, by level
//! - `remote_console_lines_queued_total` (counter): lines accepted into the queue
//! - `remote_console_lines_dropped_total` (counter): lines rejected, by reason (`full`, `closed`)
//! - `remote_console_lines_sent_total` (counter): lines written to a console
//! - `remote_console_connections_total` (counter): consoles accepted
//! - `remote_console_client_connected` (gauge): 1 while a console is attached
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; exporting is left to the host process

use metrics::{counter, gauge};

use crate::engine::LogLevel;

pub fn record_log_record(level: LogLevel) {
    counter!("log_records_total", "level" => level.as_str()).increment(1);
}

pub fn record_line_queued() {
    counter!("remote_console_lines_queued_total").increment(1);
}

pub fn record_line_dropped(reason: &'static str) {
    counter!("remote_console_lines_dropped_total", "reason" => reason).increment(1);
}

pub fn record_line_sent() {
    counter!("remote_console_lines_sent_total").increment(1);
}

/// Record a console attaching (`true`) or detaching (`false`).
pub fn record_client_connected(connected: bool) {
    if connected {
        counter!("remote_console_connections_total").increment(1);
    }
    gauge!("remote_console_client_connected").set(if connected { 1.0 } else { 0.0 });
}
