//! Record layouts for the remote console.

use serde_json::json;

use super::Record;
use crate::config::LayoutKind;

/// Timestamp pattern of the text layout: day of month, then time with milliseconds.
pub const TEXT_TIMESTAMP: &str = "%d %H:%M:%S,%3f";

/// Render `record` as one or more newline-terminated lines.
pub fn render(kind: LayoutKind, record: &Record) -> String {
    match kind {
        LayoutKind::Text => text(record),
        LayoutKind::Json => json(record),
    }
}

/// `dd HH:MM:SS,mmm LEVEL logger context- message`, then one line per cause.
fn text(record: &Record) -> String {
    let mut out = format!(
        "{} {:<5} {} {}- {}\n",
        record.timestamp.format(TEXT_TIMESTAMP),
        record.level.as_str(),
        record.logger,
        record.context,
        record.message
    );
    if let Some(cause) = &record.cause {
        for (depth, failure) in cause.chain().enumerate() {
            if depth > 0 {
                out.push_str("Caused by: ");
            }
            out.push_str(&failure.to_string());
            out.push('\n');
        }
    }
    out
}

fn json(record: &Record) -> String {
    let cause: Vec<_> = record
        .cause
        .iter()
        .flat_map(|cause| cause.chain())
        .map(|failure| json!({ "type": failure.type_name(), "message": failure.message() }))
        .collect();
    let mut value = json!({
        "timestamp": record.timestamp.to_rfc3339(),
        "level": record.level.as_str(),
        "logger": record.logger,
        "context": record.context,
        "message": record.message,
    });
    if !cause.is_empty() {
        value["cause"] = serde_json::Value::Array(cause);
    }
    format!("{value}\n")
}
