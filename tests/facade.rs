//! End-to-end: logger → dispatcher → remote console appender → TCP console.

use tokio::runtime::Handle;

use log_relay::args;
use log_relay::config::{LayoutKind, RelayConfig};
use log_relay::{Failure, LogProvider};

mod common;
use common::{listening, loopback_config, Console};

fn remote_only(layout: LayoutKind) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.logging.destinations = vec!["remote".into()];
    config.remote_console = loopback_config(100);
    config.remote_console.layout = layout;
    config
}

/// Strip the `dd HH:MM:SS,mmm ` prefix of the text layout.
fn without_timestamp(line: &str) -> &str {
    let (stamp, rest) = line.split_at(16);
    assert_eq!(stamp.as_bytes()[2], b' ', "unexpected timestamp in {line:?}");
    assert_eq!(stamp.as_bytes()[11], b',', "unexpected timestamp in {line:?}");
    rest
}

#[tokio::test]
async fn formatted_record_reaches_console() {
    let provider = LogProvider::from_config(&remote_only(LayoutKind::Text), Handle::current());
    let logger = provider.logger("app::http");

    provider.context().push("req-9");
    logger.info("Phone {phone}.", &args!["770 555-666"]);
    logger.warn("%s items left", &args![3]);
    provider.context().pop();
    logger.info("Phone %s %d.", &args!["x"]);

    let forwarder = provider.remote_forwarder().unwrap();
    let mut console = Console::connect(listening(forwarder).await).await;
    let lines = console.lines(3).await;
    assert_eq!(without_timestamp(&lines[0]), "INFO  app::http req-9- Phone 770 555-666.");
    assert_eq!(without_timestamp(&lines[1]), "WARN  app::http req-9- 3 items left");
    assert_eq!(without_timestamp(&lines[2]), "INFO  app::http - Phone %s %d.");

    provider.close().await;
}

#[tokio::test]
async fn dump_sends_cause_lines() {
    let provider = LogProvider::from_config(&remote_only(LayoutKind::Text), Handle::current());
    let failure = Failure::new("ConfigError", Some("bad port".into()))
        .caused_by(Failure::new("ParseIntError", Some("invalid digit".into())));

    let logger = provider.logger("app");
    logger.dump_failure(&failure);
    logger.error_failure(&failure);

    let forwarder = provider.remote_forwarder().unwrap();
    let mut console = Console::connect(listening(forwarder).await).await;
    let lines = console.lines(4).await;
    assert_eq!(without_timestamp(&lines[0]), "FATAL app - Stack trace dump:");
    assert_eq!(lines[1], "ConfigError: bad port");
    assert_eq!(lines[2], "Caused by: ParseIntError: invalid digit");
    assert_eq!(
        without_timestamp(&lines[3]),
        "ERROR app - ConfigError: ParseIntError: invalid digit"
    );

    provider.close().await;
}

#[tokio::test]
async fn level_changes_apply_to_existing_loggers() {
    let provider = LogProvider::from_config(&remote_only(LayoutKind::Text), Handle::current());
    let logger = provider.logger("app::db::pool");

    logger.debug("hidden", &args![]);
    assert!(provider.remote_forwarder().is_none());

    provider.levels().set_level("app::db", "debug");
    logger.debug("shown", &args![]);
    provider.levels().set_level("app::db", "no such level");
    logger.debug("still shown", &args![]);

    let forwarder = provider.remote_forwarder().unwrap();
    let mut console = Console::connect(listening(forwarder).await).await;
    let lines = console.lines(2).await;
    assert_eq!(without_timestamp(&lines[0]), "DEBUG app::db::pool - shown");
    assert_eq!(without_timestamp(&lines[1]), "DEBUG app::db::pool - still shown");

    provider.close().await;
}

#[tokio::test]
async fn json_layout_and_truncation() {
    let mut config = remote_only(LayoutKind::Json);
    config.logging.max_message_length = 12;
    let provider = LogProvider::from_config(&config, Handle::current());

    provider
        .logger("app")
        .error("collection {}", &args![vec!["a", "", "b", "c", "d"]]);

    let forwarder = provider.remote_forwarder().unwrap();
    let mut console = Console::connect(listening(forwarder).await).await;
    let line = console.next_line().await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&line).unwrap();
    assert_eq!(value["level"], "ERROR");
    assert_eq!(value["logger"], "app");
    assert_eq!(value["message"], "collectio...");

    provider.close().await;
}
