//! console-tail: print the lines served by a log-relay remote console.

use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;

use log_relay::config::ObservabilityConfig;
use log_relay::lifecycle::signals;
use log_relay::observability::logging::init_tracing;

const RECONNECT_DELAY: Duration = Duration::from_secs(1);

#[derive(Parser)]
#[command(name = "console-tail")]
#[command(about = "Print lines from a log-relay remote console", long_about = None)]
struct Cli {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(short, long, default_value_t = 8001)]
    port: u16,

    /// Reconnect when the connection is closed or refused
    #[arg(short, long)]
    follow: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(&ObservabilityConfig {
        log_level: "warn".into(),
    });

    tokio::select! {
        result = tail(&cli) => result,
        _ = signals::stop_requested() => Ok(()),
    }
}

async fn tail(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let address = format!("{}:{}", cli.host, cli.port);
    loop {
        match TcpStream::connect(&address).await {
            Ok(stream) => {
                tracing::info!(%address, "Connected");
                let mut lines = BufReader::new(stream).lines();
                loop {
                    match lines.next_line().await {
                        Ok(Some(line)) => println!("{line}"),
                        Ok(None) => break,
                        Err(e) => {
                            tracing::warn!(error = %e, "Connection lost");
                            break;
                        }
                    }
                }
            }
            Err(e) if cli.follow => tracing::warn!(%address, error = %e, "Connect failed"),
            Err(e) => return Err(e.into()),
        }
        if !cli.follow {
            return Ok(());
        }
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}
