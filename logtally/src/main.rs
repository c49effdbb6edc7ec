//! Logtally - access-log metrics aggregator reading from standard input

mod driver;

use anyhow::Result;
use driver::StreamDriver;
use tokio::io::BufReader;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Diagnostics go to stderr; stdout carries only metric snapshots.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("logtally=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting logtally v{}", env!("CARGO_PKG_VERSION"));

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            // Without a signal hook the only exit left is end of input.
            warn!("Failed to listen for interrupt: {}", e);
            std::future::pending::<()>().await;
        }
    };

    StreamDriver::new(stdout).run(stdin, shutdown).await?;

    info!("Logtally shutdown complete");
    Ok(())
}
