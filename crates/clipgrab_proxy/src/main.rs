use anyhow::{Context, Result};
use clipgrab_proxy::ProxyConfig;
use log::LevelFilter;
use session_logging::{session_warn, LogDestination};
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<()> {
    session_logging::initialize(LogDestination::default(), LevelFilter::Info);

    let config = ProxyConfig::default();
    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;

    clipgrab_proxy::serve(listener, config, shutdown_signal())
        .await
        .context("running proxy server")?;

    Ok(())
}

async fn shutdown_signal() {
    // Only graceful shutdown is affected; Ctrl+C still ends the process.
    if let Err(err) = signal::ctrl_c().await {
        session_warn!("Failed to install Ctrl+C handler: {}", err);
    }
}
