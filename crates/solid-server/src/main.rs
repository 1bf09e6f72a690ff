use std::net::SocketAddr;

use anyhow::Context;
use solid_pipeline::Settings;
use tracing_subscriber::EnvFilter;

const ADDR_VAR: &str = "SOLID_ADDR";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let address = match std::env::var(ADDR_VAR) {
        Ok(value) => value
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid {ADDR_VAR}: {value}"))?,
        Err(_) => SocketAddr::from(([127, 0, 0, 1], 3000)),
    };

    let pipeline = Settings::from_env().native_pipeline();
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("binding {address}"))?;
    tracing::info!(%address, "listening");
    axum::serve(listener, solid_server::app(pipeline)).await?;
    Ok(())
}
