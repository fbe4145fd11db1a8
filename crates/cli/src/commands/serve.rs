//! `silvercare serve` — start the HTTP gateway.

use silvercare_config::AppConfig;
use tracing::{info, warn};

pub async fn run(port: Option<u16>) -> anyhow::Result<()> {
    let mut config = AppConfig::load()?;
    if let Some(port) = port {
        config.gateway.port = port;
    }

    let routes = config.active_routes();
    if routes.is_empty() {
        warn!("No provider API keys configured — requests will get static fallback answers");
    } else {
        info!(routes = ?routes, "Provider routes active");
    }

    silvercare_gateway::start(config)
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))
}
