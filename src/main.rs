mod api;
mod config;
mod errors;
mod exchanges;
mod models;
mod orderbook;
mod symbol;
mod telemetry;

use api::{ApiServer, AppState};
use config::Config;
use exchanges::DepthSource;
use exchanges::binance::Binance;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    telemetry::init_tracing(config.log_format);

    let source: Arc<dyn DepthSource> = Arc::new(Binance::from_config(&config));

    tracing::info!(
        "depth-proxy starting: upstream [{}] {} (timeout {:?}, default limit {}, quote {}) on port {}",
        source.name(),
        config.binance_base_url,
        config.upstream_timeout,
        config.default_depth_limit,
        config.quote_asset,
        config.api_port
    );

    ApiServer::new(AppState::new(config, source)).run().await
}
