pub mod handlers;
pub mod models;
pub mod router;

use crate::config::Config;
use crate::exchanges::DepthSource;
use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use std::net::SocketAddr;
use std::sync::Arc;

/// Shared, read-only handler state. The depth source is injected so handlers
/// never reach for a global client.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub source: Arc<dyn DepthSource>,
}

impl AppState {
    pub fn new(config: Config, source: Arc<dyn DepthSource>) -> Self {
        Self {
            config: Arc::new(config),
            source,
        }
    }
}

pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Binds the server to the configured port and serves until Ctrl+C.
    pub async fn run(self) -> anyhow::Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.state.config.api_port));

        // the recorder is process-global, so it is installed here rather than in router::build
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        let app = router::build(self.state)
            .route("/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);

        tracing::info!("API server listening on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for Ctrl+C: {e}");
        return;
    }
    tracing::info!("Shutting down...");
}
