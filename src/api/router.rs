use super::{AppState, handlers};
use axum::Router;
use axum::http::Method;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Builds and returns the full Axum router with all routes and shared state.
pub fn build(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/orderbook", post(handlers::post_orderbook))
        .route("/api/orderbook/{symbol}", get(handlers::get_orderbook))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
