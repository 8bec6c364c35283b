pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use gleaner_core::Crawler;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub struct AppState {
    pub crawler: Crawler,
}

/// Builds the application router with its middleware stack.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::routes())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
