//! Router and shared state.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::handlers;
use crate::model::ModelHandle;
use crate::telemetry::RegionGauges;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub model: Arc<ModelHandle>,
    pub gauges: Arc<RegionGauges>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let model = Arc::new(ModelHandle::new(config.model_path.clone()));
        Self {
            config,
            model,
            gauges: Arc::new(RegionGauges::new()),
        }
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/status", get(handlers::status::check))
        .route("/metrics", get(handlers::metrics::export))
        .route("/train_from_logs", post(handlers::train::train_from_logs))
        .route("/score_from_logs", post(handlers::score::score_from_logs))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
