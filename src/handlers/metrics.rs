//! Metrics export handler

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;

use crate::server::AppState;

/// Text exposition content type.
const CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Expose the last-computed per-region gauges.
pub async fn export(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, CONTENT_TYPE)],
        state.gauges.render(),
    )
}
