//! Status handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::server::AppState;

#[derive(Serialize)]
pub struct StatusResponse {
    ok: bool,
    model_loaded: bool,
}

/// Report whether a model is resident in memory. Read-only: never triggers
/// a load from the persisted artifact.
pub async fn check(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        ok: true,
        model_loaded: state.model.is_loaded(),
    })
}
