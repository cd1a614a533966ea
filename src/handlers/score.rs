//! Scoring handler

use std::path::PathBuf;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::event;
use crate::features;
use crate::model::Estimator;
use crate::scoring::{self, RegionSummary};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub log_path: Option<PathBuf>,
    #[serde(default = "default_tail")]
    pub tail: usize,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_tail() -> usize {
    400
}

fn default_threshold() -> f64 {
    scoring::DEFAULT_THRESHOLD
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub ok: bool,
    pub regions: Vec<RegionSummary>,
    pub threshold: f64,
}

/// Score the most recent activity and refresh the per-region gauges.
pub async fn score_from_logs(
    State(state): State<AppState>,
    Json(req): Json<ScoreRequest>,
) -> AppResult<Json<ScoreResponse>> {
    let model = state.model.current_or_load()?;

    let log_path = req.log_path.unwrap_or_else(|| state.config.log_path.clone());
    let events = event::events_from_log(&log_path, req.tail, None)?;
    if events.is_empty() {
        return Err(AppError::NoQualifyingEvents);
    }

    let matrix = features::to_matrix(&events);
    // Larger decision = more normal; invert into an anomaly magnitude.
    let raw: Vec<f64> = model.decision(&matrix).iter().map(|d| -d).collect();
    let normalized = scoring::normalize_scores(&raw);
    let regions = scoring::aggregate_by_region(&events, &normalized, req.threshold);

    state.gauges.observe(&regions);

    tracing::info!(
        events = events.len(),
        regions = regions.len(),
        "tail scored"
    );

    Ok(Json(ScoreResponse {
        ok: true,
        regions,
        threshold: req.threshold,
    }))
}
