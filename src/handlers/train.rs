//! Training handler

use std::path::PathBuf;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::event;
use crate::features::{self, FEATURE_LAYOUT};
use crate::model::forest::{IsolationForest, DEFAULT_TREES};
use crate::model::Estimator;
use crate::server::AppState;

/// Estimator seed; training is reproducible run to run.
const TRAIN_SEED: u64 = 42;

#[derive(Debug, Deserialize)]
pub struct TrainRequest {
    pub log_path: Option<PathBuf>,
    #[serde(default)]
    pub filter: Option<TrainFilter>,
    #[serde(default = "default_contamination")]
    pub contamination: f64,
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
    #[serde(default = "default_tail")]
    pub tail: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct TrainFilter {
    pub change_id: Option<String>,
}

fn default_contamination() -> f64 {
    0.05
}

fn default_min_samples() -> usize {
    50
}

fn default_tail() -> usize {
    5000
}

#[derive(Debug, Serialize)]
pub struct TrainResponse {
    pub ok: bool,
    pub trained_on: usize,
    pub features: [&'static str; features::FEATURE_COUNT],
}

/// Fit a fresh model on the qualifying tail of the baseline log.
///
/// Fails without touching the previous model when the filtered tail holds
/// fewer than `min_samples` qualifying events.
pub async fn train_from_logs(
    State(state): State<AppState>,
    Json(req): Json<TrainRequest>,
) -> AppResult<Json<TrainResponse>> {
    let log_path = req.log_path.unwrap_or_else(|| state.config.log_path.clone());
    let change_filter = req.filter.as_ref().and_then(|f| f.change_id.as_deref());

    let events = event::events_from_log(&log_path, req.tail, change_filter)?;
    if events.len() < req.min_samples {
        return Err(AppError::InsufficientData {
            got: events.len(),
            need: req.min_samples,
        });
    }

    let matrix = features::to_matrix(&events);
    let mut forest = IsolationForest::new(DEFAULT_TREES, req.contamination, TRAIN_SEED);
    forest.fit(&matrix);
    state.model.install(forest)?;

    tracing::info!(
        samples = events.len(),
        log = %log_path.display(),
        "model trained"
    );

    Ok(Json(TrainResponse {
        ok: true,
        trained_on: events.len(),
        features: FEATURE_LAYOUT,
    }))
}
