//! Score normalization and per-region aggregation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::event::OrderEvent;

/// Guards the degenerate batch where every raw score is equal.
const NORMALIZE_EPSILON: f64 = 1e-9;

/// Default incident threshold on the mean normalized score.
pub const DEFAULT_THRESHOLD: f64 = 0.70;

/// Per-region scoring outcome for one batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionSummary {
    pub region: String,
    pub avg_anomaly_score: f64,
    pub incident_active: bool,
    #[serde(rename = "n")]
    pub sample_count: usize,
}

/// Rescale raw anomaly magnitudes into [0,1] against this batch's own
/// min and max.
///
/// This is relative normalization: a value is high because it is the most
/// anomalous sample *within the current window*, not on any absolute
/// scale, so scores are not comparable across scoring calls. Known
/// limitation, kept deliberately. A batch of equal raws maps to all zeros.
pub fn normalize_scores(raw: &[f64]) -> Vec<f64> {
    let min = raw.iter().copied().fold(f64::INFINITY, f64::min);
    let max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    raw.iter()
        .map(|r| (r - min) / (max - min + NORMALIZE_EPSILON))
        .collect()
}

/// Group normalized scores by case-normalized region and apply the
/// incident threshold to each region's mean.
///
/// One summary per region observed in the batch; absent regions produce
/// nothing. Output order is deterministic (sorted by region).
pub fn aggregate_by_region(
    events: &[OrderEvent],
    scores: &[f64],
    threshold: f64,
) -> Vec<RegionSummary> {
    let mut by_region: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for (event, score) in events.iter().zip(scores) {
        by_region
            .entry(event.region.to_lowercase())
            .or_default()
            .push(*score);
    }

    by_region
        .into_iter()
        .map(|(region, scores)| {
            let avg = scores.iter().sum::<f64>() / scores.len() as f64;
            RegionSummary {
                region,
                avg_anomaly_score: avg,
                incident_active: avg >= threshold,
                sample_count: scores.len(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(region: &str) -> OrderEvent {
        OrderEvent {
            region: region.to_string(),
            prep_time_ms: 100.0,
            refund: false,
            change_id: "none".to_string(),
            recipe_version: "unknown".to_string(),
            time: None,
        }
    }

    #[test]
    fn normalized_scores_stay_within_unit_range() {
        let normalized = normalize_scores(&[-3.2, 0.0, 0.4, 11.9]);
        assert!(normalized.iter().all(|s| (0.0..=1.0).contains(s)));
        assert_eq!(normalized[0], 0.0);
        assert!(normalized[3] > 0.999);
    }

    #[test]
    fn a_degenerate_batch_normalizes_to_zero() {
        let normalized = normalize_scores(&[0.37, 0.37, 0.37]);
        assert_eq!(normalized, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn spread_is_relative_to_the_batch() {
        // Uniformly mild raws still span [0,1) within their own batch.
        let normalized = normalize_scores(&[0.01, 0.02, 0.03]);
        assert_eq!(normalized[0], 0.0);
        assert!(normalized[2] > 0.99);
    }

    #[test]
    fn incident_threshold_is_inclusive() {
        let events = vec![event("east")];
        let at = aggregate_by_region(&events, &[0.70], 0.70);
        assert!(at[0].incident_active);

        let below = aggregate_by_region(&events, &[0.6999], 0.70);
        assert!(!below[0].incident_active);
    }

    #[test]
    fn regions_group_case_normalized() {
        let events = vec![event("East"), event("east"), event("WEST")];
        let summaries = aggregate_by_region(&events, &[0.2, 0.4, 0.9], 0.70);
        assert_eq!(summaries.len(), 2);

        let east = &summaries[0];
        assert_eq!(east.region, "east");
        assert_eq!(east.sample_count, 2);
        assert!((east.avg_anomaly_score - 0.3).abs() < 1e-12);
        assert!(!east.incident_active);

        let west = &summaries[1];
        assert_eq!(west.region, "west");
        assert_eq!(west.sample_count, 1);
        assert!(west.incident_active);
    }

    #[test]
    fn empty_batch_emits_no_summaries() {
        assert!(aggregate_by_region(&[], &[], 0.70).is_empty());
    }
}
