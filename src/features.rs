//! Feature encoding.
//!
//! The layout is fixed and order-significant: a model trained on this
//! encoding is scored against the same column order after restarts, so the
//! mapping from event to row must never change shape silently.

use ndarray::Array2;

use crate::event::OrderEvent;

/// Width of the feature matrix.
pub const FEATURE_COUNT: usize = 3;

/// Feature names, in column order.
pub const FEATURE_LAYOUT: [&str; FEATURE_COUNT] = ["prep_time_ms", "refund", "region_is_east"];

/// Encode one event into its feature row.
pub fn encode(event: &OrderEvent) -> [f32; FEATURE_COUNT] {
    [
        event.prep_time_ms as f32,
        if event.refund { 1.0 } else { 0.0 },
        if event.region.eq_ignore_ascii_case("east") { 1.0 } else { 0.0 },
    ]
}

/// Assemble the `[n, 3]` feature matrix for a batch of events.
pub fn to_matrix(events: &[OrderEvent]) -> Array2<f32> {
    let mut matrix = Array2::zeros((events.len(), FEATURE_COUNT));
    for (i, event) in events.iter().enumerate() {
        for (j, value) in encode(event).into_iter().enumerate() {
            matrix[[i, j]] = value;
        }
    }
    matrix
}
