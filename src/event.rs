//! Order-event decoding.
//!
//! Log tails are noisy: truncated lines, unrelated records, free-form
//! text. Anything that does not decode into a qualifying order event is
//! dropped silently rather than failing the call.

use std::path::Path;

use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::tail;

/// Event-type marker of a normally completed order.
pub const MSG_ORDER_OK: &str = "order_ok";

/// Event-type marker of a refund-tagged order.
pub const MSG_REFUND: &str = "REFUND_TAG";

/// One qualifying order record from the log tail.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderEvent {
    pub region: String,
    pub prep_time_ms: f64,
    pub refund: bool,
    pub change_id: String,
    pub recipe_version: String,
    pub time: Option<String>,
}

/// Decode one raw log line into an event, or `None` to drop it.
///
/// A record qualifies when its `msg` marker is one of the two recognized
/// kinds and both `region` and `prep_time_ms` are present. The refund flag
/// is derived from which marker matched, never read from a field.
pub fn parse_line(line: &str) -> Option<OrderEvent> {
    let record: Value = serde_json::from_str(line).ok()?;

    let refund = match record.get("msg")?.as_str()? {
        MSG_ORDER_OK => false,
        MSG_REFUND => true,
        _ => return None,
    };

    let region = record.get("region")?.as_str()?.to_string();
    if region.is_empty() {
        return None;
    }
    let prep_time_ms = numeric(record.get("prep_time_ms")?)?;

    Some(OrderEvent {
        region,
        prep_time_ms,
        refund,
        change_id: str_or(&record, "change_id", "none"),
        recipe_version: str_or(&record, "recipe_version", "unknown"),
        time: record.get("time").and_then(Value::as_str).map(str::to_string),
    })
}

/// Accept a JSON number or a numeric string, finite values only.
fn numeric(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.filter(|v: &f64| v.is_finite())
}

fn str_or(record: &Value, key: &str, fallback: &str) -> String {
    record
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or(fallback)
        .to_string()
}

/// Read the last `tail_count` log lines and decode the qualifying events,
/// optionally keeping only events whose `change_id` matches the filter.
pub fn events_from_log(
    path: &Path,
    tail_count: usize,
    change_filter: Option<&str>,
) -> AppResult<Vec<OrderEvent>> {
    let lines = tail::read_last_lines(path, tail_count)
        .map_err(|e| AppError::LogSource(format!("{}: {}", path.display(), e)))?;

    let mut events: Vec<OrderEvent> = lines
        .iter()
        .filter_map(|line| parse_line(line))
        .collect();
    if let Some(change_id) = change_filter {
        events.retain(|e| e.change_id == change_id);
    }
    Ok(events)
}
