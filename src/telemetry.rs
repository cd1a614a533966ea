//! Live per-region gauges, exposed in the Prometheus text format.
//!
//! Mutated only by the scoring operation; a region keeps its last observed
//! value until the next batch mentions it again.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::scoring::RegionSummary;

const SCORE_GAUGE: &str = "aiops_anomaly_score";
const INCIDENT_GAUGE: &str = "aiops_incident_active";

#[derive(Debug, Clone, Copy)]
struct GaugeSample {
    score: f64,
    incident: bool,
}

/// Last-computed per-region score and incident gauges.
#[derive(Default)]
pub struct RegionGauges {
    samples: RwLock<BTreeMap<String, GaugeSample>>,
}

impl RegionGauges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one batch of summaries into the live gauges.
    pub fn observe(&self, summaries: &[RegionSummary]) {
        let mut samples = self.samples.write();
        for summary in summaries {
            samples.insert(
                summary.region.clone(),
                GaugeSample {
                    score: summary.avg_anomaly_score,
                    incident: summary.incident_active,
                },
            );
        }
    }

    /// Render the gauges in the text exposition format.
    pub fn render(&self) -> String {
        let samples = self.samples.read();
        let mut out = String::new();

        out.push_str(&format!("# HELP {} Anomaly score (0-1)\n", SCORE_GAUGE));
        out.push_str(&format!("# TYPE {} gauge\n", SCORE_GAUGE));
        for (region, sample) in samples.iter() {
            out.push_str(&format!(
                "{}{{region=\"{}\"}} {}\n",
                SCORE_GAUGE, region, sample.score
            ));
        }

        out.push_str(&format!(
            "# HELP {} 1 if incident active else 0\n",
            INCIDENT_GAUGE
        ));
        out.push_str(&format!("# TYPE {} gauge\n", INCIDENT_GAUGE));
        for (region, sample) in samples.iter() {
            out.push_str(&format!(
                "{}{{region=\"{}\"}} {}\n",
                INCIDENT_GAUGE,
                region,
                u8::from(sample.incident)
            ));
        }
        out
    }
}
