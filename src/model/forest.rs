//! Isolation-forest outlier estimator.
//!
//! Trees isolate rows by recursive random splits; anomalous rows end up
//! alone after fewer splits, so a shorter expected path length means a more
//! isolated sample. Training is seeded and reproducible.

use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::Estimator;

/// Tree count used by training.
pub const DEFAULT_TREES: usize = 200;

/// Per-tree subsample ceiling.
const MAX_SUBSAMPLE: usize = 256;

/// Euler-Mascheroni constant, for the path-length correction.
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Split {
        feature: usize,
        threshold: f32,
        left: Box<Node>,
        right: Box<Node>,
    },
    Leaf {
        size: usize,
    },
}

/// Unsupervised outlier model over row-sample feature matrices.
///
/// Conforms to the [`Estimator`] contract: `fit` treats rows as independent
/// unlabeled samples, `decision` returns a per-row normality margin where
/// larger values mean more consistent with the training distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolationForest {
    n_estimators: usize,
    contamination: f64,
    seed: u64,
    features: usize,
    subsample: usize,
    trees: Vec<Node>,
    /// Decision offset at the contamination quantile of the training
    /// scores; rows below it get a negative margin.
    offset: f64,
    trained_at: DateTime<Utc>,
}

impl IsolationForest {
    pub fn new(n_estimators: usize, contamination: f64, seed: u64) -> Self {
        Self {
            n_estimators,
            contamination,
            seed,
            features: 0,
            subsample: 0,
            trees: Vec::new(),
            offset: 0.0,
            trained_at: Utc::now(),
        }
    }

    /// Column count the model was fitted on.
    pub fn features(&self) -> usize {
        self.features
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    /// Anomaly score in (0, 1]; higher means more isolated.
    fn anomaly_score(&self, row: &ArrayView1<f32>) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let mean_path = self
            .trees
            .iter()
            .map(|tree| path_length(tree, row, 0))
            .sum::<f64>()
            / self.trees.len() as f64;
        2f64.powf(-mean_path / average_path_length(self.subsample))
    }
}

impl Estimator for IsolationForest {
    fn fit(&mut self, x: &Array2<f32>) {
        let n = x.nrows();
        let mut rng = StdRng::seed_from_u64(self.seed);

        self.features = x.ncols();
        if n == 0 {
            self.trees = Vec::new();
            self.offset = 0.0;
            self.trained_at = Utc::now();
            return;
        }
        self.subsample = n.min(MAX_SUBSAMPLE);
        let height_limit = (self.subsample as f64).log2().ceil().max(1.0) as usize;

        let mut indices: Vec<usize> = (0..n).collect();
        self.trees = (0..self.n_estimators)
            .map(|_| {
                indices.shuffle(&mut rng);
                build_tree(x, &indices[..self.subsample], height_limit, 0, &mut rng)
            })
            .collect();

        // Place the zero margin at the contamination quantile of the
        // training scores, so roughly that fraction of training rows ends
        // up below it.
        let mut train_scores: Vec<f64> = x
            .rows()
            .into_iter()
            .map(|row| -self.anomaly_score(&row))
            .collect();
        self.offset = quantile(&mut train_scores, self.contamination);
        self.trained_at = Utc::now();
    }

    fn decision(&self, x: &Array2<f32>) -> Array1<f64> {
        Array1::from_iter(
            x.rows()
                .into_iter()
                .map(|row| -self.anomaly_score(&row) - self.offset),
        )
    }
}

fn build_tree(
    x: &Array2<f32>,
    rows: &[usize],
    height_limit: usize,
    depth: usize,
    rng: &mut StdRng,
) -> Node {
    if rows.len() <= 1 || depth >= height_limit {
        return Node::Leaf { size: rows.len() };
    }

    // Only features that still vary within this node can split it.
    let mut candidates: Vec<(usize, f32, f32)> = Vec::new();
    for feature in 0..x.ncols() {
        let mut lo = f32::INFINITY;
        let mut hi = f32::NEG_INFINITY;
        for &i in rows {
            let v = x[[i, feature]];
            lo = lo.min(v);
            hi = hi.max(v);
        }
        if hi > lo {
            candidates.push((feature, lo, hi));
        }
    }
    let Some(&(feature, lo, hi)) = candidates.choose(rng) else {
        return Node::Leaf { size: rows.len() };
    };

    let threshold = rng.gen_range(lo..hi);
    let (left, right): (Vec<usize>, Vec<usize>) =
        rows.iter().copied().partition(|&i| x[[i, feature]] < threshold);

    Node::Split {
        feature,
        threshold,
        left: Box::new(build_tree(x, &left, height_limit, depth + 1, rng)),
        right: Box::new(build_tree(x, &right, height_limit, depth + 1, rng)),
    }
}

fn path_length(node: &Node, row: &ArrayView1<f32>, depth: usize) -> f64 {
    match node {
        Node::Leaf { size } => depth as f64 + average_path_length(*size),
        Node::Split {
            feature,
            threshold,
            left,
            right,
        } => {
            if row[*feature] < *threshold {
                path_length(left, row, depth + 1)
            } else {
                path_length(right, row, depth + 1)
            }
        }
    }
}

/// c(n): average path length of an unsuccessful BST search over n samples.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

fn quantile(values: &mut [f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    let rank = ((values.len() - 1) as f64 * q.clamp(0.0, 1.0)).round() as usize;
    values[rank]
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn training_matrix() -> Array2<f32> {
        // Tight cluster of ordinary prep times in the east region.
        let mut data = Vec::new();
        for i in 0..120 {
            data.extend_from_slice(&[500.0 + (i % 10) as f32, 0.0, 1.0]);
        }
        Array2::from_shape_vec((120, 3), data).unwrap()
    }

    #[test]
    fn outliers_get_a_lower_decision_margin() {
        let mut forest = IsolationForest::new(100, 0.05, 7);
        forest.fit(&training_matrix());

        let probe =
            Array2::from_shape_vec((2, 3), vec![505.0, 0.0, 1.0, 9000.0, 1.0, 0.0]).unwrap();
        let decision = forest.decision(&probe);
        assert!(
            decision[0] > decision[1],
            "inlier {} should outrank outlier {}",
            decision[0],
            decision[1]
        );
    }

    #[test]
    fn same_seed_reproduces_the_same_decisions() {
        let x = training_matrix();
        let mut a = IsolationForest::new(50, 0.05, 42);
        let mut b = IsolationForest::new(50, 0.05, 42);
        a.fit(&x);
        b.fit(&x);

        let probe = Array2::from_shape_vec((1, 3), vec![640.0, 1.0, 0.0]).unwrap();
        assert_eq!(a.decision(&probe)[0], b.decision(&probe)[0]);
    }

    #[test]
    fn most_training_rows_sit_above_the_zero_margin() {
        let x = training_matrix();
        let mut forest = IsolationForest::new(100, 0.10, 3);
        forest.fit(&x);

        let decision = forest.decision(&x);
        let above = decision.iter().filter(|d| **d > 0.0).count();
        assert!(above >= x.nrows() / 2);
    }

    #[test]
    fn identical_rows_score_identically() {
        let mut forest = IsolationForest::new(60, 0.05, 5);
        forest.fit(&training_matrix());

        let probe =
            Array2::from_shape_vec((2, 3), vec![503.0, 0.0, 1.0, 503.0, 0.0, 1.0]).unwrap();
        let decision = forest.decision(&probe);
        assert_eq!(decision[0], decision[1]);
    }

    #[test]
    fn average_path_length_matches_known_values() {
        assert_eq!(average_path_length(0), 0.0);
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        let c256 = average_path_length(256);
        assert!(c256 > 10.0 && c256 < 12.0);
    }
}
