//! Model state and the estimator contract.
//!
//! The service owns exactly one trained model at a time. [`ModelHandle`] is
//! the exclusive-access holder: training replaces the slot wholesale after
//! persisting the artifact, scoring clones the reference out and releases
//! the lock before any heavy work.

use std::path::PathBuf;
use std::sync::Arc;

use ndarray::{Array1, Array2};
use parking_lot::RwLock;

use crate::error::{AppError, AppResult};

pub mod forest;
pub mod storage;

pub use forest::IsolationForest;

/// Capability contract for the outlier estimator.
///
/// `decision` follows the usual convention for outlier detectors: larger
/// values mean the row is more consistent with the training distribution.
/// The scoring pipeline negates it into a raw anomaly magnitude, so any
/// conforming implementation can replace the shipped forest without
/// changing downstream logic.
pub trait Estimator {
    /// Train on rows as independent unlabeled samples.
    fn fit(&mut self, x: &Array2<f32>);

    /// Per-row normality margin; larger = more normal.
    fn decision(&self, x: &Array2<f32>) -> Array1<f64>;
}

/// Exclusive-access holder for the process-wide trained model.
pub struct ModelHandle {
    slot: RwLock<Option<Arc<IsolationForest>>>,
    artifact_path: PathBuf,
}

impl ModelHandle {
    pub fn new(artifact_path: PathBuf) -> Self {
        Self {
            slot: RwLock::new(None),
            artifact_path,
        }
    }

    /// Whether a model is resident in memory. Never touches disk.
    pub fn is_loaded(&self) -> bool {
        self.slot.read().is_some()
    }

    /// Persist a freshly trained model, then install it. A persistence
    /// failure leaves the previous model in place.
    pub fn install(&self, forest: IsolationForest) -> AppResult<()> {
        storage::save_model(&self.artifact_path, &forest)
            .map_err(|e| AppError::Internal(format!("persist model: {}", e)))?;
        *self.slot.write() = Some(Arc::new(forest));
        Ok(())
    }

    /// Current model, lazily loading the persisted artifact when the slot
    /// is empty.
    pub fn current_or_load(&self) -> AppResult<Arc<IsolationForest>> {
        if let Some(model) = self.slot.read().as_ref() {
            return Ok(Arc::clone(model));
        }

        let mut slot = self.slot.write();
        // Another caller may have loaded while we waited for the lock.
        if let Some(model) = slot.as_ref() {
            return Ok(Arc::clone(model));
        }

        let loaded = storage::load_model(&self.artifact_path)
            .map_err(|e| AppError::Internal(format!("load model: {}", e)))?
            .ok_or(AppError::ModelNotTrained)?;
        tracing::info!(
            path = %self.artifact_path.display(),
            trained_at = %loaded.trained_at(),
            "model loaded from artifact"
        );

        let model = Arc::new(loaded);
        *slot = Some(Arc::clone(&model));
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FEATURE_COUNT;
    use ndarray::Array2;
    use tempfile::TempDir;

    fn trained_forest() -> IsolationForest {
        let mut data = Vec::new();
        for i in 0..80 {
            data.extend_from_slice(&[300.0 + i as f32, 0.0, 1.0]);
        }
        let x = Array2::from_shape_vec((80, FEATURE_COUNT), data).unwrap();
        let mut forest = IsolationForest::new(60, 0.05, 11);
        forest.fit(&x);
        forest
    }

    #[test]
    fn install_persists_and_loads_into_memory() {
        let dir = TempDir::new().unwrap();
        let handle = ModelHandle::new(dir.path().join("model.json"));
        assert!(!handle.is_loaded());

        handle.install(trained_forest()).unwrap();
        assert!(handle.is_loaded());
        assert!(dir.path().join("model.json").exists());
    }

    #[test]
    fn a_fresh_handle_lazily_loads_the_artifact() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.json");
        ModelHandle::new(path.clone()).install(trained_forest()).unwrap();

        let restarted = ModelHandle::new(path);
        assert!(!restarted.is_loaded());
        let model = restarted.current_or_load().unwrap();
        assert!(restarted.is_loaded());

        // The reloaded model scores exactly like the one that was saved.
        let probe = Array2::from_shape_vec((1, 3), vec![310.0, 0.0, 1.0]).unwrap();
        assert_eq!(model.decision(&probe)[0], trained_forest().decision(&probe)[0]);
    }

    #[test]
    fn no_artifact_means_model_not_trained() {
        let dir = TempDir::new().unwrap();
        let handle = ModelHandle::new(dir.path().join("model.json"));
        let err = handle.current_or_load().unwrap_err();
        assert!(matches!(err, AppError::ModelNotTrained));
    }

    #[test]
    fn training_overwrites_the_artifact_wholesale() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.json");
        let handle = ModelHandle::new(path.clone());

        handle.install(trained_forest()).unwrap();
        let first = std::fs::read(&path).unwrap();

        let mut other = IsolationForest::new(30, 0.10, 99);
        let x = Array2::from_shape_vec((2, FEATURE_COUNT), vec![1.0, 0.0, 0.0, 2.0, 1.0, 1.0])
            .unwrap();
        other.fit(&x);
        handle.install(other).unwrap();
        let second = std::fs::read(&path).unwrap();

        assert_ne!(first, second);
    }
}
