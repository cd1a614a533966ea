//! Model artifact persistence.
//!
//! One JSON artifact at a fixed path, replaced wholesale on every
//! successful training.

use std::fs;
use std::io;
use std::path::Path;

use crate::features::FEATURE_COUNT;

use super::forest::IsolationForest;

/// Write the trained model, replacing any previous artifact.
pub fn save_model(path: &Path, forest: &IsolationForest) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_vec(forest)?;
    fs::write(path, json)
}

/// Load a persisted model; `None` when no artifact exists.
pub fn load_model(path: &Path) -> io::Result<Option<IsolationForest>> {
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read(path)?;
    let forest: IsolationForest = serde_json::from_slice(&data)?;

    // A model fitted on a different feature layout must not be scored
    // against this one.
    if forest.features() != FEATURE_COUNT {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "model feature layout mismatch",
        ));
    }
    Ok(Some(forest))
}
