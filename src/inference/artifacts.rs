use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use super::{ArtifactError, ClassificationService, RandomForest, StandardScaler};

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let raw = fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&raw).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_scaler(path: &Path) -> Result<StandardScaler, ArtifactError> {
    let scaler: StandardScaler = read_json(path)?;
    scaler.validate()?;
    Ok(scaler)
}

pub fn load_forest(path: &Path) -> Result<RandomForest, ArtifactError> {
    let forest: RandomForest = read_json(path)?;
    forest.validate()?;
    Ok(forest)
}

/// Load both artifacts and wire them into a service. Any failure here is fatal.
pub fn load_service(
    scaler_path: &Path,
    model_path: &Path,
) -> Result<ClassificationService, ArtifactError> {
    let scaler = load_scaler(scaler_path)?;
    let forest = load_forest(model_path)?;

    tracing::info!(
        features = forest.n_features,
        trees = forest.trees.len(),
        classes = ?forest.classes,
        "Model and scaler loaded"
    );

    ClassificationService::new(Arc::new(scaler), Arc::new(forest))
}
