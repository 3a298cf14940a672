pub mod artifacts;
pub mod forest;
pub mod scaler;
pub mod service;

use std::path::PathBuf;

use thiserror::Error;

use crate::models::FeatureTable;

pub use artifacts::{load_forest, load_scaler, load_service};
pub use forest::RandomForest;
pub use scaler::StandardScaler;
pub use service::ClassificationService;

/// Feature normalisation fitted ahead of time.
pub trait Scaler: Send + Sync {
    /// Width of the tables this scaler accepts.
    fn n_features(&self) -> usize;

    fn transform(&self, table: &FeatureTable) -> Result<FeatureTable, ClassifyError>;
}

/// Pre-trained model producing one integer label per row.
pub trait Classifier: Send + Sync {
    fn n_features(&self) -> usize;

    fn predict(&self, table: &FeatureTable) -> Result<Vec<i64>, ClassifyError>;
}

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Expected {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Input contains NaN or infinity (row {row}, column {column})")]
    NonFinite { row: usize, column: usize },

    #[error("model returned {labels} labels for {rows} rows")]
    LabelCount { rows: usize, labels: usize },

    #[error("inference failed: {0}")]
    Inference(String),
}

/// Failure to bring a pre-trained artifact into memory. Fatal at startup.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid {kind} artifact: {reason}")]
    Invalid { kind: &'static str, reason: String },

    #[error("scaler expects {scaler} features but model expects {model}")]
    WidthMismatch { scaler: usize, model: usize },
}
