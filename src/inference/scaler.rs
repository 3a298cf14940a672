use serde::{Deserialize, Serialize};

use super::{ArtifactError, ClassifyError, Scaler};
use crate::models::FeatureTable;

/// Standardisation `(x - mean) / scale`, per column.
///
/// Accepts both `mean`/`scale` and the fitted-attribute spellings
/// `mean_`/`scale_` when deserialised.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    #[serde(alias = "mean_")]
    mean: Vec<f64>,
    #[serde(alias = "scale_")]
    scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, ArtifactError> {
        let scaler = Self { mean, scale };
        scaler.validate()?;
        Ok(scaler)
    }

    pub(crate) fn validate(&self) -> Result<(), ArtifactError> {
        let invalid = |reason: String| ArtifactError::Invalid {
            kind: "scaler",
            reason,
        };

        if self.mean.is_empty() {
            return Err(invalid("no features".into()));
        }
        if self.mean.len() != self.scale.len() {
            return Err(invalid(format!(
                "{} means but {} scales",
                self.mean.len(),
                self.scale.len()
            )));
        }
        if let Some(i) = self
            .mean
            .iter()
            .chain(self.scale.iter())
            .position(|v| !v.is_finite())
        {
            return Err(invalid(format!("non-finite parameter at index {i}")));
        }
        Ok(())
    }
}

impl Scaler for StandardScaler {
    fn n_features(&self) -> usize {
        self.mean.len()
    }

    fn transform(&self, table: &FeatureTable) -> Result<FeatureTable, ClassifyError> {
        if table.column_count() != self.n_features() {
            return Err(ClassifyError::ShapeMismatch {
                expected: self.n_features(),
                actual: table.column_count(),
            });
        }

        let rows = table
            .rows()
            .iter()
            .map(|row| {
                row.iter()
                    .zip(self.mean.iter().zip(self.scale.iter()))
                    .map(|(x, (mean, scale))| {
                        // A constant column is fitted with zero variance.
                        let scale = if *scale == 0.0 { 1.0 } else { *scale };
                        (x - mean) / scale
                    })
                    .collect()
            })
            .collect();

        FeatureTable::new(self.n_features(), rows).map_err(|e| ClassifyError::Inference(e.to_string()))
    }
}
