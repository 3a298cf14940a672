use std::sync::Arc;

use super::{ArtifactError, Classifier, ClassifyError, Scaler};
use crate::models::{FeatureTable, Prediction};

/// Reference row with normal vitals, classified once at startup.
pub const REFERENCE_NORMAL_ROW: [f64; 4] = [60.0, 36.5, 98.0, 0.1];

/// Owns the loaded scaler and classifier for the lifetime of the process.
///
/// Both artifacts are read-only after construction, so one instance is shared
/// across all request handlers without locking.
#[derive(Clone)]
pub struct ClassificationService {
    scaler: Arc<dyn Scaler>,
    classifier: Arc<dyn Classifier>,
}

impl ClassificationService {
    pub fn new(
        scaler: Arc<dyn Scaler>,
        classifier: Arc<dyn Classifier>,
    ) -> Result<Self, ArtifactError> {
        if scaler.n_features() != classifier.n_features() {
            return Err(ArtifactError::WidthMismatch {
                scaler: scaler.n_features(),
                model: classifier.n_features(),
            });
        }
        Ok(Self { scaler, classifier })
    }

    /// Column count every uploaded table must have.
    pub fn expected_features(&self) -> usize {
        self.scaler.n_features()
    }

    /// Classify every row of `table`, preserving row order.
    ///
    /// The width check runs before the scaler sees the table. An empty table
    /// yields an empty result without touching either artifact.
    pub fn classify(&self, table: &FeatureTable) -> Result<Vec<Prediction>, ClassifyError> {
        let expected = self.expected_features();
        if table.column_count() != expected {
            return Err(ClassifyError::ShapeMismatch {
                expected,
                actual: table.column_count(),
            });
        }

        if table.is_empty() {
            return Ok(Vec::new());
        }

        for (row, values) in table.rows().iter().enumerate() {
            if let Some(column) = values.iter().position(|v| !v.is_finite()) {
                return Err(ClassifyError::NonFinite { row, column });
            }
        }

        let scaled = self.scaler.transform(table)?;
        let labels = self.classifier.predict(&scaled)?;

        if labels.len() != table.row_count() {
            return Err(ClassifyError::LabelCount {
                rows: table.row_count(),
                labels: labels.len(),
            });
        }

        Ok(labels.into_iter().map(Prediction::from_label).collect())
    }

    /// Classify the reference normal-vitals row, if the model takes four features.
    pub fn self_check(&self) -> Option<Result<Vec<Prediction>, ClassifyError>> {
        if self.expected_features() != REFERENCE_NORMAL_ROW.len() {
            return None;
        }
        let table = FeatureTable::from_rows(vec![REFERENCE_NORMAL_ROW.to_vec()]).ok()?;
        Some(self.classify(&table))
    }
}
