use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::FeatureTable;

/// Raw classifier label meaning "seizure detected".
pub const SEIZURE_LABEL: i64 = 1;

/// Display label returned to callers for one classified row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Prediction {
    #[serde(rename = "Seizure Detected")]
    SeizureDetected,
    #[serde(rename = "No Seizure Detected")]
    NoSeizureDetected,
}

impl Prediction {
    /// Only `1` maps to a detection; every other label (0, -1, 2, ...) is negative.
    pub fn from_label(label: i64) -> Self {
        if label == SEIZURE_LABEL {
            Prediction::SeizureDetected
        } else {
            Prediction::NoSeizureDetected
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Prediction::SeizureDetected => "Seizure Detected",
            Prediction::NoSeizureDetected => "No Seizure Detected",
        }
    }

    pub fn is_seizure(&self) -> bool {
        matches!(self, Prediction::SeizureDetected)
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One appended row in the prediction log.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub user_id: String,
    pub input: serde_json::Value,
    /// The single label for a one-row upload, otherwise the JSON list of labels.
    pub prediction: String,
}

impl PredictionRecord {
    pub fn new(user_id: impl Into<String>, table: &FeatureTable, predictions: &[Prediction]) -> Self {
        let prediction = match predictions {
            [single] => single.as_str().to_string(),
            many => serde_json::to_string(many).unwrap_or_default(),
        };

        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            user_id: user_id.into(),
            input: serde_json::json!(table.rows()),
            prediction,
        }
    }
}
