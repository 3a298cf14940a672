pub mod alert;
pub mod prediction;
pub mod table;

pub use alert::{DeliveryOutcome, EmergencyEvent};
pub use prediction::{Prediction, PredictionRecord, SEIZURE_LABEL};
pub use table::{FeatureTable, TableError};
