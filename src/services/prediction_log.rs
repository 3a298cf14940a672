use metrics::counter;
use sqlx::PgPool;
use tokio::task::JoinHandle;

use crate::db::prediction_repo;
use crate::models::PredictionRecord;

/// Best-effort append-only log of successful classifications.
///
/// Writes run on their own task. Failures are logged and counted but never
/// reach the request that produced the record.
#[derive(Debug, Clone)]
pub struct PredictionLog {
    pool: PgPool,
}

impl PredictionLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn record_detached(&self, record: PredictionRecord) -> JoinHandle<()> {
        let pool = self.pool.clone();
        tokio::spawn(async move {
            match prediction_repo::insert_prediction(&pool, &record).await {
                Ok(()) => {
                    tracing::debug!(id = %record.id, user = %record.user_id, "Prediction logged");
                }
                Err(e) => {
                    counter!("prediction_log_failures_total").increment(1);
                    tracing::warn!(
                        error = %e,
                        id = %record.id,
                        user = %record.user_id,
                        "Failed to log prediction"
                    );
                }
            }
        })
    }
}
