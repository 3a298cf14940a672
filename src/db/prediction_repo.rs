use sqlx::PgPool;

use crate::models::PredictionRecord;

/// Append one classification to the prediction log.
pub async fn insert_prediction(pool: &PgPool, record: &PredictionRecord) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO predictions (id, created_at, user_id, input, prediction)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(record.id)
    .bind(record.created_at)
    .bind(&record.user_id)
    .bind(&record.input)
    .bind(&record.prediction)
    .execute(pool)
    .await?;

    Ok(())
}
