use std::time::Instant;

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::Json;
use metrics::{counter, histogram};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::{FeatureTable, Prediction, PredictionRecord};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub predictions: Vec<Prediction>,
}

struct UploadForm {
    /// `None` when no part named `file` carried a filename.
    file: Option<(String, Bytes)>,
    user: Option<String>,
}

async fn read_form(multipart: &mut Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm {
        file: None,
        user: None,
    };

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                // A part without a filename is a plain form value, not an upload.
                let Some(filename) = field.file_name().map(str::to_owned) else {
                    continue;
                };
                let bytes = field.bytes().await?;
                form.file = Some((filename, bytes));
            }
            Some("user") => {
                form.user = Some(field.text().await?);
            }
            _ => {}
        }
    }

    Ok(form)
}

/// POST /upload: classify every row of an uploaded CSV.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    counter!("upload_requests_total").increment(1);

    let result = classify_upload(&state, &mut multipart).await;
    if let Err(e) = &result {
        counter!("upload_rejections_total", "reason" => e.kind()).increment(1);
        tracing::warn!(error = %e, "Upload rejected");
    }
    result.map(Json)
}

async fn classify_upload(
    state: &AppState,
    multipart: &mut Multipart,
) -> Result<UploadResponse, AppError> {
    let form = read_form(multipart).await?;

    let Some((filename, bytes)) = form.file else {
        return Err(AppError::BadRequest("No file provided".into()));
    };
    if filename.is_empty() {
        return Err(AppError::BadRequest("No selected file".into()));
    }
    if bytes.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".into()));
    }

    let user = form
        .user
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| "Unknown".into());

    let table = FeatureTable::from_csv(&bytes)?;
    tracing::info!(
        user = %user,
        filename = %filename,
        rows = table.row_count(),
        columns = table.column_count(),
        "File upload received"
    );

    let started = Instant::now();
    let predictions = state.classifier.classify(&table)?;
    histogram!("classify_latency_seconds").record(started.elapsed().as_secs_f64());

    for prediction in &predictions {
        counter!("predictions_total", "label" => prediction.as_str()).increment(1);
    }
    tracing::info!(
        user = %user,
        seizures = predictions.iter().filter(|p| p.is_seizure()).count(),
        total = predictions.len(),
        "Prediction complete"
    );

    if let Some(log) = &state.prediction_log {
        log.record_detached(PredictionRecord::new(user, &table, &predictions));
    }

    Ok(UploadResponse { predictions })
}
