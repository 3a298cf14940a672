use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::inference::ClassifyError;
use crate::models::TableError;
use crate::services::DispatchError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("Expected {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("{0}")]
    DataFormat(String),

    #[error("{0}")]
    MissingCredentials(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Short machine-friendly tag, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "bad_request",
            AppError::PayloadTooLarge(_) => "payload_too_large",
            AppError::ShapeMismatch { .. } => "shape_mismatch",
            AppError::DataFormat(_) => "data_format",
            AppError::MissingCredentials(_) => "missing_credentials",
            AppError::Internal(_) => "internal",
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) | AppError::ShapeMismatch { .. } | AppError::DataFormat(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::MissingCredentials(msg) => {
                tracing::error!(missing = %msg, "Alert transport is not configured");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<ClassifyError> for AppError {
    fn from(e: ClassifyError) -> Self {
        match e {
            ClassifyError::ShapeMismatch { expected, actual } => {
                AppError::ShapeMismatch { expected, actual }
            }
            ClassifyError::NonFinite { .. } => AppError::DataFormat(e.to_string()),
            other => AppError::Internal(other.into()),
        }
    }
}

impl From<TableError> for AppError {
    fn from(e: TableError) -> Self {
        AppError::DataFormat(e.to_string())
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        match e.status() {
            StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge(e.body_text()),
            _ => AppError::BadRequest(e.body_text()),
        }
    }
}

impl From<DispatchError> for AppError {
    fn from(e: DispatchError) -> Self {
        match e {
            DispatchError::MissingCredentials(_) => AppError::MissingCredentials(e.to_string()),
            DispatchError::TransportFailure(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}
