use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let prediction_log = match &state.prediction_log {
        Some(log) => {
            if sqlx::query("SELECT 1").execute(log.pool()).await.is_ok() {
                "connected"
            } else {
                "disconnected"
            }
        }
        None => "disabled",
    };

    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "expected_features": state.classifier.expected_features(),
            "transport": state.dispatcher.kind().as_str(),
            "prediction_log": prediction_log,
        })),
    )
}
