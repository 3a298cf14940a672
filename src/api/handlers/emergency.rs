use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::Local;
use metrics::counter;
use serde::Serialize;
use serde_json::Value;

use crate::errors::AppError;
use crate::models::{DeliveryOutcome, EmergencyEvent};
use crate::services::dispatcher::maps_link;
use crate::AppState;

const RECEIVED: &str = "Emergency Received";

#[derive(Debug, Serialize)]
pub struct Location {
    pub lat: Option<Value>,
    pub lon: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct EmergencyResponse {
    pub status: &'static str,
    pub location: Location,
    pub time: String,
    pub maps_link: String,
    pub delivery: DeliveryOutcome,
}

/// POST /emergency: accept an emergency event and attempt to notify.
///
/// The event counts as received even when delivery fails; the outcome is
/// reported in `delivery`. Only an unconfigured transport is an error.
pub async fn emergency(
    State(state): State<AppState>,
    payload: Result<Json<EmergencyEvent>, JsonRejection>,
) -> Result<Json<EmergencyResponse>, AppError> {
    let Json(event) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    counter!("alerts_received_total").increment(1);

    let time = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let link = maps_link(event.lat.as_ref(), event.lon.as_ref());

    tracing::warn!(
        user = %event.user,
        lat = ?event.lat,
        lon = ?event.lon,
        doctor_email = ?event.doctor_email,
        transport = %state.dispatcher.kind(),
        time = %time,
        maps_link = %link,
        "Emergency alert received"
    );

    let delivery = state.dispatcher.notify(&event).await?;
    if delivery.is_delivered() {
        counter!("alerts_delivered_total").increment(1);
    } else {
        counter!("alerts_failed_total").increment(1);
    }

    Ok(Json(EmergencyResponse {
        status: RECEIVED,
        location: Location {
            lat: event.lat,
            lon: event.lon,
        },
        time,
        maps_link: link,
        delivery,
    }))
}
