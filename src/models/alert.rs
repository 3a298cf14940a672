use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

fn default_user() -> String {
    "Unknown".into()
}

/// An explicit `null` user is treated like an absent one.
fn user_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_user))
}

/// Emergency event posted by a wearer's device.
///
/// Coordinates are kept as raw JSON so that strings, numbers and nulls all
/// pass through to the location link untouched.
#[derive(Clone, Deserialize)]
pub struct EmergencyEvent {
    #[serde(default = "default_user", deserialize_with = "user_or_default")]
    pub user: String,
    #[serde(default)]
    pub lat: Option<Value>,
    #[serde(default)]
    pub lon: Option<Value>,

    // Email addressing, supplied per request
    #[serde(default)]
    pub doctor_email: Option<String>,
    #[serde(default)]
    pub sender_email: Option<String>,
    #[serde(default)]
    pub sender_password: Option<String>,
}

impl Default for EmergencyEvent {
    fn default() -> Self {
        Self {
            user: default_user(),
            lat: None,
            lon: None,
            doctor_email: None,
            sender_email: None,
            sender_password: None,
        }
    }
}

impl fmt::Debug for EmergencyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmergencyEvent")
            .field("user", &self.user)
            .field("lat", &self.lat)
            .field("lon", &self.lon)
            .field("doctor_email", &self.doctor_email)
            .field("sender_email", &self.sender_email)
            .field(
                "sender_password",
                &self.sender_password.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Result of a single delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Delivered { detail: String },
    Failed { detail: String },
}

impl DeliveryOutcome {
    pub fn delivered(detail: impl Into<String>) -> Self {
        DeliveryOutcome::Delivered { detail: detail.into() }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        DeliveryOutcome::Failed { detail: detail.into() }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered { .. })
    }

    pub fn detail(&self) -> &str {
        match self {
            DeliveryOutcome::Delivered { detail } | DeliveryOutcome::Failed { detail } => detail,
        }
    }
}
