use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use super::email::EmailTransport;
use super::sms::SmsTransport;
use crate::config::{AppConfig, TransportKind};
use crate::models::{DeliveryOutcome, EmergencyEvent};

const MAPS_BASE: &str = "https://www.google.com/maps";

#[derive(Debug, Error)]
pub enum DispatchError {
    /// The transport is not configured; no network call was attempted.
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("{0}")]
    TransportFailure(String),
}

/// Rendered alert text shared by every transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub subject: String,
    pub body: String,
    pub maps_link: String,
}

impl AlertMessage {
    pub fn for_event(event: &EmergencyEvent) -> Self {
        let maps_link = maps_link(event.lat.as_ref(), event.lon.as_ref());
        Self {
            subject: format_alert_subject(&event.user),
            body: format_alert_body(&event.user, &maps_link),
            maps_link,
        }
    }
}

/// Coordinates are embedded as-is: numbers in their JSON form, strings
/// unquoted, null or absent as empty text.
fn coordinate_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

pub fn maps_link(lat: Option<&Value>, lon: Option<&Value>) -> String {
    format!(
        "{MAPS_BASE}?q={},{}",
        coordinate_text(lat),
        coordinate_text(lon)
    )
}

pub fn format_alert_subject(user: &str) -> String {
    format!("🚨 Seizure Alert for {user}")
}

pub fn format_alert_body(user: &str, maps_link: &str) -> String {
    format!("{user} has had a seizure.\n\nLive location: {maps_link}")
}

#[derive(Debug, Clone)]
pub enum AlertTransport {
    Email(EmailTransport),
    Sms(SmsTransport),
}

impl AlertTransport {
    pub fn kind(&self) -> TransportKind {
        match self {
            AlertTransport::Email(_) => TransportKind::Email,
            AlertTransport::Sms(_) => TransportKind::Sms,
        }
    }
}

/// Sends emergency notifications over the one transport this deployment uses.
///
/// Delivery is best-effort: transport errors and timeouts become a
/// `Failed` outcome. Only missing credentials surface as an error.
#[derive(Debug, Clone)]
pub struct AlertDispatcher {
    transport: AlertTransport,
    timeout: Duration,
}

impl AlertDispatcher {
    pub fn new(transport: AlertTransport, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let transport = match config.alert_transport {
            TransportKind::Email => AlertTransport::Email(EmailTransport::new(
                config.smtp_host.clone(),
                config.smtp_port,
                config.default_sender_email.clone(),
                config.default_sender_password.clone(),
            )),
            TransportKind::Sms => {
                AlertTransport::Sms(SmsTransport::from_config(reqwest::Client::new(), config))
            }
        };
        Self::new(transport, config.alert_timeout)
    }

    pub fn kind(&self) -> TransportKind {
        self.transport.kind()
    }

    pub async fn notify(&self, event: &EmergencyEvent) -> Result<DeliveryOutcome, DispatchError> {
        let message = &AlertMessage::for_event(event);
        let attempt = match &self.transport {
            AlertTransport::Email(email) => match email.envelope(event) {
                Ok(envelope) => {
                    tracing::info!(recipient = %envelope.recipient, "Sending email alert");
                    tokio::time::timeout(self.timeout, email.send(&envelope, message, self.timeout))
                        .await
                }
                Err(e @ DispatchError::MissingCredentials(_)) => return Err(e),
                Err(e) => Ok(Err(e)),
            },
            AlertTransport::Sms(sms) => {
                let route = sms.route()?;
                tracing::info!(to = %route.to, "Sending SMS alert");
                tokio::time::timeout(self.timeout, sms.send(&route, message, self.timeout)).await
            }
        };

        let outcome = match attempt {
            Ok(Ok(detail)) => DeliveryOutcome::delivered(detail),
            Ok(Err(DispatchError::TransportFailure(detail))) => DeliveryOutcome::failed(detail),
            Ok(Err(e @ DispatchError::MissingCredentials(_))) => return Err(e),
            Err(_) => DeliveryOutcome::failed(format!(
                "delivery timed out after {}s",
                self.timeout.as_secs_f64()
            )),
        };

        if outcome.is_delivered() {
            tracing::info!(user = %event.user, detail = outcome.detail(), "Alert delivered");
        } else {
            tracing::warn!(user = %event.user, detail = outcome.detail(), "Alert delivery failed");
        }

        Ok(outcome)
    }
}
