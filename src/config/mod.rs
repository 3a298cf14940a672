use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_TWILIO_API_BASE: &str = "https://api.twilio.com";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Which notification channel this deployment uses for emergency alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Email,
    Sms,
}

impl TransportKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "email" | "smtp" => Some(TransportKind::Email),
            "sms" | "twilio" => Some(TransportKind::Sms),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransportKind::Email => "email",
            TransportKind::Sms => "sms",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,

    // Pre-trained artifacts, loaded once before the listener binds
    pub scaler_path: PathBuf,
    pub model_path: PathBuf,
    pub max_upload_bytes: usize,

    // Prediction log (optional, disabled when unset)
    pub database_url: Option<String>,

    // Alerting
    pub alert_transport: TransportKind,
    pub alert_timeout: Duration,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub default_sender_email: Option<String>,
    pub default_sender_password: Option<String>,

    // Twilio credentials (required only for the SMS transport)
    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    pub twilio_from_number: Option<String>,
    pub twilio_to_number: Option<String>,
    pub twilio_api_base: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let transport_raw = get("ALERT_TRANSPORT").unwrap_or_else(|| "email".into());
        let alert_transport = TransportKind::parse(&transport_raw).ok_or_else(|| {
            anyhow::anyhow!("ALERT_TRANSPORT must be 'email' or 'sms', got '{transport_raw}'")
        })?;

        let timeout_secs: u64 = get("ALERT_TIMEOUT_SECS")
            .unwrap_or_else(|| "5".into())
            .parse()
            .map_err(|e| anyhow::anyhow!("ALERT_TIMEOUT_SECS is not a number: {e}"))?;

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: get("PORT")
                .unwrap_or_else(|| "5000".into())
                .parse()
                .map_err(|e| anyhow::anyhow!("PORT is not a valid port: {e}"))?,

            scaler_path: get("SCALER_PATH")
                .unwrap_or_else(|| "artifacts/scaler.json".into())
                .into(),
            model_path: get("MODEL_PATH")
                .unwrap_or_else(|| "artifacts/model.json".into())
                .into(),
            max_upload_bytes: match get("MAX_UPLOAD_BYTES") {
                Some(raw) => raw
                    .parse()
                    .map_err(|e| anyhow::anyhow!("MAX_UPLOAD_BYTES is not a number: {e}"))?,
                None => DEFAULT_MAX_UPLOAD_BYTES,
            },

            database_url: get("DATABASE_URL"),

            alert_transport,
            alert_timeout: Duration::from_secs(timeout_secs),
            smtp_host: get("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.into()),
            smtp_port: get("SMTP_PORT")
                .unwrap_or_else(|| "587".into())
                .parse()
                .map_err(|e| anyhow::anyhow!("SMTP_PORT is not a valid port: {e}"))?,
            default_sender_email: get("ALERT_SENDER_EMAIL"),
            default_sender_password: get("ALERT_SENDER_PASSWORD"),

            twilio_account_sid: get("TWILIO_ACCOUNT_SID"),
            twilio_auth_token: get("TWILIO_AUTH_TOKEN"),
            twilio_from_number: get("TWILIO_FROM_NUMBER"),
            twilio_to_number: get("TWILIO_TO_NUMBER"),
            twilio_api_base: get("TWILIO_API_BASE")
                .unwrap_or_else(|| DEFAULT_TWILIO_API_BASE.into()),
        })
    }

    /// Returns true if all Twilio credentials and both phone numbers are configured.
    pub fn has_twilio_auth(&self) -> bool {
        self.twilio_account_sid.is_some()
            && self.twilio_auth_token.is_some()
            && self.twilio_from_number.is_some()
            && self.twilio_to_number.is_some()
    }
}
