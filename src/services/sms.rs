use std::fmt;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use super::dispatcher::{AlertMessage, DispatchError};
use crate::config::AppConfig;

const TWILIO_API_BASE: &str = "https://api.twilio.com";

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: Option<String>,
}

/// Account credentials and numbers for one SMS send.
pub struct SmsRoute<'a> {
    account_sid: &'a str,
    auth_token: &'a str,
    pub from: &'a str,
    pub to: &'a str,
}

/// Twilio Programmable Messaging client. Credentials come from server
/// configuration only, never from the request.
#[derive(Clone)]
pub struct SmsTransport {
    http: Client,
    base_url: String,
    account_sid: Option<String>,
    auth_token: Option<String>,
    from_number: Option<String>,
    to_number: Option<String>,
}

impl fmt::Debug for SmsTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmsTransport")
            .field("base_url", &self.base_url)
            .field("account_sid", &self.account_sid)
            .field("from_number", &self.from_number)
            .field("to_number", &self.to_number)
            .finish_non_exhaustive()
    }
}

impl SmsTransport {
    pub fn new(
        http: Client,
        account_sid: Option<String>,
        auth_token: Option<String>,
        from_number: Option<String>,
        to_number: Option<String>,
    ) -> Self {
        Self {
            http,
            base_url: TWILIO_API_BASE.into(),
            account_sid,
            auth_token,
            from_number,
            to_number,
        }
    }

    pub fn from_config(http: Client, config: &AppConfig) -> Self {
        Self::new(
            http,
            config.twilio_account_sid.clone(),
            config.twilio_auth_token.clone(),
            config.twilio_from_number.clone(),
            config.twilio_to_number.clone(),
        )
        .with_base_url(config.twilio_api_base.clone())
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Check every credential is configured before any request is made.
    pub fn route(&self) -> Result<SmsRoute<'_>, DispatchError> {
        match (
            self.account_sid.as_deref(),
            self.auth_token.as_deref(),
            self.from_number.as_deref(),
            self.to_number.as_deref(),
        ) {
            (Some(account_sid), Some(auth_token), Some(from), Some(to)) => Ok(SmsRoute {
                account_sid,
                auth_token,
                from,
                to,
            }),
            (sid, token, from, to) => {
                let missing: Vec<&str> = [
                    ("TWILIO_ACCOUNT_SID", sid.is_none()),
                    ("TWILIO_AUTH_TOKEN", token.is_none()),
                    ("TWILIO_FROM_NUMBER", from.is_none()),
                    ("TWILIO_TO_NUMBER", to.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
                Err(DispatchError::MissingCredentials(missing.join(", ")))
            }
        }
    }

    pub async fn send(
        &self,
        route: &SmsRoute<'_>,
        message: &AlertMessage,
        timeout: Duration,
    ) -> Result<String, DispatchError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, route.account_sid
        );

        let resp = self
            .http
            .post(&url)
            .basic_auth(route.account_sid, Some(route.auth_token))
            .form(&[
                ("To", route.to),
                ("From", route.from),
                ("Body", message.body.as_str()),
            ])
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| DispatchError::TransportFailure(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DispatchError::TransportFailure(format!(
                "SMS provider returned {status}: {body}"
            )));
        }

        let resource: Option<MessageResource> = resp.json().await.ok();
        match resource.and_then(|r| r.sid) {
            Some(sid) => Ok(format!("SMS sent to {} (sid {sid})", route.to)),
            None => Ok(format!("SMS sent to {}", route.to)),
        }
    }
}
