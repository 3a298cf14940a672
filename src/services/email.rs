use std::fmt;
use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::dispatcher::{AlertMessage, DispatchError};
use crate::models::EmergencyEvent;

/// Resolved addressing for one email alert.
pub struct EmailEnvelope {
    pub recipient: String,
    pub sender: String,
    password: String,
}

/// SMTP delivery with STARTTLS. Addressing comes from the request, with
/// server-side sender defaults filling any gap.
#[derive(Clone)]
pub struct EmailTransport {
    smtp_host: String,
    smtp_port: u16,
    default_sender: Option<String>,
    default_password: Option<String>,
}

impl fmt::Debug for EmailTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailTransport")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("default_sender", &self.default_sender)
            .finish_non_exhaustive()
    }
}

impl EmailTransport {
    pub fn new(
        smtp_host: String,
        smtp_port: u16,
        default_sender: Option<String>,
        default_password: Option<String>,
    ) -> Self {
        Self {
            smtp_host,
            smtp_port,
            default_sender,
            default_password,
        }
    }

    /// Pick recipient, sender and password for `event`. Fails without any
    /// network activity when one of them is missing. Only an unresolved
    /// sender or password counts as missing credentials; a missing
    /// recipient is a failed delivery.
    pub fn envelope(&self, event: &EmergencyEvent) -> Result<EmailEnvelope, DispatchError> {
        fn present(value: &Option<String>) -> Option<String> {
            value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
        }

        let sender = present(&event.sender_email).or_else(|| present(&self.default_sender));
        let password =
            present(&event.sender_password).or_else(|| present(&self.default_password));

        let (sender, password) = match (sender, password) {
            (Some(sender), Some(password)) => (sender, password),
            (sender, password) => {
                let missing: Vec<&str> = [
                    ("sender_email", sender.is_none()),
                    ("sender_password", password.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
                return Err(DispatchError::MissingCredentials(missing.join(", ")));
            }
        };

        let recipient = present(&event.doctor_email).ok_or_else(|| {
            DispatchError::TransportFailure("no recipient (doctor_email)".into())
        })?;

        Ok(EmailEnvelope {
            recipient,
            sender,
            password,
        })
    }

    pub async fn send(
        &self,
        envelope: &EmailEnvelope,
        message: &AlertMessage,
        timeout: Duration,
    ) -> Result<String, DispatchError> {
        let failure = |e: &dyn fmt::Display| DispatchError::TransportFailure(e.to_string());

        let from: Mailbox = envelope
            .sender
            .parse()
            .map_err(|e| DispatchError::TransportFailure(format!("invalid sender address: {e}")))?;
        let to: Mailbox = envelope
            .recipient
            .parse()
            .map_err(|e| DispatchError::TransportFailure(format!("invalid recipient address: {e}")))?;

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|e| failure(&e))?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.smtp_host)
            .map_err(|e| failure(&e))?
            .port(self.smtp_port)
            .credentials(Credentials::new(
                envelope.sender.clone(),
                envelope.password.clone(),
            ))
            .timeout(Some(timeout))
            .build();

        mailer.send(email).await.map_err(|e| failure(&e))?;

        Ok(format!("Email sent to {}", envelope.recipient))
    }
}
