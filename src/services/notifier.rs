//! Buyer notification. Delivery failures are reported, never raised.

use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::SmtpConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyOutcome {
    pub success: bool,
    pub error: Option<String>,
}

impl NotifyOutcome {
    pub fn delivered() -> Self {
        Self { success: true, error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, recipient: &str, subject: &str, html_body: &str, text_body: &str) -> NotifyOutcome;
}

/// Used when SMTP is disabled: records the message in the log.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, recipient: &str, subject: &str, _html_body: &str, _text_body: &str) -> NotifyOutcome {
        tracing::info!(to = %recipient, subject = %subject, "SMTP disabled, notification logged only");
        NotifyOutcome::delivered()
    }
}

pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    attempts: u32,
    backoff: Duration,
}

impl SmtpNotifier {
    pub const ATTEMPTS: u32 = 3;

    pub fn new(config: &SmtpConfig) -> Result<Self, String> {
        let creds = Credentials::new(config.user.clone(), config.password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| format!("Failed to create SMTP relay: {e}"))?
            .port(config.port)
            .credentials(creds)
            .build();

        let from: Mailbox = format!("{} <{}>", config.from_name, config.from_email)
            .parse()
            .map_err(|e| format!("Invalid from address: {e}"))?;

        Ok(Self {
            transport,
            from,
            attempts: Self::ATTEMPTS,
            backoff: Duration::from_millis(500),
        })
    }

    fn build(&self, recipient: &str, subject: &str, html_body: &str, text_body: &str) -> Result<Message, String> {
        let to: Mailbox = recipient
            .parse()
            .map_err(|e| format!("Invalid recipient: {e}"))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )
            .map_err(|e| format!("Failed to build message: {e}"))
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, recipient: &str, subject: &str, html_body: &str, text_body: &str) -> NotifyOutcome {
        let message = match self.build(recipient, subject, html_body, text_body) {
            Ok(m) => m,
            Err(e) => return NotifyOutcome::failed(e),
        };

        let mut last_error = String::new();
        for attempt in 1..=self.attempts {
            match self.transport.send(message.clone()).await {
                Ok(_) => {
                    tracing::info!(to = %recipient, subject = %subject, attempt, "Email sent");
                    return NotifyOutcome::delivered();
                }
                Err(e) => {
                    tracing::warn!(to = %recipient, attempt, error = %e, "Email attempt failed");
                    last_error = e.to_string();
                    if attempt < self.attempts {
                        tokio::time::sleep(self.backoff * attempt).await;
                    }
                }
            }
        }

        NotifyOutcome::failed(format!(
            "Failed to send email after {} attempts: {last_error}",
            self.attempts
        ))
    }
}
