use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::config::AppConfig;

#[derive(Debug, Clone, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Outbound email. Delivery is fire-and-forget from the booking engine's
/// point of view: a failed send never overturns a committed booking.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    async fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Posts messages to an HTTP mail relay.
pub struct MailRelayNotifier {
    client: Client,
    endpoint: String,
    from: String,
}

impl MailRelayNotifier {
    pub fn new(config: &AppConfig, endpoint: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.mail_timeout_secs))
            .build()
            .context("failed to build mail relay client")?;
        Ok(Self {
            client,
            endpoint,
            from: config.mail_from.clone(),
        })
    }
}

#[derive(Serialize)]
struct RelayPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

#[async_trait]
impl Notifier for MailRelayNotifier {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&RelayPayload {
                from: &self.from,
                to: &message.to,
                subject: &message.subject,
                body: &message.body,
            })
            .send()
            .await
            .context("mail relay request failed")?;

        response
            .error_for_status()
            .context("mail relay rejected message")?;
        Ok(())
    }
}

/// Used when no relay endpoint is configured; drops messages with a log line.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        tracing::info!(to = %message.to, subject = %message.subject, "mail relay not configured; dropping notification");
        Ok(())
    }
}

pub fn build_notifier(config: &AppConfig) -> Result<Arc<dyn Notifier>> {
    match &config.mail_relay_endpoint {
        Some(endpoint) => Ok(Arc::new(MailRelayNotifier::new(config, endpoint.clone())?)),
        None => Ok(Arc::new(NoopNotifier)),
    }
}

/// Sends in the background. Failures are surfaced as warnings, distinct from
/// the booking outcome the caller already committed.
pub fn send_in_background(notifier: Arc<dyn Notifier>, message: EmailMessage) {
    tokio::spawn(async move {
        if let Err(err) = notifier.send(&message).await {
            tracing::warn!(to = %message.to, subject = %message.subject, error = %err, "failed to send notification email");
        }
    });
}
