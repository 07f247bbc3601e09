//! Webhook notification delivery.
//!
//! [`WebhookNotifier`] POSTs a JSON-encoded [`Notification`] to a fixed URL.
//! Each notification gets a single attempt; a failure is reported to the
//! caller, which records it against the alert.

use std::time::Duration;

use async_trait::async_trait;

use super::{Notification, Notifier, NotifyError};

/// HTTP request timeout for a delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivers notifications to an external webhook endpoint.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    /// Create a notifier posting to `url`.
    pub fn new(url: impl Into<String>) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .json(notification)
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            tracing::warn!(
                url = %self.url,
                alert_id = notification.alert_id,
                status,
                "Webhook rejected notification",
            );
            return Err(NotifyError::HttpStatus(status));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
