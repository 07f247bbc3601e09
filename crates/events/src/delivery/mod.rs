//! Outbound notification channels.
//!
//! The alert engine talks to a [`Notifier`] so tests and deployments without
//! a webhook can swap in [`LogNotifier`].

pub mod webhook;

use async_trait::async_trait;
use gpuwatch_core::types::DbId;
use serde::Serialize;

/// Body posted to a notification channel for one alert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub channel: String,
    pub text: String,
    pub alert_id: DbId,
    pub node_id: String,
    pub gpu_index: i32,
}

/// Error type for notification delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Notification endpoint returned HTTP {0}")]
    HttpStatus(u16),
}

/// Sends a notification to an external channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Notifier that only writes the notification to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(
            channel = %notification.channel,
            alert_id = notification.alert_id,
            node_id = %notification.node_id,
            gpu_index = notification.gpu_index,
            text = %notification.text,
            "Notification sent",
        );
        Ok(())
    }
}
