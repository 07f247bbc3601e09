//! Action Dispatcher: turns a freshly created alert into a remediation.
//!
//! Critical alerts mark the node degraded (workload migration); warnings send
//! a notification. The side effect always runs before the action record is
//! written, and its outcome is what the record's `action_status` reports.

use std::sync::Arc;

use gpuwatch_core::action::{self, ActionPolicy, ActionStatus};
use gpuwatch_core::alert::{Severity, UnknownSeverity};
use gpuwatch_core::node::NodeStatus;
use gpuwatch_db::models::alert::Alert;
use gpuwatch_db::models::alert_action::{AlertAction, CreateAlertAction};
use gpuwatch_events::{Notification, Notifier};

use crate::gateway::{GatewayError, PersistenceGateway};

/// Default channel name for notification actions.
pub const DEFAULT_NOTIFY_CHANNEL: &str = "slack";

/// Error type for dispatch failures.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The alert carries a severity with no action policy. This is a code
    /// mismatch between rule evaluation and dispatch, not an environment issue.
    #[error("No action defined for severity '{0}'")]
    UnhandledSeverity(String),

    /// The action ran but its record could not be written.
    #[error("Failed to record action: {0}")]
    Gateway(#[from] GatewayError),
}

impl DispatchError {
    /// Value of the `error_kind` log field for this error.
    pub fn error_kind(&self) -> &'static str {
        match self {
            DispatchError::UnhandledSeverity(_) => "contract",
            DispatchError::Gateway(e) => e.error_kind(),
        }
    }
}

/// Maps alert severity to an action, executes it, and records the outcome.
#[derive(Clone)]
pub struct ActionDispatcher {
    gateway: Arc<dyn PersistenceGateway>,
    notifier: Arc<dyn Notifier>,
    channel: String,
}

impl ActionDispatcher {
    pub fn new(
        gateway: Arc<dyn PersistenceGateway>,
        notifier: Arc<dyn Notifier>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            notifier,
            channel: channel.into(),
        }
    }

    /// Execute and record the action for `alert`.
    ///
    /// Exactly one action record is written per call unless the severity is
    /// unhandled (nothing runs, nothing is written) or the record insert
    /// itself fails. Neither case is retried.
    pub async fn dispatch(&self, alert: &Alert) -> Result<AlertAction, DispatchError> {
        let severity: Severity = alert
            .severity
            .parse()
            .map_err(|UnknownSeverity(raw)| DispatchError::UnhandledSeverity(raw))?;
        let policy = ActionPolicy::for_severity(severity);

        let (status, details) = match policy {
            ActionPolicy::MigrateWorkloads => self.migrate_workloads(alert).await,
            ActionPolicy::Notify => self.notify(alert).await,
        };

        let input = CreateAlertAction {
            alert_id: alert.id,
            action_type: policy.action_type(),
            action_status: status,
            action_details: details,
        };

        match self.gateway.record_action(&input).await {
            Ok(record) => {
                tracing::info!(
                    alert_id = alert.id,
                    action_id = record.id,
                    action_type = %input.action_type,
                    action_status = %status,
                    "Recorded alert action",
                );
                Ok(record)
            }
            Err(e) => {
                // The side effect has already happened; this is a bookkeeping gap.
                tracing::error!(
                    alert_id = alert.id,
                    action_type = %input.action_type,
                    action_status = %status,
                    error_kind = e.error_kind(),
                    error = %e,
                    "Failed to record alert action",
                );
                Err(e.into())
            }
        }
    }

    async fn migrate_workloads(&self, alert: &Alert) -> (ActionStatus, serde_json::Value) {
        let details = action::migration_details(&alert.node_id, alert.gpu_index, &alert.message);
        let status = match self
            .gateway
            .set_node_status(&alert.node_id, NodeStatus::Degraded)
            .await
        {
            Ok(()) => {
                tracing::warn!(
                    alert_id = alert.id,
                    node_id = %alert.node_id,
                    gpu_index = alert.gpu_index,
                    reason = %alert.message,
                    "Node marked degraded, migrating workloads",
                );
                ActionStatus::Executed
            }
            Err(e) => {
                tracing::error!(
                    alert_id = alert.id,
                    node_id = %alert.node_id,
                    error_kind = e.error_kind(),
                    error = %e,
                    "Failed to mark node degraded",
                );
                ActionStatus::Failed
            }
        };
        (status, details)
    }

    async fn notify(&self, alert: &Alert) -> (ActionStatus, serde_json::Value) {
        let details = action::notification_details(&self.channel, &alert.message);
        let notification = Notification {
            channel: self.channel.clone(),
            text: alert.message.clone(),
            alert_id: alert.id,
            node_id: alert.node_id.clone(),
            gpu_index: alert.gpu_index,
        };
        let status = match self.notifier.send(&notification).await {
            Ok(()) => ActionStatus::Executed,
            Err(e) => {
                tracing::error!(
                    alert_id = alert.id,
                    channel = %self.channel,
                    error_kind = "transient",
                    error = %e,
                    "Notification delivery failed",
                );
                ActionStatus::Failed
            }
        };
        (status, details)
    }
}
