//! Remediation policy: which action each alert severity triggers.
//!
//! The mapping in [`ActionPolicy::for_severity`] is an exhaustive `match`, so
//! adding a [`Severity`] variant fails to compile until a policy is chosen
//! for it.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::alert::Severity;

/// Value of `action_details.action` for a workload migration.
pub const ACTION_MIGRATE_WORKLOADS: &str = "migrate_workloads";

/// Value of `action_details.action` for a notification.
pub const ACTION_SEND_NOTIFICATION: &str = "send_notification";

/// Kind of remediation recorded in `alert_actions.action_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    WorkloadMigration,
    Notification,
}

impl ActionType {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionType::WorkloadMigration => "workload_migration",
            ActionType::Notification => "notification",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome recorded in `alert_actions.action_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Pending,
    Executed,
    Failed,
}

impl ActionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionStatus::Pending => "pending",
            ActionStatus::Executed => "executed",
            ActionStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do when an alert of a given severity is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionPolicy {
    /// Mark the node degraded and migrate its workloads.
    MigrateWorkloads,
    /// Send a notification; node state is left alone.
    Notify,
}

impl ActionPolicy {
    pub fn for_severity(severity: Severity) -> Self {
        match severity {
            Severity::Critical => ActionPolicy::MigrateWorkloads,
            Severity::Warning => ActionPolicy::Notify,
        }
    }

    pub fn action_type(self) -> ActionType {
        match self {
            ActionPolicy::MigrateWorkloads => ActionType::WorkloadMigration,
            ActionPolicy::Notify => ActionType::Notification,
        }
    }
}

/// Details payload for a workload migration action.
pub fn migration_details(node_id: &str, gpu_index: i32, reason: &str) -> serde_json::Value {
    json!({
        "action": ACTION_MIGRATE_WORKLOADS,
        "from_node": node_id,
        "from_gpu": gpu_index,
        "reason": reason,
    })
}

/// Details payload for a notification action.
pub fn notification_details(channel: &str, message: &str) -> serde_json::Value {
    json!({
        "action": ACTION_SEND_NOTIFICATION,
        "channel": channel,
        "message": message,
    })
}
