//! Alert action (remediation log) models.

use gpuwatch_core::action::{ActionStatus, ActionType};
use gpuwatch_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `alert_actions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AlertAction {
    pub id: DbId,
    pub alert_id: DbId,
    pub action_type: String,
    pub action_status: String,
    pub action_details: serde_json::Value,
    pub executed_at: Timestamp,
}

/// DTO for recording an action taken for an alert.
#[derive(Debug, Clone)]
pub struct CreateAlertAction {
    pub alert_id: DbId,
    pub action_type: ActionType,
    pub action_status: ActionStatus,
    pub action_details: serde_json::Value,
}
