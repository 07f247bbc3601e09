//! Alert models.

use gpuwatch_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A persisted alert.
///
/// `alert_type`, `severity`, and `status` are stored as text; callers parse
/// them into the `gpuwatch_core` enums where they need typed values.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Alert {
    pub id: DbId,
    pub node_id: String,
    pub gpu_index: i32,
    pub alert_type: String,
    pub severity: String,
    pub message: String,
    pub threshold_value: f64,
    pub actual_value: f64,
    pub status: String,
    pub triggered_at: Timestamp,
    pub resolved_at: Option<Timestamp>,
}
