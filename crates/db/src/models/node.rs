//! GPU node inventory models.

use gpuwatch_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `gpu_nodes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Node {
    pub node_id: String,
    pub hostname: String,
    pub datacenter: String,
    pub status: String,
    pub last_seen: Timestamp,
    pub created_at: Timestamp,
}

/// DTO for registering a node explicitly.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNode {
    pub node_id: String,
    pub hostname: String,
    pub datacenter: String,
}

/// Node summary with its count of active alerts.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NodeHealth {
    pub node_id: String,
    pub hostname: String,
    pub datacenter: String,
    pub status: String,
    pub last_seen: Timestamp,
    pub active_alerts: i64,
}
