//! Repository for the `alerts` table.

use gpuwatch_core::alert::{AlertCandidate, AlertStatus};
use gpuwatch_core::types::DbId;
use sqlx::PgPool;

use crate::models::alert::Alert;

/// Column list for `alerts` SELECT queries.
const COLUMNS: &str = "\
    id, node_id, gpu_index, alert_type, severity, message, \
    threshold_value, actual_value, status, triggered_at, resolved_at";

/// Default page size for the recent-alerts listing.
pub const DEFAULT_RECENT_LIMIT: i64 = 100;

/// Provides query operations for alerts.
pub struct AlertRepo;

impl AlertRepo {
    /// Insert a new active alert from an evaluated candidate.
    ///
    /// No idempotency key is used: inserting the same candidate twice yields
    /// two rows with distinct ids.
    pub async fn create(pool: &PgPool, candidate: &AlertCandidate) -> Result<Alert, sqlx::Error> {
        let query = format!(
            "INSERT INTO alerts (node_id, gpu_index, alert_type, severity, message, \
                                 threshold_value, actual_value, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(&candidate.node_id)
            .bind(candidate.gpu_index)
            .bind(candidate.alert_type.as_str())
            .bind(candidate.severity.as_str())
            .bind(&candidate.message)
            .bind(candidate.threshold_value)
            .bind(candidate.actual_value)
            .bind(AlertStatus::Active.as_str())
            .fetch_one(pool)
            .await
    }

    /// Find an alert by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Alert>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM alerts WHERE id = $1");
        sqlx::query_as::<_, Alert>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Most recently triggered alerts of any status.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<Alert>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM alerts \
             ORDER BY triggered_at DESC, id DESC \
             LIMIT $1"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Active alerts, critical before warning, newest first within a severity.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Alert>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM alerts \
             WHERE status = $1 \
             ORDER BY CASE severity WHEN 'critical' THEN 0 ELSE 1 END, \
                      triggered_at DESC, id DESC"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(AlertStatus::Active.as_str())
            .fetch_all(pool)
            .await
    }

    /// All alerts raised for a node, newest first.
    pub async fn list_for_node(pool: &PgPool, node_id: &str) -> Result<Vec<Alert>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM alerts \
             WHERE node_id = $1 \
             ORDER BY triggered_at DESC, id DESC"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(node_id)
            .fetch_all(pool)
            .await
    }

    /// Mark an alert resolved.
    ///
    /// Returns `None` when no alert has the given id. Resolving an already
    /// resolved alert keeps its original `resolved_at`. Threshold and actual
    /// values are never touched.
    pub async fn resolve(pool: &PgPool, id: DbId) -> Result<Option<Alert>, sqlx::Error> {
        let query = format!(
            "UPDATE alerts \
             SET status = $2, resolved_at = COALESCE(resolved_at, NOW()) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(id)
            .bind(AlertStatus::Resolved.as_str())
            .fetch_optional(pool)
            .await
    }
}
