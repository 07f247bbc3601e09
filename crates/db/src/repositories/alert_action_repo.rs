//! Repository for the `alert_actions` table.

use gpuwatch_core::types::DbId;
use sqlx::PgPool;

use crate::models::alert_action::{AlertAction, CreateAlertAction};

/// Column list for `alert_actions` SELECT queries.
const COLUMNS: &str = "id, alert_id, action_type, action_status, action_details, executed_at";

/// Provides query operations for alert actions.
pub struct AlertActionRepo;

impl AlertActionRepo {
    /// Record the action taken for an alert.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAlertAction,
    ) -> Result<AlertAction, sqlx::Error> {
        let query = format!(
            "INSERT INTO alert_actions (alert_id, action_type, action_status, action_details) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AlertAction>(&query)
            .bind(input.alert_id)
            .bind(input.action_type.as_str())
            .bind(input.action_status.as_str())
            .bind(&input.action_details)
            .fetch_one(pool)
            .await
    }

    /// All actions recorded for an alert, oldest first.
    pub async fn list_for_alert(
        pool: &PgPool,
        alert_id: DbId,
    ) -> Result<Vec<AlertAction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM alert_actions \
             WHERE alert_id = $1 \
             ORDER BY id"
        );
        sqlx::query_as::<_, AlertAction>(&query)
            .bind(alert_id)
            .fetch_all(pool)
            .await
    }
}
