//! Repository for the `gpu_nodes` table.

use gpuwatch_core::node::NodeStatus;
use gpuwatch_core::types::Timestamp;
use sqlx::{PgExecutor, PgPool};

use crate::models::node::{CreateNode, Node, NodeHealth};

/// Column list for `gpu_nodes` SELECT queries.
const COLUMNS: &str = "node_id, hostname, datacenter, status, last_seen, created_at";

/// Node columns plus the active-alert count, for the health projections.
const HEALTH_SELECT: &str = "\
    SELECT n.node_id, n.hostname, n.datacenter, n.status, n.last_seen, \
           COUNT(a.id) AS active_alerts \
    FROM gpu_nodes n \
    LEFT JOIN alerts a ON a.node_id = n.node_id AND a.status = 'active'";

/// Provides query operations for GPU nodes.
pub struct NodeRepo;

impl NodeRepo {
    /// Register a node. Fails with a unique violation if it already exists.
    pub async fn create(pool: &PgPool, input: &CreateNode) -> Result<Node, sqlx::Error> {
        let query = format!(
            "INSERT INTO gpu_nodes (node_id, hostname, datacenter) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Node>(&query)
            .bind(&input.node_id)
            .bind(&input.hostname)
            .bind(&input.datacenter)
            .fetch_one(pool)
            .await
    }

    /// Advance `last_seen` for a node, registering it first if unknown.
    ///
    /// Unknown nodes get `hostname = node_id` and the default datacenter.
    /// `last_seen` never moves backwards when samples arrive out of order.
    pub async fn touch<'e>(
        executor: impl PgExecutor<'e>,
        node_id: &str,
        seen_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO gpu_nodes (node_id, hostname, last_seen) \
             VALUES ($1, $1, $2) \
             ON CONFLICT (node_id) DO UPDATE \
             SET last_seen = GREATEST(gpu_nodes.last_seen, EXCLUDED.last_seen)",
        )
        .bind(node_id)
        .bind(seen_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Find a node by its identifier.
    pub async fn find_by_id(pool: &PgPool, node_id: &str) -> Result<Option<Node>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM gpu_nodes WHERE node_id = $1");
        sqlx::query_as::<_, Node>(&query)
            .bind(node_id)
            .fetch_optional(pool)
            .await
    }

    /// Set a node's operational status.
    ///
    /// Returns the number of rows updated (0 when the node does not exist).
    pub async fn set_status(
        pool: &PgPool,
        node_id: &str,
        status: NodeStatus,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE gpu_nodes SET status = $2 WHERE node_id = $1")
            .bind(node_id)
            .bind(status.as_str())
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// All nodes with their active alert counts, ordered by `node_id`.
    pub async fn list_health(pool: &PgPool) -> Result<Vec<NodeHealth>, sqlx::Error> {
        let query = format!(
            "{HEALTH_SELECT} \
             GROUP BY n.node_id \
             ORDER BY n.node_id"
        );
        sqlx::query_as::<_, NodeHealth>(&query).fetch_all(pool).await
    }

    /// A single node with its active alert count.
    pub async fn get_health(
        pool: &PgPool,
        node_id: &str,
    ) -> Result<Option<NodeHealth>, sqlx::Error> {
        let query = format!(
            "{HEALTH_SELECT} \
             WHERE n.node_id = $1 \
             GROUP BY n.node_id"
        );
        sqlx::query_as::<_, NodeHealth>(&query)
            .bind(node_id)
            .fetch_optional(pool)
            .await
    }
}
