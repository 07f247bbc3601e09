//! Persistence Gateway: the engine's only path to the durable store.
//!
//! The gateway owns no business logic. Each operation is its own
//! transaction, and callers decide which failures are fatal.

use async_trait::async_trait;
use gpuwatch_core::alert::AlertCandidate;
use gpuwatch_core::error::CoreError;
use gpuwatch_core::node::NodeStatus;
use gpuwatch_core::telemetry::MetricSample;
use gpuwatch_core::types::DbId;
use gpuwatch_db::models::alert::Alert;
use gpuwatch_db::models::alert_action::{AlertAction, CreateAlertAction};
use gpuwatch_db::repositories::{AlertActionRepo, AlertRepo, GpuMetricRepo, NodeRepo};
use gpuwatch_db::DbPool;

/// Error type for gateway operations.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The target row does not exist. A domain outcome, not a store failure.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// The store could not be reached or rejected the statement.
    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),
}

impl GatewayError {
    /// Value of the `error_kind` log field for this error.
    pub fn error_kind(&self) -> &'static str {
        match self {
            GatewayError::NotFound { .. } => "not_found",
            GatewayError::Store(_) => "transient",
        }
    }
}

impl From<GatewayError> for CoreError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotFound { entity, id } => CoreError::NotFound { entity, id },
            GatewayError::Store(e) => CoreError::Internal(e.to_string()),
        }
    }
}

/// Durable writes for metrics, alerts, and action records.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Append a metric sample, registering the node if it is unknown.
    async fn store_metric(&self, sample: &MetricSample) -> Result<(), GatewayError>;

    /// Insert an active alert and return it with its store-assigned id.
    async fn create_alert(&self, candidate: &AlertCandidate) -> Result<Alert, GatewayError>;

    /// Set a node's status. `NotFound` when the node does not exist.
    async fn set_node_status(&self, node_id: &str, status: NodeStatus)
        -> Result<(), GatewayError>;

    /// Insert the record of an action taken for an alert.
    async fn record_action(&self, action: &CreateAlertAction)
        -> Result<AlertAction, GatewayError>;

    /// Mark an alert resolved. `NotFound` when no alert has the id.
    async fn resolve_alert(&self, alert_id: DbId) -> Result<Alert, GatewayError>;

    /// Release store connections. Called once when the engine stops.
    async fn close(&self) {}
}

/// [`PersistenceGateway`] over the PostgreSQL repositories.
#[derive(Debug, Clone)]
pub struct PgGateway {
    pool: DbPool,
}

impl PgGateway {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PersistenceGateway for PgGateway {
    async fn store_metric(&self, sample: &MetricSample) -> Result<(), GatewayError> {
        let mut tx = self.pool.begin().await?;
        NodeRepo::touch(&mut *tx, &sample.node_id, sample.collected_at).await?;
        GpuMetricRepo::insert(&mut *tx, sample).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn create_alert(&self, candidate: &AlertCandidate) -> Result<Alert, GatewayError> {
        Ok(AlertRepo::create(&self.pool, candidate).await?)
    }

    async fn set_node_status(
        &self,
        node_id: &str,
        status: NodeStatus,
    ) -> Result<(), GatewayError> {
        match NodeRepo::set_status(&self.pool, node_id, status).await? {
            0 => Err(GatewayError::NotFound {
                entity: "Node",
                id: node_id.to_string(),
            }),
            _ => Ok(()),
        }
    }

    async fn record_action(
        &self,
        action: &CreateAlertAction,
    ) -> Result<AlertAction, GatewayError> {
        Ok(AlertActionRepo::create(&self.pool, action).await?)
    }

    async fn resolve_alert(&self, alert_id: DbId) -> Result<Alert, GatewayError> {
        AlertRepo::resolve(&self.pool, alert_id)
            .await?
            .ok_or_else(|| GatewayError::NotFound {
                entity: "Alert",
                id: alert_id.to_string(),
            })
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database pool closed");
    }
}
