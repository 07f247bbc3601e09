//! Handlers for node inventory and per-node history.

use axum::extract::State;
use axum::Json;
use gpuwatch_core::error::CoreError;
use gpuwatch_db::models::alert::Alert;
use gpuwatch_db::models::metric::GpuMetric;
use gpuwatch_db::models::node::NodeHealth;
use gpuwatch_db::repositories::{AlertRepo, GpuMetricRepo, NodeRepo};

use crate::error::AppResult;
use crate::extract::{ApiPath, ApiQuery};
use crate::query::LimitParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /nodes
pub async fn list_nodes(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<NodeHealth>>>> {
    let nodes = NodeRepo::list_health(&state.pool).await?;
    Ok(Json(DataResponse { data: nodes }))
}

/// GET /nodes/{node_id}
pub async fn get_node(
    State(state): State<AppState>,
    ApiPath(node_id): ApiPath<String>,
) -> AppResult<Json<DataResponse<NodeHealth>>> {
    let node = NodeRepo::get_health(&state.pool, &node_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Node",
            id: node_id,
        })?;
    Ok(Json(DataResponse { data: node }))
}

/// GET /nodes/{node_id}/metrics?limit=N
///
/// Newest first. `limit` defaults to 100 and must be within 1..=1000.
pub async fn list_node_metrics(
    State(state): State<AppState>,
    ApiPath(node_id): ApiPath<String>,
    ApiQuery(params): ApiQuery<LimitParams>,
) -> AppResult<Json<DataResponse<Vec<GpuMetric>>>> {
    let limit = params.resolve()?;
    let metrics = GpuMetricRepo::list_for_node(&state.pool, &node_id, limit).await?;
    Ok(Json(DataResponse { data: metrics }))
}

/// GET /nodes/{node_id}/alerts
pub async fn list_node_alerts(
    State(state): State<AppState>,
    ApiPath(node_id): ApiPath<String>,
) -> AppResult<Json<DataResponse<Vec<Alert>>>> {
    let alerts = AlertRepo::list_for_node(&state.pool, &node_id).await?;
    Ok(Json(DataResponse { data: alerts }))
}
