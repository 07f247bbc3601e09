//! Handlers for alert listing, detail, and resolution.

use axum::extract::State;
use axum::Json;
use gpuwatch_core::error::CoreError;
use gpuwatch_core::types::DbId;
use gpuwatch_db::models::alert::Alert;
use gpuwatch_db::models::alert_action::AlertAction;
use gpuwatch_db::repositories::alert_repo::DEFAULT_RECENT_LIMIT;
use gpuwatch_db::repositories::{AlertActionRepo, AlertRepo};
use gpuwatch_engine::PersistenceGateway;
use serde::Serialize;

use crate::error::AppResult;
use crate::extract::ApiPath;
use crate::response::DataResponse;
use crate::state::AppState;

/// An alert together with the actions recorded for it.
#[derive(Debug, Serialize)]
pub struct AlertDetail {
    #[serde(flatten)]
    pub alert: Alert,
    pub actions: Vec<AlertAction>,
}

/// GET /alerts
pub async fn list_alerts(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Alert>>>> {
    let alerts = AlertRepo::list_recent(&state.pool, DEFAULT_RECENT_LIMIT).await?;
    Ok(Json(DataResponse { data: alerts }))
}

/// GET /alerts/active
///
/// Critical alerts first, newest first within a severity.
pub async fn list_active_alerts(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Alert>>>> {
    let alerts = AlertRepo::list_active(&state.pool).await?;
    Ok(Json(DataResponse { data: alerts }))
}

/// GET /alerts/{alert_id}
pub async fn get_alert(
    State(state): State<AppState>,
    ApiPath(alert_id): ApiPath<DbId>,
) -> AppResult<Json<DataResponse<AlertDetail>>> {
    let alert = AlertRepo::find_by_id(&state.pool, alert_id)
        .await?
        .ok_or(CoreError::not_found("Alert", alert_id))?;
    let actions = AlertActionRepo::list_for_alert(&state.pool, alert_id).await?;
    Ok(Json(DataResponse {
        data: AlertDetail { alert, actions },
    }))
}

/// POST /alerts/{alert_id}/resolve
pub async fn resolve_alert(
    State(state): State<AppState>,
    ApiPath(alert_id): ApiPath<DbId>,
) -> AppResult<Json<DataResponse<Alert>>> {
    let alert = state.gateway.resolve_alert(alert_id).await?;
    tracing::info!(alert_id, node_id = %alert.node_id, "Alert resolved");
    Ok(Json(DataResponse { data: alert }))
}
