use axum::extract::State;
use axum::Json;
use gpuwatch_db::models::metric::LatestGpuMetric;
use gpuwatch_db::repositories::GpuMetricRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /metrics/latest -- newest sample per node and GPU.
pub async fn latest(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<LatestGpuMetric>>>> {
    let metrics = GpuMetricRepo::get_latest(&state.pool).await?;
    Ok(Json(DataResponse { data: metrics }))
}
