pub mod alerts;
pub mod health;
pub mod metrics;
pub mod nodes;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /nodes                          list with active alert counts
/// /nodes/{node_id}                detail
/// /nodes/{node_id}/metrics        metric history (?limit=)
/// /nodes/{node_id}/alerts         alerts for the node
///
/// /alerts                         most recent alerts
/// /alerts/active                  active alerts, critical first
/// /alerts/{alert_id}              detail with action records
/// /alerts/{alert_id}/resolve      resolve (POST)
///
/// /metrics/latest                 newest sample per node and GPU
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/nodes", nodes::router())
        .nest("/alerts", alerts::router())
        .nest("/metrics", metrics::router())
}
