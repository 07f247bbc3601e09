use axum::routing::{get, post};
use axum::Router;

use crate::handlers::alerts;
use crate::state::AppState;

/// Routes mounted at `/alerts`.
///
/// ```text
/// GET  /                      -> list_alerts
/// GET  /active                -> list_active_alerts
/// GET  /{alert_id}            -> get_alert
/// POST /{alert_id}/resolve    -> resolve_alert
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(alerts::list_alerts))
        .route("/active", get(alerts::list_active_alerts))
        .route("/{alert_id}", get(alerts::get_alert))
        .route("/{alert_id}/resolve", post(alerts::resolve_alert))
}
