use axum::routing::get;
use axum::Router;

use crate::handlers::nodes;
use crate::state::AppState;

/// Routes mounted at `/nodes`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(nodes::list_nodes))
        .route("/{node_id}", get(nodes::get_node))
        .route("/{node_id}/metrics", get(nodes::list_node_metrics))
        .route("/{node_id}/alerts", get(nodes::list_node_alerts))
}
