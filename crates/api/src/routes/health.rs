//! Liveness probe, mounted at the root rather than under `/api/v1`.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Ok,
    /// Serving, but the store is unreachable so every data route will fail.
    Degraded,
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: ServiceStatus,
    pub version: &'static str,
    pub db_healthy: bool,
}

impl HealthReport {
    fn new(db_healthy: bool) -> Self {
        Self {
            status: if db_healthy {
                ServiceStatus::Ok
            } else {
                ServiceStatus::Degraded
            },
            version: env!("CARGO_PKG_VERSION"),
            db_healthy,
        }
    }
}

/// GET /health
async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let db_healthy = match gpuwatch_db::health_check(&state.pool).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error_kind = "transient", error = %e, "Store health check failed");
            false
        }
    };
    Json(HealthReport::new(db_healthy))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
