#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::{DateTime, Utc};
use gpuwatch_api::config::ServerConfig;
use gpuwatch_api::router::build_app_router;
use gpuwatch_api::state::AppState;
use gpuwatch_core::alert::{AlertCandidate, AlertType, Severity};
use gpuwatch_core::telemetry::MetricSample;
use gpuwatch_db::models::alert::Alert;
use gpuwatch_db::repositories::{AlertRepo, GpuMetricRepo, NodeRepo};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

/// Test `ServerConfig` with local defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: String::new(),
    }
}

/// Build the application router with the production middleware stack.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    build_app_router(AppState::new(pool, config.clone()), &config)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri).await
}

pub async fn post(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri).await
}

async fn send(app: Router, method: Method, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn sample(
    node_id: &str,
    gpu_index: i32,
    temp: f64,
    collected_at: DateTime<Utc>,
) -> MetricSample {
    MetricSample {
        node_id: node_id.to_string(),
        gpu_index,
        temperature_c: temp,
        power_w: 280.0,
        mem_used_mb: 40000.0,
        mem_total_mb: 80000.0,
        utilization_pct: 70.0,
        clock_mhz: 1500,
        collected_at,
    }
}

/// Store one sample, registering the node if needed.
pub async fn seed_metric(pool: &PgPool, sample: &MetricSample) {
    NodeRepo::touch(pool, &sample.node_id, sample.collected_at)
        .await
        .unwrap();
    GpuMetricRepo::insert(pool, sample).await.unwrap();
}

/// Register `node_id` and raise one alert on it.
pub async fn seed_alert(pool: &PgPool, node_id: &str, severity: Severity) -> Alert {
    NodeRepo::touch(pool, node_id, Utc::now()).await.unwrap();
    AlertRepo::create(
        pool,
        &AlertCandidate {
            node_id: node_id.to_string(),
            gpu_index: 0,
            alert_type: AlertType::HighTemperature,
            severity,
            message: "GPU temperature is 97.0°C".to_string(),
            threshold_value: 90.0,
            actual_value: 97.0,
        },
    )
    .await
    .unwrap()
}
