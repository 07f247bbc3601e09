//! GPU metric models (append-only time series).

use gpuwatch_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A single stored GPU metric sample.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GpuMetric {
    pub id: DbId,
    pub node_id: String,
    pub gpu_index: i32,
    pub temperature_c: f64,
    pub power_w: f64,
    pub mem_used_mb: f64,
    pub mem_total_mb: f64,
    pub utilization_pct: f64,
    pub clock_mhz: i32,
    pub collected_at: Timestamp,
    pub created_at: Timestamp,
}

/// Latest sample for one node + GPU, read from the `latest_gpu_metrics` view.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LatestGpuMetric {
    pub node_id: String,
    pub gpu_index: i32,
    pub temperature_c: f64,
    pub power_w: f64,
    pub mem_used_mb: f64,
    pub mem_total_mb: f64,
    pub utilization_pct: f64,
    pub clock_mhz: i32,
    pub collected_at: Timestamp,
}
