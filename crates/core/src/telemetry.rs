//! Telemetry sample type and topic constants.
//!
//! [`MetricSample`] is the payload of every message on the
//! [`TOPIC_GPU_TELEMETRY`] topic. It is produced by the collector, decoded
//! by the alert engine, and appended to the `gpu_metrics` table.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Topic carrying one message per GPU metric sample.
pub const TOPIC_GPU_TELEMETRY: &str = "gpu-telemetry";

/// Consumer group used by the alert engine.
pub const CONSUMER_GROUP_ALERT_ENGINE: &str = "alert-engine";

/// One timestamped telemetry reading for a single GPU.
///
/// Field names on the wire are the short forms below. The long names used by
/// older producers (`temperature_celsius`, `power_watts`, ...) are accepted as
/// aliases when decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub node_id: String,
    pub gpu_index: i32,
    #[serde(alias = "temperature_celsius")]
    pub temperature_c: f64,
    #[serde(alias = "power_watts")]
    pub power_w: f64,
    #[serde(alias = "memory_used_mb")]
    pub mem_used_mb: f64,
    #[serde(alias = "memory_total_mb")]
    pub mem_total_mb: f64,
    #[serde(alias = "utilization_percent")]
    pub utilization_pct: f64,
    #[serde(alias = "sm_clock_mhz")]
    pub clock_mhz: i32,
    pub collected_at: Timestamp,
}

impl MetricSample {
    /// Partition key used by producers: `"{node_id}-gpu-{gpu_index}"`.
    pub fn message_key(&self) -> String {
        format!("{}-gpu-{}", self.node_id, self.gpu_index)
    }

    /// Decode a sample from a raw JSON message payload.
    pub fn decode(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }

    /// Encode the sample as a JSON message payload.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Memory usage as a percentage of total, or `None` when the ratio is not
    /// a finite number (zero or missing total).
    pub fn mem_used_pct(&self) -> Option<f64> {
        if self.mem_total_mb == 0.0 {
            return None;
        }
        let pct = self.mem_used_mb / self.mem_total_mb * 100.0;
        pct.is_finite().then_some(pct)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
