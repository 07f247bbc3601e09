//! Simulated GPU readings.
//!
//! Values are drawn uniformly from ranges typical of a loaded datacenter GPU.
//! Temperature and power ranges straddle the alert thresholds, so a running
//! simulation produces a steady trickle of warnings.

use std::ops::Range;

use chrono::Utc;
use gpuwatch_core::telemetry::MetricSample;
use rand::Rng;

pub const TEMPERATURE_RANGE_C: Range<f64> = 65.0..95.0;
pub const POWER_RANGE_W: Range<f64> = 250.0..350.0;
pub const MEM_TOTAL_MB: f64 = 80_000.0;
/// Fraction of total memory in use.
pub const MEM_USED_FRACTION: Range<f64> = 0.30..0.90;
pub const UTILIZATION_RANGE_PCT: Range<f64> = 0.0..100.0;
pub const CLOCK_RANGE_MHZ: Range<i32> = 1410..1610;

/// Produces one sample per GPU for a node.
#[derive(Debug, Clone)]
pub struct Simulator {
    gpus_per_node: i32,
}

impl Simulator {
    pub fn new(gpus_per_node: i32) -> Self {
        Self { gpus_per_node }
    }

    pub fn gpus_per_node(&self) -> i32 {
        self.gpus_per_node
    }

    /// Samples for every GPU on `node_id`, using the thread-local RNG.
    pub fn collect(&self, node_id: &str) -> Vec<MetricSample> {
        self.collect_with(&mut rand::rng(), node_id)
    }

    /// Samples for every GPU on `node_id`, drawing from `rng`.
    pub fn collect_with<R: Rng + ?Sized>(&self, rng: &mut R, node_id: &str) -> Vec<MetricSample> {
        let collected_at = Utc::now();
        (0..self.gpus_per_node)
            .map(|gpu_index| MetricSample {
                node_id: node_id.to_string(),
                gpu_index,
                temperature_c: round1(rng.random_range(TEMPERATURE_RANGE_C)),
                power_w: round1(rng.random_range(POWER_RANGE_W)),
                mem_used_mb: (MEM_TOTAL_MB * rng.random_range(MEM_USED_FRACTION)).round(),
                mem_total_mb: MEM_TOTAL_MB,
                utilization_pct: round1(rng.random_range(UTILIZATION_RANGE_PCT)),
                clock_mhz: rng.random_range(CLOCK_RANGE_MHZ),
                collected_at,
            })
            .collect()
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
