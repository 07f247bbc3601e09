//! Threshold rule evaluation for GPU metric samples.
//!
//! Pure logic with no state: every call looks at exactly one sample. A
//! condition that persists across consecutive samples fires again on every
//! sample; there is no cooldown or deduplication here.

use crate::alert::{AlertCandidate, AlertType, Severity};
use crate::telemetry::MetricSample;

/// Temperature above which `high_temperature` fires (°C).
pub const TEMPERATURE_THRESHOLD_C: f64 = 90.0;

/// Temperature above which `high_temperature` escalates to critical (°C).
pub const TEMPERATURE_CRITICAL_C: f64 = 95.0;

/// Power draw above which `high_power` fires (W).
pub const POWER_THRESHOLD_W: f64 = 330.0;

/// Memory usage above which `high_memory` fires (percent of total).
pub const MEMORY_THRESHOLD_PCT: f64 = 95.0;

type Rule = fn(&MetricSample) -> Option<AlertCandidate>;

/// Rules in declaration order.
const RULES: [Rule; 3] = [check_temperature, check_power, check_memory];

/// Evaluate every rule against a sample.
///
/// Candidates are returned in rule declaration order: temperature, power,
/// memory. Each rule is independent, so one sample may yield up to three.
pub fn evaluate(sample: &MetricSample) -> Vec<AlertCandidate> {
    RULES
        .iter()
        .filter_map(|rule| rule(sample))
        .collect()
}

fn check_temperature(sample: &MetricSample) -> Option<AlertCandidate> {
    let temp = sample.temperature_c;
    (temp > TEMPERATURE_THRESHOLD_C).then(|| {
        let severity = if temp > TEMPERATURE_CRITICAL_C {
            Severity::Critical
        } else {
            Severity::Warning
        };
        // The reported threshold stays at the warning level even when critical.
        candidate(
            sample,
            AlertType::HighTemperature,
            severity,
            format!("GPU temperature is {temp:.1}°C"),
            TEMPERATURE_THRESHOLD_C,
            temp,
        )
    })
}

fn check_power(sample: &MetricSample) -> Option<AlertCandidate> {
    let power = sample.power_w;
    (power > POWER_THRESHOLD_W).then(|| {
        candidate(
            sample,
            AlertType::HighPower,
            Severity::Warning,
            format!("GPU power consumption is {power:.1}W"),
            POWER_THRESHOLD_W,
            power,
        )
    })
}

fn check_memory(sample: &MetricSample) -> Option<AlertCandidate> {
    // Zero total memory is a data-quality problem, not a violation.
    let pct = sample.mem_used_pct()?;
    (pct > MEMORY_THRESHOLD_PCT).then(|| {
        candidate(
            sample,
            AlertType::HighMemory,
            Severity::Warning,
            format!("GPU memory usage is {pct:.1}%"),
            MEMORY_THRESHOLD_PCT,
            pct,
        )
    })
}

fn candidate(
    sample: &MetricSample,
    alert_type: AlertType,
    severity: Severity,
    message: String,
    threshold_value: f64,
    actual_value: f64,
) -> AlertCandidate {
    AlertCandidate {
        node_id: sample.node_id.clone(),
        gpu_index: sample.gpu_index,
        alert_type,
        severity,
        message,
        threshold_value,
        actual_value,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
