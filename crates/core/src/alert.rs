//! Alert types for GPU threshold violations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Severity level of a threshold violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Value exceeded the rule threshold.
    Warning,
    /// Value exceeded the rule's critical level.
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a stored severity string has no matching variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown severity '{0}'")]
pub struct UnknownSeverity(pub String);

impl FromStr for Severity {
    type Err = UnknownSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warning" => Ok(Severity::Warning),
            "critical" => Ok(Severity::Critical),
            other => Err(UnknownSeverity(other.to_string())),
        }
    }
}

/// Which rule produced the alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    HighTemperature,
    HighPower,
    HighMemory,
}

impl AlertType {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertType::HighTemperature => "high_temperature",
            AlertType::HighPower => "high_power",
            AlertType::HighMemory => "high_memory",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a persisted alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Resolved,
}

impl AlertStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertStatus::Active => "active",
            AlertStatus::Resolved => "resolved",
        }
    }
}

/// An in-memory, not-yet-persisted violation produced by rule evaluation.
///
/// `threshold_value` and `actual_value` are captured here and copied verbatim
/// into the alert row; nothing downstream recomputes them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertCandidate {
    pub node_id: String,
    pub gpu_index: i32,
    pub alert_type: AlertType,
    pub severity: Severity,
    pub message: String,
    pub threshold_value: f64,
    pub actual_value: f64,
}
