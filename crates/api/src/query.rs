//! Query parameter types for API handlers.

use gpuwatch_core::error::CoreError;
use serde::Deserialize;

/// Default number of metric rows returned by the history endpoint.
pub const DEFAULT_METRICS_LIMIT: i64 = 100;

/// Upper bound for `?limit=` on the history endpoint.
pub const MAX_METRICS_LIMIT: i64 = 1000;

/// `?limit=` for the metric history endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}

impl LimitParams {
    /// The requested limit, or the default. Out-of-range values are rejected
    /// rather than clamped.
    pub fn resolve(&self) -> Result<i64, CoreError> {
        match self.limit {
            None => Ok(DEFAULT_METRICS_LIMIT),
            Some(n) if (1..=MAX_METRICS_LIMIT).contains(&n) => Ok(n),
            Some(n) => Err(CoreError::Validation(format!(
                "limit must be between 1 and {MAX_METRICS_LIMIT}, got {n}"
            ))),
        }
    }
}
