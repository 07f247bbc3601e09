//! Periodic cleanup of old GPU metrics.
//!
//! Deletes `gpu_metrics` rows collected before the retention window, once at
//! start and then every hour, until cancelled.

use std::time::Duration;

use chrono::{TimeDelta, Utc};
use gpuwatch_core::types::Timestamp;
use gpuwatch_db::repositories::GpuMetricRepo;
use gpuwatch_db::DbPool;
use tokio_util::sync::CancellationToken;

/// How often the cleanup job runs.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

/// Run the metrics retention loop until `cancel` is triggered.
pub async fn run(pool: DbPool, retention_hours: i64, cancel: CancellationToken) {
    tracing::info!(
        retention_hours,
        interval_secs = CLEANUP_INTERVAL.as_secs(),
        "Metrics retention job started",
    );

    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Metrics retention job stopping");
                break;
            }
            _ = interval.tick() => {
                let Some(cutoff) = cutoff(Utc::now(), retention_hours) else {
                    tracing::error!(
                        retention_hours,
                        error_kind = "data",
                        "Metrics retention: window out of range, skipping cleanup",
                    );
                    continue;
                };
                match GpuMetricRepo::delete_older_than(&pool, cutoff).await {
                    Ok(0) => tracing::debug!("Metrics retention: no rows to purge"),
                    Ok(deleted) => {
                        tracing::info!(deleted, %cutoff, "Metrics retention: purged old rows");
                    }
                    Err(e) => {
                        tracing::error!(
                            error_kind = "transient",
                            error = %e,
                            "Metrics retention: cleanup failed",
                        );
                    }
                }
            }
        }
    }
}

/// Start of the retention window, or `None` when it cannot be represented.
fn cutoff(now: Timestamp, retention_hours: i64) -> Option<Timestamp> {
    TimeDelta::try_hours(retention_hours).and_then(|window| now.checked_sub_signed(window))
}
