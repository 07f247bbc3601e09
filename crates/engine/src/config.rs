//! Engine configuration loaded from environment variables.

use std::time::Duration;

use gpuwatch_core::config::{ConfigError, EnvSource, ProcessEnv};
use gpuwatch_core::telemetry::{CONSUMER_GROUP_ALERT_ENGINE, TOPIC_GPU_TELEMETRY};
use gpuwatch_events::StartOffset;

use crate::dispatcher::DEFAULT_NOTIFY_CHANNEL;

/// Upper bound for `METRICS_RETENTION_HOURS` (ten years).
pub const MAX_RETENTION_HOURS: i64 = 24 * 365 * 10;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// PostgreSQL connection string for the store and the durable topic.
    pub database_url: String,
    pub topic: String,
    pub consumer_group: String,
    /// Where a group with no committed offset starts reading.
    pub start_offset: StartOffset,
    /// Idle poll interval of the durable topic.
    pub poll_interval: Duration,
    /// When set, notifications are POSTed here instead of only logged.
    pub notify_webhook_url: Option<String>,
    pub notify_channel: String,
    /// Metric retention window; 0 disables the cleanup job.
    pub metrics_retention_hours: i64,
}

impl EngineConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                  | Default          |
    /// |--------------------------|------------------|
    /// | `DATABASE_URL`           | required         |
    /// | `TELEMETRY_TOPIC`        | `gpu-telemetry`  |
    /// | `CONSUMER_GROUP`         | `alert-engine`   |
    /// | `START_FROM_EARLIEST`    | `false`          |
    /// | `QUEUE_POLL_INTERVAL_MS` | `500`            |
    /// | `NOTIFY_WEBHOOK_URL`     | unset            |
    /// | `NOTIFY_CHANNEL`         | `slack`          |
    /// | `METRICS_RETENTION_HOURS`| `0`              |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&ProcessEnv)
    }

    pub fn from_source(env: &impl EnvSource) -> Result<Self, ConfigError> {
        let start_offset = if env.flag("START_FROM_EARLIEST", false)? {
            StartOffset::Earliest
        } else {
            StartOffset::Latest
        };

        let metrics_retention_hours: i64 = env.parse_or("METRICS_RETENTION_HOURS", 0)?;
        if !(0..=MAX_RETENTION_HOURS).contains(&metrics_retention_hours) {
            return Err(ConfigError::Invalid {
                name: "METRICS_RETENTION_HOURS",
                value: metrics_retention_hours.to_string(),
            });
        }

        Ok(Self {
            database_url: env.required("DATABASE_URL")?,
            topic: env.string_or("TELEMETRY_TOPIC", TOPIC_GPU_TELEMETRY),
            consumer_group: env.string_or("CONSUMER_GROUP", CONSUMER_GROUP_ALERT_ENGINE),
            start_offset,
            poll_interval: Duration::from_millis(env.parse_or("QUEUE_POLL_INTERVAL_MS", 500)?),
            notify_webhook_url: env.optional("NOTIFY_WEBHOOK_URL"),
            notify_channel: env.string_or("NOTIFY_CHANNEL", DEFAULT_NOTIFY_CHANNEL),
            metrics_retention_hours,
        })
    }
}
