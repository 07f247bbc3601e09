//! Collector configuration loaded from environment variables.

use std::time::Duration;

use gpuwatch_core::config::{ConfigError, EnvSource, ProcessEnv};
use gpuwatch_core::telemetry::TOPIC_GPU_TELEMETRY;

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub database_url: String,
    pub topic: String,
    pub nodes: Vec<String>,
    pub gpus_per_node: i32,
    pub poll_interval: Duration,
}

impl CollectorConfig {
    /// | Env Var              | Default           |
    /// |----------------------|-------------------|
    /// | `DATABASE_URL`       | required          |
    /// | `TELEMETRY_TOPIC`    | `gpu-telemetry`   |
    /// | `NODES`              | `node-1,node-2`   |
    /// | `GPUS_PER_NODE`      | `8`               |
    /// | `POLL_INTERVAL_SECS` | `30`              |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&ProcessEnv)
    }

    pub fn from_source(env: &impl EnvSource) -> Result<Self, ConfigError> {
        let poll_secs: u64 = env.parse_or("POLL_INTERVAL_SECS", 30)?;
        if poll_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "POLL_INTERVAL_SECS",
                value: "0".to_string(),
            });
        }

        let gpus_per_node: i32 = env.parse_or("GPUS_PER_NODE", 8)?;
        if gpus_per_node < 0 {
            return Err(ConfigError::Invalid {
                name: "GPUS_PER_NODE",
                value: gpus_per_node.to_string(),
            });
        }

        Ok(Self {
            database_url: env.required("DATABASE_URL")?,
            topic: env.string_or("TELEMETRY_TOPIC", TOPIC_GPU_TELEMETRY),
            nodes: env.list_or("NODES", "node-1,node-2"),
            gpus_per_node,
            poll_interval: Duration::from_secs(poll_secs),
        })
    }
}
