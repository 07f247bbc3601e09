//! Rows of the durable telemetry topic.

use gpuwatch_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A message stored in `telemetry_messages`. `id` doubles as the offset.
#[derive(Debug, Clone, FromRow)]
pub struct TelemetryMessageRow {
    pub id: DbId,
    pub topic: String,
    pub message_key: String,
    pub payload: Vec<u8>,
    pub published_at: Timestamp,
}
