//! Topic consumer and producer contract.
//!
//! Delivery is at-least-once: a consumer's position only survives a restart
//! through [`TopicConsumer::commit`], so any message fetched but not
//! committed is delivered again to the next consumer in the same group.

use async_trait::async_trait;
use gpuwatch_core::types::Timestamp;

/// One message read from a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryMessage {
    /// Position of the message in its topic. Strictly increasing.
    pub offset: i64,
    /// Producer-side partition key, e.g. `"node-1-gpu-0"`.
    pub key: String,
    /// Raw encoded payload. May be malformed; decoding is the consumer's job.
    pub payload: Vec<u8>,
    pub published_at: Timestamp,
}

/// Where a consumer group with no committed offset starts reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartOffset {
    /// Replay everything already on the topic.
    Earliest,
    /// Only messages published after the consumer is created.
    #[default]
    Latest,
}

/// Error type for topic operations.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// The backing store could not be reached or rejected the query.
    #[error("Topic store error: {0}")]
    Store(#[from] sqlx::Error),

    /// The topic was closed and has no more messages.
    #[error("Topic closed")]
    Closed,
}

/// Reads messages from a topic on behalf of a consumer group.
#[async_trait]
pub trait TopicConsumer: Send {
    /// Wait until the next message is available and return it.
    ///
    /// Cancel-safe: dropping the future before it completes does not skip a
    /// message.
    async fn fetch(&mut self) -> Result<TelemetryMessage, QueueError>;

    /// Acknowledge `message` and everything before it for this group.
    async fn commit(&mut self, message: &TelemetryMessage) -> Result<(), QueueError>;

    /// Release the consumer. Uncommitted messages will be redelivered.
    async fn close(&mut self);
}

/// Publishes messages onto a topic.
#[async_trait]
pub trait TopicProducer: Send + Sync {
    /// Append a message and return its offset.
    async fn publish(&self, key: &str, payload: &[u8]) -> Result<i64, QueueError>;
}
