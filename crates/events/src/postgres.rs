//! Durable telemetry topic stored in PostgreSQL.
//!
//! Messages live in `telemetry_messages` (the row id is the offset) and each
//! consumer group's progress in `consumer_offsets`. Consumers poll for the
//! next row after their position, sleeping between empty polls.

use std::time::Duration;

use async_trait::async_trait;
use gpuwatch_db::models::telemetry_message::TelemetryMessageRow;
use gpuwatch_db::repositories::TelemetryTopicRepo;
use gpuwatch_db::DbPool;

use crate::topic::{QueueError, StartOffset, TelemetryMessage, TopicConsumer, TopicProducer};

/// Default delay between polls when the topic has no new messages.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Handle to one named topic in the database.
#[derive(Debug, Clone)]
pub struct PgTopic {
    pool: DbPool,
    topic: String,
}

impl PgTopic {
    pub fn new(pool: DbPool, topic: impl Into<String>) -> Self {
        Self {
            pool,
            topic: topic.into(),
        }
    }

    /// Create a consumer for `group`.
    ///
    /// Resumes after the group's committed offset, or at `start` when the
    /// group has never committed.
    pub async fn consumer(
        &self,
        group: impl Into<String>,
        start: StartOffset,
        poll_interval: Duration,
    ) -> Result<PgConsumer, QueueError> {
        let group = group.into();
        let committed = TelemetryTopicRepo::committed_offset(&self.pool, &group, &self.topic).await?;
        let position = match (committed, start) {
            (Some(offset), _) => offset,
            (None, StartOffset::Earliest) => 0,
            (None, StartOffset::Latest) => {
                TelemetryTopicRepo::head_offset(&self.pool, &self.topic).await?
            }
        };

        tracing::info!(
            topic = %self.topic,
            group = %group,
            position,
            resumed = committed.is_some(),
            "Topic consumer created",
        );

        Ok(PgConsumer {
            pool: self.pool.clone(),
            topic: self.topic.clone(),
            group,
            position,
            poll_interval,
        })
    }

    /// Last offset committed by `group`, if any.
    pub async fn committed_offset(&self, group: &str) -> Result<Option<i64>, QueueError> {
        Ok(TelemetryTopicRepo::committed_offset(&self.pool, group, &self.topic).await?)
    }
}

#[async_trait]
impl TopicProducer for PgTopic {
    async fn publish(&self, key: &str, payload: &[u8]) -> Result<i64, QueueError> {
        Ok(TelemetryTopicRepo::append(&self.pool, &self.topic, key, payload).await?)
    }
}

/// A consumer-group reader over a [`PgTopic`].
#[derive(Debug)]
pub struct PgConsumer {
    pool: DbPool,
    topic: String,
    group: String,
    /// Offset of the last message handed out.
    position: i64,
    poll_interval: Duration,
}

impl From<TelemetryMessageRow> for TelemetryMessage {
    fn from(row: TelemetryMessageRow) -> Self {
        Self {
            offset: row.id,
            key: row.message_key,
            payload: row.payload,
            published_at: row.published_at,
        }
    }
}

#[async_trait]
impl TopicConsumer for PgConsumer {
    async fn fetch(&mut self) -> Result<TelemetryMessage, QueueError> {
        loop {
            if let Some(row) =
                TelemetryTopicRepo::next_after(&self.pool, &self.topic, self.position).await?
            {
                self.position = row.id;
                return Ok(row.into());
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn commit(&mut self, message: &TelemetryMessage) -> Result<(), QueueError> {
        TelemetryTopicRepo::commit(&self.pool, &self.group, &self.topic, message.offset).await?;
        Ok(())
    }

    async fn close(&mut self) {
        tracing::info!(
            topic = %self.topic,
            group = %self.group,
            position = self.position,
            "Topic consumer closed",
        );
    }
}
