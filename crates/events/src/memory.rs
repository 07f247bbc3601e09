//! In-process telemetry topic.
//!
//! [`MemoryTopic`] keeps the message log and each group's committed offset in
//! memory behind a shared handle, so producers and consumers created from
//! clones of the same topic see the same data. Dropping a consumer without
//! committing behaves like a crash: the next consumer of that group starts
//! again after the last committed offset.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, Notify};

use crate::topic::{QueueError, StartOffset, TelemetryMessage, TopicConsumer, TopicProducer};

#[derive(Debug, Default)]
struct TopicState {
    log: Vec<TelemetryMessage>,
    /// Last committed offset per consumer group.
    committed: HashMap<String, i64>,
    closed: bool,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<TopicState>,
    appended: Notify,
}

/// Cloneable handle to an in-memory topic.
#[derive(Debug, Clone, Default)]
pub struct MemoryTopic {
    shared: Arc<Shared>,
}

impl MemoryTopic {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a consumer for `group`.
    ///
    /// Resumes after the group's committed offset, or at `start` when the
    /// group has never committed.
    pub async fn consumer(&self, group: impl Into<String>, start: StartOffset) -> MemoryConsumer {
        let group = group.into();
        let state = self.shared.state.lock().await;
        let position = match state.committed.get(&group) {
            Some(committed) => committed + 1,
            None => match start {
                StartOffset::Earliest => 0,
                StartOffset::Latest => state.log.len() as i64,
            },
        };
        drop(state);

        tracing::debug!(group = %group, position, "Memory topic consumer created");
        MemoryConsumer {
            topic: self.clone(),
            group,
            position,
        }
    }

    /// Last offset committed by `group`, if any.
    pub async fn committed_offset(&self, group: &str) -> Option<i64> {
        self.shared.state.lock().await.committed.get(group).copied()
    }

    /// Number of messages ever published.
    pub async fn len(&self) -> usize {
        self.shared.state.lock().await.log.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Stop accepting messages. Consumers drain what is left, then get
    /// [`QueueError::Closed`].
    pub async fn close(&self) {
        self.shared.state.lock().await.closed = true;
        self.shared.appended.notify_waiters();
    }
}

#[async_trait]
impl TopicProducer for MemoryTopic {
    async fn publish(&self, key: &str, payload: &[u8]) -> Result<i64, QueueError> {
        let mut state = self.shared.state.lock().await;
        if state.closed {
            return Err(QueueError::Closed);
        }
        let offset = state.log.len() as i64;
        state.log.push(TelemetryMessage {
            offset,
            key: key.to_string(),
            payload: payload.to_vec(),
            published_at: Utc::now(),
        });
        drop(state);

        self.shared.appended.notify_waiters();
        Ok(offset)
    }
}

/// A consumer-group reader over a [`MemoryTopic`].
#[derive(Debug)]
pub struct MemoryConsumer {
    topic: MemoryTopic,
    group: String,
    /// Offset of the next message to hand out.
    position: i64,
}

#[async_trait]
impl TopicConsumer for MemoryConsumer {
    async fn fetch(&mut self) -> Result<TelemetryMessage, QueueError> {
        loop {
            // Register interest before checking so a publish in between is not missed.
            let appended = self.topic.shared.appended.notified();
            {
                let state = self.topic.shared.state.lock().await;
                if let Some(message) = state.log.get(self.position as usize) {
                    self.position += 1;
                    return Ok(message.clone());
                }
                if state.closed {
                    return Err(QueueError::Closed);
                }
            }
            appended.await;
        }
    }

    async fn commit(&mut self, message: &TelemetryMessage) -> Result<(), QueueError> {
        let mut state = self.topic.shared.state.lock().await;
        let committed = state.committed.entry(self.group.clone()).or_insert(-1);
        *committed = (*committed).max(message.offset);
        Ok(())
    }

    async fn close(&mut self) {
        tracing::debug!(group = %self.group, position = self.position, "Memory topic consumer closed");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
