//! Messaging infrastructure for the GPU telemetry pipeline.
//!
//! - [`topic`]: the consumer/producer contract for the telemetry topic,
//!   with at-least-once semantics driven by explicit offset commits.
//! - [`MemoryTopic`]: in-process topic, used by tests and local runs.
//! - [`PgTopic`]: durable topic stored in PostgreSQL.
//! - [`delivery`]: outbound notification channels (log, webhook).

pub mod delivery;
pub mod memory;
pub mod postgres;
pub mod topic;

pub use delivery::webhook::WebhookNotifier;
pub use delivery::{LogNotifier, Notification, Notifier, NotifyError};
pub use memory::{MemoryConsumer, MemoryTopic};
pub use postgres::{PgConsumer, PgTopic};
pub use topic::{QueueError, StartOffset, TelemetryMessage, TopicConsumer, TopicProducer};
