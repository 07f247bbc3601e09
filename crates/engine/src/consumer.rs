//! Stream Consumer Loop.
//!
//! Pulls telemetry events one at a time and drives each through
//! store → evaluate → create alert → dispatch, committing the event's offset
//! only after every candidate has been attempted. A crash before the commit
//! means the whole event is processed again on redelivery, duplicate alerts
//! included.

use std::sync::Arc;
use std::time::Duration;

use gpuwatch_core::rules;
use gpuwatch_core::telemetry::MetricSample;
use gpuwatch_events::{QueueError, TelemetryMessage, TopicConsumer};
use tokio_util::sync::CancellationToken;

use crate::dispatcher::{ActionDispatcher, DispatchError};
use crate::gateway::PersistenceGateway;

/// Pause after a failed fetch before trying again.
const FETCH_BACKOFF: Duration = Duration::from_secs(1);

/// What happened to a single event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventReport {
    pub offset: i64,
    /// `false` when the payload could not be decoded and the event was dropped.
    pub decoded: bool,
    pub metric_stored: bool,
    pub candidates: usize,
    pub alerts_created: usize,
    pub actions_recorded: usize,
    /// Candidates whose alert creation or dispatch failed.
    pub failures: usize,
}

/// Running totals over the life of a consumer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerStats {
    pub events: u64,
    pub malformed: u64,
    pub alerts_created: u64,
    pub actions_recorded: u64,
    pub failures: u64,
}

impl ConsumerStats {
    fn record(&mut self, report: &EventReport) {
        self.events += 1;
        if !report.decoded {
            self.malformed += 1;
        }
        self.alerts_created += report.alerts_created as u64;
        self.actions_recorded += report.actions_recorded as u64;
        self.failures += report.failures as u64;
    }
}

/// Sequential single-consumer processing loop.
pub struct StreamConsumer<C> {
    consumer: C,
    gateway: Arc<dyn PersistenceGateway>,
    dispatcher: ActionDispatcher,
}

impl<C: TopicConsumer> StreamConsumer<C> {
    pub fn new(
        consumer: C,
        gateway: Arc<dyn PersistenceGateway>,
        dispatcher: ActionDispatcher,
    ) -> Self {
        Self {
            consumer,
            gateway,
            dispatcher,
        }
    }

    /// Run until `cancel` fires or the topic is closed.
    ///
    /// Cancellation is only observed between events: an event that has been
    /// fetched always runs to its commit. On exit the topic consumer and the
    /// gateway are closed.
    pub async fn run(mut self, cancel: CancellationToken) -> ConsumerStats {
        let mut stats = ConsumerStats::default();
        tracing::info!("Stream consumer started");

        loop {
            let fetched = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!("Stream consumer shutting down");
                    break;
                }
                fetched = self.consumer.fetch() => fetched,
            };

            let message = match fetched {
                Ok(message) => message,
                Err(QueueError::Closed) => {
                    tracing::info!("Telemetry topic closed");
                    break;
                }
                Err(e) => {
                    tracing::error!(
                        error_kind = "transient",
                        error = %e,
                        "Failed to fetch telemetry event",
                    );
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(FETCH_BACKOFF) => continue,
                    }
                }
            };

            let report = self.process(&message).await;
            stats.record(&report);

            if let Err(e) = self.consumer.commit(&message).await {
                tracing::error!(
                    offset = message.offset,
                    error_kind = "transient",
                    error = %e,
                    "Failed to commit offset, event will be redelivered",
                );
            }
        }

        self.consumer.close().await;
        self.gateway.close().await;
        tracing::info!(
            events = stats.events,
            malformed = stats.malformed,
            alerts_created = stats.alerts_created,
            failures = stats.failures,
            "Stream consumer stopped",
        );
        stats
    }

    /// Run one event through the pipeline. Never fails: every error is
    /// logged and counted in the report.
    pub async fn process(&self, message: &TelemetryMessage) -> EventReport {
        let mut report = EventReport {
            offset: message.offset,
            ..EventReport::default()
        };

        let sample = match MetricSample::decode(&message.payload) {
            Ok(sample) => sample,
            Err(e) => {
                tracing::warn!(
                    offset = message.offset,
                    key = %message.key,
                    error_kind = "data",
                    error = %e,
                    "Dropping malformed telemetry event",
                );
                return report;
            }
        };
        report.decoded = true;

        // Best-effort: evaluation proceeds even if the sample is not stored.
        match self.gateway.store_metric(&sample).await {
            Ok(()) => report.metric_stored = true,
            Err(e) => tracing::error!(
                offset = message.offset,
                node_id = %sample.node_id,
                gpu_index = sample.gpu_index,
                error_kind = e.error_kind(),
                error = %e,
                "Failed to store metric",
            ),
        }

        let candidates = rules::evaluate(&sample);
        report.candidates = candidates.len();

        for candidate in &candidates {
            let alert = match self.gateway.create_alert(candidate).await {
                Ok(alert) => alert,
                Err(e) => {
                    tracing::error!(
                        node_id = %candidate.node_id,
                        gpu_index = candidate.gpu_index,
                        alert_type = %candidate.alert_type.as_str(),
                        error_kind = e.error_kind(),
                        error = %e,
                        "Failed to create alert",
                    );
                    report.failures += 1;
                    continue;
                }
            };
            report.alerts_created += 1;
            tracing::info!(
                alert_id = alert.id,
                node_id = %alert.node_id,
                gpu_index = alert.gpu_index,
                alert_type = %alert.alert_type,
                severity = %alert.severity,
                actual_value = alert.actual_value,
                "Created alert",
            );

            match self.dispatcher.dispatch(&alert).await {
                Ok(_) => report.actions_recorded += 1,
                // Already reported by the dispatcher.
                Err(e @ DispatchError::Gateway(_)) => {
                    tracing::debug!(alert_id = alert.id, error = %e, "Alert action not recorded");
                    report.failures += 1;
                }
                Err(e) => {
                    tracing::error!(
                        alert_id = alert.id,
                        severity = %alert.severity,
                        error_kind = e.error_kind(),
                        error = %e,
                        "Alert dispatch failed",
                    );
                    report.failures += 1;
                }
            }
        }

        tracing::debug!(
            offset = report.offset,
            candidates = report.candidates,
            alerts_created = report.alerts_created,
            failures = report.failures,
            "Processed telemetry event",
        );
        report
    }
}
