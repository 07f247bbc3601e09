//! Publish loop: collect a round of samples and push them onto the topic.

use std::time::Duration;

use gpuwatch_events::TopicProducer;
use tokio_util::sync::CancellationToken;

use crate::simulator::Simulator;

/// Outcome of one collection round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundReport {
    /// Samples appended to the topic.
    pub published: usize,
    /// Nodes whose samples could not all be published.
    pub failed: usize,
}

/// Collect and publish one sample per GPU for every node.
///
/// A failure on one node is logged and the remaining nodes are still
/// published.
pub async fn publish_round<P>(
    producer: &P,
    simulator: &Simulator,
    nodes: &[String],
) -> RoundReport
where
    P: TopicProducer + ?Sized,
{
    let mut report = RoundReport::default();

    for node_id in nodes {
        match publish_node(producer, simulator, node_id).await {
            Ok(count) => report.published += count,
            Err(e) => {
                report.failed += 1;
                tracing::error!(node_id = %node_id, error = %e, "Failed to publish node metrics");
            }
        }
    }

    tracing::debug!(
        published = report.published,
        failed_nodes = report.failed,
        "Published metric round",
    );
    report
}

async fn publish_node<P>(
    producer: &P,
    simulator: &Simulator,
    node_id: &str,
) -> anyhow::Result<usize>
where
    P: TopicProducer + ?Sized,
{
    let samples = simulator.collect(node_id);
    for sample in &samples {
        let payload = sample.encode()?;
        producer.publish(&sample.message_key(), &payload).await?;
    }
    Ok(samples.len())
}

/// Publish a round immediately and then every `interval` until `cancel` fires.
pub async fn run<P>(
    producer: &P,
    simulator: &Simulator,
    nodes: &[String],
    interval: Duration,
    cancel: CancellationToken,
) where
    P: TopicProducer + ?Sized,
{
    tracing::info!(
        nodes = nodes.len(),
        gpus_per_node = simulator.gpus_per_node(),
        interval_secs = interval.as_secs(),
        "Collector started",
    );

    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Collector shutting down");
                break;
            }
            _ = ticker.tick() => {
                publish_round(producer, simulator, nodes).await;
            }
        }
    }
}
