//! `PgGateway` and the full pipeline against a real database.

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use chrono::Utc;
use gpuwatch_core::action::{ActionStatus, ActionType};
use gpuwatch_core::alert::{AlertCandidate, AlertType, Severity};
use gpuwatch_core::node::NodeStatus;
use gpuwatch_core::telemetry::MetricSample;
use gpuwatch_db::models::alert_action::CreateAlertAction;
use gpuwatch_db::repositories::{AlertActionRepo, AlertRepo, GpuMetricRepo, NodeRepo};
use gpuwatch_engine::{
    ActionDispatcher, GatewayError, PersistenceGateway, PgGateway, StreamConsumer,
};
use gpuwatch_events::{LogNotifier, PgTopic, StartOffset, TopicProducer};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

fn sample(node_id: &str, temp: f64) -> MetricSample {
    MetricSample {
        node_id: node_id.to_string(),
        gpu_index: 3,
        temperature_c: temp,
        power_w: 280.0,
        mem_used_mb: 40000.0,
        mem_total_mb: 80000.0,
        utilization_pct: 60.0,
        clock_mhz: 1500,
        collected_at: Utc::now(),
    }
}

fn candidate(node_id: &str, severity: Severity) -> AlertCandidate {
    AlertCandidate {
        node_id: node_id.to_string(),
        gpu_index: 3,
        alert_type: AlertType::HighTemperature,
        severity,
        message: "GPU temperature is 97.0°C".to_string(),
        threshold_value: 90.0,
        actual_value: 97.0,
    }
}

// ---------------------------------------------------------------------------
// Gateway operations
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_store_metric_registers_unknown_node(pool: PgPool) {
    let gateway = PgGateway::new(pool.clone());
    let s = sample("node-new", 70.0);

    gateway.store_metric(&s).await.unwrap();

    let node = NodeRepo::find_by_id(&pool, "node-new").await.unwrap().unwrap();
    assert_eq!(node.hostname, "node-new");
    assert_eq!(node.datacenter, "unknown");
    assert_eq!(node.status, "healthy");
    let metrics = GpuMetricRepo::list_for_node(&pool, "node-new", 10).await.unwrap();
    assert_eq!(metrics.len(), 1);
    assert_eq!(metrics[0].gpu_index, 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_store_metric_never_moves_last_seen_backwards(pool: PgPool) {
    let gateway = PgGateway::new(pool.clone());
    let newer = sample("node-1", 70.0);
    let mut older = sample("node-1", 70.0);
    older.collected_at = newer.collected_at - chrono::Duration::minutes(5);

    gateway.store_metric(&newer).await.unwrap();
    gateway.store_metric(&older).await.unwrap();

    let node = NodeRepo::find_by_id(&pool, "node-1").await.unwrap().unwrap();
    assert_eq!(
        node.last_seen.timestamp_micros(),
        newer.collected_at.timestamp_micros()
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_alert_is_active_with_store_id(pool: PgPool) {
    let gateway = PgGateway::new(pool.clone());
    gateway.store_metric(&sample("node-1", 97.0)).await.unwrap();

    let first = gateway.create_alert(&candidate("node-1", Severity::Critical)).await.unwrap();
    let second = gateway.create_alert(&candidate("node-1", Severity::Critical)).await.unwrap();

    assert_eq!(first.status, "active");
    assert_eq!(first.resolved_at, None);
    assert_ne!(first.id, second.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_alert_for_unknown_node_is_store_error(pool: PgPool) {
    let gateway = PgGateway::new(pool);
    let result = gateway.create_alert(&candidate("ghost", Severity::Warning)).await;
    assert_matches!(result, Err(GatewayError::Store(_)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_set_node_status_on_missing_node_is_not_found(pool: PgPool) {
    let gateway = PgGateway::new(pool);
    let result = gateway.set_node_status("ghost", NodeStatus::Degraded).await;
    assert_matches!(result, Err(GatewayError::NotFound { entity: "Node", .. }));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_resolve_alert(pool: PgPool) {
    let gateway = PgGateway::new(pool.clone());
    gateway.store_metric(&sample("node-1", 97.0)).await.unwrap();
    let alert = gateway.create_alert(&candidate("node-1", Severity::Critical)).await.unwrap();

    let resolved = gateway.resolve_alert(alert.id).await.unwrap();
    assert_eq!(resolved.status, "resolved");
    assert!(resolved.resolved_at.is_some());
    assert_eq!(resolved.threshold_value, alert.threshold_value);
    assert_eq!(resolved.actual_value, alert.actual_value);

    let again = gateway.resolve_alert(alert.id).await.unwrap();
    assert_eq!(again.resolved_at, resolved.resolved_at);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_resolve_missing_alert_is_not_found(pool: PgPool) {
    let gateway = PgGateway::new(pool);
    let err = gateway.resolve_alert(999_999).await.unwrap_err();
    assert_matches!(err, GatewayError::NotFound { entity: "Alert", .. });
    assert_eq!(err.error_kind(), "not_found");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_record_action(pool: PgPool) {
    let gateway = PgGateway::new(pool.clone());
    gateway.store_metric(&sample("node-1", 92.0)).await.unwrap();
    let alert = gateway.create_alert(&candidate("node-1", Severity::Warning)).await.unwrap();

    let record = gateway
        .record_action(&CreateAlertAction {
            alert_id: alert.id,
            action_type: ActionType::Notification,
            action_status: ActionStatus::Executed,
            action_details: serde_json::json!({"action": "send_notification"}),
        })
        .await
        .unwrap();

    assert_eq!(record.alert_id, alert.id);
    assert_eq!(record.action_type, "notification");
    assert_eq!(record.action_details["action"], "send_notification");
}

// ---------------------------------------------------------------------------
// End to end
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_pipeline_over_durable_topic(pool: PgPool) {
    let topic = PgTopic::new(pool.clone(), "gpu-telemetry");
    let critical = sample("node-7", 97.0);
    let malformed_offset = topic.publish("node-7-gpu-3", b"garbage").await.unwrap();
    let offset = topic
        .publish(&critical.message_key(), &critical.encode().unwrap())
        .await
        .unwrap();
    assert!(offset > malformed_offset);

    let consumer = topic
        .consumer("alert-engine", StartOffset::Earliest, Duration::from_millis(10))
        .await
        .unwrap();
    let gateway = Arc::new(PgGateway::new(pool.clone()));
    let dispatcher = ActionDispatcher::new(gateway.clone(), Arc::new(LogNotifier), "slack");
    let stream = StreamConsumer::new(consumer, gateway.clone(), dispatcher);

    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        let topic = topic.clone();
        tokio::spawn(async move {
            while topic.committed_offset("alert-engine").await.unwrap() != Some(offset) {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            cancel.cancel();
        })
    };

    // The stream consumer closes the pool on exit, so read results through a
    // fresh pool from the same database.
    let options = pool.connect_options();
    let stats = tokio::time::timeout(Duration::from_secs(10), stream.run(cancel))
        .await
        .expect("pipeline should drain both events");
    watcher.await.unwrap();
    assert_eq!(stats.events, 2);
    assert_eq!(stats.malformed, 1);

    let pool = PgPool::connect_with((*options).clone()).await.unwrap();
    let node = NodeRepo::find_by_id(&pool, "node-7").await.unwrap().unwrap();
    assert_eq!(node.status, "degraded");

    let alerts = AlertRepo::list_for_node(&pool, "node-7").await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].severity, "critical");

    let actions = AlertActionRepo::list_for_alert(&pool, alerts[0].id).await.unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].action_type, "workload_migration");
    assert_eq!(actions[0].action_status, "executed");
}
