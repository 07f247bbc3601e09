//! Integration tests for the node, metric, alert, and alert-action
//! repositories against a real database.

use chrono::{Duration, Utc};
use gpuwatch_core::action::{ActionStatus, ActionType};
use gpuwatch_core::alert::{AlertCandidate, AlertType, Severity};
use gpuwatch_core::node::NodeStatus;
use gpuwatch_core::telemetry::MetricSample;
use gpuwatch_core::types::Timestamp;
use gpuwatch_db::models::alert_action::CreateAlertAction;
use gpuwatch_db::models::node::CreateNode;
use gpuwatch_db::repositories::{AlertActionRepo, AlertRepo, GpuMetricRepo, NodeRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn sample(node_id: &str, gpu_index: i32, temp: f64, collected_at: Timestamp) -> MetricSample {
    MetricSample {
        node_id: node_id.to_string(),
        gpu_index,
        temperature_c: temp,
        power_w: 280.0,
        mem_used_mb: 40000.0,
        mem_total_mb: 80000.0,
        utilization_pct: 75.0,
        clock_mhz: 1500,
        collected_at,
    }
}

fn candidate(node_id: &str, severity: Severity) -> AlertCandidate {
    AlertCandidate {
        node_id: node_id.to_string(),
        gpu_index: 0,
        alert_type: AlertType::HighTemperature,
        severity,
        message: "GPU temperature is 96.0°C".to_string(),
        threshold_value: 90.0,
        actual_value: 96.0,
    }
}

async fn register(pool: &PgPool, node_id: &str) {
    NodeRepo::create(
        pool,
        &CreateNode {
            node_id: node_id.to_string(),
            hostname: format!("{node_id}.dc1.internal"),
            datacenter: "dc1".to_string(),
        },
    )
    .await
    .expect("node registration should succeed");
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn touch_registers_unknown_node(pool: PgPool) {
    let seen = Utc::now();
    NodeRepo::touch(&pool, "node-9", seen).await.unwrap();

    let node = NodeRepo::find_by_id(&pool, "node-9")
        .await
        .unwrap()
        .expect("node should exist after touch");
    assert_eq!(node.hostname, "node-9");
    assert_eq!(node.datacenter, "unknown");
    assert_eq!(node.status, "healthy");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn touch_never_moves_last_seen_backwards(pool: PgPool) {
    register(&pool, "node-1").await;
    let now = Utc::now();
    NodeRepo::touch(&pool, "node-1", now).await.unwrap();
    NodeRepo::touch(&pool, "node-1", now - Duration::hours(1))
        .await
        .unwrap();

    let node = NodeRepo::find_by_id(&pool, "node-1").await.unwrap().unwrap();
    assert_eq!(node.last_seen.timestamp_micros(), now.timestamp_micros());
    // Registration data is kept.
    assert_eq!(node.datacenter, "dc1");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn set_status_reports_missing_node(pool: PgPool) {
    register(&pool, "node-1").await;

    let updated = NodeRepo::set_status(&pool, "node-1", NodeStatus::Degraded)
        .await
        .unwrap();
    assert_eq!(updated, 1);
    let node = NodeRepo::find_by_id(&pool, "node-1").await.unwrap().unwrap();
    assert_eq!(node.status, "degraded");

    let missing = NodeRepo::set_status(&pool, "ghost", NodeStatus::Degraded)
        .await
        .unwrap();
    assert_eq!(missing, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn node_health_counts_only_active_alerts(pool: PgPool) {
    register(&pool, "node-1").await;
    register(&pool, "node-2").await;

    let first = AlertRepo::create(&pool, &candidate("node-1", Severity::Warning))
        .await
        .unwrap();
    AlertRepo::create(&pool, &candidate("node-1", Severity::Critical))
        .await
        .unwrap();
    AlertRepo::resolve(&pool, first.id).await.unwrap();

    let nodes = NodeRepo::list_health(&pool).await.unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0].node_id, "node-1");
    assert_eq!(nodes[0].active_alerts, 1);
    assert_eq!(nodes[1].node_id, "node-2");
    assert_eq!(nodes[1].active_alerts, 0);

    let single = NodeRepo::get_health(&pool, "node-2").await.unwrap().unwrap();
    assert_eq!(single.active_alerts, 0);
    assert!(NodeRepo::get_health(&pool, "ghost").await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn metrics_listed_newest_first_with_limit(pool: PgPool) {
    register(&pool, "node-1").await;
    let now = Utc::now();
    for i in 0..5 {
        let collected_at = now - Duration::seconds(60 - i);
        GpuMetricRepo::insert(&pool, &sample("node-1", 0, 60.0 + i as f64, collected_at))
            .await
            .unwrap();
    }

    let rows = GpuMetricRepo::list_for_node(&pool, "node-1", 3).await.unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].temperature_c, 64.0);
    assert_eq!(rows[2].temperature_c, 62.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn latest_view_returns_one_row_per_node_gpu(pool: PgPool) {
    register(&pool, "node-1").await;
    register(&pool, "node-2").await;
    let now = Utc::now();

    GpuMetricRepo::insert(&pool, &sample("node-1", 0, 60.0, now - Duration::seconds(30)))
        .await
        .unwrap();
    GpuMetricRepo::insert(&pool, &sample("node-1", 0, 75.0, now))
        .await
        .unwrap();
    GpuMetricRepo::insert(&pool, &sample("node-1", 1, 50.0, now))
        .await
        .unwrap();
    GpuMetricRepo::insert(&pool, &sample("node-2", 0, 55.0, now))
        .await
        .unwrap();

    let latest = GpuMetricRepo::get_latest(&pool).await.unwrap();
    assert_eq!(latest.len(), 3);
    assert_eq!(latest[0].node_id, "node-1");
    assert_eq!(latest[0].gpu_index, 0);
    assert_eq!(latest[0].temperature_c, 75.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_older_than_purges_only_old_rows(pool: PgPool) {
    register(&pool, "node-1").await;
    let now = Utc::now();
    GpuMetricRepo::insert(&pool, &sample("node-1", 0, 60.0, now - Duration::hours(48)))
        .await
        .unwrap();
    GpuMetricRepo::insert(&pool, &sample("node-1", 0, 61.0, now))
        .await
        .unwrap();

    let deleted = GpuMetricRepo::delete_older_than(&pool, now - Duration::hours(24))
        .await
        .unwrap();
    assert_eq!(deleted, 1);
    let remaining = GpuMetricRepo::list_for_node(&pool, "node-1", 10).await.unwrap();
    assert_eq!(remaining.len(), 1);
}

// ---------------------------------------------------------------------------
// Alerts and actions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_candidates_create_distinct_rows(pool: PgPool) {
    register(&pool, "node-1").await;
    let c = candidate("node-1", Severity::Critical);

    let a = AlertRepo::create(&pool, &c).await.unwrap();
    let b = AlertRepo::create(&pool, &c).await.unwrap();

    assert_ne!(a.id, b.id);
    assert_eq!(a.severity, b.severity);
    assert_eq!(a.message, b.message);
    assert_eq!(a.actual_value, b.actual_value);
    assert_eq!(a.status, "active");
    assert!(a.resolved_at.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn resolve_sets_status_and_keeps_values(pool: PgPool) {
    register(&pool, "node-1").await;
    let alert = AlertRepo::create(&pool, &candidate("node-1", Severity::Warning))
        .await
        .unwrap();

    let resolved = AlertRepo::resolve(&pool, alert.id).await.unwrap().unwrap();
    assert_eq!(resolved.status, "resolved");
    assert!(resolved.resolved_at.is_some());
    assert_eq!(resolved.threshold_value, alert.threshold_value);
    assert_eq!(resolved.actual_value, alert.actual_value);

    let again = AlertRepo::resolve(&pool, alert.id).await.unwrap().unwrap();
    assert_eq!(again.resolved_at, resolved.resolved_at);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn resolve_missing_alert_returns_none(pool: PgPool) {
    assert!(AlertRepo::resolve(&pool, 424_242).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn active_alerts_list_critical_first(pool: PgPool) {
    register(&pool, "node-1").await;
    AlertRepo::create(&pool, &candidate("node-1", Severity::Warning))
        .await
        .unwrap();
    AlertRepo::create(&pool, &candidate("node-1", Severity::Critical))
        .await
        .unwrap();
    let later_warning = AlertRepo::create(&pool, &candidate("node-1", Severity::Warning))
        .await
        .unwrap();

    let active = AlertRepo::list_active(&pool).await.unwrap();
    let severities: Vec<_> = active.iter().map(|a| a.severity.as_str()).collect();
    assert_eq!(severities, vec!["critical", "warning", "warning"]);
    assert_eq!(active[1].id, later_warning.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn actions_recorded_per_alert(pool: PgPool) {
    register(&pool, "node-1").await;
    let alert = AlertRepo::create(&pool, &candidate("node-1", Severity::Critical))
        .await
        .unwrap();

    let action = AlertActionRepo::create(
        &pool,
        &CreateAlertAction {
            alert_id: alert.id,
            action_type: ActionType::WorkloadMigration,
            action_status: ActionStatus::Executed,
            action_details: serde_json::json!({"action": "migrate_workloads"}),
        },
    )
    .await
    .unwrap();

    assert_eq!(action.action_type, "workload_migration");
    assert_eq!(action.action_status, "executed");

    let listed = AlertActionRepo::list_for_alert(&pool, alert.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].action_details["action"], "migrate_workloads");
}
