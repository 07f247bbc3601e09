//! Test doubles for the engine: an in-memory store behind the
//! `PersistenceGateway` trait and a notifier that records what it sends.
//! Both support fault injection.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use gpuwatch_core::alert::{AlertCandidate, AlertStatus, AlertType};
use gpuwatch_core::node::NodeStatus;
use gpuwatch_core::telemetry::MetricSample;
use gpuwatch_core::types::DbId;
use gpuwatch_db::models::alert::Alert;
use gpuwatch_db::models::alert_action::{AlertAction, CreateAlertAction};
use gpuwatch_engine::{ActionDispatcher, GatewayError, PersistenceGateway};
use gpuwatch_events::{Notification, Notifier, NotifyError};

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct StoreState {
    pub metrics: Vec<MetricSample>,
    pub nodes: HashMap<String, NodeStatus>,
    pub alerts: Vec<Alert>,
    pub actions: Vec<AlertAction>,
    next_id: DbId,
}

impl StoreState {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }
}

/// Which gateway operations should fail.
#[derive(Debug, Default)]
pub struct Faults {
    pub store_metric: bool,
    /// Fail `create_alert` for candidates of this type only.
    pub create_alert_for: Option<AlertType>,
    pub set_node_status: bool,
    pub record_action: bool,
    /// Delay inside `store_metric`, to hold an event in flight.
    pub store_delay: Option<Duration>,
}

#[derive(Debug, Default)]
pub struct MemoryGateway {
    pub state: Mutex<StoreState>,
    pub faults: Mutex<Faults>,
    closed: AtomicBool,
}

fn injected() -> GatewayError {
    GatewayError::Store(sqlx::Error::PoolTimedOut)
}

impl MemoryGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_faults(faults: Faults) -> Arc<Self> {
        Arc::new(Self {
            faults: Mutex::new(faults),
            ..Self::default()
        })
    }

    /// Register a node as healthy.
    pub fn add_node(&self, node_id: &str) {
        self.state
            .lock()
            .unwrap()
            .nodes
            .insert(node_id.to_string(), NodeStatus::Healthy);
    }

    pub fn node_status(&self, node_id: &str) -> Option<NodeStatus> {
        self.state.lock().unwrap().nodes.get(node_id).copied()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.state.lock().unwrap().alerts.clone()
    }

    pub fn actions(&self) -> Vec<AlertAction> {
        self.state.lock().unwrap().actions.clone()
    }

    pub fn metric_count(&self) -> usize {
        self.state.lock().unwrap().metrics.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Insert an alert directly, bypassing rule evaluation.
    pub fn insert_alert(&self, node_id: &str, severity: &str, message: &str) -> Alert {
        let mut state = self.state.lock().unwrap();
        let alert = Alert {
            id: state.next_id(),
            node_id: node_id.to_string(),
            gpu_index: 0,
            alert_type: AlertType::HighTemperature.as_str().to_string(),
            severity: severity.to_string(),
            message: message.to_string(),
            threshold_value: 90.0,
            actual_value: 97.0,
            status: AlertStatus::Active.as_str().to_string(),
            triggered_at: Utc::now(),
            resolved_at: None,
        };
        state.alerts.push(alert.clone());
        alert
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn store_metric(&self, sample: &MetricSample) -> Result<(), GatewayError> {
        let (fail, delay) = {
            let faults = self.faults.lock().unwrap();
            (faults.store_metric, faults.store_delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(injected());
        }
        let mut state = self.state.lock().unwrap();
        state
            .nodes
            .entry(sample.node_id.clone())
            .or_insert(NodeStatus::Healthy);
        state.metrics.push(sample.clone());
        Ok(())
    }

    async fn create_alert(&self, candidate: &AlertCandidate) -> Result<Alert, GatewayError> {
        if self.faults.lock().unwrap().create_alert_for == Some(candidate.alert_type) {
            return Err(injected());
        }
        let mut state = self.state.lock().unwrap();
        let alert = Alert {
            id: state.next_id(),
            node_id: candidate.node_id.clone(),
            gpu_index: candidate.gpu_index,
            alert_type: candidate.alert_type.as_str().to_string(),
            severity: candidate.severity.as_str().to_string(),
            message: candidate.message.clone(),
            threshold_value: candidate.threshold_value,
            actual_value: candidate.actual_value,
            status: AlertStatus::Active.as_str().to_string(),
            triggered_at: Utc::now(),
            resolved_at: None,
        };
        state.alerts.push(alert.clone());
        Ok(alert)
    }

    async fn set_node_status(
        &self,
        node_id: &str,
        status: NodeStatus,
    ) -> Result<(), GatewayError> {
        if self.faults.lock().unwrap().set_node_status {
            return Err(injected());
        }
        match self.state.lock().unwrap().nodes.get_mut(node_id) {
            Some(current) => {
                *current = status;
                Ok(())
            }
            None => Err(GatewayError::NotFound {
                entity: "Node",
                id: node_id.to_string(),
            }),
        }
    }

    async fn record_action(
        &self,
        action: &CreateAlertAction,
    ) -> Result<AlertAction, GatewayError> {
        if self.faults.lock().unwrap().record_action {
            return Err(injected());
        }
        let mut state = self.state.lock().unwrap();
        let record = AlertAction {
            id: state.next_id(),
            alert_id: action.alert_id,
            action_type: action.action_type.as_str().to_string(),
            action_status: action.action_status.as_str().to_string(),
            action_details: action.action_details.clone(),
            executed_at: Utc::now(),
        };
        state.actions.push(record.clone());
        Ok(record)
    }

    async fn resolve_alert(&self, alert_id: DbId) -> Result<Alert, GatewayError> {
        let mut state = self.state.lock().unwrap();
        let alert = state
            .alerts
            .iter_mut()
            .find(|a| a.id == alert_id)
            .ok_or_else(|| GatewayError::NotFound {
                entity: "Alert",
                id: alert_id.to_string(),
            })?;
        alert.status = AlertStatus::Resolved.as_str().to_string();
        if alert.resolved_at.is_none() {
            alert.resolved_at = Some(Utc::now());
        }
        Ok(alert.clone())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Notification>>,
    pub fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        let notifier = Self::default();
        notifier.fail.store(true, Ordering::SeqCst);
        Arc::new(notifier)
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotifyError::HttpStatus(503));
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn dispatcher(
    gateway: &Arc<MemoryGateway>,
    notifier: &Arc<RecordingNotifier>,
) -> ActionDispatcher {
    ActionDispatcher::new(gateway.clone(), notifier.clone(), "slack")
}

/// A sample on `node-1`, GPU 0, with the given readings.
pub fn sample(temp: f64, power: f64, mem_used: f64, mem_total: f64) -> MetricSample {
    MetricSample {
        node_id: "node-1".to_string(),
        gpu_index: 0,
        temperature_c: temp,
        power_w: power,
        mem_used_mb: mem_used,
        mem_total_mb: mem_total,
        utilization_pct: 80.0,
        clock_mhz: 1500,
        collected_at: Utc::now(),
    }
}

/// A sample within every threshold.
pub fn healthy_sample() -> MetricSample {
    sample(70.0, 280.0, 40000.0, 80000.0)
}
