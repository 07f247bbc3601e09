pub mod alert;
pub mod alert_action;
pub mod metric;
pub mod node;
pub mod telemetry_message;
