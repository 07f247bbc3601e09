//! Telemetry producer for the alert engine.
//!
//! Generates simulated per-GPU readings for a configured set of nodes and
//! publishes each one onto the telemetry topic.

pub mod config;
pub mod publisher;
pub mod simulator;
