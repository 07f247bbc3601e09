//! Domain types and pure logic for the GPU fleet alert engine.
//!
//! Nothing in this crate touches the database or the network, so every
//! rule and mapping here can be tested in isolation.

pub mod action;
pub mod alert;
pub mod config;
pub mod error;
pub mod node;
pub mod rules;
pub mod telemetry;
pub mod types;
