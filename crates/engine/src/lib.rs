//! The streaming alert-evaluation and remediation engine.
//!
//! [`StreamConsumer`] reads telemetry events, evaluates them with
//! [`gpuwatch_core::rules`], persists results through a
//! [`PersistenceGateway`], and hands each new alert to the
//! [`ActionDispatcher`].

pub mod config;
pub mod consumer;
pub mod dispatcher;
pub mod gateway;
pub mod retention;

pub use config::EngineConfig;
pub use consumer::{ConsumerStats, EventReport, StreamConsumer};
pub use dispatcher::{ActionDispatcher, DispatchError};
pub use gateway::{GatewayError, PersistenceGateway, PgGateway};
