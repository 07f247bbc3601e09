pub mod alerts;
pub mod metrics;
pub mod nodes;
