use std::sync::Arc;

use gpuwatch_engine::PgGateway;

use crate::config::ServerConfig;

/// Shared application state available to all handlers via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub pool: gpuwatch_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Write path shared with the alert engine (alert resolution).
    pub gateway: PgGateway,
}

impl AppState {
    pub fn new(pool: gpuwatch_db::DbPool, config: ServerConfig) -> Self {
        Self {
            gateway: PgGateway::new(pool.clone()),
            pool,
            config: Arc::new(config),
        }
    }
}
