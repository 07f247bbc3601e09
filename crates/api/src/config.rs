use axum::http::HeaderValue;
use gpuwatch_core::config::{ConfigError, EnvSource, ProcessEnv};

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub database_url: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `8080`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `DATABASE_URL`         | required                   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&ProcessEnv)
    }

    pub fn from_source(env: &impl EnvSource) -> Result<Self, ConfigError> {
        let cors_origins = env.list_or("CORS_ORIGINS", "http://localhost:5173");
        if let Some(bad) = cors_origins
            .iter()
            .find(|o| HeaderValue::from_str(o).is_err())
        {
            return Err(ConfigError::Invalid {
                name: "CORS_ORIGINS",
                value: bad.clone(),
            });
        }

        Ok(Self {
            host: env.string_or("HOST", "0.0.0.0"),
            port: env.parse_or("PORT", 8080)?,
            cors_origins,
            request_timeout_secs: env.parse_or("REQUEST_TIMEOUT_SECS", 30)?,
            database_url: env.required("DATABASE_URL")?,
        })
    }
}
