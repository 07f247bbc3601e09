//! Helpers for reading typed settings from environment variables.
//!
//! Binaries build their config through an [`EnvSource`], so parsing can be
//! tested against a plain map instead of the process environment.

use std::collections::HashMap;
use std::str::FromStr;

/// A setting was missing or could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Source of raw string settings.
pub trait EnvSource {
    fn get(&self, name: &str) -> Option<String>;

    /// A required setting.
    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.get(name)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing(name))
    }

    /// An optional setting; blank counts as unset.
    fn optional(&self, name: &str) -> Option<String> {
        self.get(name).filter(|v| !v.trim().is_empty())
    }

    /// A string setting with a default.
    fn string_or(&self, name: &str, default: &str) -> String {
        self.optional(name).unwrap_or_else(|| default.to_string())
    }

    /// A parsed setting with a default.
    fn parse_or<T: FromStr>(&self, name: &'static str, default: T) -> Result<T, ConfigError> {
        match self.optional(name) {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name,
                value: raw,
            }),
            None => Ok(default),
        }
    }

    /// A boolean flag. Accepts `true/false`, `1/0`, and `yes/no`.
    fn flag(&self, name: &'static str, default: bool) -> Result<bool, ConfigError> {
        let Some(raw) = self.optional(name) else {
            return Ok(default);
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(ConfigError::Invalid { name, value: raw }),
        }
    }

    /// A comma-separated list with a default; empty items are dropped.
    fn list_or(&self, name: &str, default: &str) -> Vec<String> {
        self.string_or(name, default)
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Reads from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
