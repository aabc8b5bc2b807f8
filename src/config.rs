use std::net::SocketAddr;

use thiserror::Error;

use kommentar_core::ActionHash;
use kommentar_refresh::DEFAULT_SIGNAL_CAPACITY;

/// Service configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub post_hash: ActionHash,
    pub store_url: String,
    pub role_name: String,
    pub listen_addr: SocketAddr,
    pub signal_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables.
    /// KOMMENTAR_POST_HASH is required.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Load configuration through `var`, which maps a variable name to its value.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let post_hash = var("KOMMENTAR_POST_HASH")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("KOMMENTAR_POST_HASH"))?
            .trim()
            .parse::<ActionHash>()
            .map_err(|_| {
                ConfigError::Invalid("KOMMENTAR_POST_HASH", "must be an action hash (uhCkk...)")
            })?;

        let store_url =
            var("KOMMENTAR_STORE_URL").unwrap_or_else(|| "http://127.0.0.1:8888".to_string());

        let role_name = var("KOMMENTAR_ROLE_NAME").unwrap_or_else(|| "forum".to_string());

        let listen_addr = var("KOMMENTAR_LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .parse()
            .map_err(|_| {
                ConfigError::Invalid("KOMMENTAR_LISTEN_ADDR", "must be a valid socket address")
            })?;

        let signal_capacity = match var("KOMMENTAR_SIGNAL_CAPACITY") {
            Some(s) => s
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid(
                    "KOMMENTAR_SIGNAL_CAPACITY",
                    "must be a positive integer",
                ))?,
            None => DEFAULT_SIGNAL_CAPACITY,
        };

        Ok(Config {
            post_hash,
            store_url,
            role_name,
            listen_addr,
            signal_capacity,
        })
    }

    /// Create a test configuration.
    #[cfg(test)]
    pub fn for_testing() -> Self {
        Config {
            post_hash: ActionHash::fake(1),
            store_url: "http://127.0.0.1:8888".to_string(),
            role_name: "forum".to_string(),
            listen_addr: "127.0.0.1:0".parse().unwrap(),
            signal_capacity: 16,
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}
