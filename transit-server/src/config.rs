//! Server configuration from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::planner::SearchConfig;

pub const FEED_PATH_VAR: &str = "TRANSIT_FEED_PATH";
pub const LISTEN_ADDR_VAR: &str = "TRANSIT_LISTEN_ADDR";
pub const MAX_TRANSFERS_VAR: &str = "TRANSIT_MAX_TRANSFERS";
pub const MAX_ALTERNATIVES_VAR: &str = "TRANSIT_MAX_ALTERNATIVES";

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";

/// Errors reading the server configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be set")]
    Missing { name: &'static str },

    #[error("{name} has invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Everything the binary needs to start serving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// JSON feed loaded at startup and on reload
    pub feed_path: PathBuf,
    pub listen_addr: SocketAddr,
    pub search: SearchConfig,
}

impl ServerConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`, which returns a variable's
    /// value if it is set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let feed_path = lookup(FEED_PATH_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .ok_or(ConfigError::Missing {
                name: FEED_PATH_VAR,
            })?;

        let listen_addr = parse_var(
            LISTEN_ADDR_VAR,
            lookup(LISTEN_ADDR_VAR).unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string()),
        )?;

        let defaults = SearchConfig::default();
        let max_transfers = match lookup(MAX_TRANSFERS_VAR) {
            Some(value) => parse_var(MAX_TRANSFERS_VAR, value)?,
            None => defaults.max_transfers,
        };
        let max_alternatives = match lookup(MAX_ALTERNATIVES_VAR) {
            Some(value) => parse_var(MAX_ALTERNATIVES_VAR, value)?,
            None => defaults.max_alternatives,
        };

        if max_transfers > defaults.transfer_limit {
            return Err(ConfigError::Invalid {
                name: MAX_TRANSFERS_VAR,
                value: max_transfers.to_string(),
                reason: format!("must be at most {}", defaults.transfer_limit),
            });
        }
        if max_alternatives == 0 || max_alternatives > defaults.alternatives_limit {
            return Err(ConfigError::Invalid {
                name: MAX_ALTERNATIVES_VAR,
                value: max_alternatives.to_string(),
                reason: format!("must be between 1 and {}", defaults.alternatives_limit),
            });
        }

        Ok(Self {
            feed_path,
            listen_addr,
            search: SearchConfig {
                max_transfers,
                max_alternatives,
                ..defaults
            },
        })
    }
}

fn parse_var<T>(name: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        reason: e.to_string(),
        value,
    })
}
