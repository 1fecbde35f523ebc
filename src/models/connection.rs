//! Connection-related data models.
//!
//! This module defines the immutable settings the connection pool is built from.

use crate::error::ConnectionError;
use serde::{Deserialize, Serialize};

// Pool configuration defaults
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_MIN_CONNECTIONS: u32 = 1;
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Where and as whom to connect. Immutable once the pool is open.
#[derive(Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    /// Contains sensitive data - never log
    #[serde(skip_serializing)]
    pub password: String,
    pub database: String,
}

impl PoolConfig {
    /// Build a config, rejecting empty required fields.
    ///
    /// Every missing field is reported in a single error so the operator can
    /// fix the environment in one pass. The password may be empty.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Result<Self, ConnectionError> {
        let config = Self {
            host: host.into(),
            port,
            user: user.into(),
            password: password.into(),
            database: database.into(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConnectionError> {
        let missing: Vec<&str> = [
            ("host", self.host.trim().is_empty()),
            ("user", self.user.trim().is_empty()),
            ("database", self.database.trim().is_empty()),
        ]
        .into_iter()
        .filter_map(|(name, empty)| empty.then_some(name))
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConnectionError::invalid_config(format!(
                "Missing required MySQL configuration: {}",
                missing.join(", ")
            )))
        }
    }

    /// Display-safe connection target (no credentials).
    pub fn masked(&self) -> String {
        format!("mysql://{}@{}:{}/{}", self.user, self.host, self.port, self.database)
    }
}

impl std::fmt::Debug for PoolConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

/// Connection pool sizing and timeouts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PoolOptions {
    pub min_connections: u32,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            min_connections: DEFAULT_MIN_CONNECTIONS,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

impl PoolOptions {
    /// Validate pool options and return an error message if invalid.
    pub fn validate(&self) -> Result<(), ConnectionError> {
        if self.max_connections == 0 {
            return Err(ConnectionError::invalid_config(
                "max_connections must be greater than 0",
            ));
        }
        if self.min_connections > self.max_connections {
            return Err(ConnectionError::invalid_config(format!(
                "min_connections ({}) cannot exceed max_connections ({})",
                self.min_connections, self.max_connections
            )));
        }
        if self.acquire_timeout_secs == 0 {
            return Err(ConnectionError::invalid_config(
                "acquire_timeout must be greater than 0",
            ));
        }
        Ok(())
    }
}
