//! Data models for the query gateway.
//!
//! This module re-exports all model types used throughout the application.

pub mod connection;
pub mod query;

// Re-export commonly used types
pub use connection::{
    DEFAULT_ACQUIRE_TIMEOUT_SECS, DEFAULT_MAX_CONNECTIONS, DEFAULT_MIN_CONNECTIONS, PoolConfig,
    PoolOptions,
};
pub use query::{
    DEFAULT_QUERY_TIMEOUT_SECS, QueryResult, Row, STATUS_NO_CONNECTION, STATUS_SUCCESS,
    SafetyVerdict,
};
