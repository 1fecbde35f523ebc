//! Database access layer.
//!
//! This module provides:
//! - Connection pool management (open, probe, close)
//! - Statement execution with error absorption
//! - MySQL row decoding

pub mod executor;
pub mod pool;
pub mod types;

pub use executor::{QueryExecutor, StatementExecutor, is_row_producing};
pub use pool::{PoolHandle, close_pool};
pub use types::RowToJson;
