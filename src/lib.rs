//! MySQL Query Gateway Library
//!
//! Read-only access to one MySQL database for AI assistants: a shared
//! connection pool, a statement executor that never fails, a keyword safety
//! filter, a plain-text result formatter and the four tools built on them.

pub mod config;
pub mod db;
pub mod error;
pub mod mcp;
pub mod models;
pub mod tools;
pub mod transport;

pub use config::Config;
pub use error::{ConnectionError, DbError};
pub use mcp::GatewayService;
pub use tools::Gateway;
