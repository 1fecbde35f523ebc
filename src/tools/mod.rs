//! Gateway tools.
//!
//! - `guard`: keyword deny-list and table name sanitizer
//! - `sql_validator`: parser-based read-only check used in strict mode
//! - `format`: text rendering of query results
//! - `schema`: the four gateway operations

pub mod format;
pub mod guard;
pub mod schema;
pub mod sql_validator;

pub use format::{format_query_result, group_thousands};
pub use guard::{SafetyPolicy, check_query, sanitize_identifier};
pub use schema::{ExecuteSqlQueryInput, Gateway, TableNameInput};
