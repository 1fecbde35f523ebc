//! Query-related data models.
//!
//! This module defines the outcome of running one statement and the verdict
//! of the safety filter.

use crate::error::DbError;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Default query timeout in seconds.
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;

pub const STATUS_SUCCESS: &str = "Query executed successfully";
pub const STATUS_NO_CONNECTION: &str = "No database connection available";

/// One result row: column name to value, in the order the server sent the columns.
pub type Row = serde_json::Map<String, JsonValue>;

/// Rows (possibly none) plus a status line. The status is always set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub rows: Vec<Row>,
    pub status_message: String,
}

impl QueryResult {
    /// Result of a row-producing statement.
    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            rows,
            status_message: STATUS_SUCCESS.to_string(),
        }
    }

    /// Result of a mutation: no rows, affected count in the status.
    pub fn affected(rows_affected: u64) -> Self {
        Self {
            rows: Vec::new(),
            status_message: format!("{}. {} rows affected.", STATUS_SUCCESS, rows_affected),
        }
    }

    /// A pure status result with no rows.
    pub fn status(message: impl Into<String>) -> Self {
        Self {
            rows: Vec::new(),
            status_message: message.into(),
        }
    }

    pub fn no_connection() -> Self {
        Self::status(STATUS_NO_CONNECTION)
    }

    /// Absorb an execution failure into a status string.
    pub fn from_error(err: &DbError) -> Self {
        match err {
            DbError::NoConnection => Self::no_connection(),
            other => Self::status(format!("Error executing query: {}", other.display_message())),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First value of the named column in the first row.
    pub fn first_value(&self, column: &str) -> Option<&JsonValue> {
        self.rows.first().and_then(|row| row.get(column))
    }
}

/// Outcome of screening raw SQL before execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyVerdict {
    pub allowed: bool,
    /// The deny-listed keyword that caused the rejection.
    pub violated_keyword: Option<&'static str>,
    /// Why the structural check rejected the statement, when it did.
    pub reason: Option<String>,
}

impl SafetyVerdict {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            violated_keyword: None,
            reason: None,
        }
    }

    pub fn keyword(keyword: &'static str) -> Self {
        Self {
            allowed: false,
            violated_keyword: Some(keyword),
            reason: None,
        }
    }

    pub fn structural(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            violated_keyword: None,
            reason: Some(reason.into()),
        }
    }

    /// User-facing explanation for a rejected statement.
    pub fn rejection_message(&self) -> Option<String> {
        if self.allowed {
            return None;
        }
        Some(match (self.violated_keyword, &self.reason) {
            (Some(keyword), _) => format!(
                "Query contains forbidden keyword '{}'. Only SELECT, SHOW, and DESCRIBE queries are allowed for safety.",
                keyword
            ),
            (None, Some(reason)) => format!(
                "Query rejected: {}. Only SELECT, SHOW, and DESCRIBE queries are allowed for safety.",
                reason
            ),
            (None, None) => {
                "Query rejected. Only SELECT, SHOW, and DESCRIBE queries are allowed for safety."
                    .to_string()
            }
        })
    }
}
