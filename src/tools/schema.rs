//! Gateway operations exposed as tools.
//!
//! [`Gateway`] implements the four read-only operations: `list_tables`,
//! `describe_table`, `get_table_info` and `execute_sql_query`. Every
//! operation returns display text; failures are reported in that text.
//! Table names are checked with [`sanitize_identifier`] before being placed
//! in SQL, and free-form SQL goes through the [`SafetyPolicy`] first.

use crate::db::{QueryExecutor, StatementExecutor};
use crate::models::QueryResult;
use crate::tools::format::{format_query_result, group_thousands};
use crate::tools::guard::{INVALID_TABLE_NAME, SafetyPolicy, sanitize_identifier};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::{info, warn};

/// Input for the execute_sql_query tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExecuteSqlQueryInput {
    /// The SQL query to execute (e.g. "SELECT * FROM users LIMIT 5")
    pub query: String,
}

/// Input for the describe_table and get_table_info tools.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TableNameInput {
    /// Name of the table. Letters, digits, underscores and hyphens only.
    pub table_name: String,
}

const COLUMNS_QUERY: &str = "SELECT COLUMN_NAME, COLUMN_TYPE, IS_NULLABLE, COLUMN_KEY, \
     COLUMN_DEFAULT, EXTRA, COLUMN_COMMENT \
     FROM INFORMATION_SCHEMA.COLUMNS";

const ROW_COUNT_COLUMN: &str = "row_count";

pub struct Gateway<E> {
    executor: E,
    /// Configured database; introspection never follows a session `USE`
    database: String,
    policy: SafetyPolicy,
}

impl<E: StatementExecutor> Gateway<E> {
    pub fn new(executor: E, database: impl Into<String>) -> Self {
        Self {
            executor,
            database: database.into(),
            policy: SafetyPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: SafetyPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn policy(&self) -> SafetyPolicy {
        self.policy
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// List every table in the current database.
    pub async fn list_tables(&self) -> String {
        let result = self.executor.execute("SHOW TABLES").await;
        info!(count = result.row_count(), "Listed tables");
        format_query_result(&result)
    }

    /// Column definitions of one table, comments included.
    pub async fn describe_table(&self, table_name: &str) -> String {
        if !sanitize_identifier(table_name) {
            warn!(table = %table_name, "Rejected table name");
            return INVALID_TABLE_NAME.to_string();
        }

        let sql = format!(
            "{} WHERE TABLE_SCHEMA = {} AND TABLE_NAME = '{}'",
            COLUMNS_QUERY,
            quote_literal(&self.database),
            table_name
        );
        let result = self.executor.execute(&sql).await;
        info!(table = %table_name, columns = result.row_count(), "Described table");
        format_query_result(&result)
    }

    /// Row count plus structure of one table.
    ///
    /// The two statements run one after the other without a transaction, so
    /// the count and the structure may come from slightly different moments.
    pub async fn get_table_info(&self, table_name: &str) -> String {
        if !sanitize_identifier(table_name) {
            warn!(table = %table_name, "Rejected table name");
            return INVALID_TABLE_NAME.to_string();
        }

        let structure = self
            .executor
            .execute(&format!("DESCRIBE `{}`", table_name))
            .await;
        let count = self
            .executor
            .execute(&format!(
                "SELECT COUNT(*) as {} FROM `{}`",
                ROW_COUNT_COLUMN, table_name
            ))
            .await;

        let mut response = format!("Table Information: {}\n\n", table_name);
        if let Some(total) = row_count(&count) {
            response.push_str(&format!("Total Rows: {}\n\n", total));
        }
        response.push_str("Table Structure:\n");
        response.push_str(&format_query_result(&structure));
        response
    }

    /// Run caller-supplied SQL after the safety check.
    ///
    /// Rejected statements never reach the executor.
    pub async fn execute_sql_query(&self, sql: &str) -> String {
        let verdict = self.policy.check(sql);
        if let Some(message) = verdict.rejection_message() {
            warn!(
                keyword = verdict.violated_keyword.unwrap_or(""),
                "Rejected query"
            );
            return message;
        }

        let result = self.executor.execute(sql).await;
        format_query_result(&result)
    }
}

impl Gateway<QueryExecutor> {
    /// Release the pool behind the executor.
    pub async fn close(&self) {
        self.executor.close().await;
    }
}

/// Quote `value` as a MySQL string literal.
fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
}

/// Thousands-grouped count from the first row, if the count query produced one.
fn row_count(result: &QueryResult) -> Option<String> {
    match result.first_value(ROW_COUNT_COLUMN)? {
        JsonValue::Number(n) => n.as_i64().map(group_thousands).or_else(|| Some(n.to_string())),
        JsonValue::String(s) => Some(
            s.parse::<i64>()
                .map(group_thousands)
                .unwrap_or_else(|_| s.clone()),
        ),
        _ => None,
    }
}
