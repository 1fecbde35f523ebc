//! Query execution engine.
//!
//! The executor is the terminal error boundary of the data layer: it borrows a
//! pooled connection, runs one statement and always hands back a
//! [`QueryResult`]. Failures of any kind (no pool, acquire timeout, syntax or
//! permission errors, statement timeout) become the result's status message.
//!
//! Statements are classified by their leading keyword. `SELECT`, `SHOW`,
//! `DESCRIBE` and `DESC` fetch rows; anything else is reported by its
//! affected-row count.

use crate::db::pool::PoolHandle;
use crate::db::types::RowToJson;
use crate::error::{DbError, DbResult};
use crate::models::{DEFAULT_QUERY_TIMEOUT_SECS, QueryResult};
use sqlx::Executor;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Leading keywords of statements that produce rows.
const ROW_PRODUCING_PREFIXES: [&str; 4] = ["SELECT", "SHOW", "DESCRIBE", "DESC"];

/// Anything that can run a single SQL statement and report its outcome.
///
/// Implementations never fail: errors are folded into the returned status.
pub trait StatementExecutor: Send + Sync {
    fn execute(&self, sql: &str) -> impl Future<Output = QueryResult> + Send;
}

/// True when the statement's leading keyword marks it as row-producing.
pub fn is_row_producing(sql: &str) -> bool {
    let head = sql.trim_start();
    ROW_PRODUCING_PREFIXES.iter().any(|prefix| {
        head.get(..prefix.len())
            .is_some_and(|start| start.eq_ignore_ascii_case(prefix))
    })
}

/// Executes statements against the shared MySQL pool.
#[derive(Debug, Clone)]
pub struct QueryExecutor {
    pool: Option<PoolHandle>,
    query_timeout: Duration,
    log_queries: bool,
}

impl QueryExecutor {
    /// Create an executor over an open pool.
    pub fn new(pool: PoolHandle) -> Self {
        Self {
            pool: Some(pool),
            query_timeout: Duration::from_secs(DEFAULT_QUERY_TIMEOUT_SECS),
            log_queries: false,
        }
    }

    /// Create an executor with no pool; every statement reports that no
    /// connection is available.
    pub fn disconnected() -> Self {
        Self {
            pool: None,
            query_timeout: Duration::from_secs(DEFAULT_QUERY_TIMEOUT_SECS),
            log_queries: false,
        }
    }

    pub fn with_query_timeout(mut self, timeout_secs: u64) -> Self {
        self.query_timeout = Duration::from_secs(timeout_secs);
        self
    }

    /// Log every statement at info level instead of debug.
    pub fn with_query_logging(mut self, enabled: bool) -> Self {
        self.log_queries = enabled;
        self
    }

    pub fn pool(&self) -> Option<&PoolHandle> {
        self.pool.as_ref()
    }

    /// Close the underlying pool, if any.
    pub async fn close(&self) {
        crate::db::pool::close_pool(self.pool.as_ref()).await;
    }

    /// Run one statement, propagating failures.
    pub async fn run(&self, sql: &str) -> DbResult<QueryResult> {
        let pool = self
            .pool
            .as_ref()
            .filter(|p| !p.is_closed())
            .ok_or(DbError::NoConnection)?;

        if self.log_queries {
            info!(sql = %sql, "Executing query");
        } else {
            debug!(sql = %sql, "Executing query");
        }

        let start = Instant::now();
        let result = match timeout(self.query_timeout, run_statement(pool, sql)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(DbError::timeout(
                    "query execution",
                    self.query_timeout.as_secs(),
                ));
            }
        };

        debug!(
            rows = result.row_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Query completed"
        );
        Ok(result)
    }
}

async fn run_statement(pool: &PoolHandle, sql: &str) -> DbResult<QueryResult> {
    // Returned to the pool when dropped, on every path out of this function
    let mut conn = pool.inner().acquire().await.map_err(|e| match e {
        sqlx::Error::PoolTimedOut => {
            DbError::timeout("connection pool acquire", pool.acquire_timeout().as_secs())
        }
        other => other.into(),
    })?;

    if is_row_producing(sql) {
        let rows = (&mut *conn).fetch_all(sql).await?;
        Ok(QueryResult::with_rows(
            rows.iter().map(|r| r.to_json_map()).collect(),
        ))
    } else {
        let done = (&mut *conn).execute(sql).await?;
        Ok(QueryResult::affected(done.rows_affected()))
    }
}

impl StatementExecutor for QueryExecutor {
    async fn execute(&self, sql: &str) -> QueryResult {
        match self.run(sql).await {
            Ok(result) => result,
            Err(e) => {
                warn!(sql = %sql, error = %e, "Query failed");
                QueryResult::from_error(&e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::STATUS_NO_CONNECTION;

    #[test]
    fn test_row_producing_prefixes() {
        assert!(is_row_producing("SELECT 1"));
        assert!(is_row_producing("  \n\tselect * from t"));
        assert!(is_row_producing("show tables"));
        assert!(is_row_producing("DESCRIBE users"));
        assert!(is_row_producing("desc users"));
    }

    #[test]
    fn test_non_row_producing() {
        assert!(!is_row_producing("SET @a = 1"));
        assert!(!is_row_producing("EXPLAIN SELECT 1"));
        assert!(!is_row_producing("(SELECT 1)"));
        assert!(!is_row_producing(""));
        assert!(!is_row_producing("SEL"));
    }

    #[test]
    fn test_executor_defaults() {
        let executor = QueryExecutor::disconnected();
        assert_eq!(
            executor.query_timeout,
            Duration::from_secs(DEFAULT_QUERY_TIMEOUT_SECS)
        );
        assert!(!executor.log_queries);
        assert!(executor.pool().is_none());
    }

    #[test]
    fn test_executor_custom_settings() {
        let executor = QueryExecutor::disconnected()
            .with_query_timeout(60)
            .with_query_logging(true);
        assert_eq!(executor.query_timeout, Duration::from_secs(60));
        assert!(executor.log_queries);
    }

    #[tokio::test]
    async fn test_disconnected_executor_reports_no_connection() {
        let executor = QueryExecutor::disconnected();
        let result = executor.execute("SELECT 1").await;
        assert!(result.rows.is_empty());
        assert_eq!(result.status_message, STATUS_NO_CONNECTION);

        let err = executor.run("SELECT 1").await.unwrap_err();
        assert!(matches!(err, DbError::NoConnection));
    }

    #[test]
    fn test_close_without_pool() {
        tokio_test::block_on(QueryExecutor::disconnected().close());
    }
}
