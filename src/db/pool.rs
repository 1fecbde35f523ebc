//! Connection pool management.
//!
//! One bounded MySQL pool is opened at startup and shared by every tool call.
//! Connections are borrowed for the duration of a single statement and go
//! back to the pool when the borrow is dropped, which also covers early
//! returns, errors and cancelled futures.

use crate::error::ConnectionError;
use crate::models::{PoolConfig, PoolOptions};
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use sqlx::{Executor, MySqlPool};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Owned handle to the process-wide connection pool.
///
/// Cloning is cheap and every clone refers to the same pool.
#[derive(Debug, Clone)]
pub struct PoolHandle {
    pool: MySqlPool,
    database: String,
}

impl PoolHandle {
    /// Open the pool and verify it with a liveness probe.
    ///
    /// Connections use utf8mb4 and autocommit, so each statement commits on
    /// its own. If the probe fails the pool is closed before returning.
    pub async fn open(
        config: &PoolConfig,
        options: &PoolOptions,
    ) -> Result<Self, ConnectionError> {
        config.validate()?;
        options.validate()?;

        info!(
            target_db = %config.masked(),
            min_connections = options.min_connections,
            max_connections = options.max_connections,
            "Opening connection pool"
        );

        let connect_options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database)
            .charset("utf8mb4");

        let reset_sql = reset_schema_sql(&config.database);
        let pool = MySqlPoolOptions::new()
            .min_connections(options.min_connections)
            .max_connections(options.max_connections)
            .acquire_timeout(Duration::from_secs(options.acquire_timeout_secs))
            .test_before_acquire(true)
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    conn.execute("SET autocommit = 1").await?;
                    Ok(())
                })
            })
            // A caller's `USE other_db` must not leak to the next borrower
            .after_release(move |conn, _meta| {
                let sql = reset_sql.clone();
                Box::pin(async move {
                    conn.execute(sql.as_str()).await?;
                    Ok(true)
                })
            })
            .connect_with(connect_options)
            .await
            .map_err(|e| ConnectionError::connect(e.to_string()))?;

        let handle = Self {
            pool,
            database: config.database.clone(),
        };

        if let Err(e) = handle.probe().await {
            handle.close().await;
            return Err(e);
        }

        if let Some(version) = handle.server_version().await {
            info!(database = %handle.database, server_version = %version, "Connected to MySQL");
        } else {
            info!(database = %handle.database, "Connected to MySQL");
        }

        Ok(handle)
    }

    /// Run `SELECT 1` on a pooled connection and check the answer.
    pub async fn probe(&self) -> Result<(), ConnectionError> {
        let value = sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ConnectionError::probe_failed(e.to_string()))?;

        if value != 1 {
            return Err(ConnectionError::probe_failed(format!(
                "expected 1, got {}",
                value
            )));
        }
        debug!("Connection probe succeeded");
        Ok(())
    }

    async fn server_version(&self) -> Option<String> {
        match sqlx::query_scalar::<_, String>("SELECT version()")
            .fetch_one(&self.pool)
            .await
        {
            Ok(version) => Some(version),
            Err(e) => {
                warn!(error = %e, "Failed to get server version");
                None
            }
        }
    }

    /// Close every pooled connection and wait for the pool to drain.
    ///
    /// Calling this more than once is harmless.
    pub async fn close(&self) {
        if self.pool.is_closed() {
            return;
        }
        info!(database = %self.database, "Closing connection pool");
        self.pool.close().await;
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    /// Database the pool is bound to.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Live connections, idle or checked out.
    pub fn size(&self) -> u32 {
        self.pool.size()
    }

    pub fn acquire_timeout(&self) -> Duration {
        self.pool.options().get_acquire_timeout()
    }

    pub fn num_idle(&self) -> usize {
        self.pool.num_idle()
    }

    pub(crate) fn inner(&self) -> &MySqlPool {
        &self.pool
    }
}

/// Statement that points a released connection back at the configured database.
fn reset_schema_sql(database: &str) -> String {
    format!("USE `{}`", database.replace('`', "``"))
}

/// Close a pool that may never have been opened.
pub async fn close_pool(handle: Option<&PoolHandle>) {
    if let Some(handle) = handle {
        handle.close().await;
    }
}
