//! MySQL Query Gateway - Main entry point.
//!
//! Opens one connection pool and serves the read-only query tools over MCP
//! until the client disconnects or a shutdown signal arrives.

use clap::Parser;
use mysql_query_gateway::config::{Config, TransportMode};
use mysql_query_gateway::db::{PoolHandle, QueryExecutor};
use mysql_query_gateway::tools::{Gateway, SafetyPolicy};
use mysql_query_gateway::transport::{HttpTransport, StdioTransport, Transport};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr; stdout belongs to the stdio transport.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();
    init_tracing(&config);

    info!(
        transport = %config.transport,
        strict_sql = config.strict_sql,
        "Starting MySQL Query Gateway v{}",
        env!("CARGO_PKG_VERSION")
    );

    let pool_config = config.pool_config()?;
    let pool = match PoolHandle::open(&pool_config, &config.pool_options()).await {
        Ok(pool) => pool,
        Err(e) => {
            error!(target_db = %pool_config.masked(), error = %e, "Failed to connect to MySQL");
            return Err(e.into());
        }
    };

    let executor = QueryExecutor::new(pool)
        .with_query_timeout(config.query_timeout)
        .with_query_logging(config.log_queries);
    let gateway = Arc::new(
        Gateway::new(executor, pool_config.database.clone()).with_policy(SafetyPolicy {
            strict: config.strict_sql,
        }),
    );

    let result = match config.transport {
        TransportMode::Stdio => StdioTransport::new(gateway.clone()).run().await,
        TransportMode::Http => {
            info!(
                host = %config.http_host,
                port = config.http_port,
                endpoint = %config.mcp_endpoint,
                "Using HTTP transport"
            );
            HttpTransport::new(
                gateway.clone(),
                &config.http_host,
                config.http_port,
                &config.mcp_endpoint,
            )
            .run()
            .await
        }
    };

    // No-op when the transport already closed it
    gateway.close().await;

    if let Err(e) = result {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
