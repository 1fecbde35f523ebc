//! MCP service implementation using rmcp.
//!
//! This module defines the GatewayService struct exposing the four gateway
//! operations as MCP tools. Every tool answers with a single text block, and
//! database failures are reported inside that text rather than as protocol
//! errors.

use crate::db::QueryExecutor;
use crate::tools::schema::{ExecuteSqlQueryInput, Gateway, TableNameInput};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct GatewayService {
    /// Shared gateway holding the pool-backed executor
    gateway: Arc<Gateway<QueryExecutor>>,
    /// Tool router for MCP tool dispatch (auto-generated)
    tool_router: ToolRouter<Self>,
}

impl GatewayService {
    pub fn new(gateway: Arc<Gateway<QueryExecutor>>) -> Self {
        Self {
            gateway,
            tool_router: Self::tool_router(),
        }
    }

    fn database_name(&self) -> &str {
        self.gateway.database()
    }
}

fn text_result(text: String) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

#[tool_router]
impl GatewayService {
    #[tool(
        description = "Execute a SQL query on the MySQL database.\nOnly SELECT, SHOW and DESCRIBE queries are allowed; statements containing DROP, DELETE, TRUNCATE, ALTER, CREATE, INSERT or UPDATE are rejected.\nResults are returned as a text table showing at most 20 rows."
    )]
    async fn execute_sql_query(
        &self,
        Parameters(input): Parameters<ExecuteSqlQueryInput>,
    ) -> Result<CallToolResult, McpError> {
        text_result(self.gateway.execute_sql_query(&input.query).await)
    }

    #[tool(
        description = "Get the structure of a table: column names, types, nullability, keys, defaults, extra attributes and comments."
    )]
    async fn describe_table(
        &self,
        Parameters(input): Parameters<TableNameInput>,
    ) -> Result<CallToolResult, McpError> {
        text_result(self.gateway.describe_table(&input.table_name).await)
    }

    #[tool(description = "List all tables in the database.")]
    async fn list_tables(&self) -> Result<CallToolResult, McpError> {
        text_result(self.gateway.list_tables().await)
    }

    #[tool(
        description = "Get information about a table: its total row count and its column structure."
    )]
    async fn get_table_info(
        &self,
        Parameters(input): Parameters<TableNameInput>,
    ) -> Result<CallToolResult, McpError> {
        text_result(self.gateway.get_table_info(&input.table_name).await)
    }
}

#[tool_handler]
impl ServerHandler for GatewayService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "mysql-query-gateway".to_owned(),
                title: Some("MySQL Query Gateway".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(format!(
                "Read-only tools for the MySQL database '{}'.\n\
                \n\
                ## Rules\n\
                - Only SELECT, SHOW and DESCRIBE queries can be executed\n\
                - Always use LIMIT in SELECT queries (e.g. LIMIT 10)\n\
                - Table and column names may be case-sensitive\n\
                \n\
                ## Workflow\n\
                1. Call `list_tables` if unsure about the schema\n\
                2. Call `describe_table` or `get_table_info` to understand a table\n\
                3. Call `execute_sql_query` for custom SELECT queries\n\
                4. Do not repeat a call with the same arguments; reuse earlier results\n\
                \n\
                ## SQL Tips\n\
                - Use backticks around names with spaces or special characters\n\
                - Use LIKE with % wildcards for text searches\n\
                - Only the first 20 rows of a result are shown",
                self.database_name()
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::STATUS_NO_CONNECTION;
    use rmcp::model::RawContent;

    fn create_test_service() -> GatewayService {
        let gateway = Arc::new(Gateway::new(QueryExecutor::disconnected(), "test"));
        GatewayService::new(gateway)
    }

    fn text_of(result: CallToolResult) -> String {
        match &result.content[0].raw {
            RawContent::Text(t) => t.text.clone(),
            other => panic!("expected text content, got {:?}", other),
        }
    }

    #[test]
    fn test_server_info() {
        let service = create_test_service();
        let info = service.get_info();
        assert_eq!(info.server_info.name, "mysql-query-gateway");
        assert!(info.capabilities.tools.is_some());
        assert!(info.instructions.unwrap().contains("'test'"));
    }

    #[tokio::test]
    async fn test_list_tables_without_connection() {
        let service = create_test_service();
        let result = service.list_tables().await.unwrap();
        assert_eq!(result.content.len(), 1);
        assert_eq!(text_of(result), STATUS_NO_CONNECTION);
    }

    #[tokio::test]
    async fn test_execute_rejection_is_text() {
        let service = create_test_service();
        let input = ExecuteSqlQueryInput {
            query: "DROP TABLE users".to_string(),
        };
        let result = service.execute_sql_query(Parameters(input)).await.unwrap();
        assert!(text_of(result).contains("'DROP'"));
    }

    #[tokio::test]
    async fn test_describe_invalid_name() {
        let service = create_test_service();
        let input = TableNameInput {
            table_name: "a; DROP".to_string(),
        };
        let result = service.describe_table(Parameters(input)).await.unwrap();
        assert!(text_of(result).starts_with("Invalid table name"));
    }
}
