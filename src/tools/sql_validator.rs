//! Structural read-only validation.
//!
//! The keyword deny-list in [`crate::tools::guard`] is a blunt text scan and
//! does not notice a write hidden behind a comment or a second statement.
//! This module parses the statement with [sqlparser](https://docs.rs/sqlparser/)
//! in the MySQL dialect and classifies every statement it finds. It is only
//! consulted when strict mode is enabled, after the deny-list has passed.

use crate::error::{DbError, DbResult};
use sqlparser::ast::Statement;
use sqlparser::dialect::MySqlDialect;
use sqlparser::parser::Parser;

/// Type of SQL statement detected by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SqlStatementType {
    /// SELECT and other read-only queries (SELECT, SHOW, DESCRIBE, EXPLAIN)
    Select,
    /// INSERT, UPDATE, DELETE, MERGE, REPLACE
    DmlWrite,
    /// CREATE, DROP, ALTER, TRUNCATE
    Ddl,
    /// BEGIN, COMMIT, ROLLBACK, SAVEPOINT
    Transaction,
    /// CALL, EXECUTE, PREPARE
    ProcedureCall,
    /// GRANT, REVOKE, SET, USE, LOCK, KILL, FLUSH
    Administrative,
    /// Unknown or unclassified statement
    Unknown,
}

mod error_messages {
    pub const DML_WRITE: &str = "Write operations are not allowed";
    pub const DDL: &str = "Schema modifications are not allowed";
    pub const TRANSACTION: &str = "Transaction control is not allowed";
    pub const PROCEDURE: &str = "Procedure calls are not allowed";
    pub const ADMINISTRATIVE: &str = "Administrative operations are not allowed";
    pub const UNKNOWN: &str = "Unrecognized SQL statement";
    pub const PARSE_ERROR: &str = "Failed to parse SQL statement.";
}

/// Validate that every statement in `sql` is read-only.
///
/// Returns `Err(DbError::Permission)` naming the first offending statement
/// type, or `Err(DbError::InvalidInput)` when the text cannot be parsed.
///
/// # Examples
///
/// ```
/// use mysql_query_gateway::tools::sql_validator::validate_readonly;
///
/// assert!(validate_readonly("SELECT * FROM users").is_ok());
/// assert!(validate_readonly("SELECT 1; INSERT INTO users VALUES (1)").is_err());
/// ```
pub fn validate_readonly(sql: &str) -> DbResult<()> {
    let statements = Parser::parse_sql(&MySqlDialect {}, sql).map_err(|e| {
        DbError::invalid_input(format!("{} Error: {}", error_messages::PARSE_ERROR, e))
    })?;

    if statements.is_empty() {
        return Err(DbError::invalid_input("Empty SQL statement"));
    }

    for stmt in &statements {
        validate_statement(stmt)?;
    }

    Ok(())
}

fn validate_statement(stmt: &Statement) -> DbResult<()> {
    let (stmt_type, operation_name) = classify_statement(stmt);

    let reason = match stmt_type {
        SqlStatementType::Select => return Ok(()),
        SqlStatementType::DmlWrite => error_messages::DML_WRITE,
        SqlStatementType::Ddl => error_messages::DDL,
        SqlStatementType::Transaction => error_messages::TRANSACTION,
        SqlStatementType::ProcedureCall => error_messages::PROCEDURE,
        SqlStatementType::Administrative => error_messages::ADMINISTRATIVE,
        SqlStatementType::Unknown => error_messages::UNKNOWN,
    };
    Err(DbError::permission(operation_name, reason))
}

fn classify_statement(stmt: &Statement) -> (SqlStatementType, &'static str) {
    match stmt {
        // Read-only
        Statement::Query { .. } => (SqlStatementType::Select, "SELECT"),
        Statement::ShowTables { .. } => (SqlStatementType::Select, "SHOW TABLES"),
        Statement::ShowColumns { .. } => (SqlStatementType::Select, "SHOW COLUMNS"),
        Statement::ShowDatabases { .. } => (SqlStatementType::Select, "SHOW DATABASES"),
        Statement::ShowSchemas { .. } => (SqlStatementType::Select, "SHOW SCHEMAS"),
        Statement::ShowCreate { .. } => (SqlStatementType::Select, "SHOW CREATE"),
        Statement::ShowFunctions { .. } => (SqlStatementType::Select, "SHOW FUNCTIONS"),
        Statement::ShowVariable { .. } => (SqlStatementType::Select, "SHOW VARIABLE"),
        Statement::ShowVariables { .. } => (SqlStatementType::Select, "SHOW VARIABLES"),
        Statement::ShowStatus { .. } => (SqlStatementType::Select, "SHOW STATUS"),
        Statement::ShowCollation { .. } => (SqlStatementType::Select, "SHOW COLLATION"),
        Statement::ExplainTable { .. } => (SqlStatementType::Select, "DESCRIBE"),

        // EXPLAIN is only as safe as the statement it wraps
        Statement::Explain { statement, .. } => {
            let (inner_type, inner_name) = classify_statement(statement);
            if inner_type == SqlStatementType::Select {
                (SqlStatementType::Select, "EXPLAIN")
            } else {
                (inner_type, inner_name)
            }
        }

        // DML writes
        Statement::Insert { .. } => (SqlStatementType::DmlWrite, "INSERT"),
        Statement::Update { .. } => (SqlStatementType::DmlWrite, "UPDATE"),
        Statement::Delete { .. } => (SqlStatementType::DmlWrite, "DELETE"),
        Statement::Merge { .. } => (SqlStatementType::DmlWrite, "MERGE"),

        // DDL
        Statement::CreateTable { .. } => (SqlStatementType::Ddl, "CREATE TABLE"),
        Statement::CreateView { .. } => (SqlStatementType::Ddl, "CREATE VIEW"),
        Statement::CreateIndex { .. } => (SqlStatementType::Ddl, "CREATE INDEX"),
        Statement::CreateDatabase { .. } => (SqlStatementType::Ddl, "CREATE DATABASE"),
        Statement::CreateFunction { .. } => (SqlStatementType::Ddl, "CREATE FUNCTION"),
        Statement::CreateProcedure { .. } => (SqlStatementType::Ddl, "CREATE PROCEDURE"),
        Statement::CreateTrigger { .. } => (SqlStatementType::Ddl, "CREATE TRIGGER"),
        Statement::AlterTable { .. } => (SqlStatementType::Ddl, "ALTER TABLE"),
        Statement::AlterView { .. } => (SqlStatementType::Ddl, "ALTER VIEW"),
        Statement::Drop { .. } => (SqlStatementType::Ddl, "DROP"),
        Statement::DropFunction { .. } => (SqlStatementType::Ddl, "DROP FUNCTION"),
        Statement::DropProcedure { .. } => (SqlStatementType::Ddl, "DROP PROCEDURE"),
        Statement::DropTrigger { .. } => (SqlStatementType::Ddl, "DROP TRIGGER"),
        Statement::Truncate { .. } => (SqlStatementType::Ddl, "TRUNCATE"),

        // Transaction control
        Statement::StartTransaction { .. } => (SqlStatementType::Transaction, "BEGIN"),
        Statement::Commit { .. } => (SqlStatementType::Transaction, "COMMIT"),
        Statement::Rollback { .. } => (SqlStatementType::Transaction, "ROLLBACK"),
        Statement::Savepoint { .. } => (SqlStatementType::Transaction, "SAVEPOINT"),

        // Procedures
        Statement::Call { .. } => (SqlStatementType::ProcedureCall, "CALL"),
        Statement::Execute { .. } => (SqlStatementType::ProcedureCall, "EXECUTE"),
        Statement::Prepare { .. } => (SqlStatementType::ProcedureCall, "PREPARE"),

        // Administrative
        Statement::Grant { .. } => (SqlStatementType::Administrative, "GRANT"),
        Statement::Revoke { .. } => (SqlStatementType::Administrative, "REVOKE"),
        Statement::Set { .. } => (SqlStatementType::Administrative, "SET"),
        Statement::Use { .. } => (SqlStatementType::Administrative, "USE"),
        Statement::Kill { .. } => (SqlStatementType::Administrative, "KILL"),
        Statement::LockTables { .. } => (SqlStatementType::Administrative, "LOCK"),
        Statement::UnlockTables { .. } => (SqlStatementType::Administrative, "UNLOCK"),
        Statement::Flush { .. } => (SqlStatementType::Administrative, "FLUSH"),
        Statement::OptimizeTable { .. } => (SqlStatementType::Administrative, "OPTIMIZE"),

        _ => (SqlStatementType::Unknown, "Unknown"),
    }
}
