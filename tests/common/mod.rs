//! Shared helpers for integration tests.

#![allow(dead_code)]

use mysql_query_gateway::db::StatementExecutor;
use mysql_query_gateway::models::{QueryResult, Row};
use serde_json::Value as JsonValue;
use std::sync::Mutex;

/// Executor that records every statement and answers from a script.
///
/// A statement gets the result of the first scripted prefix it starts with,
/// or an empty success result when nothing matches.
#[derive(Default)]
pub struct RecordingExecutor {
    script: Vec<(String, QueryResult)>,
    calls: Mutex<Vec<String>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, prefix: &str, result: QueryResult) -> Self {
        self.script.push((prefix.to_string(), result));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl StatementExecutor for RecordingExecutor {
    async fn execute(&self, sql: &str) -> QueryResult {
        self.calls.lock().unwrap().push(sql.to_string());
        self.script
            .iter()
            .find(|(prefix, _)| sql.starts_with(prefix.as_str()))
            .map(|(_, result)| result.clone())
            .unwrap_or_else(|| QueryResult::with_rows(Vec::new()))
    }
}

/// Build a row from column/value pairs, keeping their order.
pub fn row(pairs: &[(&str, JsonValue)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}
