//! Integration tests for the result formatter.

mod common;

use common::row;
use mysql_query_gateway::models::QueryResult;
use mysql_query_gateway::tools::format::{DISPLAY_LIMIT, MAX_COLUMN_WIDTH, format_query_result};
use serde_json::json;

#[test]
fn test_status_only_results_unchanged() {
    for status in [
        "Query executed successfully",
        "Query executed successfully. 0 rows affected.",
        "Error executing query: Unknown column 'x' in 'field list' (SQLSTATE: 42S22)",
        "",
    ] {
        assert_eq!(format_query_result(&QueryResult::status(status)), status);
    }
}

#[test]
fn test_formatting_is_deterministic() {
    let result = QueryResult::with_rows(vec![
        row(&[("id", json!(1)), ("name", json!("Ada")), ("note", json!(null))]),
        row(&[("id", json!(2)), ("name", json!("Grace")), ("note", json!("x"))]),
    ]);
    assert_eq!(format_query_result(&result), format_query_result(&result));
}

#[test]
fn test_twenty_five_rows_show_twenty() {
    let rows = (1..=25)
        .map(|i| row(&[("id", json!(i)), ("label", json!(format!("item-{}", i)))]))
        .collect();
    let text = format_query_result(&QueryResult::with_rows(rows));

    let row_lines = text.lines().filter(|l| l.starts_with(|c: char| c.is_ascii_digit())).count();
    assert_eq!(row_lines, DISPLAY_LIMIT);
    assert!(text.contains("item-20"));
    assert!(!text.contains("item-21"));
    assert!(text.contains("\n... and 5 more rows\n"));
    assert!(text.ends_with("\nTotal rows: 25"));
}

#[test]
fn test_exactly_display_limit_has_no_more_line() {
    let rows = (0..DISPLAY_LIMIT).map(|i| row(&[("n", json!(i))])).collect();
    let text = format_query_result(&QueryResult::with_rows(rows));
    assert!(!text.contains("more row"));
    assert!(text.ends_with("Total rows: 20"));
}

#[test]
fn test_one_row_over_limit_keeps_more_rows_wording() {
    let rows = (0..=DISPLAY_LIMIT).map(|i| row(&[("n", json!(i))])).collect();
    let text = format_query_result(&QueryResult::with_rows(rows));
    assert!(text.contains("\n... and 1 more rows\n"), "got {:?}", text);
    assert!(text.ends_with("Total rows: 21"));
}

#[test]
fn test_fifty_char_value_clamped_to_thirty() {
    let value = "abcdefghij".repeat(5);
    let result = QueryResult::with_rows(vec![row(&[("description", json!(value))])]);
    let text = format_query_result(&result);
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[2], format!("{:<width$}", "description", width = MAX_COLUMN_WIDTH));
    assert_eq!(lines[3].len(), MAX_COLUMN_WIDTH);
    assert_eq!(lines[4], &value[..MAX_COLUMN_WIDTH]);
}

#[test]
fn test_columns_follow_first_row() {
    let result = QueryResult::with_rows(vec![
        row(&[("b", json!("1")), ("a", json!("2"))]),
        row(&[("a", json!("3")), ("c", json!("4"))]),
    ]);
    let text = format_query_result(&result);
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[2], "b | a");
    assert_eq!(lines[4], "1 | 2");
    // "b" is missing from the second row and "c" is not a column
    assert_eq!(lines[5], "  | 3");
    assert!(!text.contains('4'));
}

#[test]
fn test_separator_matches_header_length() {
    let result = QueryResult::with_rows(vec![row(&[
        ("customer_id", json!(10)),
        ("email", json!("a@example.com")),
        ("active", json!(true)),
    ])]);
    let text = format_query_result(&result);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[3], "-".repeat(lines[2].len()));
    assert_eq!(lines[4], "10          | a@example.com | true  ");
}
