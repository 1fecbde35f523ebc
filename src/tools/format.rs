//! Text rendering of query results.
//!
//! Results are shown as a plain fixed-width table: a header, a dashed
//! separator, then one line per row. At most [`DISPLAY_LIMIT`] rows are shown
//! and no column is wider than [`MAX_COLUMN_WIDTH`]. Widths are measured in
//! terminal columns, so wide characters count double.

use crate::models::QueryResult;
use serde_json::Value as JsonValue;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Rows rendered before the remainder is summarized.
pub const DISPLAY_LIMIT: usize = 20;

/// Widest a column may be, in terminal columns.
pub const MAX_COLUMN_WIDTH: usize = 30;

const COLUMN_SEPARATOR: &str = " | ";

pub fn format_value(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "NULL".to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::String(s) => s.clone(),
        JsonValue::Array(arr) => serde_json::to_string(arr).unwrap_or_default(),
        JsonValue::Object(obj) => serde_json::to_string(obj).unwrap_or_default(),
    }
}

/// Render a result for display.
///
/// A result without rows renders as its status message, unchanged.
///
/// # Examples
///
/// ```
/// use mysql_query_gateway::models::QueryResult;
/// use mysql_query_gateway::tools::format::format_query_result;
///
/// let empty = QueryResult::status("Query executed successfully. 3 rows affected.");
/// assert_eq!(
///     format_query_result(&empty),
///     "Query executed successfully. 3 rows affected."
/// );
/// ```
pub fn format_query_result(result: &QueryResult) -> String {
    let Some(first) = result.rows.first() else {
        return result.status_message.clone();
    };

    let total = result.rows.len();
    let displayed = &result.rows[..total.min(DISPLAY_LIMIT)];
    let columns: Vec<&String> = first.keys().collect();

    let cells: Vec<Vec<String>> = displayed
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|col| row.get(*col).map(format_value).unwrap_or_default())
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            cells
                .iter()
                .map(|row| row[i].width())
                .fold(col.width(), usize::max)
                .min(MAX_COLUMN_WIDTH)
        })
        .collect();

    let header = render_line(columns.iter().map(|c| c.as_str()), &widths);

    let mut output = String::new();
    output.push_str(&result.status_message);
    output.push_str("\n\n");
    output.push_str(&header);
    output.push('\n');
    output.push_str(&"-".repeat(header.width()));
    output.push('\n');
    for row in &cells {
        output.push_str(&render_line(row.iter().map(String::as_str), &widths));
        output.push('\n');
    }

    let hidden = total - displayed.len();
    if hidden > 0 {
        output.push_str(&format!("\n... and {} more rows\n", hidden));
    }
    output.push_str(&format!("\nTotal rows: {}", total));

    output
}

fn render_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, &width)| fit(cell, width))
        .collect::<Vec<_>>()
        .join(COLUMN_SEPARATOR)
}

/// Left-justify `s` in exactly `width` columns, cutting it if it is wider.
fn fit(s: &str, width: usize) -> String {
    let mut out = String::with_capacity(width);
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.extend(std::iter::repeat_n(' ', width - used));
    out
}

/// Group digits in threes with commas: `1234567` becomes `1,234,567`.
pub fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        grouped.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Row;
    use serde_json::json;

    fn row(pairs: &[(&str, JsonValue)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&JsonValue::Null), "NULL");
        assert_eq!(format_value(&json!(true)), "true");
        assert_eq!(format_value(&json!(42)), "42");
        assert_eq!(format_value(&json!("abc")), "abc");
        assert_eq!(format_value(&json!([1, 2])), "[1,2]");
    }

    #[test]
    fn test_empty_rows_returns_status() {
        let result = QueryResult::status("No database connection available");
        assert_eq!(format_query_result(&result), "No database connection available");
    }

    #[test]
    fn test_single_cell_layout() {
        let result = QueryResult::with_rows(vec![row(&[("1", json!(1))])]);
        assert_eq!(
            format_query_result(&result),
            "Query executed successfully\n\n1\n-\n1\n\nTotal rows: 1"
        );
    }

    #[test]
    fn test_columns_keep_row_order() {
        let result = QueryResult::with_rows(vec![
            row(&[("name", json!("alice")), ("id", json!(1))]),
            row(&[("name", json!("bob")), ("id", json!(22))]),
        ]);
        let text = format_query_result(&result);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[2], "name  | id");
        assert_eq!(lines[3], "----------");
        assert_eq!(lines[4], "alice | 1 ");
        assert_eq!(lines[5], "bob   | 22");
    }

    #[test]
    fn test_missing_column_renders_empty() {
        let result = QueryResult::with_rows(vec![
            row(&[("a", json!("x")), ("b", json!("y"))]),
            row(&[("a", json!("z"))]),
        ]);
        let text = format_query_result(&result);
        assert!(text.contains("\nz |  \n"));
    }

    #[test]
    fn test_wide_values_clamped() {
        let long = "x".repeat(50);
        let header = "h".repeat(40);
        let result = QueryResult::with_rows(vec![row(&[(header.as_str(), json!(long))])]);
        let text = format_query_result(&result);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[2], "h".repeat(30));
        assert_eq!(lines[3], "-".repeat(30));
        assert_eq!(lines[4], "x".repeat(30));
    }

    #[test]
    fn test_truncation_after_display_limit() {
        let rows = (0..25).map(|i| row(&[("n", json!(i))])).collect();
        let text = format_query_result(&QueryResult::with_rows(rows));
        assert!(text.contains("\n19\n"));
        assert!(!text.contains("\n20\n"));
        assert!(text.contains("... and 5 more rows"));
        assert!(text.ends_with("Total rows: 25"));
    }

    #[test]
    fn test_single_hidden_row_keeps_plural_wording() {
        let rows = (0..21).map(|i| row(&[("n", json!(i))])).collect();
        let text = format_query_result(&QueryResult::with_rows(rows));
        assert!(text.contains("\n... and 1 more rows\n"));
    }

    #[test]
    fn test_wide_characters_measured_by_display_width() {
        assert_eq!(fit("日本語", 4), "日本");
        assert_eq!(fit("日本語", 5), "日本 ");
        assert_eq!(fit("ab", 4), "ab  ");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
        assert_eq!(group_thousands(-45000), "-45,000");
    }
}
