//! Safety filter for caller-supplied SQL and identifiers.
//!
//! Statements are screened against a fixed keyword deny-list before they reach
//! the database. Each keyword is matched as a whole word, ignoring case, so
//! `updated_at` passes while `update t set x = 1` does not. The scan is a text
//! check, not a parser: a keyword inside a string literal or comment is also
//! rejected, and a write disguised through comments or encodings is not
//! caught. [`SafetyPolicy::strict`] adds the parser-based check from
//! [`crate::tools::sql_validator`] on top of the scan for deployments that
//! need it.

use crate::models::SafetyVerdict;
use crate::tools::sql_validator;
use regex::Regex;
use std::sync::LazyLock;

/// Keywords that mark a statement as mutating, in scan order.
pub const FORBIDDEN_KEYWORDS: [&str; 7] = [
    "DROP", "DELETE", "TRUNCATE", "ALTER", "CREATE", "INSERT", "UPDATE",
];

/// Message returned when a table name fails [`sanitize_identifier`].
pub const INVALID_TABLE_NAME: &str =
    "Invalid table name. Only alphanumeric characters, underscores, and hyphens are allowed.";

static KEYWORD_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    FORBIDDEN_KEYWORDS
        .iter()
        .map(|kw| {
            let pattern = Regex::new(&format!(r"(?i)\b{}\b", kw))
                .expect("deny-list keyword patterns are valid");
            (*kw, pattern)
        })
        .collect()
});

/// Scan `sql` for the first deny-listed keyword.
///
/// # Examples
///
/// ```
/// use mysql_query_gateway::tools::guard::check_query;
///
/// assert!(check_query("SELECT updated_at FROM orders").allowed);
///
/// let verdict = check_query("update orders set paid = 1");
/// assert_eq!(verdict.violated_keyword, Some("UPDATE"));
/// ```
pub fn check_query(sql: &str) -> SafetyVerdict {
    KEYWORD_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.is_match(sql))
        .map(|(kw, _)| SafetyVerdict::keyword(*kw))
        .unwrap_or_else(SafetyVerdict::allow)
}

/// Accept only names made of `[A-Za-z0-9_-]` with at least one letter or digit.
///
/// Table names are interpolated into SQL text by the introspection tools, so
/// anything else is refused before a statement is built.
pub fn sanitize_identifier(name: &str) -> bool {
    name.chars().any(|c| c.is_ascii_alphanumeric())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// How strictly caller SQL is screened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SafetyPolicy {
    /// Also require every parsed statement to be read-only.
    pub strict: bool,
}

impl SafetyPolicy {
    pub fn strict() -> Self {
        Self { strict: true }
    }

    /// Run the deny-list and, in strict mode, the structural check.
    ///
    /// A keyword hit always wins so the rejection names the keyword.
    pub fn check(&self, sql: &str) -> SafetyVerdict {
        let verdict = check_query(sql);
        if !verdict.allowed || !self.strict {
            return verdict;
        }
        match sql_validator::validate_readonly(sql) {
            Ok(()) => verdict,
            Err(e) => SafetyVerdict::structural(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_allowed() {
        let verdict = check_query("SELECT * FROM users LIMIT 5");
        assert!(verdict.allowed);
        assert_eq!(verdict.violated_keyword, None);
    }

    #[test]
    fn test_each_keyword_rejected() {
        for kw in FORBIDDEN_KEYWORDS {
            let sql = format!("{} something", kw.to_lowercase());
            let verdict = check_query(&sql);
            assert!(!verdict.allowed, "{} should be rejected", kw);
            assert_eq!(verdict.violated_keyword, Some(kw));
        }
    }

    #[test]
    fn test_substring_not_rejected() {
        assert!(check_query("SELECT UPDATEDAT FROM t").allowed);
        assert!(check_query("SELECT updated_at, created_by FROM t").allowed);
        assert!(check_query("SELECT * FROM dropbox_files").allowed);
    }

    #[test]
    fn test_first_keyword_in_list_order() {
        // INSERT appears first in the text but DELETE precedes it in the list
        let verdict = check_query("INSERT INTO log SELECT * FROM x; DELETE FROM x");
        assert_eq!(verdict.violated_keyword, Some("DELETE"));
    }

    #[test]
    fn test_keyword_in_string_literal_is_rejected() {
        let verdict = check_query("SELECT * FROM notes WHERE body = 'please drop me'");
        assert_eq!(verdict.violated_keyword, Some("DROP"));
    }

    #[test]
    fn test_punctuation_is_a_word_boundary() {
        assert!(!check_query("SELECT 1;DROP TABLE x").allowed);
        assert!(!check_query("(delete)").allowed);
    }

    #[test]
    fn test_sanitize_identifier() {
        assert!(sanitize_identifier("users"));
        assert!(sanitize_identifier("order_items-2024"));
        assert!(sanitize_identifier("T1"));
        assert!(!sanitize_identifier(""));
        assert!(!sanitize_identifier("___"));
        assert!(!sanitize_identifier("-"));
        assert!(!sanitize_identifier("_-_"));
        assert!(sanitize_identifier("_a"));
        assert!(!sanitize_identifier("a; DROP"));
        assert!(!sanitize_identifier("tbl name"));
        assert!(!sanitize_identifier("users`"));
        assert!(!sanitize_identifier("db.users"));
        assert!(!sanitize_identifier("caf\u{e9}"));
    }

    #[test]
    fn test_default_policy_is_denylist_only() {
        let policy = SafetyPolicy::default();
        // A second statement without a deny-listed keyword passes the scan.
        assert!(policy.check("SELECT 1; COMMIT").allowed);
    }

    #[test]
    fn test_strict_policy_rejects_non_read_statements() {
        let policy = SafetyPolicy::strict();
        let verdict = policy.check("SELECT 1; COMMIT");
        assert!(!verdict.allowed);
        assert_eq!(verdict.violated_keyword, None);
        assert!(verdict.reason.unwrap().contains("COMMIT"));
    }

    #[test]
    fn test_strict_policy_prefers_keyword() {
        let verdict = SafetyPolicy::strict().check("DROP TABLE users");
        assert_eq!(verdict.violated_keyword, Some("DROP"));
    }

    #[test]
    fn test_strict_policy_allows_reads() {
        let policy = SafetyPolicy::strict();
        assert!(policy.check("SELECT id FROM users WHERE id = 1").allowed);
        assert!(policy.check("SHOW TABLES").allowed);
    }
}
