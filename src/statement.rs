use std::sync::LazyLock;

use regex::Regex;

static LEADING_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z]+)").expect("leading keyword pattern is valid"));

/// How a statement's result is shaped for the caller, decided by its leading keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Other,
}

impl StatementKind {
    /// Classify `sql` by its first word, ignoring leading whitespace and case.
    #[must_use]
    pub fn of(sql: &str) -> Self {
        let Some(caps) = LEADING_KEYWORD.captures(sql) else {
            return StatementKind::Other;
        };
        let keyword = &caps[1];
        if keyword.eq_ignore_ascii_case("select") {
            StatementKind::Select
        } else if keyword.eq_ignore_ascii_case("insert") {
            StatementKind::Insert
        } else {
            StatementKind::Other
        }
    }
}
