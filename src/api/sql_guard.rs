//! # Raw Query Guard
//!
//! Decides whether client-supplied SQL text may reach the datastore.
//!
//! This is a keyword blocklist, not a parser. Text must start with `SELECT`
//! (ignoring case and surrounding whitespace) and must not contain any of
//! [`FORBIDDEN_KEYWORDS`] anywhere, including inside identifiers, string
//! literals or comments. So `SELECT last_update FROM t` is refused, while a
//! crafted statement that hides a write without using those words is not
//! caught. It is a best-effort guard for an inspection endpoint, not a
//! security boundary.

/// Keywords refused anywhere in the text, as ASCII case-insensitive substrings
pub const FORBIDDEN_KEYWORDS: [&str; 6] =
    ["DROP", "DELETE", "INSERT", "UPDATE", "ALTER", "TRUNCATE"];

/// Why a query was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Text (after trimming) does not begin with `SELECT`; includes empty text
    NotSelect,
    /// Text contains a blocklisted keyword
    ForbiddenKeyword(&'static str),
}

impl DenyReason {
    /// Client-facing message
    pub fn message(&self) -> &'static str {
        match self {
            DenyReason::NotSelect => "Only SELECT queries are allowed",
            DenyReason::ForbiddenKeyword(_) => "SQL statement contains forbidden keywords",
        }
    }

    /// Log-facing detail
    pub fn detail(&self) -> String {
        match self {
            DenyReason::NotSelect => "not a SELECT".to_string(),
            DenyReason::ForbiddenKeyword(kw) => format!("contains {}", kw),
        }
    }
}

/// Outcome of [`evaluate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlVerdict<'a> {
    /// Run this (trimmed) text
    Allow(&'a str),
    /// Refuse the request
    Deny(DenyReason),
}

/// Apply the SELECT-prefix rule, then the keyword blocklist
pub fn evaluate(sql: &str) -> SqlVerdict<'_> {
    let trimmed = sql.trim();

    let starts_with_select = trimmed
        .get(..6)
        .map(|prefix| prefix.eq_ignore_ascii_case("SELECT"))
        .unwrap_or(false);
    if !starts_with_select {
        return SqlVerdict::Deny(DenyReason::NotSelect);
    }

    let upper = trimmed.to_ascii_uppercase();
    if let Some(kw) = FORBIDDEN_KEYWORDS.iter().find(|kw| upper.contains(*kw)) {
        return SqlVerdict::Deny(DenyReason::ForbiddenKeyword(*kw));
    }

    SqlVerdict::Allow(trimmed)
}
