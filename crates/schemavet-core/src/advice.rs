//! Advisory finding types.
//!
//! An [`Advice`] is one diagnostic finding: severity, a stable numeric code,
//! a short title, user-facing content, and an optional source position.
//! Findings are values, not errors — a check that runs to completion returns
//! `Ok` with its advice list even when the list is full of `Error`-severity
//! entries. Operational failures use [`crate::error::AdvisorError`] instead.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Stable numeric advice codes.
///
/// Codes are part of the public contract: external tooling keys off them, so
/// they are never renumbered, only appended.
pub mod codes {
    pub const OK: i32 = 0;
    pub const INTERNAL: i32 = 1;

    /// Backward-compatibility verdicts, one per incompatible DDL pattern.
    pub const COMPATIBILITY_DROP_DATABASE: i32 = 101;
    pub const COMPATIBILITY_RENAME_TABLE: i32 = 102;
    pub const COMPATIBILITY_DROP_TABLE: i32 = 103;
    pub const COMPATIBILITY_RENAME_COLUMN: i32 = 104;
    pub const COMPATIBILITY_DROP_COLUMN: i32 = 105;
    pub const COMPATIBILITY_ADD_PRIMARY_KEY: i32 = 106;
    pub const COMPATIBILITY_ADD_UNIQUE_KEY: i32 = 107;
    pub const COMPATIBILITY_ADD_FOREIGN_KEY: i32 = 108;
    pub const COMPATIBILITY_ADD_CHECK: i32 = 109;
    pub const COMPATIBILITY_ALTER_CHECK: i32 = 110;
    pub const COMPATIBILITY_ALTER_COLUMN: i32 = 111;

    pub const SYNTAX_ERROR: i32 = 201;

    pub const STATEMENT_NO_WHERE: i32 = 301;
    pub const OR_DEPTH_EXCEEDED: i32 = 302;

    pub const TABLE_NAMING_MISMATCH: i32 = 401;

    pub const COLUMN_CHARSET_DISALLOWED: i32 = 501;

    pub const INDEX_COUNT_EXCEEDED: i32 = 601;
    pub const TABLE_ROWS_EXCEEDED: i32 = 602;
    pub const DATABASE_NOT_EMPTY: i32 = 603;
}

/// Severity level of an advisory finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Caller-visible source position (0-based line).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// One advisory finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Advice {
    /// Severity level.
    pub severity: Severity,
    /// Stable numeric code from [`codes`].
    pub code: i32,
    /// Short rule title.
    pub title: String,
    /// Human-readable message embedding the offending names and values.
    pub content: String,
    /// Source position, if the finding is anchored to a statement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl Advice {
    pub fn new(
        severity: Severity,
        code: i32,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            code,
            title: title.into(),
            content: content.into(),
            position: None,
        }
    }

    pub fn error(code: i32, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, title, content)
    }

    pub fn warning(code: i32, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, title, content)
    }

    pub fn info(code: i32, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(Severity::Info, code, title, content)
    }

    pub fn with_position(mut self, line: usize, column: usize) -> Self {
        self.position = Some(Position { line, column });
        self
    }
}

/// Converts a statement-relative 1-based tree line plus a statement base line
/// into the caller-visible 0-based numbering.
///
/// The combined value saturates at 0: a tree line of 1 anchored at base line 0
/// maps to visible line 0, never -1.
pub fn normalized_line(base_line: usize, tree_line: usize) -> usize {
    (base_line + tree_line).saturating_sub(1)
}

/// Sorts a full advice list into the caller-visible order: positionless
/// advice first, then ascending by (line, content).
pub fn sort_advice(advice: &mut [Advice]) {
    advice.sort_by(|left, right| sort_key(left).cmp(&sort_key(right)));
}

fn sort_key(advice: &Advice) -> (usize, usize, &str) {
    match advice.position {
        // Positionless findings (e.g. batch-level syntax context) lead.
        None => (0, 0, advice.content.as_str()),
        Some(position) => (1, position.line, advice.content.as_str()),
    }
}
