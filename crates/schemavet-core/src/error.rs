//! Error types for the advisory engine.
//!
//! # Error Handling Strategy
//!
//! Two complementary channels:
//!
//! - [`ParseError`]: the parser collaborator rejected the input. This is a
//!   user-facing condition, so the advisor converts it into a single
//!   syntax-error [`crate::Advice`] rather than failing the check.
//!
//! - [`AdvisorError`]: the check itself could not run — bad rule payload,
//!   invalid regex template, unknown rule or level. Callers must treat a
//!   non-`Ok` result as "no verdict", never as "zero findings".
//!
//! Rule hook failures during traversal belong to neither channel: the
//! dispatcher logs them and keeps walking (see [`crate::dispatch`]).

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::advice::{codes, Advice};

/// Error from the SQL parser collaborator, with position when available.
#[derive(Debug, Clone)]
pub struct ParseError {
    /// The parser's own message.
    pub message: String,
    /// 1-based line of the failure, if the parser reported one.
    pub line: Option<usize>,
    /// 1-based column of the failure, if the parser reported one.
    pub column: Option<usize>,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            column: None,
        }
    }

    /// Materializes the parse failure as the fixed syntax-error advice.
    pub fn into_advice(self) -> Advice {
        let line = self.line.unwrap_or(1).saturating_sub(1);
        let column = self.column.unwrap_or(0);
        Advice::error(codes::SYNTAX_ERROR, "Syntax error", self.message)
            .with_position(line, column)
    }

    /// Extracts "Line: X, Column: Y" from sqlparser's error message format.
    ///
    /// Coupled to the `sqlparser` crate's message wording; returns `None`
    /// when the format is absent.
    fn position_from_message(message: &str) -> Option<(usize, usize)> {
        static POSITION_REGEX: OnceLock<Regex> = OnceLock::new();
        let re = POSITION_REGEX.get_or_init(|| {
            Regex::new(r"Line:\s*(\d+)\s*,\s*Column:\s*(\d+)").expect("Invalid regex pattern")
        });

        re.captures(message).and_then(|caps| {
            let line: usize = caps.get(1)?.as_str().parse().ok()?;
            let column: usize = caps.get(2)?.as_str().parse().ok()?;
            Some((line, column))
        })
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parse error")?;
        if let (Some(line), Some(column)) = (self.line, self.column) {
            write!(f, " at line {line}, column {column}")?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for ParseError {}

impl From<sqlparser::parser::ParserError> for ParseError {
    fn from(err: sqlparser::parser::ParserError) -> Self {
        let message = err.to_string();
        let position = Self::position_from_message(&message);
        Self {
            message,
            line: position.map(|(line, _)| line),
            column: position.map(|(_, column)| column),
        }
    }
}

impl From<sqlparser::tokenizer::TokenizerError> for ParseError {
    fn from(err: sqlparser::tokenizer::TokenizerError) -> Self {
        Self {
            message: err.message.clone(),
            line: Some(err.location.line as usize),
            column: Some(err.location.column as usize),
        }
    }
}

/// Configuration failure: the check could not run at all.
#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("rule {rule} expects a {expected} payload")]
    InvalidPayload {
        rule: &'static str,
        expected: &'static str,
    },

    #[error("invalid naming pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("unknown rule {0:?}")]
    UnknownRule(String),

    #[error("unknown advice level {0:?}")]
    UnknownLevel(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_extracted_from_sqlparser_message() {
        let pos =
            ParseError::position_from_message("Expected SELECT, found: BOGUS at Line: 3, Column: 7");
        assert_eq!(pos, Some((3, 7)));
    }

    #[test]
    fn position_absent_when_format_missing() {
        assert_eq!(ParseError::position_from_message("something broke"), None);
    }

    #[test]
    fn parse_error_becomes_syntax_advice() {
        let mut err = ParseError::new("Expected SELECT");
        err.line = Some(2);
        err.column = Some(4);
        let advice = err.into_advice();
        assert_eq!(advice.code, codes::SYNTAX_ERROR);
        assert_eq!(advice.position.unwrap().line, 1);
        assert_eq!(advice.position.unwrap().column, 4);
    }
}
