//! Statement splitting and parsing.
//!
//! The advisor consumes whole input texts that may hold several statements.
//! Splitting happens at the token level so semicolons inside string literals
//! and comments are respected, and each statement keeps its original source
//! slice plus the line it starts on (`base_line`, the 1-based start line
//! minus one). Rules add `base_line` to in-tree lines to report absolute
//! positions.

use sqlparser::ast::Statement;
use sqlparser::dialect::{GenericDialect, MySqlDialect, PostgreSqlDialect};
use sqlparser::parser::Parser;
use sqlparser::tokenizer::{Token, TokenWithSpan, Tokenizer, Whitespace};

use crate::error::ParseError;

/// SQL dialect used by the parser collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Generic,
    Mysql,
    Postgres,
}

impl Dialect {
    pub fn to_sqlparser_dialect(self) -> Box<dyn sqlparser::dialect::Dialect> {
        match self {
            Dialect::Generic => Box::new(GenericDialect {}),
            Dialect::Mysql => Box::new(MySqlDialect {}),
            Dialect::Postgres => Box::new(PostgreSqlDialect {}),
        }
    }
}

/// One parsed statement with its source slice and line anchor.
#[derive(Debug)]
pub struct SourceStatement {
    /// Parsed syntax tree.
    pub ast: Statement,
    /// Original source text of the statement, semicolon excluded.
    pub text: String,
    /// 1-based start line of the statement in the input, minus one.
    pub base_line: usize,
}

/// Splits `sql` into statements and parses each one.
///
/// Returns `Err` on the first tokenizer or parser failure; the error carries
/// input-absolute line/column where available.
pub fn split_statements(sql: &str, dialect: Dialect) -> Result<Vec<SourceStatement>, ParseError> {
    let sqlparser_dialect = dialect.to_sqlparser_dialect();
    let tokens = Tokenizer::new(sqlparser_dialect.as_ref(), sql)
        .tokenize_with_location()
        .map_err(ParseError::from)?;

    let mut statements = Vec::new();

    for group in tokens.split(|token| token.token == Token::SemiColon) {
        let Some(range) = trim_token_group(group) else {
            continue;
        };
        let (first, last) = range;

        let start = line_col_to_offset(
            sql,
            first.span.start.line as usize,
            first.span.start.column as usize,
        )
        .unwrap_or(0);
        let end = line_col_to_offset(
            sql,
            last.span.end.line as usize,
            last.span.end.column as usize,
        )
        .unwrap_or(sql.len());

        let text = sql[start..end].to_string();
        let base_line = (first.span.start.line as usize).saturating_sub(1);

        let ast = parse_one(&text, sqlparser_dialect.as_ref(), base_line)?;
        statements.push(SourceStatement {
            ast,
            text,
            base_line,
        });
    }

    Ok(statements)
}

/// Strips leading/trailing whitespace and comment tokens from a statement
/// token group. Returns the first and last meaningful token, or `None` when
/// the group holds no statement (e.g. a trailing `;`).
fn trim_token_group(group: &[TokenWithSpan]) -> Option<(&TokenWithSpan, &TokenWithSpan)> {
    let is_meaningful = |token: &&TokenWithSpan| {
        !matches!(
            token.token,
            Token::Whitespace(
                Whitespace::Space
                    | Whitespace::Newline
                    | Whitespace::Tab
                    | Whitespace::SingleLineComment { .. }
                    | Whitespace::MultiLineComment(_)
            ) | Token::EOF
        )
    };
    let first = group.iter().find(is_meaningful)?;
    let last = group.iter().rev().find(is_meaningful)?;
    Some((first, last))
}

fn parse_one(
    text: &str,
    dialect: &dyn sqlparser::dialect::Dialect,
    base_line: usize,
) -> Result<Statement, ParseError> {
    match Parser::parse_sql(dialect, text) {
        Ok(parsed) => parsed
            .into_iter()
            .next()
            .ok_or_else(|| ParseError::new("empty statement")),
        Err(err) => {
            // Error positions are relative to the statement slice; rebase
            // them onto the full input. Errors at end of input carry no
            // position at all, those anchor at the statement's first line.
            let mut parse_error = ParseError::from(err);
            parse_error.line = Some(
                parse_error
                    .line
                    .map_or(base_line + 1, |line| line + base_line),
            );
            Err(parse_error)
        }
    }
}

/// Converts a 1-based (line, column) pair into a byte offset.
///
/// sqlparser reports columns in characters, so the column walk iterates
/// `char_indices` instead of bytes.
fn line_col_to_offset(sql: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 || column == 0 {
        return None;
    }

    let bytes = sql.as_bytes();
    let mut current_line = 1;
    let mut offset = 0;

    while current_line < line {
        let remaining = bytes.get(offset..)?;
        let newline_pos = remaining.iter().position(|&b| b == b'\n')?;
        offset += newline_pos + 1;
        current_line += 1;
    }

    let line_start = offset;
    let remaining = bytes.get(line_start..)?;
    let line_len = remaining
        .iter()
        .position(|&b| b == b'\n')
        .unwrap_or(remaining.len());
    let line_end = line_start + line_len;
    let line_slice = &sql[line_start..line_end];

    let mut current_column = 1;
    for (rel_offset, _) in line_slice.char_indices() {
        if current_column == column {
            return Some(line_start + rel_offset);
        }
        current_column += 1;
    }

    if column == current_column {
        return Some(line_end);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_multiple_statements() {
        let statements =
            split_statements("SELECT 1; SELECT 2;", Dialect::Generic).expect("parse");
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].text, "SELECT 1");
        assert_eq!(statements[1].text, "SELECT 2");
    }

    #[test]
    fn ignores_semicolons_inside_strings() {
        let statements =
            split_statements("SELECT 'a;b'; SELECT 2", Dialect::Generic).expect("parse");
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].text, "SELECT 'a;b'");
    }

    #[test]
    fn base_line_tracks_statement_start() {
        let sql = "SELECT 1;\n\nCREATE TABLE t (id INT);";
        let statements = split_statements(sql, Dialect::Generic).expect("parse");
        assert_eq!(statements[0].base_line, 0);
        assert_eq!(statements[1].base_line, 2);
    }

    #[test]
    fn leading_comment_is_not_part_of_statement_text() {
        let sql = "-- migration\nALTER TABLE t DROP COLUMN c";
        let statements = split_statements(sql, Dialect::Generic).expect("parse");
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].text, "ALTER TABLE t DROP COLUMN c");
        assert_eq!(statements[0].base_line, 1);
    }

    #[test]
    fn reports_parse_error_with_absolute_line() {
        let err = split_statements("SELECT 1;\nSELECT FROM", Dialect::Generic)
            .expect_err("second statement is invalid");
        assert_eq!(err.line, Some(2));
    }

    #[test]
    fn truncated_statement_anchors_error_at_its_start_line() {
        // "found: EOF" errors come back from sqlparser without a position.
        let err = split_statements("SELECT 1;\n\nCREATE TABLE t (", Dialect::Generic)
            .expect_err("truncated statement is invalid");
        assert_eq!(err.line, Some(3));
    }

    #[test]
    fn empty_input_yields_no_statements() {
        let statements = split_statements("  \n-- nothing\n", Dialect::Generic).expect("parse");
        assert!(statements.is_empty());
    }
}
