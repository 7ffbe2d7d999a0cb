//! Table naming convention.
//!
//! Names introduced by CREATE TABLE or a rename target must match the
//! configured pattern. The pattern is compiled at rule construction; a bad
//! template is a configuration error, not a finding.

use regex::Regex;

use crate::advice::{codes, normalized_line, Advice, Severity};
use crate::error::AdvisorError;
use crate::parser::SourceStatement;
use crate::rule::{FinishContext, Rule, RuleError, StateScope};
use crate::tree::{Node, NodeBody, Tag};

const TITLE: &str = "Table naming convention mismatch";

pub struct TableNaming {
    severity: Severity,
    pattern: Regex,
    line: usize,
    advice: Vec<Advice>,
}

impl TableNaming {
    pub fn new(severity: Severity, pattern: &str) -> Result<Self, AdvisorError> {
        Ok(Self {
            severity,
            pattern: Regex::new(pattern)?,
            line: 0,
            advice: Vec::new(),
        })
    }

    fn check_name(&mut self, name: &str) {
        if self.pattern.is_match(name) {
            return;
        }
        self.advice.push(
            Advice::new(
                self.severity,
                codes::TABLE_NAMING_MISMATCH,
                TITLE,
                format!(
                    "`{name}` mismatches table naming convention, naming format should be \"{}\"",
                    self.pattern.as_str()
                ),
            )
            .with_position(self.line, 0),
        );
    }
}

impl Rule for TableNaming {
    fn name(&self) -> &'static str {
        "table-naming"
    }

    fn scope(&self) -> StateScope {
        StateScope::PerStatement
    }

    fn begin_statement(&mut self, stmt: &SourceStatement) {
        self.line = normalized_line(stmt.base_line, 1);
    }

    fn on_enter(&mut self, node: &Node, _tag: Tag) -> Result<(), RuleError> {
        match &node.body {
            NodeBody::CreateTable { table, .. } => self.check_name(table),
            NodeBody::RenameTable { to, .. } => self.check_name(to),
            _ => {}
        }
        Ok(())
    }

    fn take_advice(&mut self, _ctx: &FinishContext<'_>) -> Vec<Advice> {
        std::mem::take(&mut self.advice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::walk;
    use crate::parser::{split_statements, Dialect};
    use crate::tree::lower_statement;

    const SNAKE_CASE: &str = "^[a-z]+(_[a-z]+)*$";

    fn run(sql: &str, pattern: &str) -> Vec<Advice> {
        let statements = split_statements(sql, Dialect::Mysql).expect("parse");
        let mut rules: Vec<Box<dyn Rule>> = vec![Box::new(
            TableNaming::new(Severity::Warning, pattern).expect("pattern"),
        )];
        for statement in &statements {
            let root = lower_statement(&statement.ast);
            for rule in &mut rules {
                rule.begin_statement(statement);
            }
            walk(&root, &mut rules);
            for rule in &mut rules {
                rule.end_statement(statement);
            }
        }
        rules[0].take_advice(&FinishContext { catalog: None })
    }

    #[test]
    fn conforming_names_pass() {
        assert!(run("CREATE TABLE user_account (id INT)", SNAKE_CASE).is_empty());
    }

    #[test]
    fn mismatching_create_is_flagged() {
        let advice = run("CREATE TABLE UserAccount (id INT)", SNAKE_CASE);
        assert_eq!(advice.len(), 1);
        assert_eq!(
            advice[0].content,
            "`UserAccount` mismatches table naming convention, naming format should be \"^[a-z]+(_[a-z]+)*$\""
        );
    }

    #[test]
    fn rename_target_is_checked() {
        let advice = run("ALTER TABLE old_name RENAME TO NewName", SNAKE_CASE);
        assert_eq!(advice.len(), 1);
        assert!(advice[0].content.contains("`NewName`"));
    }

    #[test]
    fn invalid_pattern_is_a_configuration_error() {
        assert!(matches!(
            TableNaming::new(Severity::Warning, "("),
            Err(AdvisorError::InvalidPattern(_))
        ));
    }
}
