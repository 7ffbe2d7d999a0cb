//! WHERE-clause requirement for destructive DML.
//!
//! Per-statement flag pair: entering an UPDATE or DELETE arms the rule,
//! seeing a WHERE clause disarms it, and the verdict is settled at
//! statement end once the whole tree has been seen.

use crate::advice::{codes, normalized_line, Advice, Severity};
use crate::parser::SourceStatement;
use crate::rule::{FinishContext, Rule, RuleError, StateScope};
use crate::tree::{Node, Tag};

const TITLE: &str = "Require WHERE clause";

pub struct WhereRequirement {
    severity: Severity,
    requires_where: bool,
    seen_where: bool,
    advice: Vec<Advice>,
}

impl WhereRequirement {
    pub fn new(severity: Severity) -> Self {
        Self {
            severity,
            requires_where: false,
            seen_where: false,
            advice: Vec::new(),
        }
    }
}

impl Rule for WhereRequirement {
    fn name(&self) -> &'static str {
        "where-requirement"
    }

    fn scope(&self) -> StateScope {
        StateScope::PerStatement
    }

    fn begin_statement(&mut self, _stmt: &SourceStatement) {
        self.requires_where = false;
        self.seen_where = false;
    }

    fn on_enter(&mut self, _node: &Node, tag: Tag) -> Result<(), RuleError> {
        match tag {
            Tag::Update | Tag::Delete => self.requires_where = true,
            Tag::Where => self.seen_where = true,
            _ => {}
        }
        Ok(())
    }

    fn end_statement(&mut self, stmt: &SourceStatement) {
        if self.requires_where && !self.seen_where {
            self.advice.push(
                Advice::new(
                    self.severity,
                    codes::STATEMENT_NO_WHERE,
                    TITLE,
                    format!("\"{}\" requires a WHERE clause", stmt.text),
                )
                .with_position(normalized_line(stmt.base_line, 1), 0),
            );
        }
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

    fn run(sql: &str) -> Vec<Advice> {
        let statements = split_statements(sql, Dialect::Mysql).expect("parse");
        let mut rules: Vec<Box<dyn Rule>> =
            vec![Box::new(WhereRequirement::new(Severity::Error))];
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
    fn update_without_where_is_flagged() {
        let advice = run("UPDATE t SET a = 1");
        assert_eq!(advice.len(), 1);
        assert_eq!(advice[0].code, codes::STATEMENT_NO_WHERE);
        assert_eq!(advice[0].content, "\"UPDATE t SET a = 1\" requires a WHERE clause");
    }

    #[test]
    fn delete_without_where_is_flagged() {
        assert_eq!(run("DELETE FROM t").len(), 1);
    }

    #[test]
    fn filtered_dml_passes() {
        assert!(run("UPDATE t SET a = 1 WHERE id = 3").is_empty());
        assert!(run("DELETE FROM t WHERE id = 3").is_empty());
    }

    #[test]
    fn flag_resets_between_statements() {
        let advice = run("UPDATE t SET a = 1 WHERE id = 3;\nUPDATE t SET a = 2");
        assert_eq!(advice.len(), 1);
        assert_eq!(advice[0].position.unwrap().line, 1);
    }

    #[test]
    fn plain_select_is_ignored() {
        assert!(run("SELECT * FROM t").is_empty());
    }
}
