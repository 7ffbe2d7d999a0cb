//! DROP DATABASE guard.
//!
//! Dropping a database is only acceptable when the database holds no tables.
//! With catalog metadata available the emptiness check is exact; without it
//! the rule stays conservative and flags every DROP DATABASE it sees.

use crate::advice::{codes, normalized_line, Advice, Severity};
use crate::parser::SourceStatement;
use crate::rule::{FinishContext, Rule, RuleError, StateScope};
use crate::tree::{Node, NodeBody, Tag};

const TITLE: &str = "Database is not empty";

pub struct DropDatabaseEmpty {
    severity: Severity,
    base_line: usize,
    drops: Vec<(String, usize)>,
}

impl DropDatabaseEmpty {
    pub fn new(severity: Severity) -> Self {
        Self {
            severity,
            base_line: 0,
            drops: Vec::new(),
        }
    }
}

impl Rule for DropDatabaseEmpty {
    fn name(&self) -> &'static str {
        "drop-database-empty"
    }

    fn scope(&self) -> StateScope {
        StateScope::CrossStatement
    }

    fn begin_statement(&mut self, stmt: &SourceStatement) {
        self.base_line = stmt.base_line;
    }

    fn on_enter(&mut self, node: &Node, _tag: Tag) -> Result<(), RuleError> {
        if let NodeBody::DropDatabase { database } = &node.body {
            self.drops
                .push((database.clone(), normalized_line(self.base_line, 1)));
        }
        Ok(())
    }

    fn take_advice(&mut self, ctx: &FinishContext<'_>) -> Vec<Advice> {
        let mut advice = Vec::new();
        for (database, line) in self.drops.drain(..) {
            let empty = match ctx.catalog {
                Some(catalog) => catalog.is_empty(),
                // No metadata to consult; assume the worst.
                None => false,
            };
            if !empty {
                advice.push(
                    Advice::new(
                        self.severity,
                        codes::DATABASE_NOT_EMPTY,
                        TITLE,
                        format!("Database `{database}` is not empty and cannot be dropped"),
                    )
                    .with_position(line, 0),
                );
            }
        }
        advice
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, MemoryCatalog, TableMeta};
    use crate::dispatch::walk;
    use crate::parser::{split_statements, Dialect};
    use crate::tree::lower_statement;

    fn run(sql: &str, catalog: Option<&dyn Catalog>) -> Vec<Advice> {
        let statements = split_statements(sql, Dialect::Mysql).expect("parse");
        let mut rules: Vec<Box<dyn Rule>> =
            vec![Box::new(DropDatabaseEmpty::new(Severity::Error))];
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
        rules[0].take_advice(&FinishContext { catalog })
    }

    #[test]
    fn empty_catalog_allows_drop() {
        let catalog = MemoryCatalog::new();
        assert!(run("DROP DATABASE archive", Some(&catalog)).is_empty());
    }

    #[test]
    fn populated_catalog_blocks_drop() {
        let mut catalog = MemoryCatalog::new();
        catalog.add_table(TableMeta {
            name: "orders".into(),
            ..TableMeta::default()
        });
        let advice = run("DROP DATABASE archive", Some(&catalog));
        assert_eq!(advice.len(), 1);
        assert_eq!(advice[0].code, codes::DATABASE_NOT_EMPTY);
        assert_eq!(
            advice[0].content,
            "Database `archive` is not empty and cannot be dropped"
        );
    }

    #[test]
    fn missing_catalog_is_conservative() {
        let advice = run("DROP DATABASE archive", None);
        assert_eq!(advice.len(), 1);
    }

    #[test]
    fn advice_anchors_on_the_statement_line() {
        let advice = run("SELECT 1;\nDROP DATABASE archive", None);
        assert_eq!(advice.len(), 1);
        assert_eq!(advice[0].position.unwrap().line, 1);
    }

    #[test]
    fn unrelated_statements_pass() {
        let catalog = MemoryCatalog::new();
        assert!(run("DROP TABLE orders", Some(&catalog)).is_empty());
    }
}
