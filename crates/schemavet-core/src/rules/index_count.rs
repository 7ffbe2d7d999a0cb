//! Index-count quota.
//!
//! Cross-statement aggregator: every statement that creates an index on a
//! table (CREATE TABLE with inline keys, CREATE INDEX, ALTER TABLE ADD
//! constraint) records `table → line`, overwriting earlier touches so the
//! last touching statement's line is what gets reported. Catalog counts are
//! consulted once, at collection, after the advisor has walked the catalog
//! through the whole batch — so the quota sees post-statement totals.

use std::collections::HashMap;

use crate::advice::{codes, normalized_line, Advice, Severity};
use crate::parser::SourceStatement;
use crate::rule::{FinishContext, Rule, RuleError, StateScope};
use crate::tree::{Node, NodeBody, Tag};

const TITLE: &str = "Index count exceeds the limit";

pub struct IndexCountLimit {
    severity: Severity,
    max: usize,
    /// Visible line of the statement currently being walked.
    line: usize,
    /// Table of the ALTER TABLE currently being walked, if any.
    altering: Option<String>,
    /// Last-touch-wins map of tables whose index set this batch grows.
    touched: HashMap<String, usize>,
}

impl IndexCountLimit {
    pub fn new(severity: Severity, max: i64) -> Self {
        Self {
            severity,
            max: max.max(0) as usize,
            line: 0,
            altering: None,
            touched: HashMap::new(),
        }
    }
}

impl Rule for IndexCountLimit {
    fn name(&self) -> &'static str {
        "index-count-limit"
    }

    fn scope(&self) -> StateScope {
        StateScope::CrossStatement
    }

    fn begin_statement(&mut self, stmt: &SourceStatement) {
        self.line = normalized_line(stmt.base_line, 1);
        self.altering = None;
    }

    fn on_enter(&mut self, node: &Node, _tag: Tag) -> Result<(), RuleError> {
        match &node.body {
            NodeBody::CreateTable { table, .. } => {
                self.touched.insert(table.clone(), self.line);
            }
            NodeBody::CreateIndex { table, .. } => {
                self.touched.insert(table.clone(), self.line);
            }
            NodeBody::AlterTable { table } => {
                self.altering = Some(table.clone());
            }
            NodeBody::AddConstraint { .. } => {
                if let Some(table) = &self.altering {
                    self.touched.insert(table.clone(), self.line);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn on_exit(&mut self, _node: &Node, tag: Tag) -> Result<(), RuleError> {
        if tag == Tag::AlterTable {
            self.altering = None;
        }
        Ok(())
    }

    fn take_advice(&mut self, ctx: &FinishContext<'_>) -> Vec<Advice> {
        // Quota rules are meaningless without ground truth.
        let Some(catalog) = ctx.catalog else {
            return Vec::new();
        };

        let mut entries: Vec<(String, usize)> = self.touched.drain().collect();
        entries.sort_by(|left, right| left.1.cmp(&right.1));

        entries
            .into_iter()
            .filter_map(|(table, line)| {
                let count = catalog.index_count(&table);
                (count > self.max).then(|| {
                    Advice::new(
                        self.severity,
                        codes::INDEX_COUNT_EXCEEDED,
                        TITLE,
                        format!(
                            "The count of index in table `{table}` should be no more than {}, but found {count}",
                            self.max
                        ),
                    )
                    .with_position(line, 0)
                })
            })
            .collect()
    }
}
