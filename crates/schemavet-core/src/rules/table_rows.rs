//! Table-size quota for rewriting operations.
//!
//! Same aggregator shape as the index-count rule: statements that rewrite a
//! table in place (ALTER TABLE, CREATE INDEX) record `table → line` with
//! last-touch-wins, and the catalog's row counts are consulted once at
//! collection. Large tables make those operations lock writers for a long
//! time, which is what this quota guards.

use std::collections::HashMap;

use crate::advice::{codes, normalized_line, Advice, Severity};
use crate::parser::SourceStatement;
use crate::rule::{FinishContext, Rule, RuleError, StateScope};
use crate::tree::{Node, NodeBody, Tag};

const TITLE: &str = "Table size exceeds the limit";

pub struct TableRowLimit {
    severity: Severity,
    max: u64,
    line: usize,
    touched: HashMap<String, usize>,
}

impl TableRowLimit {
    pub fn new(severity: Severity, max: i64) -> Self {
        Self {
            severity,
            max: max.max(0) as u64,
            line: 0,
            touched: HashMap::new(),
        }
    }
}

impl Rule for TableRowLimit {
    fn name(&self) -> &'static str {
        "table-row-limit"
    }

    fn scope(&self) -> StateScope {
        StateScope::CrossStatement
    }

    fn begin_statement(&mut self, stmt: &SourceStatement) {
        self.line = normalized_line(stmt.base_line, 1);
    }

    fn on_enter(&mut self, node: &Node, _tag: Tag) -> Result<(), RuleError> {
        match &node.body {
            NodeBody::AlterTable { table } | NodeBody::CreateIndex { table, .. } => {
                self.touched.insert(table.clone(), self.line);
            }
            _ => {}
        }
        Ok(())
    }

    fn take_advice(&mut self, ctx: &FinishContext<'_>) -> Vec<Advice> {
        let Some(catalog) = ctx.catalog else {
            return Vec::new();
        };

        let mut entries: Vec<(String, usize)> = self.touched.drain().collect();
        entries.sort_by(|left, right| left.1.cmp(&right.1));

        entries
            .into_iter()
            .filter_map(|(table, line)| {
                let rows = catalog.table(&table).map_or(0, |meta| meta.row_count);
                (rows > self.max).then(|| {
                    Advice::new(
                        self.severity,
                        codes::TABLE_ROWS_EXCEEDED,
                        TITLE,
                        format!(
                            "Table `{table}` holds {rows} rows, exceeding the limit {}; rewriting it may block writes for a long time",
                            self.max
                        ),
                    )
                    .with_position(line, 0)
                })
            })
            .collect()
    }
}
