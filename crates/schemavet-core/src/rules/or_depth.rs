//! OR-nesting depth ceiling.
//!
//! Accumulates the deepest OR nesting seen while walking a statement and
//! settles the verdict only at statement end — the maximum is not knowable
//! before the whole tree has been visited.

use crate::advice::{codes, normalized_line, Advice, Severity};
use crate::parser::SourceStatement;
use crate::rule::{FinishContext, Rule, RuleError, StateScope};
use crate::tree::{Node, Tag};

const TITLE: &str = "OR nesting exceeds the limit";

pub struct OrConditionDepth {
    severity: Severity,
    max: usize,
    depth: usize,
    deepest: usize,
    advice: Vec<Advice>,
}

impl OrConditionDepth {
    pub fn new(severity: Severity, max: i64) -> Self {
        Self {
            severity,
            max: max.max(0) as usize,
            depth: 0,
            deepest: 0,
            advice: Vec::new(),
        }
    }
}

impl Rule for OrConditionDepth {
    fn name(&self) -> &'static str {
        "or-condition-depth"
    }

    fn scope(&self) -> StateScope {
        StateScope::PerStatement
    }

    fn begin_statement(&mut self, _stmt: &SourceStatement) {
        self.depth = 0;
        self.deepest = 0;
    }

    fn on_enter(&mut self, _node: &Node, tag: Tag) -> Result<(), RuleError> {
        if tag == Tag::Or {
            self.depth += 1;
            self.deepest = self.deepest.max(self.depth);
        }
        Ok(())
    }

    fn on_exit(&mut self, _node: &Node, tag: Tag) -> Result<(), RuleError> {
        if tag == Tag::Or {
            self.depth = self.depth.saturating_sub(1);
        }
        Ok(())
    }

    fn end_statement(&mut self, stmt: &SourceStatement) {
        if self.deepest > self.max {
            self.advice.push(
                Advice::new(
                    self.severity,
                    codes::OR_DEPTH_EXCEEDED,
                    TITLE,
                    format!(
                        "\"{}\" nests OR conditions {} levels deep, exceeding the limit {}",
                        stmt.text, self.deepest, self.max
                    ),
                )
                .with_position(normalized_line(stmt.base_line, 1), 0),
            );
        }
    }

    fn take_advice(&mut self, _ctx: &FinishContext<'_>) -> Vec<Advice> {
        std::mem::take(&mut self.advice)
    }
}
