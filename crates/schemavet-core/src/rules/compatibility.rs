//! Backward-compatibility classifier.
//!
//! One verdict per statement: the first incompatible pattern encountered
//! during traversal wins, later detections within the same statement are
//! ignored. The verdict is materialized into a single advice at statement
//! end, then reset. Tables created earlier in the same batch are exempt —
//! a brand-new table has no existing consumers to break.

use std::collections::HashSet;

use crate::advice::{codes, normalized_line, Advice, Severity};
use crate::parser::SourceStatement;
use crate::rule::{FinishContext, Rule, RuleError, StateScope};
use crate::tree::{ConstraintKind, Node, NodeBody, Tag};

const TITLE: &str = "Backward incompatible change";

pub struct BackwardCompatibility {
    severity: Severity,
    /// Verdict for the statement being walked; `codes::OK` means compatible.
    verdict: i32,
    /// Set while walking an ALTER TABLE against a table created in this
    /// batch; suppresses all detections underneath it.
    exempt: bool,
    /// Tables created so far in this batch.
    created: HashSet<String>,
    advice: Vec<Advice>,
}

impl BackwardCompatibility {
    pub fn new(severity: Severity) -> Self {
        Self {
            severity,
            verdict: codes::OK,
            exempt: false,
            created: HashSet::new(),
            advice: Vec::new(),
        }
    }

    /// First write wins; detections inside an exempt ALTER are dropped.
    fn record(&mut self, code: i32) {
        if self.exempt || self.verdict != codes::OK {
            return;
        }
        self.verdict = code;
    }
}

impl Rule for BackwardCompatibility {
    fn name(&self) -> &'static str {
        "backward-compatibility"
    }

    fn scope(&self) -> StateScope {
        // The created-table set spans the whole batch.
        StateScope::CrossStatement
    }

    fn begin_statement(&mut self, _stmt: &SourceStatement) {
        self.verdict = codes::OK;
        self.exempt = false;
    }

    fn on_enter(&mut self, node: &Node, _tag: Tag) -> Result<(), RuleError> {
        match &node.body {
            NodeBody::CreateTable { table, .. } => {
                self.created.insert(table.clone());
            }

            NodeBody::AlterTable { table } => {
                if self.created.contains(table) {
                    self.exempt = true;
                }
            }

            NodeBody::DropDatabase { .. } => {
                self.record(codes::COMPATIBILITY_DROP_DATABASE);
            }

            NodeBody::DropTable { tables } => {
                if tables.iter().any(|table| !self.created.contains(table)) {
                    self.record(codes::COMPATIBILITY_DROP_TABLE);
                }
            }

            NodeBody::RenameTable { table, .. } => {
                if !self.created.contains(table) {
                    self.record(codes::COMPATIBILITY_RENAME_TABLE);
                }
            }

            NodeBody::DropColumn { .. } => {
                self.record(codes::COMPATIBILITY_DROP_COLUMN);
            }

            NodeBody::RenameColumn { .. } => {
                self.record(codes::COMPATIBILITY_RENAME_COLUMN);
            }

            NodeBody::ModifyColumn { .. } => {
                self.record(codes::COMPATIBILITY_ALTER_COLUMN);
            }

            NodeBody::AddConstraint { kind, .. } => match kind {
                ConstraintKind::PrimaryKey => self.record(codes::COMPATIBILITY_ADD_PRIMARY_KEY),
                ConstraintKind::Unique => self.record(codes::COMPATIBILITY_ADD_UNIQUE_KEY),
                ConstraintKind::ForeignKey => self.record(codes::COMPATIBILITY_ADD_FOREIGN_KEY),
                ConstraintKind::Check => self.record(codes::COMPATIBILITY_ADD_CHECK),
                ConstraintKind::Index => {}
            },

            NodeBody::AlterConstraint { .. } => {
                self.record(codes::COMPATIBILITY_ALTER_CHECK);
            }

            // A unique index on an existing table constrains current data.
            NodeBody::CreateIndex { table, unique, .. } => {
                if *unique && !self.created.contains(table) {
                    self.record(codes::COMPATIBILITY_ADD_UNIQUE_KEY);
                }
            }

            _ => {}
        }
        Ok(())
    }

    fn on_exit(&mut self, _node: &Node, tag: Tag) -> Result<(), RuleError> {
        if tag == Tag::AlterTable {
            self.exempt = false;
        }
        Ok(())
    }

    fn end_statement(&mut self, stmt: &SourceStatement) {
        if self.verdict != codes::OK {
            self.advice.push(
                Advice::new(
                    self.severity,
                    self.verdict,
                    TITLE,
                    format!(
                        "\"{}\" may cause incompatibility with the existing data and code",
                        stmt.text
                    ),
                )
                .with_position(normalized_line(stmt.base_line, 1), 0),
            );
        }
        self.verdict = codes::OK;
    }

    fn take_advice(&mut self, _ctx: &FinishContext<'_>) -> Vec<Advice> {
        std::mem::take(&mut self.advice)
    }
}
