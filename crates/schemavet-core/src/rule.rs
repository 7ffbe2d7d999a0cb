//! Advisory rule contract.
//!
//! A rule observes the single tree traversal the dispatcher performs per
//! statement, mutating its own state in enter/exit hooks and surrendering
//! accumulated findings once at the end of the check.

use thiserror::Error;

use crate::advice::Advice;
use crate::catalog::Catalog;
use crate::parser::SourceStatement;
use crate::tree::{Node, Tag};

/// How long a rule's internal state lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateScope {
    /// State is reset before every statement's walk.
    PerStatement,
    /// State accumulates across all statements of one check invocation and
    /// is consulted once, at collection time.
    CrossStatement,
}

/// A rule hook failed. Non-fatal: the dispatcher records it and keeps
/// walking, so one misbehaving rule cannot suppress the others' findings.
#[derive(Debug, Clone, Error)]
#[error("rule {rule} failed at {tag}: {message}")]
pub struct RuleError {
    pub rule: &'static str,
    pub tag: &'static str,
    pub message: String,
}

impl RuleError {
    pub fn new(rule: &'static str, tag: Tag, message: impl Into<String>) -> Self {
        Self {
            rule,
            tag: tag.as_str(),
            message: message.into(),
        }
    }
}

/// Context handed to [`Rule::take_advice`] for deferred, catalog-backed
/// evaluation.
pub struct FinishContext<'a> {
    /// Schema catalog after walking through the checked statements, when one
    /// was supplied and walkthrough succeeded. Quota rules must skip
    /// emission when this is `None`.
    pub catalog: Option<&'a dyn Catalog>,
}

/// One pluggable advisory check.
///
/// Lifecycle per check invocation, driven by the advisor:
/// per statement, `begin_statement` → one walk (`on_enter`/`on_exit` per
/// node) → `end_statement`; after the last statement, a single
/// `take_advice`. `take_advice` consumes accumulated state and may perform
/// non-idempotent post-processing; it is called exactly once.
pub trait Rule {
    fn name(&self) -> &'static str;

    /// State lifetime discipline this rule follows. The advisor calls
    /// `begin_statement` either way; rules reset themselves there only when
    /// scoped per statement.
    fn scope(&self) -> StateScope;

    fn begin_statement(&mut self, _stmt: &SourceStatement) {}

    fn on_enter(&mut self, node: &Node, tag: Tag) -> Result<(), RuleError>;

    fn on_exit(&mut self, _node: &Node, _tag: Tag) -> Result<(), RuleError> {
        Ok(())
    }

    /// Deferred per-statement finalization, invoked after the walk returns.
    /// Violations only knowable once the whole statement has been seen
    /// (e.g. accumulated nesting depth) are materialized here.
    fn end_statement(&mut self, _stmt: &SourceStatement) {}

    /// Surrenders all accumulated findings. Called at most once.
    fn take_advice(&mut self, ctx: &FinishContext<'_>) -> Vec<Advice>;
}
