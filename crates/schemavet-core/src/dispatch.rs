//! Visitor dispatcher: one tree walk, many observers.
//!
//! `walk` performs exactly one pre-order, depth-first traversal of a lowered
//! statement tree. At every node it resolves the tag once, then invokes each
//! rule's enter hook in registration order; after all children are visited
//! it invokes each rule's exit hook in the same order. Rules never trigger
//! additional walks, so adding a rule costs hook calls, not traversals.
//!
//! Hook failures are rule-local: they are logged, recorded in the returned
//! [`WalkReport`], and the walk continues with the next rule. Whether
//! dropping the failed rule's remaining work for that node is the right
//! product behavior is an open design question; the behavior here is
//! deliberate and pinned by tests.

use tracing::warn;

use crate::rule::{Rule, RuleError};
use crate::tree::Node;

/// Outcome of one statement walk.
#[derive(Debug, Default)]
pub struct WalkReport {
    /// Hook failures encountered, in traversal order.
    pub failures: Vec<RuleError>,
}

impl WalkReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Walks `root` once, fanning every node out to all `rules`.
pub fn walk(root: &Node, rules: &mut [Box<dyn Rule>]) -> WalkReport {
    let mut report = WalkReport::default();
    walk_node(root, rules, &mut report);
    report
}

fn walk_node(node: &Node, rules: &mut [Box<dyn Rule>], report: &mut WalkReport) {
    let tag = node.tag();

    for rule in rules.iter_mut() {
        if let Err(failure) = rule.on_enter(node, tag) {
            warn!(rule = failure.rule, tag = failure.tag, error = %failure, "rule enter hook failed");
            report.failures.push(failure);
        }
    }

    for child in &node.children {
        walk_node(child, rules, report);
    }

    for rule in rules.iter_mut() {
        if let Err(failure) = rule.on_exit(node, tag) {
            warn!(rule = failure.rule, tag = failure.tag, error = %failure, "rule exit hook failed");
            report.failures.push(failure);
        }
    }
}
