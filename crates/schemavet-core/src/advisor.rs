//! Check entry points.
//!
//! A check runs one rule configuration (or a set) against a SQL text and
//! returns the sorted advice list. The two failure channels are distinct:
//! configuration problems (unknown rule, malformed payload, bad pattern)
//! return `Err(AdvisorError)`, while SQL that fails to parse returns `Ok`
//! with a single syntax-error finding.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::advice::{codes, sort_advice, Advice, Severity};
use crate::catalog::{Catalog, MemoryCatalog};
use crate::dispatch::walk;
use crate::error::AdvisorError;
use crate::parser::{split_statements, Dialect};
use crate::rule::{FinishContext, Rule};
use crate::rules::{build_rule, RuleKind};
use crate::tree::lower_statement;

/// Configured level of a rule, independent of the advice it emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RuleLevel {
    Error,
    Warning,
    Info,
}

impl RuleLevel {
    pub fn severity(self) -> Severity {
        match self {
            RuleLevel::Error => Severity::Error,
            RuleLevel::Warning => Severity::Warning,
            RuleLevel::Info => Severity::Info,
        }
    }
}

impl std::str::FromStr for RuleLevel {
    type Err = AdvisorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "error" => Ok(RuleLevel::Error),
            "warning" => Ok(RuleLevel::Warning),
            "info" => Ok(RuleLevel::Info),
            other => Err(AdvisorError::UnknownLevel(other.to_string())),
        }
    }
}

/// Rule parameter payload. Each rule expects one shape and rejects the rest
/// at build time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Payload {
    #[default]
    None,
    Number(i64),
    Text(String),
    List(Vec<String>),
}

impl Payload {
    pub fn require_number(&self, rule: RuleKind) -> Result<i64, AdvisorError> {
        match self {
            Payload::Number(value) => Ok(*value),
            _ => Err(AdvisorError::InvalidPayload {
                rule: rule.as_str(),
                expected: "number",
            }),
        }
    }

    pub fn require_text(&self, rule: RuleKind) -> Result<&str, AdvisorError> {
        match self {
            Payload::Text(value) => Ok(value),
            _ => Err(AdvisorError::InvalidPayload {
                rule: rule.as_str(),
                expected: "string",
            }),
        }
    }

    pub fn require_list(&self, rule: RuleKind) -> Result<&[String], AdvisorError> {
        match self {
            Payload::List(values) => Ok(values),
            _ => Err(AdvisorError::InvalidPayload {
                rule: rule.as_str(),
                expected: "string list",
            }),
        }
    }
}

/// One configured rule: which rule, at which level, with which parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RuleConfig {
    pub kind: RuleKind,
    pub level: RuleLevel,
    #[serde(default)]
    pub payload: Payload,
}

impl RuleConfig {
    /// Stock configuration for a rule, used when the caller does not supply
    /// payloads of its own.
    pub fn default_for(kind: RuleKind) -> Self {
        let (level, payload) = match kind {
            RuleKind::BackwardCompatibility => (RuleLevel::Error, Payload::None),
            RuleKind::IndexCountLimit => (RuleLevel::Warning, Payload::Number(5)),
            RuleKind::TableRowLimit => (RuleLevel::Warning, Payload::Number(1_000_000)),
            RuleKind::ColumnCharsetAllowlist => (
                RuleLevel::Warning,
                Payload::List(vec![
                    String::new(),
                    "utf8".to_string(),
                    "utf8mb4".to_string(),
                    "binary".to_string(),
                ]),
            ),
            RuleKind::WhereRequirement => (RuleLevel::Warning, Payload::None),
            RuleKind::OrConditionDepth => (RuleLevel::Warning, Payload::Number(2)),
            RuleKind::TableNaming => (
                RuleLevel::Warning,
                Payload::Text("^[a-z]+(_[a-z]+)*$".to_string()),
            ),
            RuleKind::DropDatabaseEmpty => (RuleLevel::Error, Payload::None),
        };
        Self {
            kind,
            level,
            payload,
        }
    }
}

/// What kind of change the SQL text represents. Rules declare which kinds
/// they run for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Ddl,
    Dml,
    Sdl,
}

/// Per-check environment: dialect, change kind, and the optional schema
/// snapshot quota rules consult. The snapshot is advanced statement by
/// statement so rules observe post-statement object counts.
pub struct CheckContext<'a> {
    pub dialect: Dialect,
    pub change: ChangeKind,
    pub catalog: Option<&'a mut MemoryCatalog>,
}

/// Runs a single configured rule against `sql`.
pub fn check(
    sql: &str,
    config: &RuleConfig,
    ctx: &mut CheckContext<'_>,
) -> Result<Vec<Advice>, AdvisorError> {
    check_all(sql, std::slice::from_ref(config), ctx)
}

/// Runs a set of configured rules against `sql` in one traversal per
/// statement. Advice from all rules is merged and sorted.
pub fn check_all(
    sql: &str,
    configs: &[RuleConfig],
    ctx: &mut CheckContext<'_>,
) -> Result<Vec<Advice>, AdvisorError> {
    // Configuration errors surface before any SQL is touched.
    let mut rules: Vec<Box<dyn Rule>> = Vec::new();
    for config in configs {
        if config.kind.applies_to(ctx.change) {
            rules.push(build_rule(config)?);
        }
    }
    if rules.is_empty() {
        return Ok(Vec::new());
    }

    let statements = match split_statements(sql, ctx.dialect) {
        Ok(statements) => statements,
        Err(err) => return Ok(vec![err.into_advice()]),
    };

    let mut degraded = false;
    let mut advice = Vec::new();
    for statement in &statements {
        let root = lower_statement(&statement.ast);
        for rule in rules.iter_mut() {
            rule.begin_statement(statement);
        }
        let report = walk(&root, &mut rules);
        for failure in report.failures {
            advice.push(Advice::error(
                codes::INTERNAL,
                "Internal rule failure",
                failure.to_string(),
            ));
        }
        for rule in rules.iter_mut() {
            rule.end_statement(statement);
        }
        if degraded {
            continue;
        }
        if let Some(catalog) = ctx.catalog.as_deref_mut() {
            if let Err(err) = catalog.walk_through(&root) {
                tracing::warn!(error = %err, "catalog walkthrough failed, quota rules run without catalog");
                degraded = true;
            }
        }
    }

    let finish = FinishContext {
        catalog: if degraded {
            None
        } else {
            ctx.catalog.as_deref().map(|catalog| catalog as &dyn Catalog)
        },
    };
    for rule in rules.iter_mut() {
        advice.extend(rule.take_advice(&finish));
    }
    sort_advice(&mut advice);
    Ok(advice)
}
