//! Advisory rule implementations and registry.
//!
//! Registration is explicit: the advisor builds the rule instances it needs
//! from [`RuleKind`] values, so tests can run any subset and no global
//! mutable registry exists. Every rule instance is fresh per check
//! invocation; stateful rules rely on that.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::advisor::{ChangeKind, RuleConfig};
use crate::error::AdvisorError;
use crate::rule::Rule;

pub mod column_charset;
pub mod compatibility;
pub mod drop_database;
pub mod index_count;
pub mod or_depth;
pub mod table_naming;
pub mod table_rows;
pub mod where_requirement;

/// Identifier of an advisory rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RuleKind {
    BackwardCompatibility,
    IndexCountLimit,
    TableRowLimit,
    ColumnCharsetAllowlist,
    WhereRequirement,
    OrConditionDepth,
    TableNaming,
    DropDatabaseEmpty,
}

impl RuleKind {
    pub const ALL: [RuleKind; 8] = [
        RuleKind::BackwardCompatibility,
        RuleKind::IndexCountLimit,
        RuleKind::TableRowLimit,
        RuleKind::ColumnCharsetAllowlist,
        RuleKind::WhereRequirement,
        RuleKind::OrConditionDepth,
        RuleKind::TableNaming,
        RuleKind::DropDatabaseEmpty,
    ];

    /// Stable machine name, also used by CLI `--exclude-rules`.
    pub fn as_str(self) -> &'static str {
        match self {
            RuleKind::BackwardCompatibility => "backward-compatibility",
            RuleKind::IndexCountLimit => "index-count-limit",
            RuleKind::TableRowLimit => "table-row-limit",
            RuleKind::ColumnCharsetAllowlist => "column-charset-allowlist",
            RuleKind::WhereRequirement => "where-requirement",
            RuleKind::OrConditionDepth => "or-condition-depth",
            RuleKind::TableNaming => "table-naming",
            RuleKind::DropDatabaseEmpty => "drop-database-empty",
        }
    }

    /// Which change kinds this rule runs for. A non-matching check
    /// short-circuits to an empty advice list before any parsing.
    pub fn applies_to(self, change: ChangeKind) -> bool {
        match self {
            RuleKind::WhereRequirement | RuleKind::OrConditionDepth => {
                matches!(change, ChangeKind::Dml)
            }
            RuleKind::BackwardCompatibility
            | RuleKind::IndexCountLimit
            | RuleKind::TableRowLimit
            | RuleKind::ColumnCharsetAllowlist
            | RuleKind::TableNaming
            | RuleKind::DropDatabaseEmpty => {
                matches!(change, ChangeKind::Ddl | ChangeKind::Sdl)
            }
        }
    }
}

impl std::str::FromStr for RuleKind {
    type Err = AdvisorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        RuleKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| AdvisorError::UnknownRule(value.to_string()))
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds a fresh rule instance, validating the payload shape.
pub fn build_rule(config: &RuleConfig) -> Result<Box<dyn Rule>, AdvisorError> {
    let severity = config.level.severity();
    Ok(match config.kind {
        RuleKind::BackwardCompatibility => {
            Box::new(compatibility::BackwardCompatibility::new(severity))
        }
        RuleKind::IndexCountLimit => Box::new(index_count::IndexCountLimit::new(
            severity,
            config.payload.require_number(config.kind)?,
        )),
        RuleKind::TableRowLimit => Box::new(table_rows::TableRowLimit::new(
            severity,
            config.payload.require_number(config.kind)?,
        )),
        RuleKind::ColumnCharsetAllowlist => Box::new(column_charset::ColumnCharsetAllowlist::new(
            severity,
            config.payload.require_list(config.kind)?,
        )),
        RuleKind::WhereRequirement => {
            Box::new(where_requirement::WhereRequirement::new(severity))
        }
        RuleKind::OrConditionDepth => Box::new(or_depth::OrConditionDepth::new(
            severity,
            config.payload.require_number(config.kind)?,
        )),
        RuleKind::TableNaming => Box::new(table_naming::TableNaming::new(
            severity,
            config.payload.require_text(config.kind)?,
        )?),
        RuleKind::DropDatabaseEmpty => {
            Box::new(drop_database::DropDatabaseEmpty::new(severity))
        }
    })
}
