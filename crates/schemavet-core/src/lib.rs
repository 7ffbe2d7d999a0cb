pub mod advice;
pub mod advisor;
pub mod catalog;
pub mod dispatch;
pub mod error;
pub mod parser;
pub mod rule;
pub mod rules;
pub mod tree;

// Re-export the main entry points
pub use advisor::{check, check_all, ChangeKind, CheckContext, Payload, RuleConfig, RuleLevel};
pub use parser::{split_statements, Dialect, SourceStatement};
pub use rules::{build_rule, RuleKind};

// Re-export types explicitly
pub use advice::{codes, normalized_line, sort_advice, Advice, Position, Severity};
pub use catalog::{Catalog, CatalogError, IndexMeta, MemoryCatalog, TableMeta};
pub use dispatch::{walk, WalkReport};
pub use error::{AdvisorError, ParseError};
pub use rule::{FinishContext, Rule, RuleError, StateScope};
pub use tree::{lower_statement, ConstraintKind, Node, NodeBody, Tag};
