//! Output formatting modules.

pub mod report;

pub use report::{format_check_json, format_check_results, FileCheckResult};
