//! CLI argument parsing using clap.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// schemavet - SQL schema-change advisor
#[derive(Parser, Debug)]
#[command(name = "schemavet")]
#[command(about = "Check SQL changes against advisory rules", long_about = None)]
#[command(version)]
pub struct Args {
    /// SQL files to check (reads from stdin if none provided)
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// SQL dialect
    #[arg(short, long, default_value = "mysql", value_enum)]
    pub dialect: DialectArg,

    /// Output format
    #[arg(short, long, default_value = "report", value_enum)]
    pub format: OutputFormat,

    /// Kind of change the input represents
    #[arg(short, long, default_value = "ddl", value_enum)]
    pub change: ChangeArg,

    /// Comma-separated list of rule names to exclude (e.g., table-naming,or-condition-depth)
    #[arg(long, value_delimiter = ',')]
    pub exclude_rules: Vec<String>,

    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Omit info-level findings from the report
    #[arg(short, long)]
    pub quiet: bool,

    /// Compact JSON output (no pretty-printing)
    #[arg(long)]
    pub compact: bool,
}

/// SQL dialect options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DialectArg {
    Generic,
    Mysql,
    Postgres,
}

impl From<DialectArg> for schemavet_core::Dialect {
    fn from(d: DialectArg) -> Self {
        match d {
            DialectArg::Generic => schemavet_core::Dialect::Generic,
            DialectArg::Mysql => schemavet_core::Dialect::Mysql,
            DialectArg::Postgres => schemavet_core::Dialect::Postgres,
        }
    }
}

/// Kind of change being checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChangeArg {
    /// Schema changes (CREATE/ALTER/DROP)
    Ddl,
    /// Data changes (INSERT/UPDATE/DELETE)
    Dml,
    /// Full-state schema declarations
    Sdl,
}

impl From<ChangeArg> for schemavet_core::ChangeKind {
    fn from(c: ChangeArg) -> Self {
        match c {
            ChangeArg::Ddl => schemavet_core::ChangeKind::Ddl,
            ChangeArg::Dml => schemavet_core::ChangeKind::Dml,
            ChangeArg::Sdl => schemavet_core::ChangeKind::Sdl,
        }
    }
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable per-file report
    Report,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_conversion() {
        let dialect: schemavet_core::Dialect = DialectArg::Postgres.into();
        assert_eq!(dialect, schemavet_core::Dialect::Postgres);
    }

    #[test]
    fn test_parse_minimal_args() {
        let args = Args::parse_from(["schemavet", "migration.sql"]);
        assert_eq!(args.files.len(), 1);
        assert_eq!(args.dialect, DialectArg::Mysql);
        assert_eq!(args.format, OutputFormat::Report);
        assert_eq!(args.change, ChangeArg::Ddl);
        assert!(args.exclude_rules.is_empty());
    }

    #[test]
    fn test_parse_full_args() {
        let args = Args::parse_from([
            "schemavet",
            "-d",
            "postgres",
            "-f",
            "json",
            "-c",
            "dml",
            "-o",
            "report.json",
            "--quiet",
            "--compact",
            "file1.sql",
            "file2.sql",
        ]);
        assert_eq!(args.dialect, DialectArg::Postgres);
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.change, ChangeArg::Dml);
        assert_eq!(args.output.unwrap().to_str().unwrap(), "report.json");
        assert!(args.quiet);
        assert!(args.compact);
        assert_eq!(args.files.len(), 2);
    }

    #[test]
    fn test_exclude_rules_delimited() {
        let args = Args::parse_from([
            "schemavet",
            "--exclude-rules",
            "table-naming,or-condition-depth",
            "migration.sql",
        ]);
        assert_eq!(args.exclude_rules, vec!["table-naming", "or-condition-depth"]);
    }

    #[test]
    fn test_exclude_rules_repeated() {
        let args = Args::parse_from([
            "schemavet",
            "--exclude-rules",
            "table-naming",
            "--exclude-rules",
            "where-requirement",
            "migration.sql",
        ]);
        assert_eq!(args.exclude_rules, vec!["table-naming", "where-requirement"]);
    }
}
