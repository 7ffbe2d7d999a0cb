//! schemavet CLI - SQL schema-change advisor

use schemavet_cli::cli;
use schemavet_cli::input;
use schemavet_cli::output;

use anyhow::{Context, Result};
use clap::Parser;
use is_terminal::IsTerminal;
use schemavet_core::{check_all, CheckContext, RuleConfig, RuleKind, Severity};
use std::fs;
use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Instant;

use cli::{Args, OutputFormat};
use output::{format_check_json, format_check_results, FileCheckResult};

/// Findings reported.
const EXIT_FAILURE: u8 = 1;
/// Configuration error (e.g. unknown rule name in --exclude-rules).
const EXIT_CONFIG_ERROR: u8 = 66;

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(has_findings) => {
            if has_findings {
                ExitCode::from(EXIT_FAILURE)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("schemavet: error: {e:#}");
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
    }
}

/// Run the check; returns whether any findings were reported.
fn run(args: Args) -> Result<bool> {
    let started = Instant::now();
    let configs = build_configs(&args.exclude_rules)?;
    let sources = input::read_input(&args.files)?;

    let mut results = Vec::with_capacity(sources.len());
    for source in &sources {
        let mut ctx = CheckContext {
            dialect: args.dialect.into(),
            change: args.change.into(),
            catalog: None,
        };
        let mut advice = check_all(&source.content, &configs, &mut ctx)
            .with_context(|| format!("checking {}", source.name))?;
        if args.quiet {
            drop_info_findings(&mut advice);
        }
        results.push(FileCheckResult {
            name: source.name.clone(),
            advice,
        });
    }

    let has_findings = results.iter().any(|r| !r.advice.is_empty());

    let to_stdout = args.output.is_none();
    let colored =
        to_stdout && args.format == OutputFormat::Report && io::stdout().is_terminal();

    let rendered = match args.format {
        OutputFormat::Report => format_check_results(&results, colored, started.elapsed()),
        OutputFormat::Json => format_check_json(&results, args.compact),
    };

    match &args.output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("Failed to write output file: {}", path.display()))?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            if !rendered.ends_with('\n') {
                writeln!(stdout)?;
            }
        }
    }

    Ok(has_findings)
}

/// --quiet keeps errors and warnings, drops info-level findings.
fn drop_info_findings(advice: &mut Vec<schemavet_core::Advice>) {
    advice.retain(|a| a.severity != Severity::Info);
}

/// Default rule set minus the excluded rules. Unknown names are
/// configuration errors.
fn build_configs(exclude: &[String]) -> Result<Vec<RuleConfig>> {
    let mut excluded = Vec::with_capacity(exclude.len());
    for name in exclude {
        let kind: RuleKind = name
            .parse()
            .with_context(|| format!("--exclude-rules: {name:?}"))?;
        excluded.push(kind);
    }

    Ok(RuleKind::ALL
        .into_iter()
        .filter(|kind| !excluded.contains(kind))
        .map(RuleConfig::default_for)
        .collect())
}
