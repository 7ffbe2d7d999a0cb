//! Check report formatting.

use owo_colors::OwoColorize;
use schemavet_core::{Advice, Severity};
use std::fmt::Write;
use std::time::Duration;

/// Per-file check result used by the formatter.
pub struct FileCheckResult {
    pub name: String,
    pub advice: Vec<Advice>,
}

/// Format check results as human-readable per-file text.
pub fn format_check_results(
    results: &[FileCheckResult],
    colored: bool,
    elapsed: Duration,
) -> String {
    let mut out = String::new();

    let mut total_pass = 0usize;
    let mut total_fail = 0usize;
    let mut total_findings = 0usize;

    for file in results {
        if file.advice.is_empty() {
            total_pass += 1;
        } else {
            total_fail += 1;
            total_findings += file.advice.len();
        }

        write_file_section(&mut out, file, colored);
    }

    write_summary(
        &mut out,
        total_pass,
        total_fail,
        total_findings,
        colored,
        elapsed,
    );

    out
}

fn write_file_section(out: &mut String, file: &FileCheckResult, colored: bool) {
    let status = if file.advice.is_empty() {
        if colored {
            "PASS".green().to_string()
        } else {
            "PASS".to_string()
        }
    } else if colored {
        "FAIL".red().to_string()
    } else {
        "FAIL".to_string()
    };

    writeln!(out, "== [{}] {}", file.name, status).unwrap();

    for advice in &file.advice {
        let code_str = if colored {
            match advice.severity {
                Severity::Error => advice.code.red().to_string(),
                Severity::Warning => advice.code.yellow().to_string(),
                Severity::Info => advice.code.blue().to_string(),
            }
        } else {
            advice.code.to_string()
        };

        // Findings carry 0-based line numbers; batch-level ones carry none.
        let line = advice
            .position
            .map(|p| p.line.to_string())
            .unwrap_or_else(|| "-".to_string());

        writeln!(
            out,
            "L:{:>4} | {:>4} | {} | {}",
            line, code_str, advice.title, advice.content
        )
        .unwrap();
    }
}

fn write_summary(
    out: &mut String,
    pass: usize,
    fail: usize,
    findings: usize,
    colored: bool,
    elapsed: Duration,
) {
    writeln!(out, "All Finished in {}!", format_elapsed(elapsed)).unwrap();

    let summary = format!(
        "  {} passed. {} failed. {} findings.",
        file_count_str(pass, colored, false),
        file_count_str(fail, colored, true),
        findings
    );
    writeln!(out, "{summary}").unwrap();
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs >= 1.0 {
        format!("{secs:.2}s")
    } else if elapsed.as_millis() >= 1 {
        format!("{}ms", elapsed.as_millis())
    } else {
        format!("{}us", elapsed.as_micros())
    }
}

fn file_count_str(count: usize, colored: bool, failing: bool) -> String {
    let s = format!("{count} file{}", if count == 1 { "" } else { "s" });
    if colored && count > 0 {
        if failing {
            s.red().to_string()
        } else {
            s.green().to_string()
        }
    } else {
        s
    }
}

/// Format check results as JSON.
pub fn format_check_json(results: &[FileCheckResult], compact: bool) -> String {
    let json_results: Vec<serde_json::Value> = results
        .iter()
        .map(|file| {
            serde_json::json!({
                "file": file.name,
                "advice": file.advice,
            })
        })
        .collect();

    if compact {
        serde_json::to_string(&json_results).unwrap_or_default()
    } else {
        serde_json::to_string_pretty(&json_results).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemavet_core::codes;

    fn finding() -> Advice {
        Advice::warning(
            codes::TABLE_NAMING_MISMATCH,
            "Table naming convention mismatch",
            "`BadName` mismatches table naming convention",
        )
        .with_position(3, 0)
    }

    #[test]
    fn test_format_pass() {
        let results = vec![FileCheckResult {
            name: "clean.sql".to_string(),
            advice: vec![],
        }];

        let output = format_check_results(&results, false, Duration::from_millis(250));
        assert!(output.contains("PASS"));
        assert!(output.contains("All Finished in 250ms!"));
        assert!(output.contains("clean.sql"));
        assert!(output.contains("1 file passed"));
        assert!(output.contains("0 files failed"));
        assert!(output.contains("0 findings"));
    }

    #[test]
    fn test_format_fail() {
        let results = vec![FileCheckResult {
            name: "bad.sql".to_string(),
            advice: vec![finding()],
        }];

        let output = format_check_results(&results, false, Duration::from_secs_f64(1.5));
        assert!(output.contains("FAIL"));
        assert!(output.contains("All Finished in 1.50s!"));
        assert!(output.contains("401"));
        assert!(output.contains("L:   3"));
        assert!(output.contains("1 findings"));
    }

    #[test]
    fn test_positionless_finding_renders_dash() {
        let results = vec![FileCheckResult {
            name: "broken.sql".to_string(),
            advice: vec![Advice::error(
                codes::SYNTAX_ERROR,
                "Syntax error",
                "sql parse error",
            )],
        }];

        let output = format_check_results(&results, false, Duration::from_micros(700));
        assert!(output.contains("L:   -"));
        assert!(output.contains("All Finished in 700us!"));
    }

    #[test]
    fn test_format_json() {
        let results = vec![FileCheckResult {
            name: "bad.sql".to_string(),
            advice: vec![finding()],
        }];

        let json = format_check_json(&results, false);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let arr = parsed.as_array().unwrap();
        assert_eq!(arr.len(), 1);
        assert_eq!(arr[0]["file"], "bad.sql");
        assert_eq!(arr[0]["advice"][0]["code"], 401);
        assert_eq!(arr[0]["advice"][0]["severity"], "warning");
        assert_eq!(arr[0]["advice"][0]["position"]["line"], 3);
    }
}
