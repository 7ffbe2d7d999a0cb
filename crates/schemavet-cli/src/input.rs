//! Input handling for file reading and stdin support.

use anyhow::{Context, Result};
use std::io::{self, Read};
use std::path::PathBuf;

/// One SQL text to check, with a display name for reporting.
pub struct SqlSource {
    pub name: String,
    pub content: String,
}

/// Read SQL input from files or stdin.
///
/// If no files are provided, reads from stdin.
pub fn read_input(files: &[PathBuf]) -> Result<Vec<SqlSource>> {
    if files.is_empty() {
        read_from_stdin()
    } else {
        read_from_files(files)
    }
}

fn read_from_stdin() -> Result<Vec<SqlSource>> {
    let mut content = String::new();
    io::stdin()
        .read_to_string(&mut content)
        .context("Failed to read from stdin")?;

    Ok(vec![SqlSource {
        name: "<stdin>".to_string(),
        content,
    }])
}

fn read_from_files(files: &[PathBuf]) -> Result<Vec<SqlSource>> {
    files
        .iter()
        .map(|path| {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read file: {}", path.display()))?;

            Ok(SqlSource {
                name: path.display().to_string(),
                content,
            })
        })
        .collect()
}
