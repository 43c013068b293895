//! File and stdout handling for the CLI
//!
//! - Workloads: a JSON array of query trees, or one query tree per line
//! - Command output: JSON lines or plain text on stdout, or a file
//! - UTF-8 only

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use serde::Serialize;

use super::errors::{CliError, CliResult};
use crate::scanner::QueryTree;

/// Reads a workload file, or stdin when the path is `-`
pub fn read_workload(path: &Path) -> CliResult<Vec<QueryTree>> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .lock()
            .read_to_string(&mut buf)
            .map_err(|e| CliError::workload_error(format!("Failed to read stdin: {}", e)))?;
        buf
    } else {
        fs::read_to_string(path).map_err(|e| {
            CliError::workload_error(format!("Failed to read workload {}: {}", path.display(), e))
        })?
    };
    parse_workload(&content)
}

/// Parses workload text
pub fn parse_workload(content: &str) -> CliResult<Vec<QueryTree>> {
    if content.trim_start().starts_with('[') {
        return serde_json::from_str(content)
            .map_err(|e| CliError::workload_error(format!("Invalid workload JSON: {}", e)));
    }

    let mut queries = Vec::new();
    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let query = serde_json::from_str(line).map_err(|e| {
            CliError::workload_error(format!("Invalid query on line {}: {}", index + 1, e))
        })?;
        queries.push(query);
    }
    Ok(queries)
}

/// Write one value as a JSON line to stdout
pub fn write_json_line<T: Serialize>(value: &T) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

/// Write text to stdout
pub fn write_stdout(text: &str) -> CliResult<()> {
    let mut stdout = io::stdout();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;

    Ok(())
}

/// Write text to a file, replacing its content
pub fn write_file(path: &Path, text: &str) -> CliResult<()> {
    fs::write(path, text)
        .map_err(|e| CliError::io_error(format!("Failed to write {}: {}", path.display(), e)))
}
