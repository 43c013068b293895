//! CLI command implementations
//!
//! Both commands load the JSON configuration and the catalog snapshot it
//! names before doing anything else. Nothing is written to stdout until all
//! inputs have been read and validated.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::advisor::{Advisor, AdvisorConfig, DEFAULT_MIN_ROW_COUNT, DEFAULT_PAGE_SIZE};
use crate::advisory::read_records;
use crate::candidate::DEFAULT_MAX_KEY_WIDTH;
use crate::catalog::{Catalog, CatalogSnapshot};
use crate::observability::{Logger, Severity};
use crate::selector::{
    aggregate, parse_budget, render_statements, render_summary, select_all, select_exact,
    select_greedy,
};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_workload, write_file, write_json_line, write_stdout};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Catalog snapshot JSON (required)
    pub catalog_path: String,

    /// Advisory records, one JSON object per line
    #[serde(default = "default_records_path")]
    pub records_path: String,

    /// Maximum key columns per candidate (1..=32)
    #[serde(default = "default_max_key_width")]
    pub max_key_width: usize,

    /// Tables with fewer rows are never indexed
    #[serde(default = "default_min_row_count")]
    pub min_row_count: u64,

    /// Storage page size in bytes
    #[serde(default = "default_page_size")]
    pub page_size: u64,

    /// trace, debug, info, warn or error
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_records_path() -> String {
    "./advice.jsonl".to_string()
}
fn default_max_key_width() -> usize {
    DEFAULT_MAX_KEY_WIDTH
}
fn default_min_row_count() -> u64 {
    DEFAULT_MIN_ROW_COUNT
}
fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> CliResult<()> {
        if self.catalog_path.trim().is_empty() {
            return Err(CliError::config_error("catalog_path must not be empty"));
        }

        if self.records_path.trim().is_empty() {
            return Err(CliError::config_error("records_path must not be empty"));
        }

        if self.max_key_width == 0 || self.max_key_width > DEFAULT_MAX_KEY_WIDTH {
            return Err(CliError::config_error(format!(
                "max_key_width must be between 1 and {}, got {}",
                DEFAULT_MAX_KEY_WIDTH, self.max_key_width
            )));
        }

        if self.page_size < 1024 {
            return Err(CliError::config_error(format!(
                "page_size must be at least 1024 bytes, got {}",
                self.page_size
            )));
        }

        self.severity()?;

        Ok(())
    }

    fn severity(&self) -> CliResult<Severity> {
        self.log_level
            .parse()
            .map_err(|e: String| CliError::config_error(format!("Invalid log_level: {}", e)))
    }

    /// Adviser settings derived from this configuration
    pub fn advisor_config(&self) -> AdvisorConfig {
        AdvisorConfig::new()
            .with_max_key_width(self.max_key_width)
            .with_min_row_count(self.min_row_count)
            .with_page_size(self.page_size)
    }

    pub fn catalog_path(&self) -> &Path {
        Path::new(&self.catalog_path)
    }

    pub fn records_path(&self) -> &Path {
        Path::new(&self.records_path)
    }
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Scan { config, workload } => scan(&config, &workload),
        Command::Recommend {
            config,
            budget,
            output,
            exact,
        } => recommend(&config, budget.as_deref(), output.as_deref(), exact),
    }
}

/// Loads the config, applies its log level, then loads the catalog
fn load_inputs(config_path: &Path) -> CliResult<(Config, CatalogSnapshot)> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.severity()?);
    let catalog = CatalogSnapshot::load(config.catalog_path())?;
    Ok((config, catalog))
}

/// Scan every workload query and print its relevant candidates
///
/// One JSON line per query:
/// `{"query":0,"candidates":[{"relation":16384,"table":"orders","columns":[2,1],"candidate":"16384_(2,1)"}]}`
pub fn scan(config_path: &Path, workload_path: &Path) -> CliResult<()> {
    let (config, catalog) = load_inputs(config_path)?;
    let queries = read_workload(workload_path)?;

    let advisor_config = config.advisor_config();
    let advisor = Advisor::new(&catalog, &advisor_config);

    for (position, query) in queries.iter().enumerate() {
        let candidates = advisor.candidates(query);
        let listed: Vec<_> = candidates
            .iter()
            .map(|c| {
                json!({
                    "relation": c.relation,
                    "table": catalog.relation_name(c.relation),
                    "columns": c.column_ids().collect::<Vec<_>>(),
                    "candidate": c.to_string(),
                })
            })
            .collect();
        write_json_line(&json!({ "query": position, "candidates": listed }))?;
    }

    let metrics = advisor.metrics();
    Logger::info(
        "SCAN_WORKLOAD_COMPLETE",
        &[
            ("queries", &queries.len().to_string()),
            ("generated", &metrics.candidates_generated.to_string()),
            ("relevant", &metrics.candidates_relevant.to_string()),
        ],
    );

    Ok(())
}

/// Aggregate recorded advice, select under the budget and emit statements
///
/// Statements go to `output` when given, otherwise to stdout ahead of the
/// summary. The summary always goes to stdout.
pub fn recommend(
    config_path: &Path,
    budget: Option<&str>,
    output: Option<&Path>,
    exact: bool,
) -> CliResult<()> {
    let (config, catalog) = load_inputs(config_path)?;
    let budget_kb = budget.map(parse_budget).transpose()?;

    let records = read_records(config.records_path())?;
    let recommendations = aggregate(&records, &catalog)?;

    let selection = match budget_kb {
        None => select_all(&recommendations)?,
        Some(kb) if exact => select_exact(&recommendations, kb)?,
        Some(kb) => select_greedy(&recommendations, kb)?,
    };

    let statements = render_statements(&selection);
    let summary = render_summary(&selection);
    match output {
        Some(path) => {
            write_file(path, &statements)?;
            write_stdout(&summary)?;
        }
        None => write_stdout(&format!("{}{}", statements, summary))?,
    }

    Logger::info(
        "RECOMMEND_COMPLETE",
        &[
            ("records", &records.len().to_string()),
            ("recommendations", &recommendations.len().to_string()),
            ("selected", &selection.chosen.len().to_string()),
            ("total_size_kb", &selection.total_size_kb.to_string()),
            ("selector", if exact { "exact" } else { "greedy" }),
        ],
    );

    Ok(())
}
