//! CLI argument definitions using clap
//!
//! Commands:
//! - idxadvisor scan --config <path> --workload <path>
//! - idxadvisor recommend --config <path> [--budget <size>] [--output <path>] [--exact]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// idxadvisor - index recommendations for query workloads
#[derive(Parser, Debug)]
#[command(name = "idxadvisor")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the relevant index candidates of every workload query
    Scan {
        /// Path to configuration file
        #[arg(long, default_value = "./idxadvisor.json")]
        config: PathBuf,

        /// Workload file: a JSON array of query trees, or one per line ("-" for stdin)
        #[arg(long)]
        workload: PathBuf,
    },

    /// Select recorded advice under a storage budget and emit CREATE INDEX statements
    Recommend {
        /// Path to configuration file
        #[arg(long, default_value = "./idxadvisor.json")]
        config: PathBuf,

        /// Storage budget, e.g. 512, 64M, 2G (no suffix means KB)
        #[arg(long)]
        budget: Option<String>,

        /// File for the CREATE INDEX statements (stdout if omitted)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Use the exact knapsack selector instead of the greedy one
        #[arg(long)]
        exact: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
