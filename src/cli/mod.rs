//! CLI module for idxadvisor
//!
//! Provides command-line interface for:
//! - scan: print the index candidates of each workload query
//! - recommend: select recorded advice under a budget and emit CREATE INDEX

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{recommend, run, run_command, scan, Config};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{parse_workload, read_workload, write_file, write_json_line, write_stdout};
