//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero status.

use std::fmt;
use std::io;

use crate::advisory::SinkError;
use crate::catalog::CatalogError;
use crate::selector::{SelectorError, SelectorErrorCode};

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration or catalog file error
    ConfigError,
    /// I/O error (files, stdout, advisory records)
    IoError,
    /// Workload file could not be read or parsed
    WorkloadError,
    /// Budget or records rejected by the selector
    Selection(SelectorErrorCode),
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "ADV_CLI_CONFIG_ERROR",
            Self::IoError => "ADV_CLI_IO_ERROR",
            Self::WorkloadError => "ADV_CLI_WORKLOAD_ERROR",
            Self::Selection(code) => code.code(),
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Workload error
    pub fn workload_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::WorkloadError, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<CatalogError> for CliError {
    fn from(e: CatalogError) -> Self {
        Self::config_error(e.to_string())
    }
}

impl From<SinkError> for CliError {
    fn from(e: SinkError) -> Self {
        Self::io_error(format!("Cannot read advisory records: {}", e))
    }
}

impl From<SelectorError> for CliError {
    fn from(e: SelectorError) -> Self {
        Self::new(CliErrorCode::Selection(e.code()), e.message())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_code_passes_through() {
        let err: CliError = SelectorError::budget_invalid("budget must be positive").into();
        assert_eq!(err.code_str(), "ADV_BUDGET_INVALID");
        assert_eq!(err.to_string(), "ADV_BUDGET_INVALID: budget must be positive");
    }

    #[test]
    fn test_cli_codes() {
        assert_eq!(CliError::config_error("x").code_str(), "ADV_CLI_CONFIG_ERROR");
        assert_eq!(CliError::io_error("x").code_str(), "ADV_CLI_IO_ERROR");
        assert_eq!(CliError::workload_error("x").code_str(), "ADV_CLI_WORKLOAD_ERROR");
    }
}
