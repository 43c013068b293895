//! Evaluator error types
//!
//! Error codes:
//! - ADV_ORACLE_FAILED (ERROR)
//! - ADV_PERSISTENCE_FAILED (ERROR)
//!
//! Both abort evaluation of the current query only. Hypothetical indexes
//! are already unregistered and the session guard released by the time
//! either reaches the caller.

use std::fmt;

use crate::advisory::SinkError;
use super::oracle::OracleError;

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The query failed; the workload continues
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluatorErrorCode {
    /// Cost estimation or hypothetical index registration failed
    AdvOracleFailed,
    /// An advisory record could not be persisted
    AdvPersistenceFailed,
}

impl EvaluatorErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluatorErrorCode::AdvOracleFailed => "ADV_ORACLE_FAILED",
            EvaluatorErrorCode::AdvPersistenceFailed => "ADV_PERSISTENCE_FAILED",
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::Error
    }
}

impl fmt::Display for EvaluatorErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug)]
enum Cause {
    Oracle(OracleError),
    Sink(SinkError),
}

/// Query-level evaluation failure
#[derive(Debug)]
pub struct EvaluatorError {
    code: EvaluatorErrorCode,
    message: String,
    source: Cause,
}

impl EvaluatorError {
    /// The cost oracle failed during `stage` (baseline, register, estimate, unregister)
    pub fn oracle_failed(stage: &str, source: OracleError) -> Self {
        Self {
            code: EvaluatorErrorCode::AdvOracleFailed,
            message: format!("Cost oracle failed during {}", stage),
            source: Cause::Oracle(source),
        }
    }

    /// Writing to `sink` failed
    pub fn persistence_failed(sink: impl Into<String>, source: SinkError) -> Self {
        Self {
            code: EvaluatorErrorCode::AdvPersistenceFailed,
            message: format!(
                "Could not record advice to sink '{}'; the sink must accept records of \
                 shape (relation_id, columns[], size_kb, benefit)",
                sink.into()
            ),
            source: Cause::Sink(source),
        }
    }

    pub fn code(&self) -> EvaluatorErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl fmt::Display for EvaluatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code, self.message)?;
        match &self.source {
            Cause::Oracle(e) => write!(f, " (caused by: {})", e),
            Cause::Sink(e) => write!(f, " (caused by: {})", e),
        }
    }
}

impl std::error::Error for EvaluatorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.source {
            Cause::Oracle(e) => Some(e),
            Cause::Sink(e) => Some(e),
        }
    }
}

/// Result type for evaluator operations
pub type EvaluatorResult<T> = Result<T, EvaluatorError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_codes() {
        assert_eq!(EvaluatorErrorCode::AdvOracleFailed.as_str(), "ADV_ORACLE_FAILED");
        assert_eq!(
            EvaluatorErrorCode::AdvPersistenceFailed.as_str(),
            "ADV_PERSISTENCE_FAILED"
        );
    }

    #[test]
    fn test_oracle_error_display() {
        let err = EvaluatorError::oracle_failed(
            "baseline",
            OracleError::Estimate("planner crashed".into()),
        );
        let display = err.to_string();
        assert!(display.starts_with("[ERROR] ADV_ORACLE_FAILED"));
        assert!(display.contains("baseline"));
        assert!(display.contains("planner crashed"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_persistence_error_names_sink_and_shape() {
        let err = EvaluatorError::persistence_failed("jsonl:/tmp/x", SinkError::Closed("x".into()));
        assert_eq!(err.code(), EvaluatorErrorCode::AdvPersistenceFailed);
        assert!(err.message().contains("jsonl:/tmp/x"));
        assert!(err.message().contains("(relation_id, columns[], size_kb, benefit)"));
    }
}
