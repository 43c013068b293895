//! Selector error types
//!
//! Error codes:
//! - ADV_BUDGET_INVALID (REJECT)
//! - ADV_RECORD_MALFORMED (REJECT)
//! - ADV_BUDGET_TOO_LARGE (REJECT)
//!
//! All are raised before any selection work begins.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Input rejected
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorErrorCode {
    /// Budget is zero, negative or unparseable
    AdvBudgetInvalid,
    /// A record has a non-positive size or a non-finite benefit
    AdvRecordMalformed,
    /// The exact selector's table would not fit in memory
    AdvBudgetTooLarge,
}

impl SelectorErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            SelectorErrorCode::AdvBudgetInvalid => "ADV_BUDGET_INVALID",
            SelectorErrorCode::AdvRecordMalformed => "ADV_RECORD_MALFORMED",
            SelectorErrorCode::AdvBudgetTooLarge => "ADV_BUDGET_TOO_LARGE",
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for SelectorErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone)]
pub struct SelectorError {
    code: SelectorErrorCode,
    message: String,
}

impl SelectorError {
    pub fn budget_invalid(reason: impl Into<String>) -> Self {
        Self {
            code: SelectorErrorCode::AdvBudgetInvalid,
            message: reason.into(),
        }
    }

    pub fn record_malformed(reason: impl Into<String>) -> Self {
        Self {
            code: SelectorErrorCode::AdvRecordMalformed,
            message: reason.into(),
        }
    }

    pub fn budget_too_large(records: usize, budget_kb: u64, limit: u64) -> Self {
        Self {
            code: SelectorErrorCode::AdvBudgetTooLarge,
            message: format!(
                "Exact selection over {} records with a {} KB budget needs more than {} table cells",
                records, budget_kb, limit
            ),
        }
    }

    pub fn code(&self) -> SelectorErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code, self.message)
    }
}

impl std::error::Error for SelectorError {}

/// Result type for selector operations
pub type SelectorResult<T> = Result<T, SelectorError>;
