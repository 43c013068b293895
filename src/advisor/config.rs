//! Adviser tuning knobs

use serde::{Deserialize, Serialize};

use crate::candidate::DEFAULT_MAX_KEY_WIDTH;
use crate::scanner::OperatorSet;

/// Minimum rows a table needs before indexing it is worth considering
pub const DEFAULT_MIN_ROW_COUNT: u64 = 2;

/// Storage page size in bytes
pub const DEFAULT_PAGE_SIZE: u64 = 8192;

/// Settings shared by the scanner and the evaluator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Maximum number of key columns in one candidate
    #[serde(default = "default_max_key_width")]
    pub max_key_width: usize,
    /// Tables with fewer rows yield no candidates
    #[serde(default = "default_min_row_count")]
    pub min_row_count: u64,
    /// Bytes per page, for converting index pages to KB
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// Comparison operators considered indexable
    #[serde(default)]
    pub operators: OperatorSet,
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

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            max_key_width: DEFAULT_MAX_KEY_WIDTH,
            min_row_count: DEFAULT_MIN_ROW_COUNT,
            page_size: DEFAULT_PAGE_SIZE,
            operators: OperatorSet::btree(),
        }
    }
}

impl AdvisorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_key_width(mut self, width: usize) -> Self {
        self.max_key_width = width;
        self
    }

    pub fn with_min_row_count(mut self, rows: u64) -> Self {
        self.min_row_count = rows;
        self
    }

    pub fn with_page_size(mut self, bytes: u64) -> Self {
        self.page_size = bytes;
        self
    }

    pub fn with_operators(mut self, operators: OperatorSet) -> Self {
        self.operators = operators;
        self
    }

    /// Converts an index page count to KB, rounding up
    ///
    /// Never returns 0: an index always occupies at least 1 KB.
    pub fn pages_to_kb(&self, pages: u64) -> u64 {
        pages.saturating_mul(self.page_size).div_ceil(1024).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::CompareOp;

    #[test]
    fn test_defaults() {
        let config = AdvisorConfig::default();
        assert_eq!(config.max_key_width, 32);
        assert_eq!(config.min_row_count, 2);
        assert_eq!(config.page_size, 8192);
        assert!(config.operators.contains(CompareOp::Le));
    }

    #[test]
    fn test_pages_to_kb() {
        let config = AdvisorConfig::default();
        assert_eq!(config.pages_to_kb(10), 80);
        assert_eq!(config.pages_to_kb(0), 1);
        let small = config.with_page_size(512);
        assert_eq!(small.pages_to_kb(1), 1);
        assert_eq!(small.pages_to_kb(3), 2);
        assert_eq!(small.pages_to_kb(4), 2);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AdvisorConfig = serde_json::from_str(r#"{"max_key_width": 4}"#).unwrap();
        assert_eq!(config.max_key_width, 4);
        assert_eq!(config.min_row_count, 2);
        assert_eq!(config.operators, OperatorSet::btree());
    }
}
