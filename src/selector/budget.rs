//! Storage budget parsing
//!
//! `N` and `NK` mean N KB, `NM` N MB, `NG` N GB. Suffixes are
//! case-insensitive. The result is always in KB.

use std::sync::OnceLock;

use regex::Regex;

use super::errors::{SelectorError, SelectorResult};

const BUDGET_PATTERN: &str = r"^\s*(\d+)\s*([KkMmGg]?)\s*$";

static BUDGET_REGEX: OnceLock<Regex> = OnceLock::new();

fn budget_regex() -> &'static Regex {
    BUDGET_REGEX.get_or_init(|| Regex::new(BUDGET_PATTERN).expect("budget pattern is a valid regex"))
}

/// Parses a budget string into KB
pub fn parse_budget(input: &str) -> SelectorResult<u64> {
    let captures = budget_regex().captures(input).ok_or_else(|| {
        SelectorError::budget_invalid(format!(
            "'{}' is not a size; expected a number with an optional K, M or G suffix",
            input
        ))
    })?;

    let amount: u64 = captures[1]
        .parse()
        .map_err(|_| SelectorError::budget_invalid(format!("'{}' is out of range", &captures[1])))?;

    let multiplier: u64 = match captures[2].to_ascii_uppercase().as_str() {
        "M" => 1024,
        "G" => 1024 * 1024,
        _ => 1,
    };

    let kb = amount
        .checked_mul(multiplier)
        .ok_or_else(|| SelectorError::budget_invalid(format!("'{}' is out of range", input)))?;
    if kb == 0 {
        return Err(SelectorError::budget_invalid("budget must be positive"));
    }
    Ok(kb)
}
