//! Type inference and validation of raw input
//!
//! Rules apply in a fixed order and the first match wins. Validation runs
//! before the formula check, so a formula that looks like an email or URL
//! is validated as one.

use once_cell::sync::Lazy;
use regex::Regex;
use sheetgrid_core::CellValue;
use thiserror::Error;

static DATE_ISO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

static DATE_US: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}/\d{2}/\d{4}$").expect("valid regex"));

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// Why a raw value was rejected; the message is shown in the cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Invalid URL format")]
    InvalidUrl,
}

/// Result of classifying raw input
#[derive(Debug, Clone, PartialEq)]
pub enum Inferred<'a> {
    /// Final cell value
    Value(CellValue),
    /// `=...` text that still has to be evaluated
    Formula(&'a str),
}

/// Check the validated formats (email, URL)
pub fn validate(input: &str) -> Result<(), ValidationError> {
    let trimmed = input.trim();

    if trimmed.contains('@') && !EMAIL.is_match(trimmed) {
        return Err(ValidationError::InvalidEmail);
    }

    if is_url_candidate(trimmed) {
        let valid = url::Url::parse(trimmed)
            .map(|u| u.host_str().map_or(false, |h| !h.is_empty()))
            .unwrap_or(false);
        if !valid {
            return Err(ValidationError::InvalidUrl);
        }
    }

    Ok(())
}

fn is_url_candidate(s: &str) -> bool {
    let lower = s.get(..8).unwrap_or(s).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Whether `input` is a finite number
pub fn is_number(input: &str) -> bool {
    input
        .trim()
        .parse::<f64>()
        .map_or(false, |n| n.is_finite())
}

/// Whether `input` is a `YYYY-MM-DD` or `MM/DD/YYYY` date
pub fn is_date(input: &str) -> bool {
    let trimmed = input.trim();
    DATE_ISO.is_match(trimmed) || DATE_US.is_match(trimmed)
}

/// Classify raw input the way a commit stores it
///
/// The empty string clears the cell. Whitespace-only input is kept as text.
pub fn classify(input: &str) -> Inferred<'_> {
    if input.is_empty() {
        return Inferred::Value(CellValue::Empty);
    }
    if input.trim().is_empty() {
        return Inferred::Value(CellValue::Text(input.to_string()));
    }

    if is_number(input) {
        return Inferred::Value(CellValue::Number(input.to_string()));
    }

    if is_date(input) {
        return Inferred::Value(CellValue::Date(input.to_string()));
    }

    if let Err(e) = validate(input) {
        return Inferred::Value(CellValue::invalid(input, &e.to_string()));
    }

    if input.starts_with('=') {
        return Inferred::Formula(input);
    }

    let trimmed = input.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed.eq_ignore_ascii_case("false") {
        return Inferred::Value(CellValue::Boolean(input.to_string()));
    }

    Inferred::Value(CellValue::Text(input.to_string()))
}
