//! Text functions

use super::flatten;
use crate::error::{ErrorValue, FormulaResult};
use crate::evaluator::FormulaValue;

/// Single scalar text argument, or the value to return instead
fn text_arg(args: &[FormulaValue]) -> Result<String, FormulaValue> {
    match args.first() {
        Some(FormulaValue::Error(e)) => Err(FormulaValue::Error(*e)),
        Some(FormulaValue::Array(_)) | None => Err(FormulaValue::Error(ErrorValue::Value)),
        Some(v) => Ok(v.as_string()),
    }
}

/// CONCATENATE(text1, [text2], ...)
pub fn fn_concatenate(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let mut out = String::new();
    for value in flatten(args) {
        if let FormulaValue::Error(e) = value {
            return Ok(FormulaValue::Error(*e));
        }
        out.push_str(&value.as_string());
    }
    Ok(FormulaValue::String(out))
}

/// LEN(text) - length in characters
pub fn fn_len(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(match text_arg(args) {
        Ok(s) => FormulaValue::Number(s.chars().count() as f64),
        Err(v) => v,
    })
}

/// UPPER(text)
pub fn fn_upper(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(text_arg(args).map_or_else(|v| v, |s| FormulaValue::String(s.to_uppercase())))
}

/// LOWER(text)
pub fn fn_lower(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(text_arg(args).map_or_else(|v| v, |s| FormulaValue::String(s.to_lowercase())))
}

/// TRIM(text) - strips the ends and collapses inner runs of whitespace
pub fn fn_trim(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(text_arg(args).map_or_else(
        |v| v,
        |s| FormulaValue::String(s.split_whitespace().collect::<Vec<_>>().join(" ")),
    ))
}
