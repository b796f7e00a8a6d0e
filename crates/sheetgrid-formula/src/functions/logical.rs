//! Logical functions

use super::flatten;
use crate::error::{ErrorValue, FormulaError, FormulaResult};
use crate::evaluator::FormulaValue;

/// IF(condition, value_if_true, [value_if_false])
pub fn fn_if(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let (condition, if_true) = match args {
        [condition, if_true, ..] => (condition, if_true),
        _ => {
            return Err(FormulaError::Argument(
                "IF requires at least 2 arguments".into(),
            ))
        }
    };

    let condition = match condition {
        FormulaValue::Error(e) => return Ok(FormulaValue::Error(*e)),
        FormulaValue::Array(_) => return Ok(FormulaValue::Error(ErrorValue::Value)),
        other => match other.as_bool() {
            Some(b) => b,
            None => return Ok(FormulaValue::Error(ErrorValue::Value)),
        },
    };

    if condition {
        Ok(if_true.clone())
    } else {
        Ok(args.get(2).cloned().unwrap_or(FormulaValue::Boolean(false)))
    }
}

/// Fold every logical argument; text and empties are skipped
fn fold_logical(
    args: &[FormulaValue],
    init: bool,
    f: impl Fn(bool, bool) -> bool,
) -> FormulaResult<FormulaValue> {
    let mut acc = init;
    let mut seen = false;
    for value in flatten(args) {
        match value {
            FormulaValue::Error(e) => return Ok(FormulaValue::Error(*e)),
            FormulaValue::Boolean(b) => {
                acc = f(acc, *b);
                seen = true;
            }
            FormulaValue::Number(n) => {
                acc = f(acc, *n != 0.0);
                seen = true;
            }
            _ => {}
        }
    }

    if seen {
        Ok(FormulaValue::Boolean(acc))
    } else {
        Ok(FormulaValue::Error(ErrorValue::Value))
    }
}

/// AND(logical1, ...)
pub fn fn_and(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    fold_logical(args, true, |a, b| a && b)
}

/// OR(logical1, ...)
pub fn fn_or(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    fold_logical(args, false, |a, b| a || b)
}

/// NOT(logical)
pub fn fn_not(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let arg = args
        .first()
        .ok_or_else(|| FormulaError::Argument("NOT requires 1 argument".into()))?;

    match arg {
        FormulaValue::Error(e) => Ok(FormulaValue::Error(*e)),
        FormulaValue::Array(_) => Ok(FormulaValue::Error(ErrorValue::Value)),
        other => match other.as_bool() {
            Some(b) => Ok(FormulaValue::Boolean(!b)),
            None => Ok(FormulaValue::Error(ErrorValue::Value)),
        },
    }
}

/// IFERROR(value, value_if_error)
pub fn fn_iferror(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    match args {
        [FormulaValue::Error(_), fallback, ..] => Ok(fallback.clone()),
        [value, _, ..] => Ok(value.clone()),
        _ => Err(FormulaError::Argument(
            "IFERROR requires 2 arguments".into(),
        )),
    }
}
