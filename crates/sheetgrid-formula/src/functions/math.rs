//! Math and aggregate functions

use super::flatten;
use crate::error::{ErrorValue, FormulaResult};
use crate::evaluator::FormulaValue;

/// Numbers among the arguments, or the first error encountered
fn numbers(args: &[FormulaValue]) -> Result<Vec<f64>, ErrorValue> {
    let mut out = Vec::new();
    for value in flatten(args) {
        match value {
            FormulaValue::Number(n) => out.push(*n),
            FormulaValue::Error(e) => return Err(*e),
            _ => {} // Ignore non-numeric
        }
    }
    Ok(out)
}

/// SUM function
pub fn fn_sum(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(match numbers(args) {
        Ok(values) => FormulaValue::Number(values.iter().sum()),
        Err(e) => FormulaValue::Error(e),
    })
}

/// AVERAGE function
pub fn fn_average(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(match numbers(args) {
        Ok(values) if values.is_empty() => FormulaValue::Error(ErrorValue::Div0),
        Ok(values) => FormulaValue::Number(values.iter().sum::<f64>() / values.len() as f64),
        Err(e) => FormulaValue::Error(e),
    })
}

/// MIN function
pub fn fn_min(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(match numbers(args) {
        Ok(values) => FormulaValue::Number(values.into_iter().reduce(f64::min).unwrap_or(0.0)),
        Err(e) => FormulaValue::Error(e),
    })
}

/// MAX function
pub fn fn_max(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(match numbers(args) {
        Ok(values) => FormulaValue::Number(values.into_iter().reduce(f64::max).unwrap_or(0.0)),
        Err(e) => FormulaValue::Error(e),
    })
}

/// COUNT - numeric values only
pub fn fn_count(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let count = flatten(args)
        .filter(|v| matches!(v, FormulaValue::Number(_)))
        .count();
    Ok(FormulaValue::Number(count as f64))
}

/// COUNTA - every non-empty value, errors included
pub fn fn_counta(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let count = flatten(args)
        .filter(|v| match v {
            FormulaValue::Empty => false,
            FormulaValue::String(s) => !s.is_empty(),
            _ => true,
        })
        .count();
    Ok(FormulaValue::Number(count as f64))
}

/// ABS(number)
pub fn fn_abs(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    match args.first() {
        Some(FormulaValue::Number(n)) => Ok(FormulaValue::Number(n.abs())),
        Some(FormulaValue::Error(e)) => Ok(FormulaValue::Error(*e)),
        Some(FormulaValue::Empty) => Ok(FormulaValue::Number(0.0)),
        _ => Ok(FormulaValue::Error(ErrorValue::Value)),
    }
}

/// ROUND(number, [num_digits]) - half away from zero
pub fn fn_round(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let number = match args.first() {
        Some(FormulaValue::Number(n)) => *n,
        Some(FormulaValue::Error(e)) => return Ok(FormulaValue::Error(*e)),
        Some(FormulaValue::Empty) => 0.0,
        _ => return Ok(FormulaValue::Error(ErrorValue::Value)),
    };

    let num_digits = match args.get(1) {
        Some(FormulaValue::Number(n)) => *n as i32,
        Some(FormulaValue::Error(e)) => return Ok(FormulaValue::Error(*e)),
        Some(FormulaValue::Empty) | None => 0,
        _ => return Ok(FormulaValue::Error(ErrorValue::Value)),
    };

    // Negative digits round to the left of the decimal point
    let multiplier = 10_f64.powi(num_digits);
    let result = (number * multiplier).round() / multiplier;

    Ok(FormulaValue::Number(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(v: f64) -> FormulaValue {
        FormulaValue::Number(v)
    }

    fn s(v: &str) -> FormulaValue {
        FormulaValue::String(v.to_string())
    }

    #[test]
    fn test_sum_skips_text_and_reads_arrays() {
        let range = FormulaValue::Array(vec![vec![n(1.0), s("x")], vec![FormulaValue::Empty, n(2.0)]]);
        assert_eq!(fn_sum(&[range, n(3.0)]).unwrap(), n(6.0));
    }

    #[test]
    fn test_sum_propagates_errors() {
        let range = FormulaValue::Array(vec![vec![n(1.0), FormulaValue::Error(ErrorValue::Ref)]]);
        assert_eq!(
            fn_sum(&[range]).unwrap(),
            FormulaValue::Error(ErrorValue::Ref)
        );
    }

    #[test]
    fn test_average_of_nothing_is_div0() {
        assert_eq!(fn_average(&[s("a")]).unwrap(), FormulaValue::Error(ErrorValue::Div0));
        assert_eq!(fn_average(&[n(2.0), n(4.0)]).unwrap(), n(3.0));
    }

    #[test]
    fn test_min_max() {
        assert_eq!(fn_min(&[n(3.0), n(-1.0), n(2.0)]).unwrap(), n(-1.0));
        assert_eq!(fn_max(&[n(3.0), n(-1.0), n(2.0)]).unwrap(), n(3.0));
        assert_eq!(fn_max(&[s("only text")]).unwrap(), n(0.0));
    }

    #[test]
    fn test_count_and_counta() {
        let args = [n(1.0), s("a"), s(""), FormulaValue::Empty, FormulaValue::Boolean(true)];
        assert_eq!(fn_count(&args).unwrap(), n(1.0));
        assert_eq!(fn_counta(&args).unwrap(), n(3.0));
    }

    #[test]
    fn test_round() {
        assert_eq!(fn_round(&[n(2.5)]).unwrap(), n(3.0));
        assert_eq!(fn_round(&[n(-2.5)]).unwrap(), n(-3.0));
        assert_eq!(fn_round(&[n(3.14159), n(2.0)]).unwrap(), n(3.14));
        assert_eq!(fn_round(&[n(1234.0), n(-2.0)]).unwrap(), n(1200.0));
    }

    #[test]
    fn test_abs() {
        assert_eq!(fn_abs(&[n(-4.0)]).unwrap(), n(4.0));
        assert_eq!(fn_abs(&[s("x")]).unwrap(), FormulaValue::Error(ErrorValue::Value));
    }
}
