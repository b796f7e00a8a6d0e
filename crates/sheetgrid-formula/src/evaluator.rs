//! Formula evaluator
//!
//! Evaluates formula ASTs against a read-only [`FormulaContext`].

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use crate::error::{ErrorValue, FormulaError, FormulaResult};
use crate::functions::FunctionRegistry;
use crate::parser::parse_formula;
use sheetgrid_core::{CellRange, ERROR_PREFIX};
use std::cmp::Ordering;
use std::sync::OnceLock;

/// Global function registry (lazily initialized)
static FUNCTION_REGISTRY: OnceLock<FunctionRegistry> = OnceLock::new();

fn get_function_registry() -> &'static FunctionRegistry {
    FUNCTION_REGISTRY.get_or_init(FunctionRegistry::new)
}

/// Read-only view of the grid a formula evaluates against
///
/// Implementations return *computed* values: a formula cell is seen through
/// its display value, never its formula text.
pub trait FormulaContext {
    /// Display value of a cell, `None` when the cell is empty
    fn cell_value(&self, row: u32, col: u16) -> Option<String>;

    /// Values of an inclusive range, row-major
    ///
    /// Corners may arrive in any order; implementations normalize with min/max.
    fn cell_range(&self, start_row: u32, start_col: u16, end_row: u32, end_col: u16)
        -> Vec<RangeValue>;

    /// Cells that exist, `None` when the context is unbounded
    ///
    /// Range references are clipped to these bounds before they are read;
    /// everything outside reads as empty.
    fn bounds(&self) -> Option<CellRange> {
        None
    }
}

/// One item of a range read
#[derive(Debug, Clone, PartialEq)]
pub enum RangeValue {
    Number(f64),
    Text(String),
    Empty,
}

impl RangeValue {
    /// Classify a display string the way range reads expose it
    pub fn from_display(display: &str) -> Self {
        if display.is_empty() {
            return RangeValue::Empty;
        }
        match display.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => RangeValue::Number(n),
            _ => RangeValue::Text(display.to_string()),
        }
    }
}

/// Value types during formula evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaValue {
    Number(f64),
    String(String),
    Boolean(bool),
    Error(ErrorValue),
    Array(Vec<Vec<FormulaValue>>),
    Empty,
}

impl FormulaValue {
    /// Interpret a referenced cell's display value
    pub fn from_display(display: Option<String>) -> Self {
        match display {
            None => FormulaValue::Empty,
            Some(s) if s.is_empty() => FormulaValue::Empty,
            Some(s) => {
                if let Ok(n) = s.trim().parse::<f64>() {
                    if n.is_finite() {
                        return FormulaValue::Number(n);
                    }
                }
                if let Some(e) = ErrorValue::parse(&s) {
                    return FormulaValue::Error(e);
                }
                if s.starts_with(ERROR_PREFIX) {
                    return FormulaValue::Error(ErrorValue::Value);
                }
                FormulaValue::String(s)
            }
        }
    }

    /// Convert to number, if possible
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FormulaValue::Number(n) => Some(*n),
            FormulaValue::Boolean(true) => Some(1.0),
            FormulaValue::Boolean(false) => Some(0.0),
            FormulaValue::String(s) => s.trim().parse().ok(),
            FormulaValue::Empty => Some(0.0),
            _ => None,
        }
    }

    /// Force conversion to number for arithmetic
    pub fn to_number(&self) -> FormulaResult<f64> {
        self.as_number().ok_or_else(|| {
            FormulaError::Evaluation(format!("Cannot convert {} to number", self.describe()))
        })
    }

    /// Convert to boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FormulaValue::Boolean(b) => Some(*b),
            FormulaValue::Number(n) => Some(*n != 0.0),
            FormulaValue::String(s) => match s.to_uppercase().as_str() {
                "TRUE" => Some(true),
                "FALSE" => Some(false),
                _ => None,
            },
            FormulaValue::Empty => Some(false),
            _ => None,
        }
    }

    /// Convert to its display string
    pub fn as_string(&self) -> String {
        match self {
            FormulaValue::Number(n) => format_number(*n),
            FormulaValue::String(s) => s.clone(),
            FormulaValue::Boolean(true) => "TRUE".to_string(),
            FormulaValue::Boolean(false) => "FALSE".to_string(),
            FormulaValue::Error(e) => e.to_string(),
            FormulaValue::Empty => String::new(),
            FormulaValue::Array(_) => ErrorValue::Value.to_string(),
        }
    }

    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        matches!(self, FormulaValue::Error(_))
    }

    /// Get the error if this is one
    pub fn get_error(&self) -> Option<ErrorValue> {
        match self {
            FormulaValue::Error(e) => Some(*e),
            _ => None,
        }
    }

    fn describe(&self) -> String {
        match self {
            FormulaValue::String(s) => format!("\"{}\"", s),
            FormulaValue::Array(_) => "a range".to_string(),
            other => other.as_string(),
        }
    }
}

impl From<RangeValue> for FormulaValue {
    fn from(value: RangeValue) -> Self {
        match value {
            RangeValue::Number(n) => FormulaValue::Number(n),
            RangeValue::Text(s) => FormulaValue::from_display(Some(s)),
            RangeValue::Empty => FormulaValue::Empty,
        }
    }
}

/// Format a number for display: integral values without a fraction
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Parse and evaluate formula text in one step
pub fn evaluate_formula(formula: &str, ctx: &dyn FormulaContext) -> FormulaResult<FormulaValue> {
    let ast = parse_formula(formula)?;
    evaluate(&ast, ctx)
}

/// Evaluate a formula expression
pub fn evaluate(expr: &FormulaExpr, ctx: &dyn FormulaContext) -> FormulaResult<FormulaValue> {
    match expr {
        // === Literals ===
        FormulaExpr::Number(n) => Ok(FormulaValue::Number(*n)),
        FormulaExpr::String(s) => Ok(FormulaValue::String(s.clone())),
        FormulaExpr::Boolean(b) => Ok(FormulaValue::Boolean(*b)),
        FormulaExpr::Error(e) => Ok(FormulaValue::Error(*e)),

        // === References ===
        FormulaExpr::CellRef(addr) => Ok(FormulaValue::from_display(
            ctx.cell_value(addr.row, addr.col),
        )),

        FormulaExpr::RangeRef(range) => {
            let range = match ctx.bounds() {
                Some(bounds) => match range.intersect(&bounds) {
                    Some(clipped) => clipped,
                    None => return Ok(FormulaValue::Array(Vec::new())),
                },
                None => *range,
            };
            let values = ctx.cell_range(
                range.start.row,
                range.start.col,
                range.end.row,
                range.end.col,
            );
            let width = range.col_count() as usize;
            let mut rows = Vec::new();
            let mut iter = values.into_iter().map(FormulaValue::from);
            loop {
                let row: Vec<FormulaValue> = iter.by_ref().take(width).collect();
                if row.is_empty() {
                    break;
                }
                rows.push(row);
            }
            Ok(FormulaValue::Array(rows))
        }

        FormulaExpr::NameRef(_) => Ok(FormulaValue::Error(ErrorValue::Name)),

        // === Operators ===
        FormulaExpr::BinaryOp { op, left, right } => evaluate_binary_op(*op, left, right, ctx),

        FormulaExpr::UnaryOp { op, operand } => evaluate_unary_op(*op, operand, ctx),

        // === Functions ===
        FormulaExpr::Function { name, args } => evaluate_function(name, args, ctx),
    }
}

/// Evaluate a binary operation
fn evaluate_binary_op(
    op: BinaryOperator,
    left: &FormulaExpr,
    right: &FormulaExpr,
    ctx: &dyn FormulaContext,
) -> FormulaResult<FormulaValue> {
    let left_val = evaluate(left, ctx)?;
    let right_val = evaluate(right, ctx)?;

    // Propagate errors
    if let Some(e) = left_val.get_error() {
        return Ok(FormulaValue::Error(e));
    }
    if let Some(e) = right_val.get_error() {
        return Ok(FormulaValue::Error(e));
    }

    match op {
        BinaryOperator::Add => arithmetic(&left_val, &right_val, |l, r| l + r),
        BinaryOperator::Subtract => arithmetic(&left_val, &right_val, |l, r| l - r),
        BinaryOperator::Multiply => arithmetic(&left_val, &right_val, |l, r| l * r),
        BinaryOperator::Divide => {
            let l = left_val.to_number()?;
            let r = right_val.to_number()?;
            if r == 0.0 {
                Ok(FormulaValue::Error(ErrorValue::Div0))
            } else {
                Ok(FormulaValue::Number(l / r))
            }
        }
        BinaryOperator::Power => arithmetic(&left_val, &right_val, f64::powf),

        BinaryOperator::Equal => Ok(FormulaValue::Boolean(
            compare_values(&left_val, &right_val) == Ordering::Equal,
        )),
        BinaryOperator::NotEqual => Ok(FormulaValue::Boolean(
            compare_values(&left_val, &right_val) != Ordering::Equal,
        )),
        BinaryOperator::LessThan => Ok(FormulaValue::Boolean(
            compare_values(&left_val, &right_val) == Ordering::Less,
        )),
        BinaryOperator::LessEqual => Ok(FormulaValue::Boolean(
            compare_values(&left_val, &right_val) != Ordering::Greater,
        )),
        BinaryOperator::GreaterThan => Ok(FormulaValue::Boolean(
            compare_values(&left_val, &right_val) == Ordering::Greater,
        )),
        BinaryOperator::GreaterEqual => Ok(FormulaValue::Boolean(
            compare_values(&left_val, &right_val) != Ordering::Less,
        )),

        BinaryOperator::Concat => Ok(FormulaValue::String(
            left_val.as_string() + &right_val.as_string(),
        )),
    }
}

fn arithmetic(
    left: &FormulaValue,
    right: &FormulaValue,
    f: impl Fn(f64, f64) -> f64,
) -> FormulaResult<FormulaValue> {
    let result = f(left.to_number()?, right.to_number()?);
    if result.is_finite() {
        Ok(FormulaValue::Number(result))
    } else {
        Ok(FormulaValue::Error(ErrorValue::Num))
    }
}

/// Compare two values (spreadsheet ordering: number < text < boolean)
fn compare_values(left: &FormulaValue, right: &FormulaValue) -> Ordering {
    let left = match left {
        FormulaValue::Empty => &FormulaValue::Number(0.0),
        v => v,
    };
    let right = match right {
        FormulaValue::Empty => &FormulaValue::Number(0.0),
        v => v,
    };

    match (left, right) {
        (FormulaValue::Number(l), FormulaValue::Number(r)) => {
            l.partial_cmp(r).unwrap_or(Ordering::Equal)
        }

        // Strings compare case-insensitively
        (FormulaValue::String(l), FormulaValue::String(r)) => {
            l.to_lowercase().cmp(&r.to_lowercase())
        }

        (FormulaValue::Boolean(l), FormulaValue::Boolean(r)) => l.cmp(r),

        (FormulaValue::Number(_), FormulaValue::String(_) | FormulaValue::Boolean(_)) => {
            Ordering::Less
        }
        (FormulaValue::String(_), FormulaValue::Number(_)) => Ordering::Greater,
        (FormulaValue::String(_), FormulaValue::Boolean(_)) => Ordering::Less,
        (FormulaValue::Boolean(_), FormulaValue::Number(_) | FormulaValue::String(_)) => {
            Ordering::Greater
        }

        _ => Ordering::Equal,
    }
}

/// Evaluate a unary operation
fn evaluate_unary_op(
    op: UnaryOperator,
    operand: &FormulaExpr,
    ctx: &dyn FormulaContext,
) -> FormulaResult<FormulaValue> {
    let val = evaluate(operand, ctx)?;

    if let Some(e) = val.get_error() {
        return Ok(FormulaValue::Error(e));
    }

    let n = val.to_number()?;
    match op {
        UnaryOperator::Negate => Ok(FormulaValue::Number(-n)),
        UnaryOperator::Percent => Ok(FormulaValue::Number(n / 100.0)),
    }
}

/// Evaluate a function call
fn evaluate_function(
    name: &str,
    args: &[FormulaExpr],
    ctx: &dyn FormulaContext,
) -> FormulaResult<FormulaValue> {
    let registry = get_function_registry();

    let func = registry
        .get(name)
        .ok_or_else(|| FormulaError::UnknownFunction(name.to_string()))?;

    if args.len() < func.min_args {
        return Err(FormulaError::ArgumentCount {
            function: name.to_string(),
            expected: format!("at least {}", func.min_args),
            actual: args.len(),
        });
    }

    if let Some(max) = func.max_args {
        if args.len() > max {
            return Err(FormulaError::ArgumentCount {
                function: name.to_string(),
                expected: format!("at most {}", max),
                actual: args.len(),
            });
        }
    }

    let mut evaluated_args = Vec::with_capacity(args.len());
    for arg in args {
        evaluated_args.push(evaluate(arg, ctx)?);
    }

    (func.implementation)(&evaluated_args)
}
