//! # sheetgrid-formula
//!
//! Formula parser and evaluator for sheetgrid.
//!
//! This crate provides:
//! - Formula parsing (text → AST)
//! - Formula evaluation against a read-only [`FormulaContext`]
//! - A small set of built-in functions
//! - Dependency tracking for reactive recalculation
//!
//! ## Example
//!
//! ```rust
//! use sheetgrid_formula::{evaluate_formula, FormulaContext, FormulaValue, RangeValue};
//!
//! struct Fixed;
//!
//! impl FormulaContext for Fixed {
//!     fn cell_value(&self, row: u32, col: u16) -> Option<String> {
//!         match (row, col) {
//!             (0, 0) => Some("3".into()),
//!             (0, 1) => Some("4".into()),
//!             _ => None,
//!         }
//!     }
//!
//!     fn cell_range(&self, _: u32, _: u16, _: u32, _: u16) -> Vec<RangeValue> {
//!         Vec::new()
//!     }
//! }
//!
//! let result = evaluate_formula("=A1+B1", &Fixed).unwrap();
//! assert_eq!(result, FormulaValue::Number(7.0));
//! ```

pub mod ast;
pub mod dependency;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod parser;

pub use ast::{BinaryOperator, FormulaExpr, UnaryOperator};
pub use dependency::{CellKey, DependencyGraph};
pub use error::{ErrorValue, FormulaError, FormulaResult};
pub use evaluator::{
    evaluate, evaluate_formula, format_number, FormulaContext, FormulaValue, RangeValue,
};
pub use parser::parse_formula;
