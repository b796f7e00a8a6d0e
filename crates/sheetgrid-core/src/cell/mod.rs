//! Cell-related types and utilities
//!
//! This module contains:
//! - [`Cell`] and [`CellValue`] - A cell and its classified payload
//! - [`CellAddress`] - A cell's location (e.g., "A1")
//! - [`CellRange`] - A range of cells (e.g., "A1:B10")
//! - [`CellStore`] - Sparse storage keyed by (row, column)

mod address;
mod storage;
mod value;

pub use address::{column_index, column_name, CellAddress, CellRange, CellRangeIterator};
pub use storage::{CellStore, EditVersion};
pub use value::{error_display, Cell, CellValue, DataType, FormulaOutcome};
