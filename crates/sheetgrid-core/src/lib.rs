//! # sheetgrid-core
//!
//! Core data structures for the sheetgrid editor.
//!
//! This crate provides the fundamental types used throughout sheetgrid:
//! - [`Cell`] and [`CellValue`] - A cell and its classified payload
//! - [`CellAddress`] and [`CellRange`] - Cell addressing and ranges
//! - [`Column`] and [`ColumnModel`] - Column descriptors
//! - [`CellStore`] - Sparse, versioned cell storage
//!
//! ## Example
//!
//! ```rust
//! use sheetgrid_core::{Cell, CellStore, CellValue, DataType};
//!
//! let mut store = CellStore::new();
//!
//! // Unknown coordinates read as the empty default
//! assert_eq!(store.get(10, 3).data_type(), DataType::Text);
//! assert_eq!(store.get(10, 3).value(), None);
//!
//! store.set(0, 0, Cell::new(CellValue::Number("42".into())));
//! assert_eq!(store.get(0, 0).display_value(), "42");
//! ```

pub mod cell;
pub mod column;
pub mod error;
pub mod record;

// Re-exports for convenience
pub use cell::{
    column_index, column_name, Cell, CellAddress, CellRange, CellStore, CellValue, DataType,
    FormulaOutcome, EditVersion,
};
pub use column::{Column, ColumnModel, ColumnType};
pub use error::{Error, Result};
pub use record::CellRecord;

/// Maximum number of rows in a grid (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a grid (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Prefix of every error display string produced by the editor
pub const ERROR_PREFIX: &str = "#ERROR";
