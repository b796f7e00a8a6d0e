//! # sheetgrid
//!
//! A virtualized grid editor with inline formula evaluation.
//!
//! The editor keeps only the cells a host has fetched or the user has
//! edited, classifies raw keystrokes into typed values, evaluates `=...`
//! formulas against the other cells, and speaks the usual spreadsheet
//! keyboard and clipboard conventions. Rendering and IO belong to the host:
//! it feeds scroll positions, pointer and key events in, runs the range
//! fetches the editor asks for, and listens for committed changes.
//!
//! ## Example
//!
//! ```rust
//! use sheetgrid::{ColumnModel, DataType, GridEditor, GridOptions, MemoryClipboard};
//! use sheetgrid::{Key, KeyEvent};
//!
//! let mut editor = GridEditor::new("budget", GridOptions::default(), ColumnModel::default());
//!
//! editor.commit(0, 0, "3");
//! editor.commit(0, 1, "4");
//! editor.commit(1, 1, "=A1+B1");
//! assert_eq!(editor.cell(1, 1).display_value(), "7");
//! assert_eq!(editor.cell(1, 1).data_type(), DataType::Number);
//!
//! // Select B2 and copy it
//! let mut clipboard = MemoryClipboard::new();
//! editor.click(1, 1);
//! editor.handle_key(KeyEvent::plain(Key::Escape), &mut clipboard);
//! editor.handle_key(KeyEvent::ctrl(Key::Char('c')), &mut clipboard);
//! assert_eq!(clipboard.payload().unwrap().text, "7");
//! ```

pub mod bridge;
pub mod controller;
pub mod editor;
pub mod error;
pub mod fetch;
pub mod infer;
pub mod options;
pub mod viewport;

pub use controller::{CellPosition, Controller, EditorState, Key, KeyEvent, KeyOutcome, Modifiers};
pub use editor::{ChangeListener, GridEditor};
pub use error::{Error, Result};
pub use fetch::{decode_records, FetchError, FetchRequest, MemorySource, RangeSource};
pub use infer::{classify, validate, Inferred, ValidationError};
pub use options::{GridOptions, RecalcMode};
pub use viewport::{ScrollState, Viewport, ViewportManager};

// Re-export the building blocks hosts touch directly
pub use sheetgrid_clipboard::{
    Clipboard, ClipboardPayload, GridWriter, MemoryClipboard, PasteOptions,
};
pub use sheetgrid_core::{
    column_index, column_name, Cell, CellAddress, CellRange, CellRecord, CellStore, CellValue,
    Column, ColumnModel, ColumnType, DataType, FormulaOutcome,
};
pub use sheetgrid_formula::FormulaValue;
