//! Error types for the grid editor

use thiserror::Error;

use crate::fetch::FetchError;

/// Result type for editor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the editor's fallible helpers
///
/// User input never produces an `Error`; invalid input and failing formulas
/// become error cells instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Core error (addresses, column names, records)
    #[error("Core error: {0}")]
    Core(#[from] sheetgrid_core::Error),

    /// Formula error
    #[error("Formula error: {0}")]
    Formula(#[from] sheetgrid_formula::FormulaError),

    /// Clipboard decoding error
    #[error("Clipboard error: {0}")]
    Clipboard(#[from] sheetgrid_clipboard::ClipboardError),

    /// Range fetch error
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),
}
