//! Editor options

use serde::{Deserialize, Serialize};

/// When formulas are re-evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecalcMode {
    /// Formulas evaluate once, when committed
    #[default]
    Snapshot,
    /// Committing a cell re-evaluates the formula cells that read it
    Reactive,
}

/// Options for a grid editor session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridOptions {
    /// Number of rows in the grid (default: 1000)
    pub total_rows: u32,
    /// Row height in pixels (default: 24)
    pub row_height: f64,
    /// Disable all editing (default: false)
    pub read_only: bool,
    /// Formula recalculation mode (default: snapshot)
    pub recalc: RecalcMode,
    /// Rows fetched beyond the visible area (default: 5)
    pub buffer_rows: u32,
    /// Columns fetched beyond the visible area (default: 2)
    pub buffer_cols: u16,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            total_rows: 1000,
            row_height: 24.0,
            read_only: false,
            recalc: RecalcMode::Snapshot,
            buffer_rows: 5,
            buffer_cols: 2,
        }
    }
}
