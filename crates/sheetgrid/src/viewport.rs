//! Viewport calculations
//!
//! Maps a scroll position and container size to the window of cells that
//! must be loaded: the visible area plus a buffer of rows and columns.

use log::trace;
use sheetgrid_core::{CellRange, ColumnModel};

use crate::options::GridOptions;

/// Scroll position and container size, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollState {
    pub scroll_top: f64,
    pub scroll_left: f64,
    pub width: f64,
    pub height: f64,
}

impl ScrollState {
    pub fn new(scroll_top: f64, scroll_left: f64, width: f64, height: f64) -> Self {
        Self {
            scroll_top,
            scroll_left,
            width,
            height,
        }
    }
}

/// Window of loaded cells; end bounds are exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub start_row: u32,
    pub end_row: u32,
    pub start_col: u16,
    pub end_col: u16,
}

impl Viewport {
    /// Number of rows in the window
    pub fn row_count(&self) -> u32 {
        self.end_row.saturating_sub(self.start_row)
    }

    /// Number of columns in the window
    pub fn col_count(&self) -> u16 {
        self.end_col.saturating_sub(self.start_col)
    }

    /// Check if the window holds no cells
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0 || self.col_count() == 0
    }

    /// Check if a cell lies inside the window
    pub fn contains(&self, row: u32, col: u16) -> bool {
        (self.start_row..self.end_row).contains(&row) && (self.start_col..self.end_col).contains(&col)
    }

    /// The window as an inclusive range, `None` when empty
    pub fn to_range(&self) -> Option<CellRange> {
        if self.is_empty() {
            return None;
        }
        Some(CellRange::from_indices(
            self.start_row,
            self.start_col,
            self.end_row - 1,
            self.end_col - 1,
        ))
    }
}

/// Tracks the current viewport and reports when it changes
#[derive(Debug, Clone)]
pub struct ViewportManager {
    row_height: f64,
    total_rows: u32,
    buffer_rows: u32,
    buffer_cols: u16,
    scroll: ScrollState,
    current: Option<Viewport>,
}

impl ViewportManager {
    /// Create a manager for the given options
    ///
    /// Non-positive row heights are treated as one pixel.
    pub fn new(options: &GridOptions) -> Self {
        Self {
            row_height: if options.row_height > 0.0 {
                options.row_height
            } else {
                1.0
            },
            total_rows: options.total_rows,
            buffer_rows: options.buffer_rows,
            buffer_cols: options.buffer_cols,
            scroll: ScrollState::default(),
            current: None,
        }
    }

    /// The last computed viewport
    pub fn current(&self) -> Option<Viewport> {
        self.current
    }

    /// The last scroll state seen
    pub fn scroll(&self) -> ScrollState {
        self.scroll
    }

    /// Forget the current viewport so the next update reports a change
    pub fn invalidate(&mut self) {
        self.current = None;
    }

    /// Recompute for a new scroll state; returns the viewport if it changed
    pub fn update(&mut self, scroll: ScrollState, columns: &ColumnModel) -> Option<Viewport> {
        self.scroll = scroll;
        let viewport = self.compute(&scroll, columns);
        trace!("viewport recomputed: {:?}", viewport);

        if self.current == Some(viewport) {
            return None;
        }
        self.current = Some(viewport);
        Some(viewport)
    }

    /// Compute the viewport for a scroll state without recording it
    pub fn compute(&self, scroll: &ScrollState, columns: &ColumnModel) -> Viewport {
        let (start_row, end_row) = self.row_window(scroll);
        let (start_col, end_col) = self.col_window(scroll, columns);
        Viewport {
            start_row,
            end_row,
            start_col,
            end_col,
        }
    }

    fn row_window(&self, scroll: &ScrollState) -> (u32, u32) {
        let top = scroll.scroll_top.max(0.0);
        let height = scroll.height.max(0.0);

        let start = ((top / self.row_height).floor() as u64).min(self.total_rows as u64) as u32;
        let visible = (height / self.row_height).ceil() as u64 + self.buffer_rows as u64;
        let end = (start as u64 + visible).min(self.total_rows as u64) as u32;

        (start, end)
    }

    fn col_window(&self, scroll: &ScrollState, columns: &ColumnModel) -> (u16, u16) {
        let left = scroll.scroll_left.max(0.0);
        let right = left + scroll.width.max(0.0);
        let widths: Vec<f64> = columns.widths().collect();
        let total = widths.len();

        // Column whose span contains the left edge
        let mut acc = 0.0;
        let mut start = total;
        for (i, w) in widths.iter().enumerate() {
            if acc + w > left {
                start = i;
                break;
            }
            acc += w;
        }

        // First column starting at or past the right edge
        let mut end = total;
        for (i, w) in widths.iter().enumerate().skip(start) {
            if acc >= right {
                end = i;
                break;
            }
            acc += w;
        }

        let end = (end + self.buffer_cols as usize).min(total);
        (start as u16, end as u16)
    }
}
