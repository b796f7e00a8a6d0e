//! Cell storage implementation
//!
//! Sparse storage for grid cells. Only cells that were fetched or edited are
//! stored, using a row-based BTreeMap structure; every other coordinate reads
//! as [`Cell::EMPTY`].

use std::collections::BTreeMap;

use super::{Cell, CellRange};

/// Monotonic stamp of the store's local edit clock
///
/// Fetches record the clock when issued so that a slow response cannot
/// overwrite a cell that was edited locally after the request went out.
pub type EditVersion = u64;

static EMPTY_CELL: Cell = Cell::EMPTY;

#[derive(Debug, Clone)]
struct Slot {
    cell: Cell,
    /// Version of the last local edit (0 = never edited locally)
    edited_at: EditVersion,
}

/// Sparse row-based storage for grid cells
///
/// Structure: `BTreeMap<row_index, BTreeMap<col_index, Slot>>`. Row-major
/// ordering makes range iteration cheap and deterministic.
#[derive(Debug, Default)]
pub struct CellStore {
    /// Row index → column map
    rows: BTreeMap<u32, BTreeMap<u16, Slot>>,

    /// Local edit clock; bumped by every [`CellStore::set`]
    clock: EditVersion,
}

impl CellStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cell; unknown coordinates return the empty default
    pub fn get(&self, row: u32, col: u16) -> &Cell {
        self.rows
            .get(&row)
            .and_then(|r| r.get(&col))
            .map(|slot| &slot.cell)
            .unwrap_or(&EMPTY_CELL)
    }

    /// Check whether a coordinate has been materialized
    pub fn contains(&self, row: u32, col: u16) -> bool {
        self.rows.get(&row).map_or(false, |r| r.contains_key(&col))
    }

    /// Replace a cell wholesale as a local edit
    ///
    /// Returns the edit version stamped on the cell.
    pub fn set(&mut self, row: u32, col: u16, cell: Cell) -> EditVersion {
        self.clock += 1;
        let edited_at = self.clock;
        self.rows
            .entry(row)
            .or_default()
            .insert(col, Slot { cell, edited_at });
        edited_at
    }

    /// Replace a cell's computed content without counting as a local edit
    ///
    /// Used when a formula is re-evaluated because something it reads changed.
    pub fn refresh(&mut self, row: u32, col: u16, cell: Cell) {
        let slot = self.rows.entry(row).or_default().entry(col).or_insert(Slot {
            cell: Cell::EMPTY,
            edited_at: 0,
        });
        slot.cell = cell;
    }

    /// Merge cells from a range fetch issued when the clock read `issued_at`
    ///
    /// Cells edited locally after the fetch was issued are kept. Returns the
    /// number of cells written.
    pub fn merge_range<I>(&mut self, cells: I, issued_at: EditVersion) -> usize
    where
        I: IntoIterator<Item = (u32, u16, Cell)>,
    {
        let mut written = 0;

        for (row, col, cell) in cells {
            let slot = self.rows.entry(row).or_default().entry(col).or_insert(Slot {
                cell: Cell::EMPTY,
                edited_at: 0,
            });

            if slot.edited_at > issued_at {
                continue;
            }

            slot.cell = cell;
            written += 1;
        }

        written
    }

    /// Current value of the local edit clock
    pub fn clock(&self) -> EditVersion {
        self.clock
    }

    /// Version of the last local edit at a coordinate (0 if never edited)
    pub fn version_of(&self, row: u32, col: u16) -> EditVersion {
        self.rows
            .get(&row)
            .and_then(|r| r.get(&col))
            .map_or(0, |slot| slot.edited_at)
    }

    /// Clear all cells
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Get the number of materialized cells
    pub fn len(&self) -> usize {
        self.rows.values().map(|r| r.len()).sum()
    }

    /// Check if storage is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over all materialized cells in row order
    pub fn iter(&self) -> impl Iterator<Item = (u32, u16, &Cell)> {
        self.rows.iter().flat_map(|(&row, cols)| {
            cols.iter()
                .map(move |(&col, slot)| (row, col, &slot.cell))
        })
    }

    /// Iterate over materialized cells inside a range, in row order
    pub fn iter_range(&self, range: CellRange) -> impl Iterator<Item = (u32, u16, &Cell)> {
        self.rows
            .range(range.start.row..=range.end.row)
            .flat_map(move |(&row, cols)| {
                cols.range(range.start.col..=range.end.col)
                    .map(move |(&col, slot)| (row, col, &slot.cell))
            })
    }
}
