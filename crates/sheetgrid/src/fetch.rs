//! Range fetch protocol
//!
//! The editor never performs IO itself. When the viewport changes it hands
//! the host a [`FetchRequest`]; the host loads the records however it likes
//! and passes the result back to
//! [`GridEditor::complete_fetch`](crate::GridEditor::complete_fetch).

use std::collections::BTreeMap;

use sheetgrid_core::{CellRange, CellRecord, EditVersion};
use thiserror::Error;

/// Errors a host reports for a failed fetch
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport or backend failure
    #[error("fetch failed: {0}")]
    Failed(String),

    /// Response body could not be decoded
    #[error("invalid fetch response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// One outstanding range load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Sequence number, unique per editor
    pub id: u64,
    /// Identity of the grid the cells belong to
    pub grid_id: String,
    /// Grid session the request was issued in
    pub generation: u64,
    /// Inclusive bounds of the cells to load
    pub range: CellRange,
    /// Store clock when the request was issued
    pub issued_at: EditVersion,
}

/// Decode a JSON array of cell records
pub fn decode_records(json: &str) -> Result<Vec<CellRecord>, FetchError> {
    Ok(serde_json::from_str(json)?)
}

/// A synchronous source of cell records
pub trait RangeSource {
    /// Load the non-empty cells of `range` for the given grid
    fn fetch(&mut self, grid_id: &str, range: CellRange) -> Result<Vec<CellRecord>, FetchError>;
}

/// Records held in memory, keyed by position
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    records: BTreeMap<(u32, u16), CellRecord>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a record
    pub fn insert(&mut self, record: CellRecord) {
        self.records.insert(record.position(), record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<CellRecord> for MemorySource {
    fn from_iter<I: IntoIterator<Item = CellRecord>>(iter: I) -> Self {
        let mut source = Self::new();
        for record in iter {
            source.insert(record);
        }
        source
    }
}

impl RangeSource for MemorySource {
    fn fetch(&mut self, _grid_id: &str, range: CellRange) -> Result<Vec<CellRecord>, FetchError> {
        Ok(self
            .records
            .range((range.start.row, range.start.col)..=(range.end.row, range.end.col))
            .filter(|&(&(row, col), _)| range.contains(row, col))
            .map(|(_, record)| record.clone())
            .collect())
    }
}
