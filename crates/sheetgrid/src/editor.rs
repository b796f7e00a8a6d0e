//! Grid editor
//!
//! Ties the store, viewport, controller, formula bridge and clipboard codec
//! together. Every user-visible operation goes through [`GridEditor`].

use log::{debug, warn};
use sheetgrid_clipboard::{parse_clipboard_text, Clipboard, ClipboardPayload, PasteOptions};
use sheetgrid_core::{
    Cell, CellAddress, CellRange, CellRecord, CellStore, CellValue, ColumnModel,
};
use sheetgrid_formula::{evaluate_formula, DependencyGraph, FormulaError, FormulaValue};

use crate::bridge::{self, StoreContext};
use crate::controller::{CellPosition, Controller, EditorState, KeyEvent, KeyOutcome};
use crate::error::Result;
use crate::fetch::{FetchError, FetchRequest, RangeSource};
use crate::options::{GridOptions, RecalcMode};
use crate::viewport::{ScrollState, Viewport, ViewportManager};

/// Callback fired once per committed cell with the raw committed value
pub type ChangeListener = Box<dyn FnMut(u32, u16, &str)>;

/// A virtualized grid editing session
pub struct GridEditor {
    grid_id: String,
    generation: u64,
    options: GridOptions,
    columns: ColumnModel,
    store: CellStore,
    viewport: ViewportManager,
    controller: Controller,
    graph: DependencyGraph,
    paste_options: PasteOptions,
    next_request: u64,
    listener: Option<ChangeListener>,
}

impl GridEditor {
    /// Create an editor for the given grid
    pub fn new(grid_id: impl Into<String>, options: GridOptions, columns: ColumnModel) -> Self {
        Self {
            grid_id: grid_id.into(),
            generation: 0,
            viewport: ViewportManager::new(&options),
            controller: Controller::new(options.total_rows, columns.len()),
            options,
            columns,
            store: CellStore::new(),
            graph: DependencyGraph::new(),
            paste_options: PasteOptions::default(),
            next_request: 0,
            listener: None,
        }
    }

    /// Use custom paste tokenising options
    pub fn with_paste_options(mut self, options: PasteOptions) -> Self {
        self.paste_options = options;
        self
    }

    pub fn grid_id(&self) -> &str {
        &self.grid_id
    }

    /// Session counter, bumped by every [`reset`](Self::reset)
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    pub fn columns(&self) -> &ColumnModel {
        &self.columns
    }

    pub fn store(&self) -> &CellStore {
        &self.store
    }

    pub fn state(&self) -> &EditorState {
        self.controller.state()
    }

    /// The current loaded window, once the editor has been scrolled or sized
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport.current()
    }

    /// Read a cell; unknown coordinates are empty
    pub fn cell(&self, row: u32, col: u16) -> &Cell {
        self.store.get(row, col)
    }

    /// Read a cell by A1 address
    pub fn cell_at(&self, address: &str) -> Result<&Cell> {
        let addr = CellAddress::parse(address)?;
        Ok(self.store.get(addr.row, addr.col))
    }

    /// Register the change listener, replacing any previous one
    pub fn on_cell_change<F>(&mut self, listener: F)
    where
        F: FnMut(u32, u16, &str) + 'static,
    {
        self.listener = Some(Box::new(listener));
    }

    // === Viewport and fetch ===

    /// Apply a scroll position or container size
    ///
    /// Returns the fetch the host must run when the loaded window changed.
    pub fn scroll(&mut self, scroll: ScrollState) -> Option<FetchRequest> {
        let viewport = self.viewport.update(scroll, &self.columns)?;
        self.request_for(viewport)
    }

    /// Replace the column model
    pub fn set_columns(&mut self, columns: ColumnModel) -> Option<FetchRequest> {
        self.columns = columns;
        self.controller.resize(self.options.total_rows, self.columns.len());

        if self.viewport.current().is_none() {
            return None;
        }
        let viewport = self.viewport.update(self.viewport.scroll(), &self.columns)?;
        self.request_for(viewport)
    }

    fn request_for(&mut self, viewport: Viewport) -> Option<FetchRequest> {
        let range = viewport.to_range()?;
        self.next_request += 1;

        let request = FetchRequest {
            id: self.next_request,
            grid_id: self.grid_id.clone(),
            generation: self.generation,
            range,
            issued_at: self.store.clock(),
        };
        debug!(
            "fetch #{} issued for {} ({})",
            request.id,
            range.to_a1_string(),
            self.grid_id
        );
        Some(request)
    }

    /// Merge the result of a fetch
    ///
    /// Requests from an earlier grid session are ignored, records outside the
    /// requested range are dropped, and cells edited locally after the
    /// request was issued are kept. Failures leave the store untouched.
    /// Returns the number of cells written.
    pub fn complete_fetch(
        &mut self,
        request: &FetchRequest,
        result: std::result::Result<Vec<CellRecord>, FetchError>,
    ) -> usize {
        if request.generation != self.generation || request.grid_id != self.grid_id {
            warn!(
                "ignoring stale fetch #{} for {} (generation {}, current {})",
                request.id, request.grid_id, request.generation, self.generation
            );
            return 0;
        }

        let records = match result {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    "fetch #{} for {} failed: {}",
                    request.id,
                    request.range.to_a1_string(),
                    e
                );
                return 0;
            }
        };

        let received = records.len();
        let records: Vec<CellRecord> = records
            .into_iter()
            .filter(|record| {
                let (row, col) = record.position();
                request.range.contains(row, col)
            })
            .collect();
        if records.len() < received {
            warn!(
                "fetch #{} returned {} cells outside {}",
                request.id,
                received - records.len(),
                request.range.to_a1_string()
            );
        }

        let positions: Vec<(u32, u16)> = match self.options.recalc {
            RecalcMode::Reactive => records.iter().map(CellRecord::position).collect(),
            RecalcMode::Snapshot => Vec::new(),
        };

        let written = self.store.merge_range(
            records.into_iter().map(|record| {
                let (row, col) = record.position();
                (row, col, record.into_cell())
            }),
            request.issued_at,
        );
        debug!("fetch #{} merged {} cells", request.id, written);

        // Remote formulas join the graph but are not recomputed
        for (row, col) in positions {
            self.track(row, col);
        }

        written
    }

    /// Run a fetch synchronously against `source` and merge the result
    pub fn load(&mut self, request: &FetchRequest, source: &mut dyn RangeSource) -> usize {
        let result = source.fetch(&request.grid_id, request.range);
        self.complete_fetch(request, result)
    }

    /// Switch to another grid, discarding all cached cells
    ///
    /// Returns the fetch for the current window of the new grid, if the
    /// editor has a window.
    pub fn reset(&mut self, grid_id: impl Into<String>) -> Option<FetchRequest> {
        self.grid_id = grid_id.into();
        self.generation += 1;
        self.store.clear();
        self.graph.clear();
        self.controller.clear();
        debug!(
            "grid reset to {} (generation {})",
            self.grid_id, self.generation
        );

        self.viewport.current()?;
        self.viewport.invalidate();
        let viewport = self.viewport.update(self.viewport.scroll(), &self.columns)?;
        self.request_for(viewport)
    }

    // === Commit path ===

    /// Every cell of the grid, `None` when it has no rows or columns
    fn grid(&self) -> Option<CellRange> {
        bridge::grid_bounds(self.options.total_rows, self.columns.len())
    }

    fn in_bounds(&self, row: u32, col: u16) -> bool {
        row < self.options.total_rows && col < self.columns.len()
    }

    /// Whether a cell accepts edits
    pub fn is_editable(&self, row: u32, col: u16) -> bool {
        self.in_bounds(row, col)
            && !self.options.read_only
            && !self.columns.is_locked(col)
            && !self.store.get(row, col).locked
    }

    /// Commit raw input to a cell
    ///
    /// Returns `false` without touching the store when the cell is out of
    /// bounds or not editable.
    pub fn commit(&mut self, row: u32, col: u16, raw: &str) -> bool {
        if !self.is_editable(row, col) {
            debug!("commit to {} refused", CellAddress::new(row, col));
            return false;
        }

        let mut cell = self.store.get(row, col).clone();
        cell.value = bridge::interpret(raw, &StoreContext::new(&self.store, self.grid()));

        let reactive = self.options.recalc == RecalcMode::Reactive;
        if reactive {
            self.track_cell(row, col, &cell);
            if let Some(formula) = cell.formula().map(str::to_string) {
                if self.graph.has_circular_reference(bridge::key(row, col)) {
                    cell.value = circular(&formula);
                }
            }
        }

        debug!(
            "commit {} = {:?} ({})",
            CellAddress::new(row, col),
            raw,
            cell.data_type()
        );
        self.store.set(row, col, cell);

        if reactive {
            self.recalculate_dependents(row, col);
        }

        if let Some(listener) = self.listener.as_mut() {
            listener(row, col, raw);
        }
        true
    }

    /// Commit raw input to a cell given by A1 address
    pub fn commit_at(&mut self, address: &str, raw: &str) -> Result<bool> {
        let addr = CellAddress::parse(address)?;
        Ok(self.commit(addr.row, addr.col, raw))
    }

    /// Evaluate formula text against the current cells without storing it
    pub fn evaluate(&self, formula: &str) -> Result<FormulaValue> {
        Ok(evaluate_formula(formula, &StoreContext::new(&self.store, self.grid()))?)
    }

    fn track(&mut self, row: u32, col: u16) {
        let cell = self.store.get(row, col).clone();
        self.track_cell(row, col, &cell);
    }

    fn track_cell(&mut self, row: u32, col: u16, cell: &Cell) {
        let key = bridge::key(row, col);
        match (cell.formula(), self.grid()) {
            (Some(formula), Some(grid)) => {
                self.graph.set_precedents(key, &bridge::precedents(formula, &grid))
            }
            _ => self.graph.clear_dependencies(key),
        }
    }

    fn recalculate_dependents(&mut self, row: u32, col: u16) {
        let order = self.graph.get_recalc_order(&[bridge::key(row, col)]);
        let grid = self.grid();

        for key in order {
            let current = self.store.get(key.row, key.col);
            let Some(formula) = current.formula() else {
                continue;
            };

            let value = if self.graph.has_circular_reference(key) {
                circular(formula)
            } else {
                CellValue::Formula {
                    formula: formula.to_string(),
                    outcome: bridge::evaluate_outcome(formula, &StoreContext::new(&self.store, grid)),
                }
            };

            let mut updated = current.clone();
            updated.value = value;
            debug!("recalculated {}", CellAddress::new(key.row, key.col));
            self.store.refresh(key.row, key.col, updated);
        }
    }

    // === Pointer and keyboard ===

    /// Commit the edit in progress, if any
    fn commit_pending(&mut self) {
        if let Some((pos, draft)) = self.controller.finish_edit() {
            self.commit(pos.row, pos.col, &draft);
        }
    }

    fn editing_at(&self, pos: CellPosition) -> bool {
        matches!(self.controller.state(), EditorState::Editing { position, .. } if *position == pos)
    }

    /// Single click: select the cell and stage an edit seeded with its raw value
    pub fn click(&mut self, row: u32, col: u16) {
        let pos = CellPosition::new(row, col);
        if !self.controller.in_bounds(pos) || self.editing_at(pos) {
            return;
        }
        self.commit_pending();

        if self.is_editable(row, col) {
            let seed = self.store.get(row, col).value().unwrap_or("").to_string();
            self.controller.begin_edit(pos, seed);
        } else {
            self.controller.select(pos);
        }
    }

    /// Double click: stage an edit seeded with the formula, else the raw value
    pub fn double_click(&mut self, row: u32, col: u16) {
        let pos = CellPosition::new(row, col);
        if !self.controller.in_bounds(pos) {
            return;
        }
        if !self.editing_at(pos) {
            self.commit_pending();
        }

        if self.is_editable(row, col) {
            let seed = self.store.get(row, col).edit_text().to_string();
            self.controller.begin_edit(pos, seed);
        } else {
            self.controller.select(pos);
        }
    }

    /// Focus left the grid: commit the edit in progress
    pub fn blur(&mut self) {
        self.commit_pending();
    }

    /// Handle a key press
    pub fn handle_key(&mut self, event: KeyEvent, clipboard: &mut dyn Clipboard) -> KeyOutcome {
        let editable = self
            .controller
            .state()
            .selection()
            .map_or(false, |pos| self.is_editable(pos.row, pos.col));

        let outcome = self.controller.handle_key(event, editable);

        match &outcome {
            KeyOutcome::OpenEdit(pos) => {
                let seed = self.store.get(pos.row, pos.col).edit_text().to_string();
                self.controller.begin_edit(*pos, seed);
            }
            KeyOutcome::Commit { position, draft } => {
                self.commit(position.row, position.col, draft);
            }
            KeyOutcome::Copy(pos) => {
                clipboard.write(ClipboardPayload::from_cell(self.store.get(pos.row, pos.col)));
            }
            KeyOutcome::Paste(pos) => {
                if let Some(text) = clipboard.read_text() {
                    if let Err(e) = self.paste_at(*pos, &text) {
                        warn!("paste at {} failed: {}", CellAddress::new(pos.row, pos.col), e);
                    }
                }
            }
            _ => {}
        }

        outcome
    }

    // === Clipboard ===

    /// Copy the selected cell
    pub fn copy(&self, clipboard: &mut dyn Clipboard) -> bool {
        match self.controller.state().selection() {
            Some(pos) => {
                clipboard.write(ClipboardPayload::from_cell(self.store.get(pos.row, pos.col)));
                true
            }
            None => false,
        }
    }

    /// Paste text at the selected cell; returns the number of cells written
    pub fn paste_text(&mut self, text: &str) -> Result<usize> {
        match self.controller.state().selection() {
            Some(pos) => self.paste_at(pos, text),
            None => Ok(0),
        }
    }

    /// Paste a TSV/CSV block with its top-left corner at `pos`
    ///
    /// The block is clipped to the grid. Locked cells are skipped; every
    /// other cell goes through [`commit`](Self::commit).
    pub fn paste_at(&mut self, pos: CellPosition, text: &str) -> Result<usize> {
        if self.options.read_only {
            debug!("paste ignored on read-only grid");
            return Ok(0);
        }

        let block = parse_clipboard_text(text, &self.paste_options)?;
        let mut written = 0;

        for (i, fields) in block.iter().enumerate() {
            let row = match u32::try_from(i).ok().and_then(|i| pos.row.checked_add(i)) {
                Some(row) if row < self.options.total_rows => row,
                _ => break,
            };

            for (j, field) in fields.iter().enumerate() {
                let col = match u16::try_from(j).ok().and_then(|j| pos.col.checked_add(j)) {
                    Some(col) if col < self.columns.len() => col,
                    _ => break,
                };

                if !self.is_editable(row, col) {
                    warn!("paste skipped locked cell {}", CellAddress::new(row, col));
                    continue;
                }
                if self.commit(row, col, field) {
                    written += 1;
                }
            }
        }

        debug!(
            "pasted {} cells at {}",
            written,
            CellAddress::new(pos.row, pos.col)
        );
        Ok(written)
    }

    // === Export ===

    /// Bounding box of the non-empty cells
    pub fn used_range(&self) -> Option<CellRange> {
        let mut bounds: Option<(u32, u16, u32, u16)> = None;
        for (row, col, cell) in self.store.iter() {
            if cell.is_empty() {
                continue;
            }
            bounds = Some(match bounds {
                None => (row, col, row, col),
                Some((r1, c1, r2, c2)) => (r1.min(row), c1.min(col), r2.max(row), c2.max(col)),
            });
        }
        bounds.map(|(r1, c1, r2, c2)| CellRange::from_indices(r1, c1, r2, c2))
    }

    /// Display values of a range, row-major
    pub fn display_grid(&self, range: CellRange) -> Vec<Vec<String>> {
        (range.start.row..=range.end.row)
            .map(|row| {
                (range.start.col..=range.end.col)
                    .map(|col| self.store.get(row, col).display_value().to_string())
                    .collect()
            })
            .collect()
    }
}

/// Formula value for a cell that is part of a reference cycle
fn circular(formula: &str) -> CellValue {
    CellValue::Formula {
        formula: formula.to_string(),
        outcome: bridge::failure(&FormulaError::CircularReference.to_string()),
    }
}

impl std::fmt::Debug for GridEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridEditor")
            .field("grid_id", &self.grid_id)
            .field("generation", &self.generation)
            .field("options", &self.options)
            .field("cells", &self.store.len())
            .field("state", self.controller.state())
            .finish()
    }
}
