//! Formula bridge: exposes the cell store to the evaluator and turns
//! evaluation results into cell values

use sheetgrid_core::cell::error_display;
use sheetgrid_core::{CellRange, CellStore, CellValue, FormulaOutcome, ERROR_PREFIX};
use sheetgrid_formula::{
    evaluate, format_number, parse_formula, CellKey, ErrorValue, FormulaContext, FormulaValue,
    RangeValue,
};

use crate::infer::{classify, Inferred};

/// Read-only evaluator view of a cell store
///
/// Formulas see other cells through their display values. Only cells inside
/// the grid exist; references past its edges read as empty.
pub struct StoreContext<'a> {
    store: &'a CellStore,
    grid: Option<CellRange>,
}

impl<'a> StoreContext<'a> {
    /// View of `store` limited to `grid` (`None` for a grid without cells)
    pub fn new(store: &'a CellStore, grid: Option<CellRange>) -> Self {
        Self { store, grid }
    }
}

/// Extent of a `rows` x `cols` grid, `None` when it has no cells
pub fn grid_bounds(rows: u32, cols: u16) -> Option<CellRange> {
    if rows == 0 || cols == 0 {
        return None;
    }
    Some(CellRange::from_indices(0, 0, rows - 1, cols - 1))
}

impl FormulaContext for StoreContext<'_> {
    fn cell_value(&self, row: u32, col: u16) -> Option<String> {
        if !self.grid.map_or(false, |grid| grid.contains(row, col)) {
            return None;
        }
        let display = self.store.get(row, col).display_value();
        if display.is_empty() {
            None
        } else {
            Some(display.to_string())
        }
    }

    fn cell_range(&self, start_row: u32, start_col: u16, end_row: u32, end_col: u16) -> Vec<RangeValue> {
        let requested = CellRange::from_indices(start_row, start_col, end_row, end_col);
        let Some(range) = self.grid.and_then(|grid| requested.intersect(&grid)) else {
            return Vec::new();
        };

        let mut values = Vec::with_capacity(range.cell_count() as usize);
        for addr in range.cells() {
            values.push(RangeValue::from_display(
                self.store.get(addr.row, addr.col).display_value(),
            ));
        }
        values
    }

    fn bounds(&self) -> Option<CellRange> {
        self.grid
    }
}

/// Cells of `grid` a formula reads; empty when it does not parse
pub fn precedents(formula: &str, grid: &CellRange) -> Vec<CellRange> {
    parse_formula(formula)
        .map(|expr| {
            expr.references()
                .iter()
                .filter_map(|range| range.intersect(grid))
                .collect()
        })
        .unwrap_or_default()
}

/// Outcome of a failed evaluation
pub fn failure(message: &str) -> FormulaOutcome {
    let reason = if message.is_empty() {
        "Invalid formula"
    } else {
        message
    };
    FormulaOutcome::Error(error_display(reason))
}

/// Evaluate formula text against `ctx`
pub fn evaluate_outcome(formula: &str, ctx: &dyn FormulaContext) -> FormulaOutcome {
    match parse_formula(formula).and_then(|expr| evaluate(&expr, ctx)) {
        Ok(value) => outcome_of(value),
        Err(e) => failure(&e.to_string()),
    }
}

/// Interpret an evaluator result
///
/// Numbers are NUMBER, error values and `#ERROR` strings are ERROR, and
/// everything else is shown as text under the FORMULA type.
pub fn outcome_of(value: FormulaValue) -> FormulaOutcome {
    match value {
        FormulaValue::Number(n) if n.is_finite() => FormulaOutcome::Number(format_number(n)),
        FormulaValue::Number(_) => FormulaOutcome::Error(ErrorValue::Num.to_string()),
        FormulaValue::Empty => FormulaOutcome::Number("0".to_string()),
        FormulaValue::Error(e) => FormulaOutcome::Error(e.to_string()),
        FormulaValue::String(s) if s.starts_with(ERROR_PREFIX) => FormulaOutcome::Error(s),
        FormulaValue::Array(rows) => {
            // A bare range shows its top-left value
            let first = rows
                .into_iter()
                .next()
                .and_then(|row| row.into_iter().next())
                .unwrap_or(FormulaValue::Empty);
            outcome_of(first)
        }
        other => FormulaOutcome::Text(other.as_string()),
    }
}

/// Turn raw input into the value a commit stores
pub fn interpret(input: &str, ctx: &dyn FormulaContext) -> CellValue {
    match classify(input) {
        Inferred::Value(value) => value,
        Inferred::Formula(formula) => CellValue::Formula {
            formula: formula.to_string(),
            outcome: evaluate_outcome(formula, ctx),
        },
    }
}

/// Key of a grid coordinate in the dependency graph
pub fn key(row: u32, col: u16) -> CellKey {
    CellKey::new(row, col)
}
