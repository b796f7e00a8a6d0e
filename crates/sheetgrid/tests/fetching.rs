//! Viewport-driven fetches and merging of fetched records

use pretty_assertions::assert_eq;
use sheetgrid::{
    decode_records, CellRange, CellRecord, ColumnModel, DataType, FetchError, GridEditor,
    GridOptions, Key, KeyEvent, MemoryClipboard, MemorySource, ScrollState,
};

fn editor() -> GridEditor {
    GridEditor::new("orders", GridOptions::default(), ColumnModel::default())
}

fn screen(scroll_top: f64) -> ScrollState {
    ScrollState::new(scroll_top, 0.0, 800.0, 480.0)
}

fn record(row: u32, col: u16, value: &str) -> CellRecord {
    CellRecord {
        row_index: row,
        column_index: col,
        value: Some(value.to_string()),
        display_value: Some(value.to_string()),
        formula: None,
        data_type: DataType::Text,
        is_locked: false,
        comment: None,
    }
}

#[test]
fn visible_rows_follow_scroll_position() {
    let mut ed = editor();
    for scroll_top in [0.0, 24.0, 250.0, 1000.0, 12_345.0, 20_000.0] {
        ed.scroll(screen(scroll_top));
        let vp = ed.viewport().unwrap();
        let span = vp.end_row - vp.start_row;
        assert_eq!(vp.start_row, (scroll_top / 24.0).floor() as u32);
        assert!((20..=25).contains(&span), "span {} at {}", span, scroll_top);
    }
}

#[test]
fn one_request_per_viewport_change() {
    let mut ed = editor();

    let first = ed.scroll(screen(0.0)).unwrap();
    assert_eq!(first.range, CellRange::from_indices(0, 0, 24, 9));
    assert_eq!(first.grid_id, "orders");

    assert!(ed.scroll(screen(0.0)).is_none());
    assert!(ed.scroll(screen(5.0)).is_none());

    let second = ed.scroll(screen(48.0)).unwrap();
    assert!(second.id > first.id);
    assert_eq!(second.range.start.row, 2);
}

#[test]
fn fetched_record_appears_exactly_as_sent() {
    let mut ed = editor();
    let request = ed.scroll(screen(0.0)).unwrap();

    let records = decode_records(
        r#"[
            {"rowIndex": 3, "columnIndex": 2, "value": "=SUM(A1:A3)", "displayValue": "60",
             "formula": "=SUM(A1:A3)", "dataType": "NUMBER"},
            {"rowIndex": 4, "columnIndex": 0, "value": "2024-02-30", "displayValue": "2024-02-30",
             "dataType": "DATE", "comment": "unchecked"}
        ]"#,
    )
    .unwrap();
    assert_eq!(ed.complete_fetch(&request, Ok(records)), 2);

    let cell = ed.cell(3, 2);
    assert_eq!(cell.display_value(), "60");
    assert_eq!(cell.data_type(), DataType::Number);
    assert_eq!(cell.formula(), Some("=SUM(A1:A3)"));

    let cell = ed.cell(4, 0);
    assert_eq!(cell.display_value(), "2024-02-30");
    assert_eq!(cell.data_type(), DataType::Date);
    assert_eq!(cell.comment.as_deref(), Some("unchecked"));
}

#[test]
fn local_edits_survive_a_slower_fetch() {
    let mut ed = editor();
    let request = ed.scroll(screen(0.0)).unwrap();

    // User types into A1 while the fetch is in flight
    ed.commit(0, 0, "mine");

    let written = ed.complete_fetch(
        &request,
        Ok(vec![record(0, 0, "server"), record(0, 1, "server")]),
    );
    assert_eq!(written, 1);
    assert_eq!(ed.cell(0, 0).display_value(), "mine");
    assert_eq!(ed.cell(0, 1).display_value(), "server");

    // A fetch issued after the edit may overwrite it
    let later = ed.scroll(screen(24.0)).unwrap();
    let later = sheetgrid::FetchRequest {
        range: CellRange::from_indices(0, 0, 0, 0),
        ..later
    };
    ed.complete_fetch(&later, Ok(vec![record(0, 0, "server")]));
    assert_eq!(ed.cell(0, 0).display_value(), "server");
}

#[test]
fn failed_fetch_leaves_cells_unchanged() {
    let mut ed = editor();
    ed.commit(0, 0, "kept");
    let request = ed.scroll(screen(0.0)).unwrap();

    let written = ed.complete_fetch(&request, Err(FetchError::Failed("503".into())));
    assert_eq!(written, 0);
    assert_eq!(ed.cell(0, 0).display_value(), "kept");
    assert_eq!(ed.store().len(), 1);
}

#[test]
fn fetches_from_a_previous_grid_are_ignored() {
    let mut ed = editor();
    let stale = ed.scroll(screen(0.0)).unwrap();
    ed.commit(0, 0, "old grid");

    let fresh = ed.reset("invoices").unwrap();
    assert!(ed.store().is_empty());
    assert_eq!(fresh.grid_id, "invoices");
    assert_eq!(fresh.generation, 1);
    assert_eq!(fresh.range, stale.range);

    assert_eq!(ed.complete_fetch(&stale, Ok(vec![record(1, 1, "stale")])), 0);
    assert!(ed.store().is_empty());

    assert_eq!(ed.complete_fetch(&fresh, Ok(vec![record(1, 1, "fresh")])), 1);
    assert_eq!(ed.cell(1, 1).display_value(), "fresh");
}

#[test]
fn load_runs_request_against_a_source() {
    let mut source: MemorySource = vec![record(0, 0, "in view"), record(500, 0, "far away")]
        .into_iter()
        .collect();

    let mut ed = editor();
    let request = ed.scroll(screen(0.0)).unwrap();
    assert_eq!(ed.load(&request, &mut source), 1);
    assert_eq!(ed.cell(0, 0).display_value(), "in view");
    assert!(ed.cell(500, 0).is_empty());

    let request = ed.scroll(screen(500.0 * 24.0)).unwrap();
    assert_eq!(ed.load(&request, &mut source), 1);
    assert_eq!(ed.cell(500, 0).display_value(), "far away");
}

#[test]
fn column_changes_refetch() {
    let mut ed = editor();
    assert!(ed.set_columns(ColumnModel::with_default_columns(4, 100.0)).is_none());

    let first = ed.scroll(screen(0.0)).unwrap();
    assert_eq!(first.range.end.col, 3);

    let request = ed
        .set_columns(ColumnModel::with_default_columns(40, 50.0))
        .unwrap();
    assert_eq!(request.range.end.col, 17);
}

#[test]
fn records_outside_the_requested_range_are_dropped() {
    let mut ed = editor();
    let request = ed.scroll(screen(0.0)).unwrap();
    assert_eq!(request.range, CellRange::from_indices(0, 0, 24, 9));

    let written = ed.complete_fetch(
        &request,
        Ok(vec![
            record(24, 9, "edge"),
            record(25, 0, "below"),
            record(0, 10, "right"),
            record(900, 20, "far"),
        ]),
    );

    assert_eq!(written, 1);
    assert_eq!(ed.cell(24, 9).display_value(), "edge");
    assert!(ed.cell(25, 0).is_empty());
    assert!(ed.cell(0, 10).is_empty());
    assert_eq!(ed.store().len(), 1);
}

#[test]
fn formatted_numbers_edit_from_their_raw_value() {
    let mut ed = editor();
    let request = ed.scroll(screen(0.0)).unwrap();

    let records = decode_records(
        r#"[
            {"rowIndex": 1, "columnIndex": 1, "value": "1000", "displayValue": "1,000",
             "dataType": "NUMBER"}
        ]"#,
    )
    .unwrap();
    assert_eq!(ed.complete_fetch(&request, Ok(records)), 1);

    let cell = ed.cell(1, 1);
    assert_eq!(cell.value(), Some("1000"));
    assert_eq!(cell.display_value(), "1,000");
    assert_eq!(cell.data_type(), DataType::Number);

    // Click then Enter commits the seeded raw value unchanged
    ed.click(1, 1);
    ed.handle_key(KeyEvent::plain(Key::Enter), &mut MemoryClipboard::new());

    let cell = ed.cell(1, 1);
    assert_eq!(cell.data_type(), DataType::Number);
    assert_eq!(cell.value(), Some("1000"));
    assert_eq!(cell.display_value(), "1000");
}
