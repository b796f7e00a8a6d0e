//! Snapshot and reactive formula recalculation

use pretty_assertions::assert_eq;
use sheetgrid::{
    ColumnModel, DataType, GridEditor, GridOptions, MemorySource, RecalcMode, ScrollState,
};
use std::cell::RefCell;
use std::rc::Rc;

fn editor(recalc: RecalcMode) -> GridEditor {
    let options = GridOptions {
        recalc,
        ..Default::default()
    };
    GridEditor::new("calc", options, ColumnModel::default())
}

#[test]
fn snapshot_formulas_keep_their_commit_time_value() {
    let mut ed = editor(RecalcMode::Snapshot);
    ed.commit(0, 0, "3");
    ed.commit(0, 1, "=A1*2");
    ed.commit(0, 0, "10");

    assert_eq!(ed.cell(0, 1).display_value(), "6");
}

#[test]
fn reactive_formulas_follow_their_inputs() {
    let mut ed = editor(RecalcMode::Reactive);
    ed.commit(0, 0, "3");
    ed.commit(0, 1, "=A1*2");
    ed.commit(0, 2, "=B1+A1");
    ed.commit(1, 0, "=SUM(A1:C1)");

    ed.commit(0, 0, "10");

    assert_eq!(ed.cell(0, 1).display_value(), "20");
    assert_eq!(ed.cell(0, 2).display_value(), "30");
    assert_eq!(ed.cell(1, 0).display_value(), "60");
}

#[test]
fn recalculated_dependents_do_not_notify() {
    let mut ed = editor(RecalcMode::Reactive);
    ed.commit(0, 0, "1");
    ed.commit(1, 0, "=A1+1");

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    ed.on_cell_change(move |row, col, _| sink.borrow_mut().push((row, col)));

    ed.commit(0, 0, "5");
    assert_eq!(ed.cell(1, 0).display_value(), "6");
    assert_eq!(*seen.borrow(), vec![(0, 0)]);
}

#[test]
fn replacing_a_formula_drops_its_old_inputs() {
    let mut ed = editor(RecalcMode::Reactive);
    ed.commit(0, 0, "1");
    ed.commit(0, 1, "=A1");
    ed.commit(0, 1, "fixed");

    ed.commit(0, 0, "2");
    assert_eq!(ed.cell(0, 1).display_value(), "fixed");
    assert_eq!(ed.cell(0, 1).data_type(), DataType::Text);
}

#[test]
fn cycles_render_as_circular_reference_errors() {
    let mut ed = editor(RecalcMode::Reactive);
    ed.commit(0, 0, "=B1+1");
    ed.commit(0, 1, "=A1+1");

    for col in [0, 1] {
        let cell = ed.cell(0, col);
        assert_eq!(cell.display_value(), "#ERROR: Circular reference");
        assert_eq!(cell.data_type(), DataType::Error);
    }

    // Breaking the cycle recovers both cells
    ed.commit(0, 1, "4");
    assert_eq!(ed.cell(0, 0).display_value(), "5");
    assert_eq!(ed.cell(0, 0).data_type(), DataType::Number);
}

#[test]
fn self_reference_is_circular() {
    let mut ed = editor(RecalcMode::Reactive);
    ed.commit(2, 2, "=C3*2");
    assert_eq!(ed.cell(2, 2).display_value(), "#ERROR: Circular reference");
}

#[test]
fn fetched_formulas_react_to_local_edits_but_merges_do_not_recalculate() {
    let mut ed = editor(RecalcMode::Reactive);
    ed.commit(0, 0, "2");

    let request = ed
        .scroll(ScrollState::new(0.0, 0.0, 800.0, 480.0))
        .unwrap();
    let mut source: MemorySource = sheetgrid::decode_records(
        r#"[{"rowIndex": 1, "columnIndex": 0, "formula": "=A1*100",
             "displayValue": "100", "dataType": "NUMBER"}]"#,
    )
    .unwrap()
    .into_iter()
    .collect();
    ed.load(&request, &mut source);

    // Server value is kept as sent
    assert_eq!(ed.cell(1, 0).display_value(), "100");

    ed.commit(0, 0, "3");
    assert_eq!(ed.cell(1, 0).display_value(), "300");
}

#[test]
fn whole_sheet_ranges_read_only_the_grid() {
    let mut ed = editor(RecalcMode::Snapshot);
    ed.commit(0, 0, "2");
    ed.commit(999, 25, "3");

    ed.commit(1, 1, "=SUM(A1:XFD1048576)");
    assert_eq!(ed.cell(1, 1).display_value(), "5");
    assert_eq!(ed.cell(1, 1).data_type(), DataType::Number);

    ed.commit(2, 1, "=COUNTA(AA1:AZ9)");
    assert_eq!(ed.cell(2, 1).display_value(), "0");
}

#[test]
fn oversized_ranges_track_only_cells_inside_the_grid() {
    let mut ed = editor(RecalcMode::Reactive);
    ed.commit(1, 1, "=SUM(C1:Z1000000)");
    assert_eq!(ed.cell(1, 1).display_value(), "0");

    ed.commit(4, 2, "7");
    ed.commit(999, 25, "3");
    assert_eq!(ed.cell(1, 1).display_value(), "10");

    // Rows past the grid never exist, so they cannot be edited
    assert!(!ed.commit(1000, 2, "100"));
    assert_eq!(ed.cell(1, 1).display_value(), "10");
}
