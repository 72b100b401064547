use std::fs;

use roster_tools::RosterError;
use roster_tools::io::excel_read::read_workbook;
use roster_tools::io::excel_write::write_workbook;
use calamine::{DataType, Reader, Xlsx, open_workbook};
use roster_tools::io::{Cell, NoteWriter, TableStore, Workbook};
use roster_tools::layout::RosterLayout;
use roster_tools::model::{CellRef, RecordId, TableRange, column_index, column_letters};
use roster_tools::sync::{self, DeleteOutcome};
use tempfile::tempdir;

const ALICE: &str = "100000000000000001";
const BOB: &str = "100000000000000002";

fn seeded_workbook(layout: &RosterLayout) -> Workbook {
    let mut workbook = Workbook::new();
    for name in ["Список", "Норма", "Ивент", "ЧС"] {
        workbook.add_sheet(name);
    }

    let first_agent = CellRef::parse("Список!P5").unwrap();
    let second_agent = CellRef::parse("Список!P6").unwrap();
    workbook.write_cell(&first_agent, ALICE).unwrap();
    workbook.write_cell(&second_agent, BOB).unwrap();
    workbook.write_cell(&CellRef::parse("Список!L5").unwrap(), "alice").unwrap();
    workbook.write_cell(&CellRef::parse("Список!L6").unwrap(), "bob").unwrap();
    workbook.write_cell(&CellRef::parse("Норма!E24").unwrap(), "7,50").unwrap();
    workbook.write_cell(&CellRef::parse("Норма!E25").unwrap(), "3,25").unwrap();
    workbook.write_cell(&CellRef::parse("Ивент!E5").unwrap(), "win").unwrap();
    workbook
        .set_note(
            &CellRef::parse("Список!T5").unwrap(),
            Some("Дата и время выговора: 01.01.2026, 10:00:00".into()),
        )
        .unwrap();

    // Keep the layout honest: the seeded cells sit inside the configured ranges.
    assert!(layout.schedule.range.contains(&first_agent));
    workbook
}

#[test]
fn cells_and_notes_survive_a_write_read_cycle() {
    let layout = RosterLayout::default();
    let workbook = seeded_workbook(&layout);
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("roster.xlsx");

    write_workbook(&path, &workbook).expect("workbook written");
    let restored = read_workbook(&path).expect("workbook read");

    assert_eq!(restored, workbook);
    let names: Vec<&str> = restored.sheets().iter().map(|sheet| sheet.name.as_str()).collect();
    assert_eq!(names, vec!["Список", "Норма", "Ивент", "ЧС"]);
}

#[test]
fn deletion_persists_through_the_file() {
    let layout = RosterLayout::default();
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("roster.xlsx");
    write_workbook(&path, &seeded_workbook(&layout)).expect("workbook written");

    let mut workbook = read_workbook(&path).expect("workbook read");
    let id = RecordId::parse(ALICE).unwrap();
    let outcome = sync::delete_record_by_id(&mut workbook, &layout, &id, &mut |_: &str| true)
        .expect("record deleted");
    assert!(matches!(outcome, DeleteOutcome::Deleted { offset: 0, .. }));
    write_workbook(&path, &workbook).expect("workbook rewritten");

    let restored = read_workbook(&path).expect("workbook reread");
    let schedule = restored.read_rows(&layout.schedule.range).unwrap();
    assert_eq!(schedule[0][0], "bob");
    assert_eq!(schedule[0][4], BOB);
    assert_eq!(schedule[1][4], "");
    assert_eq!(schedule[49], layout.schedule.default_row);

    let norm = restored.read_rows(&layout.dependents[0].range).unwrap();
    assert_eq!(norm[0][0], "3.25");
    assert_eq!(norm[1][0], "");

    let event = restored.read_rows(&layout.dependents[1].range).unwrap();
    assert_eq!(event[0][0], "");
}

#[test]
fn numbers_and_formulas_survive_a_delete_and_save() {
    let layout = RosterLayout::default();
    let mut workbook = seeded_workbook(&layout);
    let total = CellRef::parse("Норма!E75").unwrap();
    workbook.add_sheet("Норма").set_cell(
        total.row,
        total.col,
        Cell::Formula {
            formula: "SUM(E24:E73)".into(),
            cached: "10.75".into(),
        },
    );
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("roster.xlsx");
    write_workbook(&path, &workbook).expect("workbook written");

    let mut restored = read_workbook(&path).expect("workbook read");
    assert_eq!(
        restored.sheet("Норма").unwrap().cell(total.row, total.col),
        &Cell::Formula {
            formula: "SUM(E24:E73)".into(),
            cached: "10.75".into(),
        }
    );

    let id = RecordId::parse(BOB).unwrap();
    sync::delete_record_by_id(&mut restored, &layout, &id, &mut |_: &str| true)
        .expect("record deleted");
    write_workbook(&path, &restored).expect("workbook rewritten");

    let mut file: Xlsx<_> = open_workbook(&path).expect("xlsx opens");
    let values = file.worksheet_range("Норма").unwrap().unwrap();
    assert_eq!(values.get_value((23, 4)), Some(&DataType::Float(7.5)));
    assert!(matches!(values.get_value((24, 4)), None | Some(DataType::Empty)));
    let formulas = file.worksheet_formula("Норма").unwrap().unwrap();
    let formula = formulas.get_value((74, 4)).expect("formula cell");
    assert_eq!(formula.trim_start_matches('='), "SUM(E24:E73)");
}

#[test]
fn typed_input_becomes_numbers_only_when_short() {
    assert_eq!(Cell::from_input("7,50"), Cell::Number(7.5));
    assert_eq!(Cell::from_input("12"), Cell::Number(12.0));
    assert_eq!(Cell::from_input(ALICE), Cell::Text(ALICE.into()));
    assert_eq!(Cell::from_input("0/3"), Cell::Text("0/3".into()));
    assert_eq!(Cell::from_input("1,2,3"), Cell::Text("1,2,3".into()));
    assert_eq!(Cell::from_input(""), Cell::Empty);
}

#[test]
fn rewriting_a_shown_value_keeps_the_formula() {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_sheet("Норма");
    let formula = Cell::Formula {
        formula: "E24*2".into(),
        cached: "15".into(),
    };
    sheet.set_cell(0, 0, formula.clone());

    sheet.set(0, 0, "15");
    assert_eq!(sheet.cell(0, 0), &formula);

    sheet.set(0, 0, "16");
    assert_eq!(sheet.cell(0, 0), &Cell::Number(16.0));
}

#[test]
fn notes_for_removed_sheets_are_skipped() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("roster.xlsx");
    let mut book = rust_xlsxwriter::Workbook::new();
    book.add_worksheet()
        .set_name("Список")
        .unwrap()
        .write_string(4, 19, "1/3")
        .unwrap();
    let notes = book.add_worksheet().set_name("__notes").unwrap();
    for (col, text) in ["sheet", "cell", "note"].into_iter().enumerate() {
        notes.write_string(0, col as u16, text).unwrap();
    }
    for (col, text) in ["Архив", "T5", "old"].into_iter().enumerate() {
        notes.write_string(1, col as u16, text).unwrap();
    }
    for (col, text) in ["Список", "T5", "kept"].into_iter().enumerate() {
        notes.write_string(2, col as u16, text).unwrap();
    }
    book.save(&path).expect("workbook saved");

    let workbook = read_workbook(&path).expect("workbook read");

    assert_eq!(workbook.notes().len(), 1);
    assert_eq!(workbook.note(&CellRef::parse("Список!T5").unwrap()), Some("kept"));
}

#[test]
fn missing_file_is_reported() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("absent.xlsx");

    assert!(matches!(read_workbook(&path), Err(RosterError::MissingInput(_))));
}

#[test]
fn default_layout_is_consistent_and_loads_from_json() {
    let layout = RosterLayout::default();
    layout.validate().expect("default layout is valid");
    assert_eq!(layout.schedule.range.width(), 9);
    assert_eq!(layout.dependents[0].range.width(), 7);
    assert_eq!(layout.dependents[1].range.width(), 5);

    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("layout.json");
    fs::write(&path, layout.to_json().unwrap()).expect("layout written");

    let loaded = RosterLayout::load(&path).expect("layout loaded");
    assert_eq!(loaded, layout);
}

#[test]
fn layout_with_mismatched_default_row_is_rejected() {
    let mut layout = RosterLayout::default();
    layout.dependents[0].default_row.pop();

    assert!(matches!(layout.validate(), Err(RosterError::InvalidLayout(_))));

    let mut layout = RosterLayout::default();
    layout.dependents[1].range = TableRange::parse("Ивент!E5:I40").unwrap();

    assert!(matches!(layout.validate(), Err(RosterError::InvalidLayout(_))));
}

#[test]
fn references_parse_to_zero_based_bounds() {
    let range = TableRange::parse("Список!L5:T54").unwrap();
    assert_eq!(
        (range.first_row, range.first_col, range.last_row, range.last_col),
        (4, 11, 53, 19)
    );
    assert_eq!(range.to_string(), "Список!L5:T54");

    let cell = CellRef::parse("'Список'!P7").unwrap();
    assert_eq!((cell.sheet.as_str(), cell.row, cell.col), ("Список", 6, 15));

    assert_eq!(column_index("AA").unwrap(), 26);
    assert_eq!(column_letters(26), "AA");
    assert!(TableRange::parse("L5:T54").is_err());
    assert!(CellRef::parse("Список!P0").is_err());
    assert!(TableRange::parse("Список!T54:L5").is_err());
}
