use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};
use tracing::warn;

use crate::roster::error::{Result, RosterError};
use crate::roster::io::{Cell, NOTES_SHEET, NoteWriter, Workbook};
use crate::roster::model::CellRef;

/// Reads every sheet of an `.xlsx` file into a [`Workbook`] of typed cells.
/// Formulas are kept alongside their cached values. Notes are restored from
/// the hidden [`NOTES_SHEET`] written by
/// [`excel_write`](crate::roster::io::excel_write).
pub fn read_workbook(path: &Path) -> Result<Workbook> {
    if !path.exists() {
        return Err(RosterError::MissingInput(path.to_path_buf()));
    }

    let mut source: Xlsx<_> = open_workbook(path)?;
    let sheet_names = source.sheet_names().to_vec();
    let mut workbook = Workbook::new();
    let mut notes_range = None;

    for name in &sheet_names {
        let range = read_required_sheet(&mut source, name)?;
        if name == NOTES_SHEET {
            notes_range = Some(range);
            continue;
        }

        let sheet = workbook.add_sheet(name);
        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        for (row_offset, row) in range.rows().enumerate() {
            for (col_offset, value) in row.iter().enumerate() {
                let cell = data_to_cell(value);
                if cell.is_empty() {
                    continue;
                }
                sheet.set_cell(
                    start_row + row_offset as u32,
                    (start_col as usize + col_offset) as u16,
                    cell,
                );
            }
        }

        let formulas = match source.worksheet_formula(name) {
            Some(result) => result.map_err(RosterError::from)?,
            None => continue,
        };
        let (start_row, start_col) = formulas.start().unwrap_or((0, 0));
        for (row_offset, row) in formulas.rows().enumerate() {
            for (col_offset, formula) in row.iter().enumerate() {
                if formula.is_empty() {
                    continue;
                }
                let (row, col) = (
                    start_row + row_offset as u32,
                    (start_col as usize + col_offset) as u16,
                );
                let cached = sheet.get(row, col);
                sheet.set_cell(
                    row,
                    col,
                    Cell::Formula {
                        formula: formula.trim_start_matches('=').to_string(),
                        cached,
                    },
                );
            }
        }
    }

    if let Some(range) = notes_range {
        ingest_notes(&range, &mut workbook)?;
    }

    Ok(workbook)
}

fn read_required_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<calamine::Range<DataType>> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| RosterError::MissingSheet(name.to_string()))?;
    let range = range_result.map_err(RosterError::from)?;
    Ok(range)
}

fn ingest_notes(range: &calamine::Range<DataType>, workbook: &mut Workbook) -> Result<()> {
    for row in range.rows().skip(1) {
        let sheet = cell_to_string(row.first());
        if sheet.is_empty() {
            continue;
        }
        let cell = cell_to_string(row.get(1));
        let text = cell_to_string(row.get(2));
        let cell = CellRef::parse_on(sheet, &cell).map_err(|_| {
            RosterError::InvalidWorkbook(format!("bad note reference '{cell}' in {NOTES_SHEET}"))
        })?;
        if workbook.sheet(&cell.sheet).is_err() {
            warn!(cell = %cell, "skipping note for a sheet that no longer exists");
            continue;
        }
        workbook.set_note(&cell, Some(text))?;
    }
    Ok(())
}

fn data_to_cell(value: &DataType) -> Cell {
    match value {
        DataType::Empty => Cell::Empty,
        DataType::String(text) if text.is_empty() => Cell::Empty,
        DataType::String(text) => Cell::Text(text.clone()),
        DataType::Float(number) => Cell::Number(*number),
        DataType::Int(number) => Cell::Number(*number as f64),
        DataType::Bool(flag) => Cell::Boolean(*flag),
        DataType::DateTime(serial) => Cell::Date(*serial),
        other => Cell::Text(other.to_string()),
    }
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
