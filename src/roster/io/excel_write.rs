use std::path::Path;

use rust_xlsxwriter::{Format, Formula, Note, Workbook as XlsxWorkbook};

use crate::roster::error::Result;
use crate::roster::io::{Cell, NOTES_SHEET, Workbook};

const DATE_FORMAT: &str = "dd.mm.yyyy";

/// Writes the workbook to the given path, replacing any existing file.
///
/// Every sheet is emitted in order. Numbers, booleans, dates, and formulas
/// keep their type; formulas carry their cached value. Notes are
/// attached to their cells and mirrored into a hidden [`NOTES_SHEET`] so that
/// [`read_workbook`](crate::roster::io::excel_read::read_workbook) can restore
/// them.
pub fn write_workbook(path: &Path, workbook: &Workbook) -> Result<()> {
    let mut workbook_writer = XlsxWorkbook::new();
    let date_format = Format::new().set_num_format(DATE_FORMAT);

    for sheet in workbook.sheets() {
        let worksheet = workbook_writer.add_worksheet();
        worksheet.set_name(&sheet.name)?;

        for (row, col, cell) in sheet.filled_cells() {
            match cell {
                Cell::Empty => {}
                Cell::Text(value) => {
                    worksheet.write_string(row, col, value)?;
                }
                Cell::Number(value) => {
                    worksheet.write_number(row, col, *value)?;
                }
                Cell::Boolean(value) => {
                    worksheet.write_boolean(row, col, *value)?;
                }
                Cell::Date(serial) => {
                    worksheet.write_number_with_format(row, col, *serial, &date_format)?;
                }
                Cell::Formula { formula, cached } => {
                    let formula = Formula::new(format!("={formula}")).set_result(cached);
                    worksheet.write_formula(row, col, formula)?;
                }
            }
        }

        for (cell, text) in workbook.notes().iter().filter(|(cell, _)| cell.sheet == sheet.name) {
            worksheet.insert_note(cell.row, cell.col, &Note::new(text))?;
        }
    }

    if !workbook.notes().is_empty() {
        let worksheet = workbook_writer.add_worksheet();
        worksheet.set_name(NOTES_SHEET)?;
        worksheet.set_hidden(true);

        for (col_idx, header) in ["sheet", "cell", "note"].iter().enumerate() {
            worksheet.write_string(0, col_idx as u16, *header)?;
        }

        for (row_idx, (cell, text)) in workbook.notes().iter().enumerate() {
            let row = (row_idx + 1) as u32;
            worksheet.write_string(row, 0, &cell.sheet)?;
            worksheet.write_string(row, 1, cell.a1())?;
            worksheet.write_string(row, 2, text)?;
        }
    }

    workbook_writer.save(path)?;
    Ok(())
}
