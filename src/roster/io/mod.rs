//! Table I/O seams and the in-memory workbook that implements them.
//!
//! The engine never touches spreadsheet files directly: operations read
//! snapshots through [`TableStore`], write them back through the same trait,
//! and stamp notes through [`NoteWriter`]. [`Workbook`] keeps every sheet as a
//! grid of typed cells, hands the engine their display strings, and is loaded
//! and saved by [`excel_read`] and [`excel_write`].

pub mod excel_read;
pub mod excel_write;

use std::collections::BTreeMap;

use crate::roster::error::{Result, RosterError};
use crate::roster::model::{CellRef, Row, TableRange};

/// Hidden sheet mirroring every cell note as `sheet | cell | text`.
pub const NOTES_SHEET: &str = "__notes";

/// Reads and writes rectangular blocks of cells.
pub trait TableStore {
    /// Returns the rows of `range`, padding absent cells with empty strings.
    fn read_rows(&self, range: &TableRange) -> Result<Vec<Row>>;

    /// Overwrites `range` with `rows`. The shape must match the range exactly.
    fn write_rows(&mut self, range: &TableRange, rows: &[Row]) -> Result<()>;

    fn read_cell(&self, cell: &CellRef) -> Result<String>;

    fn write_cell(&mut self, cell: &CellRef, value: &str) -> Result<()>;
}

/// Sets or clears the note attached to a cell.
pub trait NoteWriter {
    fn set_note(&mut self, cell: &CellRef, note: Option<String>) -> Result<()>;
}

/// Largest number of digits a typed-in value may carry and still be stored as
/// a number. Longer digit strings (agent identifiers) stay text.
const MAX_NUMBER_DIGITS: usize = 15;

/// A typed cell value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Boolean(bool),
    /// Spreadsheet date serial.
    Date(f64),
    /// Formula source without the leading `=` and its last computed value.
    Formula { formula: String, cached: String },
}

impl Cell {
    /// Interprets a typed-in value: blank clears the cell, plain or
    /// comma-decimal numbers become numbers, anything else stays text.
    pub fn from_input(value: &str) -> Self {
        if value.is_empty() {
            return Cell::Empty;
        }
        match parse_number(value) {
            Some(number) => Cell::Number(number),
            None => Cell::Text(value.to_string()),
        }
    }

    /// The string the engine sees for this cell.
    pub fn display(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(value) => value.clone(),
            Cell::Number(value) | Cell::Date(value) => value.to_string(),
            Cell::Boolean(value) => value.to_string(),
            Cell::Formula { cached, .. } => cached.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

fn parse_number(value: &str) -> Option<f64> {
    let normalized = match value.matches(',').count() {
        0 => value.to_string(),
        1 if !value.contains('.') => value.replace(',', "."),
        _ => return None,
    };
    if !normalized
        .chars()
        .all(|ch| ch.is_ascii_digit() || matches!(ch, '.' | '-' | '+'))
    {
        return None;
    }
    let digits = normalized.chars().filter(char::is_ascii_digit).count();
    if digits == 0 || digits > MAX_NUMBER_DIGITS {
        return None;
    }
    normalized.parse::<f64>().ok().filter(|number| number.is_finite())
}

/// A worksheet stored as a dense grid of typed cells anchored at `A1`. Two
/// sheets are equal when they hold the same non-empty cells.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub name: String,
    cells: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: Vec::new(),
        }
    }

    pub fn cell(&self, row: u32, col: u16) -> &Cell {
        static EMPTY: Cell = Cell::Empty;
        self.cells
            .get(row as usize)
            .and_then(|cells| cells.get(col as usize))
            .unwrap_or(&EMPTY)
    }

    pub fn get(&self, row: u32, col: u16) -> String {
        self.cell(row, col).display()
    }

    /// Writes a display value. A cell already showing `value` keeps its type,
    /// so untouched formulas and numbers inside a rewritten range survive.
    pub fn set(&mut self, row: u32, col: u16, value: &str) {
        if self.get(row, col) == value {
            return;
        }
        self.set_cell(row, col, Cell::from_input(value));
    }

    pub fn set_cell(&mut self, row: u32, col: u16, cell: Cell) {
        let (row, col) = (row as usize, col as usize);
        if cell.is_empty() && self.cells.get(row).is_none_or(|cells| cells.len() <= col) {
            return;
        }
        if self.cells.len() <= row {
            self.cells.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.cells[row];
        if cells.len() <= col {
            cells.resize_with(col + 1, Cell::default);
        }
        cells[col] = cell;
    }

    /// Iterates over every non-empty cell as `(row, col, cell)`.
    pub fn filled_cells(&self) -> impl Iterator<Item = (u32, u16, &Cell)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|(_, cell)| !cell.is_empty())
                .map(move |(col, cell)| (row as u32, col as u16, cell))
        })
    }
}

impl PartialEq for Sheet {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.filled_cells().eq(other.filled_cells())
    }
}

/// In-memory snapshot of a whole workbook: sheets in their original order
/// plus the notes attached to individual cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
    notes: BTreeMap<CellRef, String>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the named sheet, appending an empty one when absent.
    pub fn add_sheet(&mut self, name: &str) -> &mut Sheet {
        let index = match self.sheets.iter().position(|sheet| sheet.name == name) {
            Some(index) => index,
            None => {
                self.sheets.push(Sheet::new(name));
                self.sheets.len() - 1
            }
        };
        &mut self.sheets[index]
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Result<&Sheet> {
        self.sheets
            .iter()
            .find(|sheet| sheet.name == name)
            .ok_or_else(|| RosterError::MissingSheet(name.to_string()))
    }

    fn sheet_mut(&mut self, name: &str) -> Result<&mut Sheet> {
        self.sheets
            .iter_mut()
            .find(|sheet| sheet.name == name)
            .ok_or_else(|| RosterError::MissingSheet(name.to_string()))
    }

    pub fn notes(&self) -> &BTreeMap<CellRef, String> {
        &self.notes
    }

    pub fn note(&self, cell: &CellRef) -> Option<&str> {
        self.notes.get(cell).map(String::as_str)
    }
}

impl TableStore for Workbook {
    fn read_rows(&self, range: &TableRange) -> Result<Vec<Row>> {
        let sheet = self.sheet(&range.sheet)?;
        let rows = (range.first_row..=range.last_row)
            .map(|row| {
                (range.first_col..=range.last_col)
                    .map(|col| sheet.get(row, col))
                    .collect()
            })
            .collect();
        Ok(rows)
    }

    fn write_rows(&mut self, range: &TableRange, rows: &[Row]) -> Result<()> {
        if rows.len() != range.height() {
            return Err(RosterError::PreconditionViolation(format!(
                "{} rows do not fit range {range} of height {}",
                rows.len(),
                range.height()
            )));
        }
        if let Some(row) = rows.iter().find(|row| row.len() != range.width()) {
            return Err(RosterError::PreconditionViolation(format!(
                "row of {} cells does not fit range {range} of width {}",
                row.len(),
                range.width()
            )));
        }

        let sheet = self.sheet_mut(&range.sheet)?;
        for (row_offset, row) in rows.iter().enumerate() {
            for (col_offset, value) in row.iter().enumerate() {
                sheet.set(
                    range.first_row + row_offset as u32,
                    range.first_col + col_offset as u16,
                    value.as_str(),
                );
            }
        }
        Ok(())
    }

    fn read_cell(&self, cell: &CellRef) -> Result<String> {
        Ok(self.sheet(&cell.sheet)?.get(cell.row, cell.col))
    }

    fn write_cell(&mut self, cell: &CellRef, value: &str) -> Result<()> {
        self.sheet_mut(&cell.sheet)?.set(cell.row, cell.col, value);
        Ok(())
    }
}

impl NoteWriter for Workbook {
    fn set_note(&mut self, cell: &CellRef, note: Option<String>) -> Result<()> {
        self.sheet(&cell.sheet)?;
        match note {
            Some(text) => {
                self.notes.insert(cell.clone(), text);
            }
            None => {
                self.notes.remove(cell);
            }
        }
        Ok(())
    }
}
