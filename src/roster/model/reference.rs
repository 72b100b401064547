use std::fmt;

use serde::{Deserialize, Serialize};

use crate::roster::error::{Result, RosterError};

/// Converts spreadsheet column letters (`A`, `P`, `AA`) into a zero-based
/// column index.
pub fn column_index(letters: &str) -> Result<u16> {
    if letters.is_empty() {
        return Err(RosterError::InvalidReference(letters.to_string()));
    }

    let mut index: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return Err(RosterError::InvalidReference(letters.to_string()));
        }
        let digit = (ch.to_ascii_uppercase() as u8 - b'A') as u32 + 1;
        index = index * 26 + digit;
        if index > u16::MAX as u32 {
            return Err(RosterError::InvalidReference(letters.to_string()));
        }
    }

    Ok((index - 1) as u16)
}

/// Converts a zero-based column index back into spreadsheet letters.
pub fn column_letters(index: u16) -> String {
    let mut remaining = index as u32 + 1;
    let mut letters = Vec::new();
    while remaining > 0 {
        let digit = ((remaining - 1) % 26) as u8;
        letters.push((b'A' + digit) as char);
        remaining = (remaining - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Parses `P7` into zero-based `(row, column)`.
fn parse_a1(cell: &str) -> Result<(u32, u16)> {
    let invalid = || RosterError::InvalidReference(cell.to_string());
    let split = cell
        .find(|ch: char| ch.is_ascii_digit())
        .ok_or_else(invalid)?;
    let (letters, digits) = cell.split_at(split);
    let col = column_index(letters).map_err(|_| invalid())?;
    let row: u32 = digits.parse().map_err(|_| invalid())?;
    if row == 0 {
        return Err(invalid());
    }
    Ok((row - 1, col))
}

/// Splits `Sheet!A1` into its sheet and cell parts. Quoted sheet names are
/// unquoted.
fn split_sheet(reference: &str) -> Option<(String, &str)> {
    let (sheet, cell) = reference.rsplit_once('!')?;
    let sheet = sheet
        .strip_prefix('\'')
        .and_then(|name| name.strip_suffix('\''))
        .unwrap_or(sheet);
    Some((sheet.to_string(), cell))
}

/// A single cell on a named sheet. Row and column are zero-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    pub sheet: String,
    pub row: u32,
    pub col: u16,
}

impl CellRef {
    pub fn new(sheet: impl Into<String>, row: u32, col: u16) -> Self {
        Self {
            sheet: sheet.into(),
            row,
            col,
        }
    }

    /// Parses `Sheet!P7`.
    pub fn parse(reference: &str) -> Result<Self> {
        let (sheet, cell) = split_sheet(reference)
            .ok_or_else(|| RosterError::InvalidReference(reference.to_string()))?;
        Self::parse_on(sheet, cell)
    }

    /// Parses a bare A1 cell such as `P7` on the given sheet.
    pub fn parse_on(sheet: impl Into<String>, cell: &str) -> Result<Self> {
        let (row, col) = parse_a1(cell.trim())?;
        Ok(Self::new(sheet, row, col))
    }

    /// A1 notation of the cell without the sheet, e.g. `P7`.
    pub fn a1(&self) -> String {
        format!("{}{}", column_letters(self.col), self.row + 1)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}", self.sheet, self.a1())
    }
}

/// A rectangular block of cells on a named sheet, the handle through which a
/// table is read and written. Bounds are zero-based and inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TableRange {
    pub sheet: String,
    pub first_row: u32,
    pub first_col: u16,
    pub last_row: u32,
    pub last_col: u16,
}

impl TableRange {
    /// Parses `Sheet!L5:T54`. A single cell (`Sheet!D5`) is a one-cell range.
    pub fn parse(reference: &str) -> Result<Self> {
        let (sheet, cells) = split_sheet(reference)
            .ok_or_else(|| RosterError::InvalidReference(reference.to_string()))?;
        Self::parse_on(sheet, cells)
    }

    /// Parses a bare A1 range such as `L5:T54` on the given sheet.
    pub fn parse_on(sheet: impl Into<String>, cells: &str) -> Result<Self> {
        let (start, end) = cells.split_once(':').unwrap_or((cells, cells));
        let (first_row, first_col) = parse_a1(start.trim())?;
        let (last_row, last_col) = parse_a1(end.trim())?;
        if last_row < first_row || last_col < first_col {
            return Err(RosterError::InvalidReference(cells.to_string()));
        }
        Ok(Self {
            sheet: sheet.into(),
            first_row,
            first_col,
            last_row,
            last_col,
        })
    }

    pub fn width(&self) -> usize {
        (self.last_col - self.first_col) as usize + 1
    }

    pub fn height(&self) -> usize {
        (self.last_row - self.first_row) as usize + 1
    }

    /// Returns whether the cell lies inside the rectangle on the same sheet.
    pub fn contains(&self, cell: &CellRef) -> bool {
        cell.sheet == self.sheet
            && (self.first_row..=self.last_row).contains(&cell.row)
            && (self.first_col..=self.last_col).contains(&cell.col)
    }

    /// A1 notation of the rectangle without the sheet, e.g. `L5:T54`.
    pub fn a1(&self) -> String {
        format!(
            "{}{}:{}{}",
            column_letters(self.first_col),
            self.first_row + 1,
            column_letters(self.last_col),
            self.last_row + 1
        )
    }
}

impl fmt::Display for TableRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}", self.sheet, self.a1())
    }
}

impl TryFrom<String> for TableRange {
    type Error = RosterError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<TableRange> for String {
    fn from(range: TableRange) -> Self {
        range.to_string()
    }
}
