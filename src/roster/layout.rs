//! Static description of where the roster tables live inside the workbook.
//!
//! The layout replaces hard-coded ranges with a plain immutable structure that
//! can be serialised to JSON, edited, and loaded back with
//! [`RosterLayout::load`]. [`RosterLayout::default`] describes the production
//! workbook.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::roster::error::{Result, RosterError};
use crate::roster::model::{AlignedTable, Row, TableRange, column_index};

/// Value marking a status cell as fully cleared.
pub const COMPLETION_SENTINEL: &str = "0/3";
const NOTE_PREFIX: &str = "Дата и время выговора: ";

/// One aligned table: its location, width, and vacated-row template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableLayout {
    pub name: String,
    pub range: TableRange,
    pub width: usize,
    /// Zero-based column holding the record identifier, if the table has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_column: Option<usize>,
    pub default_row: Row,
}

impl TableLayout {
    fn blank(name: &str, range: &str, width: usize) -> Self {
        Self {
            name: name.to_string(),
            range: parse_static(range),
            width,
            id_column: None,
            default_row: vec![String::new(); width],
        }
    }

    /// Wraps a snapshot of this table's rows for synchronization.
    pub fn snapshot(&self, rows: Vec<Row>) -> AlignedTable {
        AlignedTable::new(self.name.clone(), rows, self.default_row.clone())
    }

    fn validate(&self) -> Result<()> {
        if self.range.width() != self.width {
            return Err(RosterError::InvalidLayout(format!(
                "table '{}' declares width {} but range {} spans {} columns",
                self.name,
                self.width,
                self.range,
                self.range.width()
            )));
        }
        if self.default_row.len() != self.width {
            return Err(RosterError::InvalidLayout(format!(
                "table '{}' default row has {} cells, expected {}",
                self.name,
                self.default_row.len(),
                self.width
            )));
        }
        if let Some(column) = self.id_column {
            if column >= self.width {
                return Err(RosterError::InvalidLayout(format!(
                    "table '{}' identifier column {column} is outside width {}",
                    self.name, self.width
                )));
            }
        }
        Ok(())
    }
}

/// A named single-column blacklist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlacklistLayout {
    pub name: String,
    pub range: TableRange,
}

/// Cells whose edits stamp or clear a reprimand note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusBand {
    pub range: TableRange,
    /// Value that clears the note instead of stamping it.
    pub sentinel: String,
    /// Text placed before the timestamp in the note.
    pub note_prefix: String,
}

/// Norm sheet settings used by the hour utilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormLayout {
    /// Sheet on which time conversion is allowed.
    pub sheet: String,
    /// Ranges blanked by the clear-norm operation.
    pub clear_ranges: Vec<TableRange>,
}

/// Complete workbook layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterLayout {
    /// Primary table searched by identifier.
    pub schedule: TableLayout,
    /// Tables edited at the same row offset as the schedule.
    pub dependents: Vec<TableLayout>,
    pub blacklists: Vec<BlacklistLayout>,
    /// Column letters of the cell users select to pick an agent's identifier.
    pub id_selection_column: String,
    pub status: StatusBand,
    pub norm: NormLayout,
}

impl Default for RosterLayout {
    fn default() -> Self {
        let schedule = TableLayout {
            name: "schedule".to_string(),
            range: parse_static("Список!L5:T54"),
            width: 9,
            id_column: Some(4),
            default_row: ["", "", "-", "", "<@>", "", "", "", COMPLETION_SENTINEL]
                .iter()
                .map(|cell| cell.to_string())
                .collect(),
        };

        Self {
            schedule,
            dependents: vec![
                TableLayout::blank("norm", "Норма!E24:K73", 7),
                TableLayout::blank("event", "Ивент!E5:I54", 5),
            ],
            blacklists: vec![
                BlacklistLayout {
                    name: "Саппорты".to_string(),
                    range: parse_static("ЧС!D5:D64"),
                },
                BlacklistLayout {
                    name: "Ключи".to_string(),
                    range: parse_static("ЧС!J5:J64"),
                },
            ],
            id_selection_column: "P".to_string(),
            status: StatusBand {
                range: parse_static("Список!T5:T54"),
                sentinel: COMPLETION_SENTINEL.to_string(),
                note_prefix: NOTE_PREFIX.to_string(),
            },
            norm: NormLayout {
                sheet: "Норма".to_string(),
                clear_ranges: vec![
                    parse_static("Норма!E5:K21"),
                    parse_static("Норма!E24:K73"),
                ],
            },
        }
    }
}

impl RosterLayout {
    /// Reads a JSON layout from disk and validates it.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RosterError::MissingInput(path.to_path_buf()));
        }
        let source = fs::read_to_string(path)?;
        let layout: RosterLayout = serde_json::from_str(&source)?;
        layout.validate()?;
        Ok(layout)
    }

    /// Checks that widths, ranges, and templates agree with each other.
    pub fn validate(&self) -> Result<()> {
        self.schedule.validate()?;
        if self.schedule.id_column.is_none() {
            return Err(RosterError::InvalidLayout(
                "schedule table needs an identifier column".into(),
            ));
        }

        for table in &self.dependents {
            table.validate()?;
            if table.range.height() != self.schedule.range.height() {
                return Err(RosterError::InvalidLayout(format!(
                    "table '{}' spans {} rows but the schedule spans {}",
                    table.name,
                    table.range.height(),
                    self.schedule.range.height()
                )));
            }
        }

        for blacklist in &self.blacklists {
            if blacklist.range.width() != 1 {
                return Err(RosterError::InvalidLayout(format!(
                    "blacklist '{}' must be a single column",
                    blacklist.name
                )));
            }
        }

        column_index(&self.id_selection_column)
            .map_err(|_| RosterError::InvalidLayout(format!(
                "invalid identifier selection column '{}'",
                self.id_selection_column
            )))?;
        Ok(())
    }

    /// Zero-based sheet column where users select an identifier.
    pub fn id_selection_col(&self) -> Result<u16> {
        column_index(&self.id_selection_column)
    }

    /// Serialises the layout as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// Only called with the literals above.
fn parse_static(reference: &str) -> TableRange {
    match TableRange::parse(reference) {
        Ok(range) => range,
        Err(error) => panic!("built-in range {reference} is invalid: {error}"),
    }
}
