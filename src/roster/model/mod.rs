mod reference;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::roster::error::{Result, RosterError};

pub use reference::{CellRef, TableRange, column_index, column_letters};

/// Shortest identifier the roster accepts.
pub const MIN_ID_LENGTH: usize = 17;
/// Longest identifier the roster accepts.
pub const MAX_ID_LENGTH: usize = 22;

/// A single table row: an ordered sequence of display strings.
pub type Row = Vec<String>;

/// Identifier of a support agent. It is the join key across the schedule,
/// norm, and event tables and is only checked for length; uniqueness is
/// assumed by the workbook authors and never enforced here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

impl RecordId {
    /// Validates the raw value and wraps it. Length is counted in characters.
    pub fn parse(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let length = value.chars().count();
        if !(MIN_ID_LENGTH..=MAX_ID_LENGTH).contains(&length) {
            return Err(RosterError::InvalidIdentifier { value, length });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RecordId {
    type Error = RosterError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

/// An aligned table snapshot together with the row that replaces a vacated
/// slot. Every table taking part in one synchronization describes the same
/// agents at the same row offsets.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedTable {
    /// Human readable name used in logs and errors.
    pub name: String,
    pub rows: Vec<Row>,
    /// Row appended at the end after a record has been removed.
    pub default_row: Row,
}

impl AlignedTable {
    pub fn new(name: impl Into<String>, rows: Vec<Row>, default_row: Row) -> Self {
        Self {
            name: name.into(),
            rows,
            default_row,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Removes the row at `offset` and appends the default row, keeping the
    /// row count stable. Rows after `offset` shift up by one.
    pub(crate) fn vacate(&mut self, offset: usize) {
        self.rows.remove(offset);
        self.rows.push(self.default_row.clone());
    }
}

/// A named free-text column checked by substring containment.
#[derive(Debug, Clone, PartialEq)]
pub struct Blacklist {
    pub name: String,
    pub entries: Vec<String>,
}

impl Blacklist {
    pub fn new(name: impl Into<String>, entries: Vec<String>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }
}

/// Outcome of checking one identifier against one blacklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlacklistHit {
    pub name: String,
    pub found: bool,
    /// 1-based position of the first matching entry.
    pub position: Option<usize>,
}
