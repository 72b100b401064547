//! Reprimand notes on the status column.
//!
//! Setting a status cell to anything other than the completion sentinel
//! stamps the cell with the time of the edit; setting it back to the sentinel
//! removes the note. Each non-sentinel edit re-stamps with a fresh time.

use chrono::{DateTime, Local, TimeZone};
use tracing::debug;

use crate::roster::error::Result;
use crate::roster::io::NoteWriter;
use crate::roster::layout::StatusBand;
use crate::roster::model::CellRef;

const TIMESTAMP_FORMAT: &str = "%d.%m.%Y, %H:%M:%S";

/// A single-cell edit. The previous value is carried for the log line; the
/// rule itself only looks at the new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellEdit {
    pub cell: CellRef,
    pub old_value: Option<String>,
    pub new_value: String,
}

/// Change to apply to the edited cell's note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteUpdate {
    Set(String),
    Clear,
}

/// Decides how the note on the edited cell changes, if at all.
///
/// Returns `None` for edits outside the status band.
pub fn status_note_update<Tz>(
    edit: &CellEdit,
    band: &StatusBand,
    now: &DateTime<Tz>,
) -> Option<NoteUpdate>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    if !band.range.contains(&edit.cell) {
        return None;
    }

    if edit.new_value == band.sentinel {
        return Some(NoteUpdate::Clear);
    }

    Some(NoteUpdate::Set(format!(
        "{}{}",
        band.note_prefix,
        now.format(TIMESTAMP_FORMAT)
    )))
}

/// Applies the annotation rule to `edit` using the current local time.
/// Returns the update that was written, if any.
pub fn on_status_cell_changed<W: NoteWriter + ?Sized>(
    edit: &CellEdit,
    band: &StatusBand,
    writer: &mut W,
) -> Result<Option<NoteUpdate>> {
    let update = status_note_update(edit, band, &Local::now());
    match &update {
        Some(NoteUpdate::Set(text)) => writer.set_note(&edit.cell, Some(text.clone()))?,
        Some(NoteUpdate::Clear) => writer.set_note(&edit.cell, None)?,
        None => {}
    }
    debug!(cell = %edit.cell, old = ?edit.old_value, new = %edit.new_value, ?update, "status edit handled");
    Ok(update)
}
