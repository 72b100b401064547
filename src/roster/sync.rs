//! Aligned table synchronizer.
//!
//! The schedule, norm, and event tables describe the same agents at the same
//! row offsets. Removing an agent therefore means locating the offset once in
//! the schedule and then removing that row from every table, appending each
//! table's own default row so that row counts never change.

use tracing::{debug, info, instrument};

use crate::roster::confirm::Confirm;
use crate::roster::error::{Result, RosterError};
use crate::roster::io::TableStore;
use crate::roster::layout::RosterLayout;
use crate::roster::model::{AlignedTable, CellRef, RecordId, Row};

const DELETE_PROMPT: &str = "Are you sure you want to delete this support agent?";

/// Result of a store-level deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The record was removed at `offset` from every aligned table.
    Deleted { id: RecordId, offset: usize },
    /// The user declined the confirmation prompt; nothing was touched.
    Declined,
}

/// Returns the offset of the first row whose identifier column equals `id`.
pub fn find_row_offset(id: &RecordId, rows: &[Row], id_column: usize) -> Option<usize> {
    rows.iter()
        .position(|row| row.get(id_column).is_some_and(|cell| cell == id.as_str()))
}

/// Removes the record identified by `id` from `primary` and every dependent
/// table, appending each table's default row in its place.
///
/// Only the primary table is searched. Either every table is edited at the
/// same offset or, on error, none is. Returns the offset that was vacated.
pub fn delete_record(
    id: &RecordId,
    id_column: usize,
    primary: &mut AlignedTable,
    dependents: &mut [AlignedTable],
) -> Result<usize> {
    if let Some(table) = dependents.iter().find(|table| table.len() != primary.len()) {
        return Err(RosterError::PreconditionViolation(format!(
            "table '{}' has {} rows but '{}' has {}",
            table.name,
            table.len(),
            primary.name,
            primary.len()
        )));
    }

    let offset = find_row_offset(id, &primary.rows, id_column)
        .ok_or_else(|| RosterError::RecordNotFound(id.to_string()))?;

    primary.vacate(offset);
    for table in dependents.iter_mut() {
        table.vacate(offset);
    }

    debug!(offset, tables = dependents.len() + 1, "vacated aligned rows");
    Ok(offset)
}

/// Reads the identifier from the selected cell and deletes that agent.
///
/// The selection must sit on the schedule sheet in the identifier column;
/// those checks run before anything else is read.
#[instrument(level = "info", skip_all, fields(selection = %selection))]
pub fn delete_selected_record<S, C>(
    store: &mut S,
    layout: &RosterLayout,
    selection: &CellRef,
    confirm: &mut C,
) -> Result<DeleteOutcome>
where
    S: TableStore,
    C: Confirm + ?Sized,
{
    let id = selected_id(store, layout, selection)?;
    delete_record_by_id(store, layout, &id, confirm)
}

/// Deletes the agent with the given identifier from every aligned table in
/// the store after the user confirms.
#[instrument(level = "info", skip_all, fields(id = %id))]
pub fn delete_record_by_id<S, C>(
    store: &mut S,
    layout: &RosterLayout,
    id: &RecordId,
    confirm: &mut C,
) -> Result<DeleteOutcome>
where
    S: TableStore,
    C: Confirm + ?Sized,
{
    let id_column = layout.schedule.id_column.ok_or_else(|| {
        RosterError::InvalidLayout("schedule table needs an identifier column".into())
    })?;

    if !confirm.confirm(DELETE_PROMPT) {
        info!("deletion declined");
        return Ok(DeleteOutcome::Declined);
    }

    let mut primary = layout.schedule.snapshot(store.read_rows(&layout.schedule.range)?);
    let mut dependents = layout
        .dependents
        .iter()
        .map(|table| Ok(table.snapshot(store.read_rows(&table.range)?)))
        .collect::<Result<Vec<_>>>()?;

    let offset = delete_record(id, id_column, &mut primary, &mut dependents)?;

    store.write_rows(&layout.schedule.range, &primary.rows)?;
    for (table, snapshot) in layout.dependents.iter().zip(&dependents) {
        store.write_rows(&table.range, &snapshot.rows)?;
    }

    info!(offset, tables = dependents.len() + 1, "record deleted");
    Ok(DeleteOutcome::Deleted {
        id: id.clone(),
        offset,
    })
}

fn selected_id<S: TableStore>(
    store: &S,
    layout: &RosterLayout,
    selection: &CellRef,
) -> Result<RecordId> {
    let schedule_sheet = &layout.schedule.range.sheet;
    if &selection.sheet != schedule_sheet {
        return Err(RosterError::PreconditionViolation(format!(
            "select an identifier on sheet '{schedule_sheet}', not '{}'",
            selection.sheet
        )));
    }
    if selection.col != layout.id_selection_col()? {
        return Err(RosterError::PreconditionViolation(format!(
            "select a cell in the identifier column {}, not {}",
            layout.id_selection_column,
            selection.a1()
        )));
    }

    let value = store.read_cell(selection)?;
    RecordId::parse(value)
}
