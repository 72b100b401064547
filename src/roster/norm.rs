use tracing::{info, instrument};

use crate::roster::confirm::Confirm;
use crate::roster::error::{Result, RosterError};
use crate::roster::io::TableStore;
use crate::roster::layout::RosterLayout;
use crate::roster::model::{Row, TableRange};

const CLEAR_PROMPT: &str = "Are you sure you want to clear the norm?";

/// Converts a `"H M"` hours/minutes string into decimal hours with a comma
/// separator, e.g. `"7 30"` becomes `"7,50"`. Returns `None` when the cell is
/// not in that shape.
pub fn time_to_decimal(value: &str) -> Option<String> {
    let mut parts = value.split(' ');
    let (hours, minutes) = match (parts.next(), parts.next(), parts.next()) {
        (Some(hours), Some(minutes), None) => (hours, minutes),
        _ => return None,
    };
    let hours: f64 = hours.parse().ok()?;
    let minutes: f64 = minutes.parse().ok()?;
    if !hours.is_finite() || !minutes.is_finite() {
        return None;
    }
    Some(to_fixed_2(hours + minutes / 60.0).replace('.', ","))
}

/// Two-decimal rendering that rounds exact halves away from zero, as
/// spreadsheet scripts do. `format!` alone rounds them to even.
fn to_fixed_2(value: f64) -> String {
    let scaled = value * 100.0;
    // Only multiples of 1/8 can carry an exact half at the third decimal.
    let exact_half = (value * 8.0).fract() == 0.0 && scaled.fract().abs() == 0.5;
    let value = if exact_half {
        scaled.round() / 100.0
    } else {
        value
    };
    format!("{value:.2}")
}

/// Rewrites every convertible cell in place and returns how many changed.
pub fn convert_time_cells(rows: &mut [Row]) -> usize {
    let mut converted = 0;
    for cell in rows.iter_mut().flatten() {
        if let Some(decimal) = time_to_decimal(cell) {
            *cell = decimal;
            converted += 1;
        }
    }
    converted
}

/// Converts the time strings inside `range`, which must lie on the norm sheet.
#[instrument(level = "info", skip_all, fields(range = %range))]
pub fn convert_time_range<S: TableStore>(
    store: &mut S,
    layout: &RosterLayout,
    range: &TableRange,
) -> Result<usize> {
    if range.sheet != layout.norm.sheet {
        return Err(RosterError::PreconditionViolation(format!(
            "time conversion only works on sheet '{}'",
            layout.norm.sheet
        )));
    }

    let mut rows = store.read_rows(range)?;
    let converted = convert_time_cells(&mut rows);
    store.write_rows(range, &rows)?;
    info!(converted, "time cells converted");
    Ok(converted)
}

/// Blanks the configured norm ranges after confirmation. Returns `false` when
/// the user declined.
#[instrument(level = "info", skip_all)]
pub fn clear_norm<S, C>(store: &mut S, layout: &RosterLayout, confirm: &mut C) -> Result<bool>
where
    S: TableStore,
    C: Confirm + ?Sized,
{
    if !confirm.confirm(CLEAR_PROMPT) {
        info!("norm clearing declined");
        return Ok(false);
    }

    for range in &layout.norm.clear_ranges {
        let blank = vec![vec![String::new(); range.width()]; range.height()];
        store.write_rows(range, &blank)?;
    }
    info!(ranges = layout.norm.clear_ranges.len(), "norm cleared");
    Ok(true)
}
