use tracing::{info, instrument};

use crate::roster::error::Result;
use crate::roster::io::TableStore;
use crate::roster::layout::RosterLayout;
use crate::roster::model::{Blacklist, BlacklistHit, RecordId};

/// Checks `id` against every blacklist, in order.
///
/// An entry matches when its text contains the identifier anywhere; only the
/// first matching entry of each list is reported.
pub fn find_in_blacklists(id: &RecordId, blacklists: &[Blacklist]) -> Vec<BlacklistHit> {
    blacklists
        .iter()
        .map(|blacklist| {
            let position = blacklist
                .entries
                .iter()
                .position(|entry| entry.contains(id.as_str()))
                .map(|index| index + 1);
            BlacklistHit {
                name: blacklist.name.clone(),
                found: position.is_some(),
                position,
            }
        })
        .collect()
}

/// Reads the configured blacklist columns and checks `id` against them.
#[instrument(level = "info", skip_all, fields(id = %id))]
pub fn check_blacklists<S: TableStore>(
    store: &S,
    layout: &RosterLayout,
    id: &RecordId,
) -> Result<Vec<BlacklistHit>> {
    let blacklists = layout
        .blacklists
        .iter()
        .map(|blacklist| {
            let entries = store
                .read_rows(&blacklist.range)?
                .into_iter()
                .map(|row| row.into_iter().next().unwrap_or_default())
                .collect();
            Ok(Blacklist::new(blacklist.name.clone(), entries))
        })
        .collect::<Result<Vec<_>>>()?;

    let hits = find_in_blacklists(id, &blacklists);
    info!(
        lists = hits.len(),
        matches = hits.iter().filter(|hit| hit.found).count(),
        "blacklists checked"
    );
    Ok(hits)
}
