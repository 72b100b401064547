use roster_tools::blacklist::{check_blacklists, find_in_blacklists};
use roster_tools::io::{TableStore, Workbook};
use roster_tools::layout::RosterLayout;
use roster_tools::model::{Blacklist, BlacklistHit, RecordId, TableRange};

const SUSPECT: &str = "284756019283746501";

fn entries(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn first_containing_entry_is_reported_per_list() {
    let id = RecordId::parse(SUSPECT).unwrap();
    let blacklists = vec![
        Blacklist::new(
            "agents",
            entries(&[
                "nobody",
                format!("banned <@{SUSPECT}> for spam").as_str(),
                format!("{SUSPECT} again").as_str(),
            ]),
        ),
        Blacklist::new("keys", entries(&["key-1", "key-2"])),
    ];

    let hits = find_in_blacklists(&id, &blacklists);

    assert_eq!(
        hits,
        vec![
            BlacklistHit {
                name: "agents".into(),
                found: true,
                position: Some(2),
            },
            BlacklistHit {
                name: "keys".into(),
                found: false,
                position: None,
            },
        ]
    );
}

#[test]
fn empty_lists_never_match() {
    let id = RecordId::parse(SUSPECT).unwrap();
    let hits = find_in_blacklists(&id, &[Blacklist::new("empty", Vec::new())]);

    assert_eq!(hits.len(), 1);
    assert!(!hits[0].found);
    assert_eq!(hits[0].position, None);
}

#[test]
fn partial_identifier_does_not_match() {
    let id = RecordId::parse(SUSPECT).unwrap();
    let truncated = &SUSPECT[..SUSPECT.len() - 1];
    let hits = find_in_blacklists(&id, &[Blacklist::new("agents", entries(&[truncated]))]);

    assert!(!hits[0].found);
}

#[test]
fn store_lookup_reads_configured_columns() {
    let layout = RosterLayout::default();
    let mut workbook = Workbook::new();
    workbook.add_sheet("ЧС");

    let keys = TableRange::parse("ЧС!J5:J64").unwrap();
    let mut key_rows = vec![vec![String::new()]; keys.height()];
    key_rows[9] = vec![format!("key for {SUSPECT}")];
    workbook.write_rows(&keys, &key_rows).unwrap();

    let id = RecordId::parse(SUSPECT).unwrap();
    let hits = check_blacklists(&workbook, &layout, &id).expect("lookup succeeds");

    assert_eq!(hits[0].name, "Саппорты");
    assert!(!hits[0].found);
    assert_eq!(hits[1].name, "Ключи");
    assert_eq!(hits[1].position, Some(10));
}

#[test]
fn store_lookup_requires_the_blacklist_sheet() {
    let layout = RosterLayout::default();
    let workbook = Workbook::new();
    let id = RecordId::parse(SUSPECT).unwrap();

    let result = check_blacklists(&workbook, &layout, &id);

    assert!(matches!(
        result,
        Err(roster_tools::RosterError::MissingSheet(name)) if name == "ЧС"
    ));
}

#[test]
fn hits_serialise_with_null_positions() {
    let hit = BlacklistHit {
        name: "keys".into(),
        found: false,
        position: None,
    };

    let json = serde_json::to_value(&hit).unwrap();

    assert_eq!(
        json,
        serde_json::json!({"name": "keys", "found": false, "position": null})
    );
}
