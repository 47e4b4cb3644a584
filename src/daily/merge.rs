use crate::daily::scan::ScanResult;
use crate::daily::summary::{DayGroup, GroupKey, SummaryIndex};
use std::collections::BTreeSet;
use std::collections::btree_map::Entry;

#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    pub merged: SummaryIndex,
    /// Keys seen for the first time this run, ascending.
    pub added: Vec<String>,
    pub updated: usize,
    pub untouched: usize,
}

/// Fold a fresh scan into the previously persisted groups.
///
/// `describe` turns a scanned `.txt` name into caption text. A non-empty new
/// caption replaces the stored one; an empty one never does. File lists are
/// unioned. Stored groups that were not rescanned pass through as they are.
pub fn merge<F>(existing: SummaryIndex, scanned: ScanResult, mut describe: F) -> MergeOutcome
where
    F: FnMut(Option<&str>) -> String,
{
    let mut merged = existing;
    let mut added = Vec::new();
    let mut updated = 0usize;
    let scanned_len = scanned.len();

    for (key, group) in scanned {
        let new_files: Vec<String> = group.images.into_iter().collect();
        let new_description = describe(group.text_file.as_deref());

        match merged.entry(GroupKey::Stamp(key.clone())) {
            Entry::Occupied(mut slot) => {
                let day = slot.get_mut();
                let combined: BTreeSet<String> = day.files.drain(..).chain(new_files).collect();
                day.files = combined.into_iter().collect();
                if !new_description.is_empty() {
                    day.description = new_description;
                }
                updated += 1;
            }
            Entry::Vacant(slot) => {
                slot.insert(DayGroup {
                    files: new_files,
                    description: new_description,
                });
                added.push(key);
            }
        }
    }

    let untouched = merged.len() - scanned_len;
    MergeOutcome {
        merged,
        added,
        updated,
        untouched,
    }
}
