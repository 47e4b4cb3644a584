use crate::daily::key::extract_key;
use crate::daily::warn::{self, WarnEvent};
use crate::error::{DailyError, DailyErrorCode};
use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

pub const IMAGE_EXTENSION: &str = ".jpg";
pub const TEXT_EXTENSION: &str = ".txt";
/// Profile pictures live next to the posts but belong to no day.
pub const EXCLUDE_MARKER: &str = "profile_pic";

/// Files found on disk for one key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannedGroup {
    pub images: BTreeSet<String>,
    pub text_file: Option<String>,
}

pub type ScanResult = BTreeMap<String, ScannedGroup>;

/// Names of the regular files directly inside `dir`.
fn list_file_names(dir: &Path) -> Result<Vec<String>> {
    let read_dir = fs::read_dir(dir)
        .map_err(|err| DailyError::MissingDataDir(format!("{}: {err}", dir.display())))?;

    let mut names = Vec::new();
    for entry in read_dir {
        let entry = entry.with_context(|| format!("failed to list {}", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(ToOwned::to_owned) else {
            warn::emit(WarnEvent {
                code: DailyErrorCode::W003NonUtf8Name,
                stage: "scan",
                action: "skip-entry",
                path: &path.display().to_string(),
                reason: "file-name-not-utf8",
                err: "",
            });
            continue;
        };
        names.push(name);
    }
    Ok(names)
}

/// Group file names by key. Names are visited in lexicographic order, so when
/// several `.txt` files share a key the lexicographically last one wins.
pub fn group_file_names<I, S>(names: I) -> ScanResult
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut names: Vec<S> = names.into_iter().collect();
    names.sort_by(|a, b| a.as_ref().cmp(b.as_ref()));

    let mut grouped = ScanResult::new();
    for name in &names {
        let name = name.as_ref();
        if name.contains(EXCLUDE_MARKER) {
            continue;
        }

        if name.ends_with(IMAGE_EXTENSION) {
            grouped
                .entry(extract_key(name))
                .or_default()
                .images
                .insert(name.to_string());
        } else if name.ends_with(TEXT_EXTENSION) {
            grouped.entry(extract_key(name)).or_default().text_file = Some(name.to_string());
        }
    }
    grouped
}

pub fn scan(dir: &Path) -> Result<ScanResult> {
    let names = list_file_names(dir)?;
    Ok(group_file_names(names))
}
