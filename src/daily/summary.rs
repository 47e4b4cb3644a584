use crate::daily::config::CorruptPolicy;
use crate::daily::key::extract_key;
use crate::daily::util::utc_file_stamp;
use crate::daily::warn::{self, WarnEvent};
use crate::error::{DailyError, DailyErrorCode};
use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// One post: its image files and caption.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayGroup {
    #[serde(default, deserialize_with = "list_or_null")]
    pub files: Vec<String>,
    #[serde(default, deserialize_with = "string_or_null")]
    pub description: String,
}

/// The persisted `daily.json` document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub days: Vec<DayGroup>,
}

fn string_or_null<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn list_or_null<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Index key for a group. Stamps come from filenames; orphans are loaded
/// groups that have a caption but no files, numbered in load order. The two
/// variants can never compare equal, and every stamp sorts before any orphan.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum GroupKey {
    Stamp(String),
    Orphan(usize),
}

pub type SummaryIndex = BTreeMap<GroupKey, DayGroup>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// No summary on disk yet.
    Missing,
    Loaded { days: usize },
    /// The summary was unreadable and the run continues from an empty index.
    Recovered(CorruptRecovery),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorruptRecovery {
    BackedUp(PathBuf),
    WouldBackUp(PathBuf),
    Discarded,
}

#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub index: SummaryIndex,
    pub status: LoadStatus,
}

pub fn read_summary(path: &Path) -> Result<Option<Summary>> {
    if !path.exists() {
        return Ok(None);
    }
    if !path.is_file() {
        return Err(DailyError::OutputNotFile(path.display().to_string()).into());
    }

    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let parsed: Summary = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(Some(parsed))
}

/// Re-key loaded groups by the stamp of their first file as stored.
/// Groups with neither files nor caption are dropped.
pub fn index_summary(summary: Summary) -> SummaryIndex {
    let mut index = SummaryIndex::new();
    let mut orphans = 0usize;
    for day in summary.days {
        let stamp = day.files.first().map(|first| extract_key(first));
        match stamp {
            Some(stamp) => {
                index.insert(GroupKey::Stamp(stamp), day);
            }
            None if !day.description.is_empty() => {
                index.insert(GroupKey::Orphan(orphans), day);
                orphans += 1;
            }
            None => {}
        }
    }
    index
}

pub fn corrupt_backup_path(path: &Path, stamp: &str) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("daily.json");
    path.with_file_name(format!("{name}.corrupt-{stamp}"))
}

pub fn load_existing(path: &Path, policy: CorruptPolicy, dry_run: bool) -> Result<LoadOutcome> {
    let err = match read_summary(path) {
        Ok(None) => {
            return Ok(LoadOutcome {
                index: SummaryIndex::new(),
                status: LoadStatus::Missing,
            });
        }
        Ok(Some(summary)) => {
            let days = summary.days.len();
            return Ok(LoadOutcome {
                index: index_summary(summary),
                status: LoadStatus::Loaded { days },
            });
        }
        Err(err) if err.downcast_ref::<DailyError>().is_some() => return Err(err),
        Err(err) => err,
    };

    let reason = format!("{err:#}");
    warn::emit(WarnEvent {
        code: DailyErrorCode::W002SummaryCorrupt,
        stage: "load",
        action: policy.as_str(),
        path: &path.display().to_string(),
        reason: "summary-unreadable",
        err: &reason,
    });

    let recovery = match policy {
        CorruptPolicy::Fail => {
            return Err(DailyError::CorruptSummary {
                path: path.display().to_string(),
                reason,
            }
            .into());
        }
        CorruptPolicy::Discard => CorruptRecovery::Discarded,
        CorruptPolicy::Backup => {
            let backup = corrupt_backup_path(path, &utc_file_stamp());
            if dry_run {
                CorruptRecovery::WouldBackUp(backup)
            } else {
                fs::rename(path, &backup).with_context(|| {
                    format!(
                        "failed to back up corrupt summary {} to {}",
                        path.display(),
                        backup.display()
                    )
                })?;
                CorruptRecovery::BackedUp(backup)
            }
        }
    };

    Ok(LoadOutcome {
        index: SummaryIndex::new(),
        status: LoadStatus::Recovered(recovery),
    })
}

/// Groups with files, ascending by key, each file list sorted and unique.
pub fn ordered_summary(merged: &SummaryIndex) -> Summary {
    let days = merged
        .values()
        .filter(|day| !day.files.is_empty())
        .map(|day| {
            let mut files = day.files.clone();
            files.sort();
            files.dedup();
            DayGroup {
                files,
                description: day.description.clone(),
            }
        })
        .collect();
    Summary { days }
}

pub fn render_summary(summary: &Summary) -> Result<String> {
    serde_json::to_string(summary).context("failed to serialize summary")
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .context("failed to create temp file for atomic write")?;
    tmp.write_all(contents.as_bytes())
        .with_context(|| format!("failed to write temp file for {}", path.display()))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("failed to sync {} for {}", tmp.path().display(), path.display()))?;

    if let Ok(meta) = fs::metadata(path) {
        fs::set_permissions(tmp.path(), meta.permissions()).with_context(|| {
            format!(
                "failed to copy permissions of {} to {}",
                path.display(),
                tmp.path().display()
            )
        })?;
    } else {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(tmp.path(), fs::Permissions::from_mode(0o644)).with_context(
                || {
                    format!(
                        "failed to set permissions on {} for {}",
                        tmp.path().display(),
                        path.display()
                    )
                },
            )?;
        }
    }

    tmp.persist(path)
        .with_context(|| format!("failed to persist {}", path.display()))?;
    Ok(())
}

/// Write the merged index as `{"days": [...]}`, replacing `path` in one
/// rename. Returns the number of days written.
pub fn persist(merged: &SummaryIndex, path: &Path) -> Result<usize> {
    let summary = ordered_summary(merged);
    write_atomic(path, &render_summary(&summary)?)?;
    Ok(summary.days.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn day(files: &[&str], description: &str) -> DayGroup {
        DayGroup {
            files: files.iter().map(|f| f.to_string()).collect(),
            description: description.to_string(),
        }
    }

    #[test]
    fn loaded_groups_are_keyed_by_first_file_as_stored() {
        let index = index_summary(Summary {
            days: vec![
                day(&["2022-12-25_05-00-26_UTC_2.jpg", "2022-12-25_05-00-26_UTC_1.jpg"], "x"),
                day(&["2022-10-25_05-06-01_UTC.jpg"], ""),
            ],
        });

        let keys: Vec<_> = index.keys().cloned().collect();
        assert_eq!(
            keys,
            vec![
                GroupKey::Stamp("2022-10-25_05-06-01_UTC".to_string()),
                GroupKey::Stamp("2022-12-25_05-00-26_UTC".to_string()),
            ]
        );
    }

    #[test]
    fn caption_only_groups_get_orphan_keys_and_empty_groups_vanish() {
        let index = index_summary(Summary {
            days: vec![day(&[], "lost caption"), day(&[], ""), day(&[], "another")],
        });

        assert_eq!(index.len(), 2);
        assert_eq!(index[&GroupKey::Orphan(0)].description, "lost caption");
        assert_eq!(index[&GroupKey::Orphan(1)].description, "another");
    }

    #[test]
    fn orphans_sort_after_every_stamp() {
        assert!(GroupKey::Stamp("~~~~".to_string()) < GroupKey::Orphan(0));
        assert!(GroupKey::Stamp("_no_files_0".to_string()) != GroupKey::Orphan(0));
    }

    #[test]
    fn missing_and_null_fields_default_to_empty() {
        let parsed: Summary =
            serde_json::from_str(r#"{"days":[{"files":["a.jpg"]},{"description":null}]}"#)
                .expect("parse");
        assert_eq!(parsed.days[0].description, "");
        assert!(parsed.days[1].files.is_empty());
        assert_eq!(parsed.days[1].description, "");

        let empty: Summary = serde_json::from_str("{}").expect("parse empty object");
        assert!(empty.days.is_empty());
    }

    #[test]
    fn null_file_list_keeps_the_rest_of_the_summary() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("daily.json");
        fs::write(
            &path,
            r#"{"days":[{"files":["a.jpg"],"description":"keep me"},{"files":null,"description":"x"}]}"#,
        )
        .expect("write summary");

        let outcome = load_existing(&path, CorruptPolicy::Discard, false).expect("load");
        assert_eq!(outcome.status, LoadStatus::Loaded { days: 2 });
        assert_eq!(outcome.index.len(), 2);
        assert_eq!(outcome.index[&GroupKey::Stamp("a".to_string())].description, "keep me");
        assert_eq!(outcome.index[&GroupKey::Orphan(0)].description, "x");
    }

    #[test]
    fn directory_at_output_path_is_fatal_and_left_alone() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("daily.json");
        fs::create_dir(&path).expect("mkdir");

        let err = load_existing(&path, CorruptPolicy::Backup, false).expect_err("should fail");
        assert!(matches!(
            err.downcast_ref::<DailyError>(),
            Some(DailyError::OutputNotFile(_))
        ));
        assert!(path.is_dir());
        assert_eq!(fs::read_dir(tmp.path()).expect("list").count(), 1);
    }

    #[test]
    fn ordered_summary_drops_empty_groups_and_normalizes_files() {
        let mut merged = SummaryIndex::new();
        merged.insert(GroupKey::Stamp("b".to_string()), day(&["b_1.jpg", "b.jpg", "b.jpg"], ""));
        merged.insert(GroupKey::Stamp("a".to_string()), day(&["a.jpg"], "first"));
        merged.insert(GroupKey::Stamp("c".to_string()), day(&[], "text only"));
        merged.insert(GroupKey::Orphan(0), day(&[], "orphan"));

        let summary = ordered_summary(&merged);
        assert_eq!(
            summary.days,
            vec![day(&["a.jpg"], "first"), day(&["b.jpg", "b_1.jpg"], "")]
        );
    }

    #[test]
    fn rendered_summary_is_compact_and_keeps_unicode() {
        let raw = render_summary(&Summary {
            days: vec![day(&["a.jpg"], "ಬೆಂಗಳೂರು")],
        })
        .expect("render");
        assert_eq!(raw, r#"{"days":[{"files":["a.jpg"],"description":"ಬೆಂಗಳೂರು"}]}"#);
    }

    #[test]
    fn persist_replaces_the_file_and_reports_written_days() {
        let tmp = tempdir().expect("tempdir");
        let out = tmp.path().join("nested").join("daily.json");

        let mut merged = SummaryIndex::new();
        merged.insert(GroupKey::Stamp("a".to_string()), day(&["a.jpg"], ""));
        merged.insert(GroupKey::Orphan(0), day(&[], "orphan"));
        assert_eq!(persist(&merged, &out).expect("persist"), 1);

        merged.insert(GroupKey::Stamp("b".to_string()), day(&["b.jpg"], ""));
        assert_eq!(persist(&merged, &out).expect("persist again"), 2);

        let reloaded = read_summary(&out).expect("read").expect("present");
        assert_eq!(reloaded.days.len(), 2);
        let leftovers = fs::read_dir(out.parent().unwrap()).expect("list").count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn missing_summary_loads_as_empty() {
        let tmp = tempdir().expect("tempdir");
        let outcome = load_existing(&tmp.path().join("daily.json"), CorruptPolicy::Fail, false)
            .expect("load");
        assert!(outcome.index.is_empty());
        assert_eq!(outcome.status, LoadStatus::Missing);
    }

    #[test]
    fn corrupt_summary_is_backed_up_before_continuing() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("daily.json");
        fs::write(&path, "{\"days\": [").expect("write corrupt");

        let outcome = load_existing(&path, CorruptPolicy::Backup, false).expect("load");
        assert!(outcome.index.is_empty());
        let LoadStatus::Recovered(CorruptRecovery::BackedUp(backup)) = &outcome.status else {
            panic!("expected a backup, got {:?}", outcome.status);
        };
        assert!(!path.exists());
        assert_eq!(fs::read_to_string(backup).expect("read backup"), "{\"days\": [");
    }

    #[test]
    fn corrupt_summary_dry_run_leaves_file_in_place() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("daily.json");
        fs::write(&path, "not json").expect("write corrupt");

        let outcome = load_existing(&path, CorruptPolicy::Backup, true).expect("load");
        assert!(matches!(
            outcome.status,
            LoadStatus::Recovered(CorruptRecovery::WouldBackUp(_))
        ));
        assert!(path.exists());
    }

    #[test]
    fn corrupt_summary_with_fail_policy_aborts() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("daily.json");
        fs::write(&path, "[1, 2, 3]").expect("write corrupt");

        let err = load_existing(&path, CorruptPolicy::Fail, false).expect_err("should fail");
        assert!(err.downcast_ref::<DailyError>().is_some());
        assert!(path.exists());
    }

    #[test]
    fn corrupt_summary_with_discard_policy_continues_empty() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("daily.json");
        fs::write(&path, "{\"days\": 7}").expect("write corrupt");

        let outcome = load_existing(&path, CorruptPolicy::Discard, false).expect("load");
        assert_eq!(
            outcome.status,
            LoadStatus::Recovered(CorruptRecovery::Discarded)
        );
        assert!(path.exists());
    }

    #[test]
    fn backup_path_sits_next_to_the_summary() {
        let backup = corrupt_backup_path(Path::new("/srv/site/daily.json"), "20261016T000000Z");
        assert_eq!(
            backup,
            PathBuf::from("/srv/site/daily.json.corrupt-20261016T000000Z")
        );
    }
}
