use anyhow::Result;

use crate::commands::{CommandReport, PathOverrides};
use crate::daily::audit::AuditLog;
use crate::daily::config::load_config;
use crate::daily::description::read_description;
use crate::daily::key::day_label;
use crate::daily::merge::merge;
use crate::daily::paths::resolve_paths_with_overrides;
use crate::daily::scan::scan;
use crate::daily::summary::{
    CorruptRecovery, LoadStatus, load_existing, ordered_summary, persist,
};

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub paths: PathOverrides,
    pub dry_run: bool,
}

fn describe_load(status: &LoadStatus) -> (&'static str, String) {
    match status {
        LoadStatus::Missing => ("missing", "no existing summary; starting fresh".to_string()),
        LoadStatus::Loaded { days } => ("ok", format!("loaded {days} existing days")),
        LoadStatus::Recovered(CorruptRecovery::BackedUp(backup)) => (
            "recovered",
            format!("corrupt summary moved to {}", backup.display()),
        ),
        LoadStatus::Recovered(CorruptRecovery::WouldBackUp(backup)) => (
            "recovered",
            format!("dry-run: corrupt summary would be moved to {}", backup.display()),
        ),
        LoadStatus::Recovered(CorruptRecovery::Discarded) => (
            "recovered",
            "corrupt summary discarded; rebuilding from scan".to_string(),
        ),
    }
}

pub fn run(opts: &BuildOptions) -> Result<CommandReport> {
    let paths = resolve_paths_with_overrides(
        opts.paths.data_dir.clone(),
        opts.paths.output_file.clone(),
    )?;
    let cfg = load_config()?;
    let audit = if opts.dry_run {
        AuditLog::disabled()
    } else {
        AuditLog::new(&paths, cfg.audit.enabled)
    };
    let mut report = CommandReport::new("build");

    let loaded = load_existing(&paths.output_file, cfg.summary.on_corrupt, opts.dry_run)?;
    let (load_status, load_message) = describe_load(&loaded.status);
    audit.record("load", load_status, &load_message)?;

    let scanned = scan(&paths.data_dir)?;
    let scanned_keys = scanned.len();
    audit.record("scan", "ok", &format!("keys={scanned_keys}"))?;

    let outcome = merge(loaded.index, scanned, |txt| {
        read_description(&paths.data_dir, txt)
    });
    audit.record(
        "merge",
        "ok",
        &format!(
            "added={} updated={} untouched={}",
            outcome.added.len(),
            outcome.updated,
            outcome.untouched
        ),
    )?;

    for key in &outcome.added {
        report.detail(format!("Added day: {}", day_label(key)));
    }
    report.detail(format!("data_dir={}", paths.data_dir.display()));
    report.detail(format!("output_file={}", paths.output_file.display()));
    report.detail(format!("load.status={load_status}"));
    report.detail(format!("load.message={load_message}"));
    report.detail(format!("scan.keys={scanned_keys}"));
    report.detail(format!("merge.added={}", outcome.added.len()));
    report.detail(format!("merge.updated={}", outcome.updated));
    report.detail(format!("merge.untouched={}", outcome.untouched));

    if opts.dry_run {
        let summary = ordered_summary(&outcome.merged);
        report.detail(format!(
            "dry-run: would write {} with {} days",
            paths.output_file.display(),
            summary.days.len()
        ));
        return Ok(report);
    }

    let written = persist(&outcome.merged, &paths.output_file)?;
    audit.record("write", "ok", &format!("days={written}"))?;
    report.detail(format!(
        "Created {} with {written} days",
        paths
            .output_file
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("summary")
    ));

    Ok(report)
}
