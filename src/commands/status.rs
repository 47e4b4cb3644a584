use anyhow::Result;

use crate::commands::{CommandReport, PathOverrides};
use crate::daily::config::load_config;
use crate::daily::paths::resolve_paths_with_overrides;
use crate::daily::scan::scan;
use crate::daily::summary::{GroupKey, index_summary, read_summary};

pub fn run(overrides: &PathOverrides) -> Result<CommandReport> {
    let paths =
        resolve_paths_with_overrides(overrides.data_dir.clone(), overrides.output_file.clone())?;
    let cfg = load_config()?;
    let mut report = CommandReport::new("status");

    report.detail(format!("daily_home={}", paths.daily_home.display()));
    report.detail(format!("data_dir={}", paths.data_dir.display()));
    report.detail(format!("output_file={}", paths.output_file.display()));
    report.detail(format!("logs_dir={}", paths.logs_dir.display()));
    report.detail(format!("config.on_corrupt={}", cfg.summary.on_corrupt));
    report.detail(format!("config.audit_enabled={}", cfg.audit.enabled));

    let index = match read_summary(&paths.output_file) {
        Ok(None) => {
            report.detail("summary.days=0");
            report.detail("summary.written=false");
            Default::default()
        }
        Ok(Some(summary)) => {
            let images: usize = summary.days.iter().map(|d| d.files.len()).sum();
            let uncaptioned = summary
                .days
                .iter()
                .filter(|d| d.description.is_empty())
                .count();
            report.detail(format!("summary.days={}", summary.days.len()));
            report.detail(format!("summary.images={images}"));
            report.detail(format!("summary.days_without_description={uncaptioned}"));
            index_summary(summary)
        }
        Err(err) => {
            report.issue(format!("summary unreadable: {err:#}"));
            Default::default()
        }
    };

    if !paths.data_dir.is_dir() {
        report.issue(format!("missing data dir ({})", paths.data_dir.display()));
        return Ok(report);
    }

    let scanned = scan(&paths.data_dir)?;
    let pending = scanned
        .keys()
        .filter(|key| !index.contains_key(&GroupKey::Stamp((*key).clone())))
        .count();
    report.detail(format!("data_dir.keys={}", scanned.len()));
    report.detail(format!("data_dir.pending_days={pending}"));

    Ok(report)
}
