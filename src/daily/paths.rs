use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct DailyPaths {
    pub daily_home: PathBuf,
    pub data_dir: PathBuf,
    pub output_file: PathBuf,
    pub logs_dir: PathBuf,
}

impl DailyPaths {
    pub fn audit_log(&self) -> PathBuf {
        self.logs_dir.join("audit.log")
    }
}

fn env_or_default_path(var: &str, fallback: PathBuf) -> PathBuf {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => fallback,
    }
}

pub fn resolve_paths() -> Result<DailyPaths> {
    let cwd = env::current_dir().context("current directory could not be resolved")?;
    let daily_home = env_or_default_path("DAILY_HOME", cwd);

    let data_dir = env_or_default_path("DAILY_DATA_DIR", daily_home.join("daily"));
    let output_file = env_or_default_path("DAILY_OUTPUT_FILE", daily_home.join("daily.json"));
    let logs_dir = env_or_default_path("DAILY_LOGS_DIR", daily_home.join("logs"));

    Ok(DailyPaths {
        daily_home,
        data_dir,
        output_file,
        logs_dir,
    })
}

/// Resolve paths, then let explicit command-line values win over env/defaults.
pub fn resolve_paths_with_overrides(
    data_dir: Option<PathBuf>,
    output_file: Option<PathBuf>,
) -> Result<DailyPaths> {
    let mut paths = resolve_paths()?;
    if let Some(dir) = data_dir {
        paths.data_dir = dir;
    }
    if let Some(file) = output_file {
        paths.output_file = file;
    }
    Ok(paths)
}
