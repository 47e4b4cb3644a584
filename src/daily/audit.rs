use crate::daily::paths::DailyPaths;
use crate::daily::util::now_epoch_secs;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub at_epoch_secs: u64,
    pub phase: String,
    pub status: String,
    pub message: String,
}

/// Append-only JSONL run log, written only when `[audit] enabled = true`.
#[derive(Debug, Clone)]
pub struct AuditLog {
    paths: Option<DailyPaths>,
}

impl AuditLog {
    pub fn new(paths: &DailyPaths, enabled: bool) -> Self {
        Self {
            paths: enabled.then(|| paths.clone()),
        }
    }

    pub fn disabled() -> Self {
        Self { paths: None }
    }

    pub fn record(&self, phase: &str, status: &str, message: &str) -> Result<()> {
        match &self.paths {
            Some(paths) => append_event(paths, phase, status, message),
            None => Ok(()),
        }
    }
}

pub fn append_event(paths: &DailyPaths, phase: &str, status: &str, message: &str) -> Result<()> {
    fs::create_dir_all(&paths.logs_dir)
        .with_context(|| format!("failed to create {}", paths.logs_dir.display()))?;
    let event = AuditEvent {
        at_epoch_secs: now_epoch_secs()?,
        phase: phase.to_string(),
        status: status.to_string(),
        message: message.to_string(),
    };

    let line = format!("{}\n", serde_json::to_string(&event)?);
    let path = paths.audit_log();
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    file.write_all(line.as_bytes())?;
    Ok(())
}
