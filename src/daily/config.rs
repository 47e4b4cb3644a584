use crate::error::DailyError;
use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

/// What to do when the persisted summary exists but cannot be read or parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorruptPolicy {
    /// Move the unreadable file aside, then rebuild from the scan.
    Backup,
    /// Rebuild from the scan and overwrite the unreadable file.
    Discard,
    /// Abort the run and leave the file untouched.
    Fail,
}

impl CorruptPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Backup => "backup",
            Self::Discard => "discard",
            Self::Fail => "fail",
        }
    }
}

impl fmt::Display for CorruptPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CorruptPolicy {
    type Err = DailyError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "backup" => Ok(Self::Backup),
            "discard" => Ok(Self::Discard),
            "fail" => Ok(Self::Fail),
            other => Err(DailyError::InvalidConfig(format!(
                "invalid on_corrupt `{other}`: use `backup`, `discard` or `fail`"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    pub on_corrupt: CorruptPolicy,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            on_corrupt: CorruptPolicy::Backup,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AuditConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DailyConfig {
    pub summary: SummaryConfig,
    pub audit: AuditConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialDailyConfig {
    summary: Option<SummaryConfig>,
    audit: Option<AuditConfig>,
}

fn env_or_bool(var: &str, fallback: bool) -> bool {
    match env::var(var) {
        Ok(v) => match v.trim() {
            "1" | "true" | "TRUE" | "yes" | "on" => true,
            "0" | "false" | "FALSE" | "no" | "off" => false,
            _ => fallback,
        },
        Err(_) => fallback,
    }
}

fn env_or_policy(var: &str, fallback: CorruptPolicy) -> Result<CorruptPolicy> {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => Ok(v.parse::<CorruptPolicy>()?),
        _ => Ok(fallback),
    }
}

fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(custom) = env::var("DAILY_CONFIG_PATH") {
        let trimmed = custom.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    let base = dirs::config_dir()?;
    Some(base.join("daily-index").join("config.toml"))
}

fn parse_partial(raw: &str) -> Result<PartialDailyConfig> {
    toml::from_str(raw).map_err(|err| DailyError::InvalidConfig(err.to_string()).into())
}

fn merge_file_config(base: &mut DailyConfig) -> Result<()> {
    let Some(path) = resolve_config_path() else {
        return Ok(());
    };
    if !path.exists() {
        return Ok(());
    }

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read daily config {}", path.display()))?;
    let parsed = parse_partial(&raw)
        .map_err(|err| anyhow!("failed to parse daily config {}: {err}", path.display()))?;
    if let Some(summary) = parsed.summary {
        base.summary = summary;
    }
    if let Some(audit) = parsed.audit {
        base.audit = audit;
    }
    Ok(())
}

pub fn load_config() -> Result<DailyConfig> {
    let mut cfg = DailyConfig::default();
    merge_file_config(&mut cfg)?;

    cfg.summary.on_corrupt = env_or_policy("DAILY_ON_CORRUPT", cfg.summary.on_corrupt)?;
    cfg.audit.enabled = env_or_bool("DAILY_AUDIT_ENABLED", cfg.audit.enabled);

    Ok(cfg)
}
