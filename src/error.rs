use thiserror::Error;

#[derive(Debug, Error)]
pub enum DailyError {
    #[error("config file invalid or unreadable: {0}")]
    InvalidConfig(String),
    #[error("input directory unavailable: {0}")]
    MissingDataDir(String),
    #[error("persisted summary {path} is corrupt: {reason}")]
    CorruptSummary { path: String, reason: String },
    #[error("summary path is not a regular file: {0}")]
    OutputNotFile(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailyErrorCode {
    W001DescriptionUnreadable,
    W002SummaryCorrupt,
    W003NonUtf8Name,
}

impl DailyErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::W001DescriptionUnreadable => "W001_DESCRIPTION_UNREADABLE",
            Self::W002SummaryCorrupt => "W002_SUMMARY_CORRUPT",
            Self::W003NonUtf8Name => "W003_NON_UTF8_NAME",
        }
    }
}
