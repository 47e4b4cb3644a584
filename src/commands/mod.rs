pub mod build;
pub mod status;

use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize)]
pub struct CommandReport {
    pub command: String,
    pub ok: bool,
    pub details: Vec<String>,
    pub issues: Vec<String>,
}

impl CommandReport {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ok: true,
            details: Vec::new(),
            issues: Vec::new(),
        }
    }

    pub fn detail(&mut self, text: impl Into<String>) {
        self.details.push(text.into());
    }

    pub fn issue(&mut self, text: impl Into<String>) {
        self.ok = false;
        self.issues.push(text.into());
    }

    /// Plain-text rendering: details first, then issues.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for line in &self.details {
            out.push_str(line);
            out.push('\n');
        }
        for line in &self.issues {
            out.push_str("issue: ");
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// Path overrides shared by every command.
#[derive(Debug, Clone, Default)]
pub struct PathOverrides {
    pub data_dir: Option<PathBuf>,
    pub output_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::CommandReport;

    #[test]
    fn issues_flip_ok_and_render_after_details() {
        let mut report = CommandReport::new("status");
        report.detail("summary.days=3");
        assert!(report.ok);

        report.issue("missing data dir");
        assert!(!report.ok);
        assert_eq!(
            report.render_text(),
            "summary.days=3\nissue: missing data dir\n"
        );
    }
}
