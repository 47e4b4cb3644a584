use crate::daily::warn::{self, WarnEvent};
use crate::error::DailyErrorCode;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

fn load_description(path: &Path) -> Result<String> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(raw.trim().to_string())
}

/// Trimmed caption text for a post, or `""` when there is none.
///
/// A caption that cannot be read or is not valid UTF-8 is reported and treated
/// as empty; it never aborts the run.
pub fn read_description(data_dir: &Path, txt_file: Option<&str>) -> String {
    let Some(txt_file) = txt_file else {
        return String::new();
    };

    let path = data_dir.join(txt_file);
    match load_description(&path) {
        Ok(text) => text,
        Err(err) => {
            warn::emit(WarnEvent {
                code: DailyErrorCode::W001DescriptionUnreadable,
                stage: "merge",
                action: "read-description",
                path: &path.display().to_string(),
                reason: "description-unreadable",
                err: &format!("{err:#}"),
            });
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::read_description;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn absent_text_file_yields_empty_description() {
        let tmp = tempdir().expect("tempdir");
        assert_eq!(read_description(tmp.path(), None), "");
    }

    #[test]
    fn description_is_trimmed() {
        let tmp = tempdir().expect("tempdir");
        fs::write(tmp.path().join("a.txt"), "\n  Cubbon Park, 1962 \n\n").expect("write");
        assert_eq!(
            read_description(tmp.path(), Some("a.txt")),
            "Cubbon Park, 1962"
        );
    }

    #[test]
    fn unreadable_or_undecodable_files_fall_back_to_empty() {
        let tmp = tempdir().expect("tempdir");
        fs::write(tmp.path().join("bad.txt"), [0xff, 0xfe, 0x00, 0x41]).expect("write");

        assert_eq!(read_description(tmp.path(), Some("missing.txt")), "");
        assert_eq!(read_description(tmp.path(), Some("bad.txt")), "");
    }
}
