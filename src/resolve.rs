//! Recency resolution: pick the workbook whose filename carries the
//! latest calendar date.

use crate::error::ReportError;
use chrono::NaiveDate;
use globset::Glob;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

static FILENAME_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("filename date pattern"));

/// Extract the first `YYYY-MM-DD` substring of the filename (not the full
/// path). A substring that matches the digit shape but fails calendar
/// validation counts as "no date found".
pub fn filename_date(path: &Path) -> Option<NaiveDate> {
    let name = path.file_name()?.to_string_lossy();
    let matched = FILENAME_DATE.find(&name)?;
    NaiveDate::parse_from_str(matched.as_str(), "%Y-%m-%d").ok()
}

/// Resolve the most recently dated file in `directory` matching `pattern`.
///
/// Undated candidates sort with the minimum representable date, so any
/// dated file outranks every undated one. Ties on the date key (including
/// the all-undated case) fall back to the lexicographically larger path,
/// which keeps the result independent of directory enumeration order.
///
/// Returns `Ok(None)` when nothing matches; callers treat that as "no
/// report available", not as a fault.
pub fn resolve_latest(directory: &Path, pattern: &str) -> Result<Option<PathBuf>, ReportError> {
    if !directory.is_dir() {
        return Err(ReportError::NoMatchingFile {
            directory: directory.to_path_buf(),
            pattern: pattern.to_string(),
        });
    }

    let matcher = Glob::new(pattern)
        .map_err(|err| ReportError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: err.to_string(),
        })?
        .compile_matcher();

    let mut best: Option<(NaiveDate, PathBuf)> = None;
    for entry in WalkDir::new(directory).min_depth(1).max_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(?err, "skipping unreadable directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if !matcher.is_match(Path::new(entry.file_name())) {
            continue;
        }

        let path = entry.path().to_path_buf();
        let sort_key = filename_date(&path).unwrap_or(NaiveDate::MIN);
        let candidate = (sort_key, path);
        if best.as_ref().map(|current| candidate > *current).unwrap_or(true) {
            best = Some(candidate);
        }
    }

    Ok(best.map(|(_, path)| path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_date_substring() {
        let date = filename_date(Path::new("public_bids_received_2025-09-19.xlsx"));
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 9, 19));
    }

    #[test]
    fn invalid_calendar_date_is_no_date() {
        assert!(filename_date(Path::new("bids_2025-13-40.xlsx")).is_none());
    }

    #[test]
    fn date_must_come_from_filename_not_parent() {
        assert!(filename_date(Path::new("2025-01-01/bids.xlsx")).is_none());
    }
}
