// Copyright 2026 ly-exam Contributors
// SPDX-License-Identifier: Apache-2.0

//! Analysis over a directory of collected exports: gathering them from the
//! downloads folder, reading them back, and building the incorrect-question
//! book.

pub mod estimate;
pub mod markdown;

use crate::export::{BOM, FILE_PREFIX};
use crate::extraction::{AnswerResult, Record};
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::SystemTime;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read export {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ReviewError {
    let path = path.display().to_string();
    move |source| ReviewError::Io { path, source }
}

/// Whether `name` looks like a file written by the exporter.
pub fn is_export_name(name: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(&format!(r"^{FILE_PREFIX}_\d{{8}}_\d{{6}}\.csv$")).expect("valid regex")
        })
        .is_match(name)
}

/// Move exports from `downloads` into `records_dir`. Returns the new paths.
pub fn collect_downloads(downloads: &Path, records_dir: &Path) -> Result<Vec<PathBuf>, ReviewError> {
    std::fs::create_dir_all(records_dir).map_err(io_error(records_dir))?;
    if !downloads.is_dir() {
        debug!(path = %downloads.display(), "downloads directory missing, nothing to collect");
        return Ok(Vec::new());
    }

    let mut moved = Vec::new();
    for entry in std::fs::read_dir(downloads).map_err(io_error(downloads))? {
        let entry = entry.map_err(io_error(downloads))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !is_export_name(&name) {
            continue;
        }
        let src = entry.path();
        let dst = records_dir.join(&name);
        move_file(&src, &dst)?;
        info!(from = %src.display(), to = %dst.display(), "collected export");
        moved.push(dst);
    }
    Ok(moved)
}

/// `rename`, falling back to copy + remove across filesystems.
fn move_file(src: &Path, dst: &Path) -> Result<(), ReviewError> {
    if std::fs::rename(src, dst).is_ok() {
        return Ok(());
    }
    std::fs::copy(src, dst).map_err(io_error(dst))?;
    std::fs::remove_file(src).map_err(io_error(src))
}

/// Export files in `records_dir`, oldest first by modification time.
pub fn list_exports(records_dir: &Path) -> Result<Vec<PathBuf>, ReviewError> {
    if !records_dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files: Vec<(SystemTime, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(records_dir).map_err(io_error(records_dir))? {
        let entry = entry.map_err(io_error(records_dir))?;
        if !is_export_name(&entry.file_name().to_string_lossy()) {
            continue;
        }
        let path = entry.path();
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .map_err(io_error(&path))?;
        files.push((modified, path));
    }
    files.sort();
    Ok(files.into_iter().map(|(_, path)| path).collect())
}

/// Read every record of one export, tolerating the leading byte-order mark.
pub fn read_export(path: &Path) -> Result<Vec<Record>, ReviewError> {
    let bytes = std::fs::read(path).map_err(io_error(path))?;
    let data = bytes.strip_prefix(BOM).unwrap_or(&bytes);
    csv::ReaderBuilder::new()
        .from_reader(data)
        .deserialize()
        .collect::<Result<Vec<Record>, _>>()
        .map_err(|source| ReviewError::Csv {
            path: path.display().to_string(),
            source,
        })
}

/// One export, deduplicated by question content.
#[derive(Debug, Clone)]
pub struct ExamFile {
    pub path: PathBuf,
    pub records: Vec<Record>,
}

impl ExamFile {
    pub fn load(path: &Path) -> Result<Self, ReviewError> {
        let records = dedupe_by_content(read_export(path)?);
        Ok(Self {
            path: path.to_path_buf(),
            records,
        })
    }

    /// Distinct question contents in this export.
    pub fn contents(&self) -> HashSet<&str> {
        self.records
            .iter()
            .map(|r| r.question_content.as_str())
            .collect()
    }
}

/// Keep the first record for each question content, preserving order.
pub fn dedupe_by_content(records: impl IntoIterator<Item = Record>) -> Vec<Record> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert(r.question_content.clone()))
        .collect()
}

/// Every distinct question across exports, first occurrence wins.
pub fn distinct_questions(files: &[ExamFile]) -> Vec<Record> {
    dedupe_by_content(files.iter().flat_map(|f| f.records.iter().cloned()))
}

/// Distinct questions whose first occurrence was answered incorrectly.
pub fn incorrect_questions(files: &[ExamFile]) -> Vec<Record> {
    distinct_questions(files)
        .into_iter()
        .filter(|r| r.result == AnswerResult::Incorrect)
        .collect()
}


#[cfg(test)]
mod tests {
    use super::test_support::record;
    use super::*;
    use crate::export;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_is_export_name() {
        assert!(is_export_name("ly_exam_20250103_120000.csv"));
        assert!(!is_export_name("ly_exam_20250103.csv"));
        assert!(!is_export_name("incorrect.csv"));
        assert!(!is_export_name("ly_exam_20250103_120000.csv.part"));
    }

    #[test]
    fn test_exports_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![
            record("comma, inside", "正确"),
            record("multi\nline \"quoted\"", "错误"),
        ];
        let at = Utc.with_ymd_and_hms(2025, 1, 3, 12, 0, 0).unwrap();
        let path = export::save(&records, dir.path(), at).unwrap();

        assert_eq!(read_export(&path).unwrap(), records);
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let deduped = dedupe_by_content(vec![
            record("q1", "错误"),
            record("q2", "正确"),
            record("q1", "正确"),
        ]);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].result, AnswerResult::Incorrect);
    }

    #[test]
    fn test_incorrect_questions_use_first_occurrence() {
        let files = vec![
            ExamFile {
                path: "a".into(),
                records: vec![record("q1", "正确"), record("q2", "错误")],
            },
            ExamFile {
                path: "b".into(),
                records: vec![record("q1", "错误"), record("q3", "错误")],
            },
        ];
        let contents: Vec<String> = incorrect_questions(&files)
            .into_iter()
            .map(|r| r.question_content)
            .collect();
        assert_eq!(contents, ["q2", "q3"]);
    }

    #[test]
    fn test_collect_moves_only_exports() {
        let downloads = tempfile::tempdir().unwrap();
        let records = tempfile::tempdir().unwrap();
        std::fs::write(downloads.path().join("ly_exam_20250101_000000.csv"), "x").unwrap();
        std::fs::write(downloads.path().join("notes.csv"), "y").unwrap();

        let moved = collect_downloads(downloads.path(), records.path()).unwrap();
        assert_eq!(moved, vec![records.path().join("ly_exam_20250101_000000.csv")]);
        assert!(downloads.path().join("notes.csv").exists());
        assert!(!downloads.path().join("ly_exam_20250101_000000.csv").exists());
    }

    #[test]
    fn test_list_exports_skips_other_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ly_exam_20250101_000000.csv"), "x").unwrap();
        std::fs::write(dir.path().join("incorrect.csv"), "x").unwrap();
        let listed = list_exports(dir.path()).unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[test]
    fn test_missing_records_dir_is_empty() {
        let listed = list_exports(Path::new("/nonexistent/ly-exam/records")).unwrap();
        assert!(listed.is_empty());
    }
}
