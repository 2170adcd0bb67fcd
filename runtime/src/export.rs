// Copyright 2026 ly-exam Contributors
// SPDX-License-Identifier: Apache-2.0

//! CSV export of walked records.
//!
//! Layout: UTF-8 byte-order mark (spreadsheet tools need it to detect UTF-8),
//! a bare header row, then one row per record with every field quoted. Rows
//! are separated by `\n`; the last one has no terminator.

use crate::extraction::{Record, COLUMNS};
use chrono::{DateTime, Utc};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// UTF-8 byte-order mark.
pub const BOM: &[u8] = b"\xEF\xBB\xBF";

/// File name prefix of every export.
pub const FILE_PREFIX: &str = "ly_exam";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Serialize records into the export byte layout.
pub fn to_csv_bytes(records: &[Record]) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::with_capacity(256 + records.len() * 256);
    buf.extend_from_slice(BOM);
    buf.extend_from_slice(COLUMNS.join(",").as_bytes());
    buf.push(b'\n');

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(buf);
    for record in records {
        writer.write_record(record.fields())?;
    }
    let mut buf = writer
        .into_inner()
        .map_err(|e| ExportError::Csv(csv::Error::from(e.into_error())))?;
    buf.pop();
    Ok(buf)
}

/// `ly_exam_YYYYMMDD_HHMMSS.csv` for the given instant.
pub fn export_filename(at: DateTime<Utc>) -> String {
    format!("{FILE_PREFIX}_{}.csv", at.format("%Y%m%d_%H%M%S"))
}

/// Write records into `dir` under a name stamped with `at`.
///
/// The bytes go to a hidden temporary sibling first and are renamed into
/// place, so the final name never refers to a partial file. The sibling is
/// removed again if any step fails.
pub fn save(records: &[Record], dir: &Path, at: DateTime<Utc>) -> Result<PathBuf, ExportError> {
    let bytes = to_csv_bytes(records)?;
    let io_err = |path: &Path| {
        let path = path.display().to_string();
        move |source| ExportError::Io { path, source }
    };

    std::fs::create_dir_all(dir).map_err(io_err(dir))?;

    let filename = export_filename(at);
    let target = dir.join(&filename);
    let staging = dir.join(format!(".{filename}.part"));

    let written = std::fs::File::create(&staging)
        .and_then(|mut file| {
            file.write_all(&bytes)?;
            file.sync_all()
        })
        .map_err(io_err(&staging))
        .and_then(|()| std::fs::rename(&staging, &target).map_err(io_err(&target)));
    if let Err(e) = written {
        if !staging.exists() {
            return Err(e);
        }
        if let Err(cleanup) = std::fs::remove_file(&staging) {
            warn!(path = %staging.display(), error = %cleanup, "failed to remove staging file");
        }
        return Err(e);
    }

    info!(path = %target.display(), records = records.len(), "exported records");
    Ok(target)
}
