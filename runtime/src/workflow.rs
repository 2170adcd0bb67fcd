// Copyright 2026 ly-exam Contributors
// SPDX-License-Identifier: Apache-2.0

//! One export run: walk the page, then write the CSV.

use crate::export::{self, ExportError};
use crate::walker::{WalkError, Walker};
use chrono::Utc;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Walk(#[from] WalkError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// What a finished run wrote.
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub path: PathBuf,
    /// Entries listed on the page.
    pub total: usize,
    /// Rows written.
    pub records: usize,
    /// Entries that produced no row.
    pub skipped: usize,
    pub elapsed_ms: u64,
}

/// Walk every entry and save the records into `out_dir`.
///
/// Nothing is written when the walk aborts.
pub async fn run_export(walker: &Walker<'_>, out_dir: &Path) -> Result<ExportSummary, WorkflowError> {
    let outcome = walker.walk().await?;
    let path = export::save(&outcome.records, out_dir, Utc::now())?;
    Ok(ExportSummary {
        path,
        total: outcome.total,
        records: outcome.records.len(),
        skipped: outcome.skipped.len(),
        elapsed_ms: outcome.elapsed_ms,
    })
}
