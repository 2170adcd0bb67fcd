// Copyright 2026 ly-exam Contributors
// SPDX-License-Identifier: Apache-2.0

//! `ly-exam export`: walk the review page once and write the CSV.

use super::output::{self, Styled};
use super::session::{self, ExamSession};
use super::BrowserArgs;
use crate::config;
use crate::extraction::CompiledProfile;
use crate::progress;
use crate::trigger::Trigger;
use crate::walker::readiness::WaitStrategy;
use crate::walker::{PageDriver, ScriptedPage, Walker};
use crate::workflow::{self, ExportSummary, WorkflowError};
use anyhow::Result;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::warn;

/// Run one export against the open page, mirroring its progress into
/// `trigger` and a terminal progress bar.
///
/// The trigger must already be started; it ends up `Done` or `Failed`.
pub async fn run_tracked(
    driver: &dyn PageDriver,
    profile: &CompiledProfile,
    wait: WaitStrategy,
    out_dir: &Path,
    trigger: Arc<Mutex<Trigger>>,
) -> Result<ExportSummary, WorkflowError> {
    let run_id = format!("export-{}", Utc::now().format("%Y%m%d%H%M%S"));
    let (tx, rx) = progress::channel();
    let follower = tokio::spawn(output::follow_progress(
        rx,
        Arc::clone(&trigger),
        output::walk_progress_bar(),
    ));

    let result = {
        let walker = Walker::new(driver, profile, wait).with_progress(tx, run_id);
        workflow::run_export(&walker, out_dir).await
    };
    // The walker owned the only sender, so the follower drains and exits.
    if let Err(e) = follower.await {
        warn!("progress display task failed: {e}");
    }

    let mut trigger = trigger.lock().await;
    match &result {
        Ok(summary) => trigger.finish(summary.path.clone(), Instant::now()),
        Err(e) => trigger.fail(e.to_string()),
    }
    result
}

/// Print what a run wrote, honoring `--json` and `--quiet`.
pub fn report(summary: &ExportSummary) {
    if output::is_json() {
        output::print_json(&serde_json::json!({
            "path": summary.path,
            "total": summary.total,
            "records": summary.records,
            "skipped": summary.skipped,
            "elapsed_ms": summary.elapsed_ms,
        }));
        return;
    }
    if output::is_quiet() {
        println!("{}", summary.path.display());
        return;
    }

    let s = Styled::new();
    eprintln!(
        "  {} Exported {} of {} questions in {:.1}s",
        s.ok_sym(),
        summary.records,
        summary.total,
        summary.elapsed_ms as f64 / 1000.0
    );
    if summary.skipped > 0 {
        eprintln!(
            "  {} {} questions had no detail panel and were skipped",
            s.warn_sym(),
            summary.skipped
        );
    }
    println!("  {}", s.bold(&summary.path.display().to_string()));
}

pub async fn run(browser: &BrowserArgs, out_dir: Option<PathBuf>) -> Result<()> {
    let profile = browser.selector_profile()?;
    let compiled = profile.compile()?;
    let out_dir = config::resolve_out_dir(out_dir);

    let session = ExamSession::open(browser).await?;
    let driver = ScriptedPage::new(Arc::clone(&session.context), profile);

    if !session::wait_for_question_list(&driver, &compiled, browser.ready_timeout()).await {
        warn!("question list did not appear; trying anyway");
    }

    let trigger = Arc::new(Mutex::new(Trigger::default()));
    trigger.lock().await.start()?;
    let result = run_tracked(
        &driver,
        &compiled,
        browser.wait_strategy(),
        &out_dir,
        trigger,
    )
    .await;

    session.close().await?;

    let summary = result?;
    report(&summary);
    Ok(())
}
