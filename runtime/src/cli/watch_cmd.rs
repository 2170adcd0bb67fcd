// Copyright 2026 ly-exam Contributors
// SPDX-License-Identifier: Apache-2.0

//! `ly-exam watch`: keep a floating export button on the review page and run
//! an export each time it is clicked.

use super::export_cmd;
use super::output::{self, Styled};
use super::session::ExamSession;
use super::BrowserArgs;
use crate::config;
use crate::renderer::RenderContext;
use crate::trigger::button;
use crate::trigger::{ExportState, Trigger};
use crate::walker::ScriptedPage;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(300);

/// Consecutive failed polls after which the page is considered gone.
const MAX_POLL_FAILURES: u32 = 10;

/// Push the trigger state onto the button. Errors mean the page is between
/// loads; the next poll reinstalls the button.
async fn render(context: &dyn RenderContext, trigger: &Mutex<Trigger>) {
    let script = {
        let trigger = trigger.lock().await;
        button::render_script(trigger.state(), trigger.is_enabled())
    };
    if let Err(e) = context.execute_js(&script).await {
        debug!("failed to render export button: {e:#}");
    }
}

/// One poll: reinstall the button, advance timed transitions, render, and
/// report whether the user asked for an export.
async fn poll(context: &dyn RenderContext, trigger: &Mutex<Trigger>) -> Result<bool> {
    let state = trigger.lock().await.state().clone();
    context.execute_js(&button::install_script(&state)).await?;
    let requested = context
        .execute_js(&button::take_request_script())
        .await?
        .as_bool()
        .unwrap_or(false);

    trigger.lock().await.tick(Instant::now());
    render(context, trigger).await;
    Ok(requested)
}

pub async fn run(browser: &BrowserArgs, out_dir: Option<PathBuf>) -> Result<()> {
    let profile = browser.selector_profile()?;
    let compiled = profile.compile()?;
    let out_dir = config::resolve_out_dir(out_dir);
    let wait = browser.wait_strategy();

    let session = ExamSession::open(browser).await?;
    let context = Arc::clone(&session.context);
    let driver = ScriptedPage::new(Arc::clone(&context), profile);
    let trigger = Arc::new(Mutex::new(Trigger::default()));

    if !output::is_quiet() && !output::is_json() {
        let s = Styled::new();
        eprintln!(
            "  {} Watching the exam page; click {} to export. Ctrl-C to stop.",
            s.ok_sym(),
            s.bold(&ExportState::Idle.label())
        );
    }

    let mut failures = 0u32;
    let mut exports = 0usize;
    let mut ticker = tokio::time::interval(POLL_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let outcome: Result<()> = 'watch: loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, stopping watch");
                break Ok(());
            }
            _ = ticker.tick() => {}
        }

        let requested = match poll(context.as_ref(), &trigger).await {
            Ok(requested) => {
                failures = 0;
                requested
            }
            Err(e) => {
                failures += 1;
                debug!(failures, "poll failed: {e:#}");
                if failures >= MAX_POLL_FAILURES {
                    break Err(e.context("lost the exam page"));
                }
                continue;
            }
        };
        if !requested {
            continue;
        }

        if let Err(e) = trigger.lock().await.start() {
            debug!("ignoring export request: {e}");
            continue;
        }
        info!("export requested from the page");
        render(context.as_ref(), &trigger).await;

        let run = export_cmd::run_tracked(&driver, &compiled, wait, &out_dir, Arc::clone(&trigger));
        tokio::pin!(run);
        let result = loop {
            tokio::select! {
                result = &mut run => break result,
                _ = ticker.tick() => render(context.as_ref(), &trigger).await,
                _ = tokio::signal::ctrl_c() => {
                    warn!("interrupted during an export, nothing written");
                    break 'watch Ok(());
                }
            }
        };
        render(context.as_ref(), &trigger).await;

        match result {
            Ok(summary) => {
                exports += 1;
                export_cmd::report(&summary);
            }
            Err(e) => {
                warn!("export failed: {e}");
                let label = ExportState::Failed {
                    message: e.to_string(),
                }
                .label();
                if let Err(e) = context.execute_js(&button::alert_script(&label)).await {
                    debug!("failed to show alert: {e:#}");
                }
            }
        }
    };

    info!(exports, "watch finished");
    if let Err(e) = session.close().await {
        debug!("failed to close session: {e:#}");
    }
    outcome
}
