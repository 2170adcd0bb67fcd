// Copyright 2026 ly-exam Contributors
// SPDX-License-Identifier: Apache-2.0

//! Getting hold of the review page: launch or attach, then find or open the
//! exam tab.

use super::BrowserArgs;
use crate::config;
use crate::extraction::{count_entries, CompiledProfile};
use crate::renderer::chromium::{ChromiumRenderer, LaunchOptions};
use crate::renderer::{RenderContext, Renderer};
use crate::walker::PageDriver;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

const NAVIGATION_TIMEOUT_MS: u64 = 30_000;
const READY_POLL: Duration = Duration::from_secs(1);

/// A browser plus the tab showing the review page.
pub struct ExamSession {
    renderer: ChromiumRenderer,
    pub context: Arc<dyn RenderContext>,
}

impl ExamSession {
    /// Attach or launch according to `args`, then locate the exam tab.
    pub async fn open(args: &BrowserArgs) -> Result<Self> {
        url::Url::parse(&args.url).with_context(|| format!("invalid exam URL: {}", args.url))?;

        let renderer = match config::resolve_attach(args.attach.clone()) {
            Some(endpoint) => {
                url::Url::parse(&endpoint)
                    .with_context(|| format!("invalid DevTools endpoint: {endpoint}"))?;
                ChromiumRenderer::connect(&endpoint).await?
            }
            None => {
                ChromiumRenderer::launch(&LaunchOptions {
                    chrome_path: args.chromium.clone(),
                    profile_dir: config::resolve_profile_dir(args.profile_dir.clone()),
                    headless: args.headless,
                })
                .await?
            }
        };

        if let Some(context) = renderer.find_context(&args.url).await? {
            info!(url = %context.get_url().await.unwrap_or_default(), "using open exam tab");
            return Ok(Self { renderer, context });
        }

        let context = renderer.new_context().await?;
        let nav = context
            .navigate(&args.url, NAVIGATION_TIMEOUT_MS)
            .await
            .with_context(|| format!("failed to open {}", args.url))?;
        info!(url = %nav.final_url, load_time_ms = nav.load_time_ms, "opened exam page");

        Ok(Self { renderer, context })
    }

    /// Close the tab we opened and stop driving the browser.
    pub async fn close(self) -> Result<()> {
        self.context.close().await?;
        self.renderer.shutdown().await
    }
}

/// Poll until the question list is on the page or `timeout` passes.
///
/// Gives the user time to log in and open the review page in a freshly
/// launched window. Returns whether the list appeared; the walk itself
/// reports the missing anchor.
pub async fn wait_for_question_list(
    driver: &dyn PageDriver,
    profile: &CompiledProfile,
    timeout: Duration,
) -> bool {
    let start = Instant::now();
    let mut announced = false;
    loop {
        match driver.page_html().await {
            Ok(html) if count_entries(&html, profile).is_ok() => return true,
            Ok(_) => {}
            Err(e) => warn!("failed to read page: {e:#}"),
        }
        if start.elapsed() >= timeout {
            return false;
        }
        if !announced {
            info!(
                timeout_secs = timeout.as_secs(),
                "waiting for the exam review page; log in and open it in the browser window"
            );
            announced = true;
        }
        tokio::time::sleep(READY_POLL).await;
    }
}
