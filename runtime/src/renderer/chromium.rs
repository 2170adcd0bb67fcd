// Copyright 2026 ly-exam Contributors
// SPDX-License-Identifier: Apache-2.0

//! Chromium-based renderer using chromiumoxide.
//!
//! Two ways in: launch a Chromium with a persistent profile (so a login done
//! in that window survives between runs), or attach to a browser the user
//! already started with `--remote-debugging-port`.

use super::{NavigationResult, RenderContext, Renderer};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig, HeadlessMode};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Environment variable naming an explicit Chromium binary.
pub const CHROMIUM_PATH_ENV: &str = "LY_EXAM_CHROMIUM_PATH";

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. LY_EXAM_CHROMIUM_PATH env
    if let Ok(p) = std::env::var(CHROMIUM_PATH_ENV) {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. ~/.ly-exam/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".ly-exam/chromium/chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".ly-exam/chromium/chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".ly-exam/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".ly-exam/chromium/chrome-linux64/chrome"),
                home.join(".ly-exam/chromium/chrome"),
            ]
        };
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    // 3. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common macOS location
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// How to launch a browser we own.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Explicit binary; `find_chromium()` is used when absent.
    pub chrome_path: Option<PathBuf>,
    /// Persistent profile directory (cookies, login state).
    pub profile_dir: PathBuf,
    /// Run without a window. The review page needs a logged-in session, so
    /// this only makes sense with a profile that already holds one.
    pub headless: bool,
}

/// Headless runs use Chromium's new headless mode and skip the sandbox,
/// which container hosts often cannot provide.
fn browser_config(options: &LaunchOptions, chrome_path: &Path) -> Result<BrowserConfig> {
    let mut builder = BrowserConfig::builder()
        .chrome_executable(chrome_path)
        .user_data_dir(&options.profile_dir)
        .arg("--disable-gpu")
        .arg("--disable-dev-shm-usage")
        .arg("--disable-extensions")
        .arg("--no-first-run");
    if options.headless {
        builder = builder.headless_mode(HeadlessMode::New).no_sandbox();
    } else {
        builder = builder.with_head();
    }
    builder
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))
}

/// Chromium-based renderer.
pub struct ChromiumRenderer {
    browser: Browser,
    handler_task: JoinHandle<()>,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumRenderer {
    /// Launch a Chromium instance with a persistent profile.
    pub async fn launch(options: &LaunchOptions) -> Result<Self> {
        let chrome_path = match &options.chrome_path {
            Some(p) => p.clone(),
            None => find_chromium()
                .with_context(|| format!("Chromium not found. Set {CHROMIUM_PATH_ENV}."))?,
        };

        std::fs::create_dir_all(&options.profile_dir).with_context(|| {
            format!(
                "failed to create browser profile dir {}",
                options.profile_dir.display()
            )
        })?;

        let config = browser_config(options, &chrome_path)?;

        info!(path = %chrome_path.display(), headless = options.headless, "launching Chromium");
        let (browser, handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        Ok(Self {
            browser,
            handler_task: spawn_handler(handler),
            active_count: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Attach to a running browser's DevTools endpoint
    /// (e.g. `http://127.0.0.1:9222`).
    pub async fn connect(endpoint: &str) -> Result<Self> {
        info!(%endpoint, "attaching to running browser");
        let (mut browser, handler) = Browser::connect(endpoint)
            .await
            .with_context(|| format!("failed to connect to browser at {endpoint}"))?;
        let handler_task = spawn_handler(handler);

        // Tabs that predate the connection are only visible once discovered.
        let targets = browser
            .fetch_targets()
            .await
            .context("failed to list browser targets")?;
        debug!(targets = targets.len(), "discovered browser targets");

        Ok(Self {
            browser,
            handler_task,
            active_count: Arc::new(AtomicUsize::new(0)),
        })
    }
}

/// Drain the CDP handler on its own task; chromiumoxide stalls otherwise.
fn spawn_handler(mut handler: chromiumoxide::Handler) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                debug!("browser handler stopped: {e}");
                break;
            }
        }
    })
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_context(&self) -> Result<Arc<dyn RenderContext>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .context("failed to create new page")?;

        self.active_count.fetch_add(1, Ordering::Relaxed);

        Ok(Arc::new(ChromiumContext {
            page,
            owned: Some(Arc::clone(&self.active_count)),
        }))
    }

    async fn find_context(&self, url_prefix: &str) -> Result<Option<Arc<dyn RenderContext>>> {
        // Attached targets surface asynchronously; give them a moment.
        for _ in 0..10 {
            let pages = self.browser.pages().await.context("failed to list pages")?;
            for page in pages {
                let url = page.url().await.ok().flatten().unwrap_or_default();
                if url.starts_with(url_prefix) {
                    debug!(%url, "found open exam tab");
                    return Ok(Some(Arc::new(ChromiumContext { page, owned: None })));
                }
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        Ok(None)
    }

    async fn shutdown(&self) -> Result<()> {
        // A launched browser is killed when ChromiumRenderer is dropped; an
        // attached one keeps running.
        self.handler_task.abort();
        Ok(())
    }

    fn active_contexts(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }
}

/// A single Chromium tab.
pub struct ChromiumContext {
    page: Page,
    /// Set for tabs we opened; attached tabs are never closed.
    owned: Option<Arc<AtomicUsize>>,
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn navigate(&self, url: &str, timeout_ms: u64) -> Result<NavigationResult> {
        let start = Instant::now();

        let result =
            tokio::time::timeout(Duration::from_millis(timeout_ms), self.page.goto(url)).await;

        let load_time_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(Ok(_)) => {
                if let Err(e) = self.page.wait_for_navigation().await {
                    debug!(url, error = %e, "wait for navigation failed");
                }

                let final_url = self
                    .page
                    .url()
                    .await
                    .unwrap_or_default()
                    .unwrap_or_else(|| url.to_string());

                Ok(NavigationResult {
                    final_url,
                    load_time_ms,
                })
            }
            Ok(Err(e)) => bail!("navigation failed: {e}"),
            Err(_) => bail!("navigation timed out after {timeout_ms}ms"),
        }
    }

    async fn execute_js(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .context("JS execution failed")?;

        // Scripts returning undefined carry no value.
        Ok(result.into_value().unwrap_or(serde_json::Value::Null))
    }

    async fn get_html(&self) -> Result<String> {
        let result = self
            .page
            .evaluate("document.documentElement.outerHTML")
            .await
            .context("failed to get HTML")?;

        let html: String = result
            .into_value()
            .map_err(|e| anyhow::anyhow!("failed to convert HTML result: {e:?}"))?;

        Ok(html)
    }

    async fn get_url(&self) -> Result<String> {
        let url = self
            .page
            .url()
            .await
            .context("failed to get URL")?
            .unwrap_or_default();
        Ok(url)
    }

    async fn close(&self) -> Result<()> {
        if let Some(count) = &self.owned {
            count.fetch_sub(1, Ordering::Relaxed);
            let _ = self.page.clone().close().await;
        }
        Ok(())
    }
}
