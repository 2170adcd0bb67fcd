// Copyright 2026 ly-exam Contributors
// SPDX-License-Identifier: Apache-2.0

//! Renderer abstraction for browser-based page access.
//!
//! Defines the `Renderer` and `RenderContext` traits that abstract over
//! the browser engine (currently Chromium via chromiumoxide).

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Result of navigating to a URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationResult {
    /// The final URL after any redirects.
    pub final_url: String,
    /// Time taken to load the page in milliseconds.
    pub load_time_ms: u64,
}

/// A browser engine that hands out page contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Open a new tab.
    async fn new_context(&self) -> Result<Arc<dyn RenderContext>>;
    /// Find an already-open tab whose URL starts with `url_prefix`.
    async fn find_context(&self, url_prefix: &str) -> Result<Option<Arc<dyn RenderContext>>>;
    /// Shut down the browser engine.
    async fn shutdown(&self) -> Result<()>;
    /// Number of tabs opened through this renderer that are still open.
    fn active_contexts(&self) -> usize;
}

/// A single browser tab.
///
/// Methods take `&self` so one tab can be shared between the walk and the
/// surface rendering its progress.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Navigate to a URL with a timeout.
    async fn navigate(&self, url: &str, timeout_ms: u64) -> Result<NavigationResult>;
    /// Execute JavaScript in the page context and return the result.
    async fn execute_js(&self, script: &str) -> Result<serde_json::Value>;
    /// Get the full page HTML.
    async fn get_html(&self) -> Result<String>;
    /// Get the current URL.
    async fn get_url(&self) -> Result<String>;
    /// Close this tab if it was opened by us; attached tabs are left alone.
    async fn close(&self) -> Result<()>;
}
