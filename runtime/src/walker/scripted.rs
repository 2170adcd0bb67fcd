// Copyright 2026 ly-exam Contributors
// SPDX-License-Identifier: Apache-2.0

//! `PageDriver` over a live browser tab.
//!
//! Clicking has to happen in the page, so the entry lookup is mirrored in a
//! small script built from the same selector profile the extractor uses.
//! Selector strings are embedded as JSON string literals, which are valid
//! JavaScript literals.

use super::PageDriver;
use crate::extraction::SelectorProfile;
use crate::renderer::RenderContext;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Drives a rendered review page through injected scripts.
pub struct ScriptedPage {
    context: Arc<dyn RenderContext>,
    profile: SelectorProfile,
}

impl ScriptedPage {
    pub fn new(context: Arc<dyn RenderContext>, profile: SelectorProfile) -> Self {
        Self { context, profile }
    }
}

#[async_trait]
impl PageDriver for ScriptedPage {
    async fn page_html(&self) -> Result<String> {
        self.context.get_html().await
    }

    async fn click_entry(&self, index: usize) -> Result<bool> {
        let clicked = self
            .context
            .execute_js(&click_entry_script(&self.profile, index))
            .await?;
        Ok(clicked.as_bool().unwrap_or(false))
    }

    async fn panel_html(&self) -> Result<Option<String>> {
        let html = self
            .context
            .execute_js(&panel_html_script(&self.profile))
            .await?;
        Ok(html.as_str().map(str::to_string))
    }
}

/// Quote a string as a JavaScript literal.
pub(crate) fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// Script that clicks the `index`-th entry after the progress marker.
/// Evaluates to `true` when an entry was clicked.
pub fn click_entry_script(profile: &SelectorProfile, index: usize) -> String {
    format!(
        r#"(() => {{
  const marker = Array.from(document.querySelectorAll({scope}))
    .find(el => el.textContent.trim() === {marker});
  if (!marker || !marker.nextElementSibling) return false;
  const entry = marker.nextElementSibling.querySelectorAll({entry})[{index}];
  if (!entry) return false;
  entry.click();
  return true;
}})()"#,
        scope = js_string(&profile.progress_marker_scope),
        marker = js_string(&profile.progress_marker_text),
        entry = js_string(&profile.entry),
    )
}

/// Script evaluating to the detail panel's outer HTML, or `null`.
pub fn panel_html_script(profile: &SelectorProfile) -> String {
    format!(
        r#"(() => {{
  const panel = document.querySelector({panel});
  return panel ? panel.outerHTML : null;
}})()"#,
        panel = js_string(&profile.detail_panel),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_script_embeds_profile() {
        let script = click_entry_script(&SelectorProfile::default(), 7);
        assert!(script.contains(r#""考试进度详情""#));
        assert!(script.contains(r#""[class^=\"_sheet_\"]""#));
        assert!(script.contains("[7]"));
        assert!(script.contains("entry.click()"));
    }

    #[test]
    fn test_panel_script_embeds_profile() {
        let script = panel_html_script(&SelectorProfile::default());
        assert!(script.contains(r#"document.querySelector("[class^=\"_rightContent\"]")"#));
        assert!(script.contains("outerHTML"));
    }

    #[test]
    fn test_js_string_escapes_quotes_and_newlines() {
        assert_eq!(js_string("a\"b\nc"), r#""a\"b\nc""#);
    }
}
