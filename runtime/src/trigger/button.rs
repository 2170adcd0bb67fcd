// Copyright 2026 ly-exam Contributors
// SPDX-License-Identifier: Apache-2.0

//! The floating export button injected into the review page.
//!
//! The page cannot call back into the process, so a click only raises a flag
//! on `window`; the watch loop polls and clears it. Installation is idempotent
//! and re-run on every poll, which also restores the button after the page
//! navigates.

use super::ExportState;
use crate::walker::scripted::js_string;

/// DOM id of the injected button.
pub const BUTTON_ID: &str = "ly-exam-export";

const REQUEST_FLAG: &str = "__lyExamExportRequested";

/// Script that creates the button if it is not on the page yet.
pub fn install_script(initial: &ExportState) -> String {
    format!(
        r#"(() => {{
  if (!document.body) return false;
  if (document.getElementById({id})) return true;
  const button = document.createElement('button');
  button.id = {id};
  button.textContent = {label};
  button.style.cssText = 'position: fixed; left: 16px; bottom: 16px; z-index: 9999; padding: 10px 20px; background-color: #4CAF50; color: white; border: none; border-radius: 4px; cursor: pointer;';
  button.addEventListener('click', () => {{
    if (!button.disabled) window.{flag} = true;
  }});
  document.body.appendChild(button);
  return true;
}})()"#,
        id = js_string(BUTTON_ID),
        label = js_string(&initial.label()),
        flag = REQUEST_FLAG,
    )
}

/// Script that reads and clears the click flag. Evaluates to a boolean.
pub fn take_request_script() -> String {
    format!(
        r#"(() => {{
  const requested = window.{flag} === true;
  window.{flag} = false;
  return requested;
}})()"#,
        flag = REQUEST_FLAG,
    )
}

/// Script that renders `state` onto the button.
pub fn render_script(state: &ExportState, enabled: bool) -> String {
    format!(
        r#"(() => {{
  const button = document.getElementById({id});
  if (!button) return false;
  button.textContent = {label};
  button.disabled = {disabled};
  button.style.opacity = {opacity};
  return true;
}})()"#,
        id = js_string(BUTTON_ID),
        label = js_string(&state.label()),
        disabled = !enabled,
        opacity = if enabled { "'1'" } else { "'0.6'" },
    )
}

/// Script that shows a failure dialog. The dialog is deferred so the
/// evaluation returns before the page blocks on it.
pub fn alert_script(message: &str) -> String {
    format!(
        "setTimeout(() => window.alert({}), 0)",
        js_string(message)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_script_is_idempotent_and_labelled() {
        let script = install_script(&ExportState::Idle);
        assert!(script.contains(r#"document.getElementById("ly-exam-export")"#));
        assert!(script.contains(r#""导出答题记录""#));
        assert!(script.contains("window.__lyExamExportRequested = true"));
    }

    #[test]
    fn test_render_script_reflects_state() {
        let running = ExportState::Running {
            current: 2,
            total: Some(10),
        };
        let script = render_script(&running, false);
        assert!(script.contains(r#""导出中...(2/10)""#));
        assert!(script.contains("button.disabled = true"));

        let script = render_script(&ExportState::Idle, true);
        assert!(script.contains("button.disabled = false"));
    }

    #[test]
    fn test_alert_script_escapes_message() {
        assert_eq!(
            alert_script("导出失败: \"x\""),
            r#"setTimeout(() => window.alert("导出失败: \"x\""), 0)"#
        );
    }
}
