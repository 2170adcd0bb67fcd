// Copyright 2026 ly-exam Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared CLI output formatting: global flags, colors, symbols, and the
//! terminal progress bar for a walk.

use crate::progress::{ProgressEventKind, ProgressReceiver};
use crate::trigger::Trigger;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::Mutex;

pub const JSON_ENV: &str = "LY_EXAM_JSON";
pub const QUIET_ENV: &str = "LY_EXAM_QUIET";
pub const NO_COLOR_ENV: &str = "LY_EXAM_NO_COLOR";

/// Check if color output is enabled.
pub fn color_enabled() -> bool {
    // Respect NO_COLOR env (https://no-color.org/)
    if std::env::var("NO_COLOR").is_ok() || std::env::var(NO_COLOR_ENV).is_ok() {
        return false;
    }
    std::io::stdout().is_terminal()
}

/// Check if --quiet mode is active.
pub fn is_quiet() -> bool {
    std::env::var(QUIET_ENV).is_ok()
}

/// Check if --json mode is active.
pub fn is_json() -> bool {
    std::env::var(JSON_ENV).is_ok()
}

/// Print JSON output to stdout.
pub fn print_json(value: &serde_json::Value) {
    if let Ok(s) = serde_json::to_string_pretty(value) {
        println!("{s}");
    }
}

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Colored string builder.
pub struct Styled {
    use_color: bool,
}

impl Default for Styled {
    fn default() -> Self {
        Self::new()
    }
}

impl Styled {
    pub fn new() -> Self {
        Self {
            use_color: color_enabled(),
        }
    }

    /// Green checkmark symbol.
    pub fn ok_sym(&self) -> &str {
        if self.use_color {
            "\x1b[32m\u{2713}\x1b[0m"
        } else {
            "OK"
        }
    }

    /// Red X symbol.
    pub fn fail_sym(&self) -> &str {
        if self.use_color {
            "\x1b[31m\u{2717}\x1b[0m"
        } else {
            "!!"
        }
    }

    /// Yellow warning symbol.
    pub fn warn_sym(&self) -> &str {
        if self.use_color {
            "\x1b[33m\u{26a0}\x1b[0m"
        } else {
            "??"
        }
    }

    fn paint(&self, code: &str, s: &str) -> String {
        if self.use_color {
            format!("{code}{s}{RESET}")
        } else {
            s.to_string()
        }
    }

    pub fn green(&self, s: &str) -> String {
        self.paint(GREEN, s)
    }

    pub fn red(&self, s: &str) -> String {
        self.paint(RED, s)
    }

    pub fn yellow(&self, s: &str) -> String {
        self.paint(YELLOW, s)
    }

    pub fn dim(&self, s: &str) -> String {
        self.paint(DIM, s)
    }

    pub fn bold(&self, s: &str) -> String {
        self.paint(BOLD, s)
    }
}

/// Print a check result line with symbol and label/value.
pub fn print_check(symbol: &str, label: &str, value: &str) {
    eprintln!("    {symbol} {label:<16} {value}");
}

/// Progress bar for a walk; hidden under --quiet and --json.
pub fn walk_progress_bar() -> ProgressBar {
    if is_quiet() || is_json() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::with_template("  {bar:30.cyan/blue} {pos}/{len} {msg}") {
        bar.set_style(style.progress_chars("\u{2588}\u{2589}\u{2591}"));
    }
    bar
}

/// Mirror walk progress into `trigger` and onto the terminal bar until the
/// sender side closes.
pub async fn follow_progress(
    mut rx: ProgressReceiver,
    trigger: Arc<Mutex<Trigger>>,
    bar: ProgressBar,
) {
    loop {
        let event = match rx.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        };
        match event.event {
            ProgressEventKind::WalkStarted { total } => bar.set_length(total as u64),
            ProgressEventKind::EntryStarted { current, total } => {
                let label = {
                    let mut trigger = trigger.lock().await;
                    trigger.progress(current, total);
                    trigger.state().label()
                };
                bar.set_position(current as u64);
                bar.set_message(label);
            }
            ProgressEventKind::EntrySkipped { current, reason } => {
                bar.println(format!("  skipped question {current}: {reason}"));
            }
            ProgressEventKind::Warning { message } => bar.println(format!("  warning: {message}")),
            ProgressEventKind::WalkComplete { .. } => bar.finish_and_clear(),
            ProgressEventKind::RecordExtracted { .. } => {}
        }
    }
}
