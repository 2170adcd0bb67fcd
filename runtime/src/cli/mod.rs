// Copyright 2026 ly-exam Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI subcommand implementations for the ly-exam binary.

pub mod doctor;
pub mod export_cmd;
pub mod extract_cmd;
pub mod output;
pub mod review_cmd;
pub mod session;
pub mod watch_cmd;

use crate::config::DEFAULT_EXAM_URL;
use crate::extraction::SelectorProfile;
use crate::walker::readiness::WaitStrategy;
use crate::walker::SettleConfig;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::filter::Directive;

/// Install the global subscriber. Logs go to stderr so stdout stays
/// parseable under `--json`, where they are emitted as JSON lines too.
pub fn init_tracing(verbose: bool, quiet: bool) -> Result<()> {
    let level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let directive: Directive = format!("ly_exam={level}")
        .parse()
        .context("invalid log directive")?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive))
        .with_writer(std::io::stderr);
    if output::is_json() {
        builder.json().init();
    } else {
        builder.with_ansi(output::color_enabled()).init();
    }
    Ok(())
}

/// Flags shared by every command that drives the exam page.
#[derive(Debug, Clone, Args)]
pub struct BrowserArgs {
    /// Review page URL; an open tab whose URL starts with it is reused
    #[arg(long, default_value = DEFAULT_EXAM_URL)]
    pub url: String,

    /// DevTools endpoint of a running browser (e.g. http://127.0.0.1:9222)
    #[arg(long)]
    pub attach: Option<String>,

    /// Browser profile directory holding the login session
    #[arg(long)]
    pub profile_dir: Option<PathBuf>,

    /// Launch the browser without a window
    #[arg(long)]
    pub headless: bool,

    /// Chromium binary to launch (default: auto-detect)
    #[arg(long)]
    pub chromium: Option<PathBuf>,

    /// JSON file overriding selector roles
    #[arg(long)]
    pub selectors: Option<PathBuf>,

    /// Wait a fixed delay after each click instead of polling the panel
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Longest time to wait for the panel to settle after a click
    #[arg(long, default_value = "5000")]
    pub settle_timeout_ms: u64,

    /// How long to wait for the question list to appear
    #[arg(long, default_value = "120")]
    pub ready_timeout_secs: u64,
}

impl BrowserArgs {
    pub fn wait_strategy(&self) -> WaitStrategy {
        match self.delay_ms {
            Some(ms) => WaitStrategy::Fixed(Duration::from_millis(ms)),
            None => WaitStrategy::Settle(SettleConfig {
                timeout: Duration::from_millis(self.settle_timeout_ms),
                ..SettleConfig::default()
            }),
        }
    }

    pub fn selector_profile(&self) -> Result<SelectorProfile> {
        Ok(SelectorProfile::resolve(self.selectors.as_deref())?)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        browser: BrowserArgs,
    }

    #[test]
    fn test_defaults_settle() {
        let args = Harness::parse_from(["ly-exam"]).browser;
        assert_eq!(args.url, DEFAULT_EXAM_URL);
        match args.wait_strategy() {
            WaitStrategy::Settle(config) => {
                assert_eq!(config.timeout, Duration::from_millis(5000));
                assert_eq!(config.poll, SettleConfig::default().poll);
            }
            other => panic!("unexpected strategy {other:?}"),
        }
    }

    #[test]
    fn test_delay_selects_fixed() {
        let args = Harness::parse_from(["ly-exam", "--delay-ms", "1000"]).browser;
        assert_eq!(
            args.wait_strategy(),
            WaitStrategy::Fixed(Duration::from_millis(1000))
        );
    }
}
