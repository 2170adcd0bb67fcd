// Copyright 2026 ly-exam Contributors
// SPDX-License-Identifier: Apache-2.0

//! When is the detail panel done re-rendering after a click?
//!
//! The page gives no signal, so readiness is inferred from the panel markup:
//! either a fixed sleep, or polling until two consecutive reads agree.

use std::time::Duration;

/// How the walker waits between clicking an entry and reading the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitStrategy {
    /// Sleep a fixed duration, then read once.
    Fixed(Duration),
    /// Poll the panel until it settles.
    Settle(SettleConfig),
}

impl Default for WaitStrategy {
    fn default() -> Self {
        Self::Settle(SettleConfig::default())
    }
}

/// Polling parameters for [`WaitStrategy::Settle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleConfig {
    /// Delay between panel reads.
    pub poll: Duration,
    /// No panel is accepted before this long after the click, however stable.
    /// A loading placeholder can hold still for a couple of polls.
    pub min_wait: Duration,
    /// Give up waiting and use the latest read.
    pub timeout: Duration,
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            poll: Duration::from_millis(150),
            min_wait: Duration::from_millis(1000),
            timeout: Duration::from_millis(5000),
        }
    }
}

/// Outcome of one observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Wait,
    /// The panel held still; use this snapshot.
    Ready(Option<String>),
    /// The panel never held still; this is the latest read (`None`: no panel).
    TimedOut(Option<String>),
}

/// Tracks panel snapshots for one entry.
#[derive(Debug)]
pub struct Settle {
    config: SettleConfig,
    last: Option<String>,
    observed: bool,
}

impl Settle {
    pub fn new(config: SettleConfig) -> Self {
        Self {
            config,
            last: None,
            observed: false,
        }
    }

    /// Feed the latest panel read, taken `elapsed` after the click.
    ///
    /// Ready once `min_wait` has passed and two consecutive reads agree on a
    /// present panel; at `timeout` the latest read is taken as is.
    pub fn observe(&mut self, snapshot: Option<String>, elapsed: Duration) -> Verdict {
        let stable = self.observed && snapshot.is_some() && snapshot == self.last;

        if stable && elapsed >= self.config.min_wait {
            return Verdict::Ready(snapshot);
        }
        if elapsed >= self.config.timeout {
            return Verdict::TimedOut(snapshot);
        }

        self.last = snapshot;
        self.observed = true;
        Verdict::Wait
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SettleConfig {
        SettleConfig {
            poll: Duration::from_millis(100),
            min_wait: Duration::from_millis(1000),
            timeout: Duration::from_millis(3000),
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_stable_panel_waits_for_min_wait() {
        let mut settle = Settle::new(config());
        assert_eq!(settle.observe(some("q2"), ms(100)), Verdict::Wait);
        assert_eq!(settle.observe(some("q2"), ms(200)), Verdict::Wait);
        assert_eq!(settle.observe(some("q2"), ms(900)), Verdict::Wait);
        assert_eq!(settle.observe(some("q2"), ms(1000)), Verdict::Ready(some("q2")));
    }

    #[test]
    fn test_loading_placeholder_is_not_accepted() {
        let spinner = some(r#"<div class="_rightContent_1"><div class="spinner"></div></div>"#);
        let question = some(r#"<div class="_rightContent_1"><div class="_questionContent_1">q2</div></div>"#);
        let mut settle = Settle::new(SettleConfig::default());
        assert_eq!(settle.observe(spinner.clone(), ms(150)), Verdict::Wait);
        assert_eq!(settle.observe(spinner, ms(300)), Verdict::Wait);
        assert_eq!(settle.observe(question.clone(), ms(900)), Verdict::Wait);
        assert_eq!(settle.observe(question.clone(), ms(1050)), Verdict::Ready(question));
    }

    #[test]
    fn test_first_read_is_never_stable() {
        let mut settle = Settle::new(config());
        assert_eq!(settle.observe(some("q1"), ms(2000)), Verdict::Wait);
        assert_eq!(settle.observe(some("q1"), ms(2100)), Verdict::Ready(some("q1")));
    }

    #[test]
    fn test_missing_panel_is_never_stable() {
        let mut settle = Settle::new(config());
        assert_eq!(settle.observe(None, ms(100)), Verdict::Wait);
        assert_eq!(settle.observe(None, ms(1500)), Verdict::Wait);
        assert_eq!(settle.observe(None, ms(3000)), Verdict::TimedOut(None));
    }

    #[test]
    fn test_timeout_takes_latest_read() {
        let mut settle = Settle::new(config());
        assert_eq!(settle.observe(some("a"), ms(1000)), Verdict::Wait);
        assert_eq!(settle.observe(some("b"), ms(2000)), Verdict::Wait);
        assert_eq!(settle.observe(some("c"), ms(3000)), Verdict::TimedOut(some("c")));
    }

    #[test]
    fn test_default_strategy_is_settle() {
        assert!(matches!(WaitStrategy::default(), WaitStrategy::Settle(_)));
    }
}
