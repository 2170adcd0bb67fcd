// Copyright 2026 ly-exam Contributors
// SPDX-License-Identifier: Apache-2.0

//! The click-wait-extract loop over the review page's question list.
//!
//! Entries are visited strictly one at a time: the detail panel is a single
//! viewport overwritten in place by each click.

pub mod readiness;
pub mod scripted;

use crate::extraction::{count_entries, extract_record, AnchorError, CompiledProfile, Record};
use crate::progress::{emit, ProgressEventKind, ProgressSender};
use anyhow::Result;
use async_trait::async_trait;
use readiness::{Settle, Verdict, WaitStrategy};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

pub use readiness::SettleConfig;
pub use scripted::ScriptedPage;

/// The page operations a walk needs.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Full markup of the current page.
    async fn page_html(&self) -> Result<String>;
    /// Click the `index`-th question entry. `false` if it could not be found.
    async fn click_entry(&self, index: usize) -> Result<bool>;
    /// Outer markup of the detail panel, if one is rendered.
    async fn panel_html(&self) -> Result<Option<String>>;
}

/// Errors that abort a whole walk.
#[derive(Debug, Error)]
pub enum WalkError {
    #[error(transparent)]
    Anchor(#[from] AnchorError),
    #[error(transparent)]
    Browser(#[from] anyhow::Error),
}

/// Everything one walk produced.
#[derive(Debug, Clone, Default)]
pub struct WalkOutcome {
    /// One record per entry that rendered a panel, in page order.
    pub records: Vec<Record>,
    /// Zero-based indices of entries that produced no record.
    pub skipped: Vec<usize>,
    /// Number of entries listed on the page.
    pub total: usize,
    pub elapsed_ms: u64,
}

/// Walks the question list of one page.
pub struct Walker<'a> {
    driver: &'a dyn PageDriver,
    profile: &'a CompiledProfile,
    wait: WaitStrategy,
    progress: Option<ProgressSender>,
    run_id: String,
}

impl<'a> Walker<'a> {
    pub fn new(driver: &'a dyn PageDriver, profile: &'a CompiledProfile, wait: WaitStrategy) -> Self {
        Self {
            driver,
            profile,
            wait,
            progress: None,
            run_id: String::new(),
        }
    }

    /// Report progress on `tx`, tagging events with `run_id`.
    pub fn with_progress(mut self, tx: ProgressSender, run_id: impl Into<String>) -> Self {
        self.progress = Some(tx);
        self.run_id = run_id.into();
        self
    }

    /// Click through every entry and collect the records.
    ///
    /// Fails before clicking anything when the progress marker or the list
    /// next to it is missing. An entry whose panel never appears is skipped.
    pub async fn walk(&self) -> Result<WalkOutcome, WalkError> {
        let start = Instant::now();
        let mut seq = 0u64;

        let html = self.driver.page_html().await?;
        let total = count_entries(&html, self.profile)?;
        info!(total, "found question entries");
        self.emit(&mut seq, ProgressEventKind::WalkStarted { total });

        let mut outcome = WalkOutcome {
            total,
            ..WalkOutcome::default()
        };

        for index in 0..total {
            let current = index + 1;
            self.emit(&mut seq, ProgressEventKind::EntryStarted { current, total });

            if !self.driver.click_entry(index).await? {
                warn!(current, "question entry disappeared before it could be clicked");
                outcome.skipped.push(index);
                self.emit(
                    &mut seq,
                    ProgressEventKind::EntrySkipped {
                        current,
                        reason: "entry not found".to_string(),
                    },
                );
                continue;
            }
            debug!(current, "clicked question entry");

            let panel = self.await_panel(current, &mut seq).await?;
            match panel.as_deref().and_then(|html| extract_record(html, self.profile)) {
                Some(record) => {
                    self.emit(
                        &mut seq,
                        ProgressEventKind::RecordExtracted {
                            current,
                            result: record.result.label().to_string(),
                        },
                    );
                    outcome.records.push(record);
                }
                None => {
                    warn!(current, "detail panel not found, skipping question");
                    outcome.skipped.push(index);
                    self.emit(
                        &mut seq,
                        ProgressEventKind::EntrySkipped {
                            current,
                            reason: "detail panel not found".to_string(),
                        },
                    );
                }
            }
        }

        outcome.elapsed_ms = start.elapsed().as_millis() as u64;
        info!(
            records = outcome.records.len(),
            skipped = outcome.skipped.len(),
            elapsed_ms = outcome.elapsed_ms,
            "walk complete"
        );
        self.emit(
            &mut seq,
            ProgressEventKind::WalkComplete {
                records: outcome.records.len(),
                skipped: outcome.skipped.len(),
                elapsed_ms: outcome.elapsed_ms,
            },
        );

        Ok(outcome)
    }

    async fn await_panel(&self, current: usize, seq: &mut u64) -> Result<Option<String>> {
        match self.wait {
            WaitStrategy::Fixed(delay) => {
                tokio::time::sleep(delay).await;
                self.driver.panel_html().await
            }
            WaitStrategy::Settle(config) => {
                let clicked_at = Instant::now();
                let mut settle = Settle::new(config);
                loop {
                    tokio::time::sleep(config.poll).await;
                    let snapshot = self.driver.panel_html().await?;
                    match settle.observe(snapshot, clicked_at.elapsed()) {
                        Verdict::Wait => {}
                        Verdict::Ready(panel) => return Ok(panel),
                        Verdict::TimedOut(panel) => {
                            // A missing panel is reported as a skip instead.
                            if panel.is_some() {
                                warn!(current, "detail panel still changing at settle timeout, using last read");
                                self.emit(
                                    seq,
                                    ProgressEventKind::Warning {
                                        message: format!(
                                            "question {current}: panel still changing after {}ms",
                                            config.timeout.as_millis()
                                        ),
                                    },
                                );
                            }
                            return Ok(panel);
                        }
                    }
                }
            }
        }
    }

    fn emit(&self, seq: &mut u64, event: ProgressEventKind) {
        emit(&self.progress, &self.run_id, seq, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::{AnswerResult, SelectorProfile};
    use crate::progress::{self, ProgressEvent};
    use std::sync::Mutex;
    use std::time::Duration;

    /// In-memory review page: clicking entry `i` shows `panels[i]`.
    struct FakePage {
        page: String,
        panels: Vec<Option<String>>,
        shown: Mutex<Option<usize>>,
        clicks: Mutex<Vec<usize>>,
        /// Every panel read differs from the last, as if still animating.
        churn: bool,
        reads: Mutex<usize>,
    }

    impl FakePage {
        fn new(panels: Vec<Option<String>>) -> Self {
            let entries: String = (0..panels.len())
                .map(|i| format!(r#"<div class="_sheet_item_a">{}</div>"#, i + 1))
                .collect();
            Self {
                page: format!(
                    "<html><body><div>考试进度详情</div><div>{entries}</div></body></html>"
                ),
                panels,
                shown: Mutex::new(None),
                clicks: Mutex::new(Vec::new()),
                churn: false,
                reads: Mutex::new(0),
            }
        }

        fn churning(panels: Vec<Option<String>>) -> Self {
            Self {
                churn: true,
                ..Self::new(panels)
            }
        }

        fn without_marker() -> Self {
            Self {
                page: "<html><body><div>答题卡</div></body></html>".to_string(),
                ..Self::new(vec![])
            }
        }
    }

    #[async_trait]
    impl PageDriver for FakePage {
        async fn page_html(&self) -> Result<String> {
            Ok(self.page.clone())
        }

        async fn click_entry(&self, index: usize) -> Result<bool> {
            self.clicks.lock().unwrap().push(index);
            if index < self.panels.len() {
                *self.shown.lock().unwrap() = Some(index);
                Ok(true)
            } else {
                Ok(false)
            }
        }

        async fn panel_html(&self) -> Result<Option<String>> {
            let shown = *self.shown.lock().unwrap();
            let panel = shown.and_then(|i| self.panels[i].clone());
            if !self.churn {
                return Ok(panel);
            }
            let mut reads = self.reads.lock().unwrap();
            *reads += 1;
            Ok(panel.map(|html| format!("{html}<!-- frame {reads} -->")))
        }
    }

    fn panel(content: &str, correct: &str, mine: &str) -> Option<String> {
        Some(format!(
            r#"<div class="_rightContent_x">
                 <div class="_questionType_x">单选题</div>
                 <div class="_questionContent_x">{content}</div>
                 <span class="_optionText_x">1</span><span class="_optionText_x">2</span>
                 <div class="_correctAnswers_x"><span>{correct}</span></div>
                 <div class="_selectedAnswer_x"><span>{mine}</span></div>
               </div>"#
        ))
    }

    fn profile() -> CompiledProfile {
        SelectorProfile::default().compile().unwrap()
    }

    const NO_WAIT: WaitStrategy = WaitStrategy::Fixed(Duration::ZERO);

    #[tokio::test]
    async fn test_walk_visits_entries_in_order() {
        let page = FakePage::new(vec![
            panel("q1", "B", "B"),
            panel("q2", "A", "C"),
            panel("q3", "D", "未答题"),
        ]);
        let profile = profile();
        let outcome = Walker::new(&page, &profile, NO_WAIT).walk().await.unwrap();

        assert_eq!(outcome.total, 3);
        assert!(outcome.skipped.is_empty());
        let contents: Vec<&str> = outcome
            .records
            .iter()
            .map(|r| r.question_content.as_str())
            .collect();
        assert_eq!(contents, ["q1", "q2", "q3"]);
        let results: Vec<AnswerResult> = outcome.records.iter().map(|r| r.result).collect();
        assert_eq!(
            results,
            [
                AnswerResult::Correct,
                AnswerResult::Incorrect,
                AnswerResult::Unanswered
            ]
        );
        assert_eq!(*page.clicks.lock().unwrap(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_missing_panel_is_skipped() {
        let page = FakePage::new(vec![panel("q1", "A", "A"), None, panel("q3", "A", "B")]);
        let profile = profile();
        let outcome = Walker::new(&page, &profile, NO_WAIT).walk().await.unwrap();

        assert_eq!(outcome.total, 3);
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.skipped, vec![1]);
        assert_eq!(outcome.records[1].question_content, "q3");
    }

    #[tokio::test]
    async fn test_missing_marker_aborts_before_clicking() {
        let page = FakePage::without_marker();
        let profile = profile();
        let err = Walker::new(&page, &profile, NO_WAIT).walk().await.unwrap_err();

        assert!(matches!(
            err,
            WalkError::Anchor(AnchorError::MarkerNotFound(_))
        ));
        assert!(page.clicks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_settle_strategy_reads_new_panel() {
        let page = FakePage::new(vec![panel("q1", "A", "A"), panel("q2", "B", "A")]);
        let profile = profile();
        let wait = WaitStrategy::Settle(SettleConfig {
            poll: Duration::from_millis(1),
            min_wait: Duration::from_millis(5),
            timeout: Duration::from_millis(200),
        });
        let outcome = Walker::new(&page, &profile, wait).walk().await.unwrap();

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[1].question_content, "q2");
        assert_eq!(outcome.records[1].result, AnswerResult::Incorrect);
    }

    #[tokio::test]
    async fn test_progress_events_cover_the_walk() {
        let page = FakePage::new(vec![panel("q1", "A", "A"), None]);
        let profile = profile();
        let (tx, mut rx) = progress::channel();
        Walker::new(&page, &profile, NO_WAIT)
            .with_progress(tx, "run-7")
            .walk()
            .await
            .unwrap();

        let mut events: Vec<ProgressEvent> = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert!(events.iter().all(|e| e.run_id == "run-7"));
        assert!(matches!(
            events.first().map(|e| &e.event),
            Some(ProgressEventKind::WalkStarted { total: 2 })
        ));
        assert!(events.iter().any(|e| matches!(
            e.event,
            ProgressEventKind::EntrySkipped { current: 2, .. }
        )));
        assert!(matches!(
            events.last().map(|e| &e.event),
            Some(ProgressEventKind::WalkComplete {
                records: 1,
                skipped: 1,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_unsettled_panel_is_read_with_warning() {
        let page = FakePage::churning(vec![panel("q1", "A", "A"), None]);
        let profile = profile();
        let wait = WaitStrategy::Settle(SettleConfig {
            poll: Duration::from_millis(1),
            min_wait: Duration::from_millis(2),
            timeout: Duration::from_millis(20),
        });
        let (tx, mut rx) = progress::channel();
        let outcome = Walker::new(&page, &profile, wait)
            .with_progress(tx, "run")
            .walk()
            .await
            .unwrap();

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].question_content, "q1");
        assert_eq!(outcome.skipped, vec![1]);

        let mut warnings = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let ProgressEventKind::Warning { message } = event.event {
                warnings.push(message);
            }
        }
        assert_eq!(warnings, ["question 1: panel still changing after 20ms"]);
    }
}
