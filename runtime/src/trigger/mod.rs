// Copyright 2026 ly-exam Contributors
// SPDX-License-Identifier: Apache-2.0

//! Export trigger state.
//!
//! Every surface (terminal, in-page button) renders from one explicit state
//! value instead of flipping flags and texts by hand.

pub mod button;

use std::path::PathBuf;
use std::time::{Duration, Instant};
use thiserror::Error;

/// How long the "done" state stays up before the trigger re-arms.
pub const DONE_COOLDOWN: Duration = Duration::from_millis(2000);

/// Where an export run stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportState {
    Idle,
    /// `total` is unknown until the question list has been located.
    Running { current: usize, total: Option<usize> },
    Done { path: PathBuf },
    Failed { message: String },
}

impl ExportState {
    /// Button text for this state.
    pub fn label(&self) -> String {
        match self {
            Self::Idle => "导出答题记录".to_string(),
            Self::Running { total: None, .. } => "导出中...".to_string(),
            Self::Running {
                current,
                total: Some(total),
            } => format!("导出中...({current}/{total})"),
            Self::Done { .. } => "导出完成".to_string(),
            Self::Failed { message } => format!("导出失败: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriggerError {
    #[error("an export is already running")]
    AlreadyRunning,
    #[error("the trigger is cooling down after the last export")]
    CoolingDown,
}

/// The export control: a state plus the re-arm rules.
#[derive(Debug)]
pub struct Trigger {
    state: ExportState,
    done_at: Option<Instant>,
    cooldown: Duration,
}

impl Default for Trigger {
    fn default() -> Self {
        Self::new(DONE_COOLDOWN)
    }
}

impl Trigger {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            state: ExportState::Idle,
            done_at: None,
            cooldown,
        }
    }

    pub fn state(&self) -> &ExportState {
        &self.state
    }

    /// Whether a new run may start.
    pub fn is_enabled(&self) -> bool {
        matches!(self.state, ExportState::Idle | ExportState::Failed { .. })
    }

    /// Begin a run. Rejected while one is running or the done state is up.
    pub fn start(&mut self) -> Result<(), TriggerError> {
        match self.state {
            ExportState::Running { .. } => Err(TriggerError::AlreadyRunning),
            ExportState::Done { .. } => Err(TriggerError::CoolingDown),
            ExportState::Idle | ExportState::Failed { .. } => {
                self.state = ExportState::Running {
                    current: 0,
                    total: None,
                };
                self.done_at = None;
                Ok(())
            }
        }
    }

    /// Record walk progress; ignored unless running.
    pub fn progress(&mut self, current: usize, total: usize) {
        if let ExportState::Running { .. } = self.state {
            self.state = ExportState::Running {
                current,
                total: Some(total),
            };
        }
    }

    pub fn finish(&mut self, path: PathBuf, now: Instant) {
        self.state = ExportState::Done { path };
        self.done_at = Some(now);
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.state = ExportState::Failed {
            message: message.into(),
        };
        self.done_at = None;
    }

    /// Advance time-based transitions. Returns `true` if the state changed.
    ///
    /// Done re-arms once the cooldown has passed; a failure re-arms on the
    /// first tick after it has been shown.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.state {
            ExportState::Done { .. } => {
                let elapsed = self
                    .done_at
                    .map(|at| now.saturating_duration_since(at))
                    .unwrap_or(self.cooldown);
                if elapsed >= self.cooldown {
                    self.reset();
                    true
                } else {
                    false
                }
            }
            ExportState::Failed { .. } => {
                self.reset();
                true
            }
            _ => false,
        }
    }

    fn reset(&mut self) {
        self.state = ExportState::Idle;
        self.done_at = None;
    }
}
