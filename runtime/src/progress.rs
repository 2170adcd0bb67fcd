// Copyright 2026 ly-exam Contributors
// SPDX-License-Identifier: Apache-2.0

//! Progress event types and broadcast channel for walk telemetry.
//!
//! The walker emits `ProgressEvent`s as it clicks through entries; they flow
//! through a `tokio::sync::broadcast` channel to whichever surface renders
//! them (terminal progress bar, in-page button). When no subscriber exists,
//! events are silently dropped.

use serde::{Deserialize, Serialize};

/// A progress event emitted during a walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// The run this event belongs to.
    pub run_id: String,
    /// Monotonically increasing sequence number.
    pub seq: u64,
    /// The kind of progress event.
    pub event: ProgressEventKind,
}

/// The specific kind of progress event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProgressEventKind {
    /// The question list was located.
    WalkStarted { total: usize },
    /// An entry is about to be clicked. `current` is 1-based.
    EntryStarted { current: usize, total: usize },
    /// A record was read from the detail panel.
    RecordExtracted { current: usize, result: String },
    /// An entry produced no detail panel and was skipped.
    EntrySkipped { current: usize, reason: String },
    /// Every entry was visited.
    WalkComplete {
        records: usize,
        skipped: usize,
        elapsed_ms: u64,
    },
    /// A non-fatal warning occurred.
    Warning { message: String },
}

/// Sender handle for emitting progress events.
pub type ProgressSender = tokio::sync::broadcast::Sender<ProgressEvent>;

/// Receiver handle for consuming progress events.
pub type ProgressReceiver = tokio::sync::broadcast::Receiver<ProgressEvent>;

/// Create a new progress broadcast channel with a bounded buffer.
///
/// A review page lists well under a hundred questions, each producing two or
/// three events.
pub fn channel() -> (ProgressSender, ProgressReceiver) {
    tokio::sync::broadcast::channel(256)
}

/// Emit a progress event, silently ignoring send errors
/// (which occur when no receivers are listening).
pub fn emit(tx: &Option<ProgressSender>, run_id: &str, seq: &mut u64, event: ProgressEventKind) {
    if let Some(ref sender) = tx {
        *seq += 1;
        let _ = sender.send(ProgressEvent {
            run_id: run_id.to_string(),
            seq: *seq,
            event,
        });
    }
}
