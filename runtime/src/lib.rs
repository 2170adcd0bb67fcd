// Copyright 2026 ly-exam Contributors
// SPDX-License-Identifier: Apache-2.0

//! ly-exam: export answer records from the exam review page to CSV.
//!
//! This library crate exposes the core modules for integration testing.

pub mod cli;
pub mod config;
pub mod export;
pub mod extraction;
pub mod progress;
pub mod renderer;
pub mod review;
pub mod trigger;
pub mod walker;
pub mod workflow;
