// Copyright 2026 ly-exam Contributors
// SPDX-License-Identifier: Apache-2.0

//! Path and endpoint resolution.
//!
//! Each setting resolves in the same order: explicit flag, then environment
//! variable, then a conventional location under `~/.ly-exam`.

use std::path::PathBuf;

/// Review page every run targets unless `--url` says otherwise.
pub const DEFAULT_EXAM_URL: &str = "https://cert.lydaas.com/cert-ly-online/exam/test";

pub const PROFILE_DIR_ENV: &str = "LY_EXAM_PROFILE_DIR";
pub const ATTACH_ENV: &str = "LY_EXAM_ATTACH";
pub const OUT_DIR_ENV: &str = "LY_EXAM_OUT_DIR";
pub const RECORDS_DIR_ENV: &str = "LY_EXAM_RECORDS_DIR";

/// `~/.ly-exam`, or `./.ly-exam` without a home directory.
pub fn home_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ly-exam")
}

fn resolve(explicit: Option<PathBuf>, env: &str, fallback: impl FnOnce() -> PathBuf) -> PathBuf {
    explicit
        .or_else(|| {
            std::env::var(env)
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        })
        .unwrap_or_else(fallback)
}

/// Browser profile holding the login session.
pub fn resolve_profile_dir(explicit: Option<PathBuf>) -> PathBuf {
    resolve(explicit, PROFILE_DIR_ENV, || home_dir().join("profile"))
}

/// Where fresh exports are written. Defaults to the records directory so
/// `review` picks them up without a collect step.
pub fn resolve_out_dir(explicit: Option<PathBuf>) -> PathBuf {
    resolve(explicit, OUT_DIR_ENV, || resolve_records_dir(None))
}

/// Where collected exports accumulate for review.
pub fn resolve_records_dir(explicit: Option<PathBuf>) -> PathBuf {
    resolve(explicit, RECORDS_DIR_ENV, || home_dir().join("records"))
}

/// Where `review` writes its books: `~/.ly-exam` unless given.
pub fn resolve_review_dir(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(home_dir)
}

/// DevTools endpoint of a running browser to attach to, if any.
pub fn resolve_attach(explicit: Option<String>) -> Option<String> {
    explicit.or_else(|| std::env::var(ATTACH_ENV).ok().filter(|v| !v.is_empty()))
}

/// The browser's download folder, where in-page exports land.
pub fn downloads_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("."))
}
