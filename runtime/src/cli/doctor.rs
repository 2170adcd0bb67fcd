// Copyright 2026 ly-exam Contributors
// SPDX-License-Identifier: Apache-2.0

//! Environment readiness check.

use super::output::{self, Styled};
use crate::config;
use crate::extraction::SelectorProfile;
use crate::renderer::chromium::{find_chromium, CHROMIUM_PATH_ENV};
use crate::review;
use anyhow::Result;
use std::path::Path;

/// Report the browser, resolved directories and selector profile.
pub async fn run(selectors: Option<&Path>) -> Result<()> {
    let chromium = find_chromium();
    let attach = config::resolve_attach(None);
    let profile_dir = config::resolve_profile_dir(None);
    let out_dir = config::resolve_out_dir(None);
    let records_dir = config::resolve_records_dir(None);
    let downloads_dir = config::downloads_dir();
    let exports = review::list_exports(&records_dir).map(|v| v.len()).unwrap_or(0);
    let profile = SelectorProfile::resolve(selectors).and_then(|p| p.compile().map(|_| p));

    let ready = chromium.is_some() || attach.is_some();

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "os": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
            "chromium": chromium,
            "attach": attach,
            "profile_dir": profile_dir,
            "out_dir": out_dir,
            "records_dir": records_dir,
            "downloads_dir": downloads_dir,
            "exports": exports,
            "selectors": profile.as_ref().err().map(ToString::to_string).unwrap_or_else(|| "ok".into()),
            "ready": ready && profile.is_ok(),
        }));
        return Ok(());
    }

    let s = Styled::new();
    eprintln!();
    eprintln!("  {}", s.bold("ly-exam doctor"));
    eprintln!();
    output::print_check(
        s.ok_sym(),
        "Platform",
        &format!("{} {}", std::env::consts::OS, std::env::consts::ARCH),
    );

    match (&chromium, &attach) {
        (_, Some(endpoint)) => output::print_check(s.ok_sym(), "Browser", &format!("attach {endpoint}")),
        (Some(path), None) => output::print_check(s.ok_sym(), "Chromium", &path.display().to_string()),
        (None, None) => output::print_check(
            s.fail_sym(),
            "Chromium",
            &format!("not found; install Chrome or set {CHROMIUM_PATH_ENV}"),
        ),
    }

    output::print_check(s.ok_sym(), "Profile dir", &profile_dir.display().to_string());
    output::print_check(s.ok_sym(), "Output dir", &out_dir.display().to_string());
    output::print_check(
        s.ok_sym(),
        "Records dir",
        &format!("{} ({exports} exports)", records_dir.display()),
    );
    let downloads_sym = if downloads_dir.is_dir() {
        s.ok_sym()
    } else {
        s.warn_sym()
    };
    output::print_check(downloads_sym, "Downloads", &downloads_dir.display().to_string());

    match &profile {
        Ok(_) if selectors.is_some() => output::print_check(s.ok_sym(), "Selectors", "custom profile ok"),
        Ok(_) => output::print_check(s.ok_sym(), "Selectors", "built-in"),
        Err(e) => output::print_check(s.fail_sym(), "Selectors", &e.to_string()),
    }

    eprintln!();
    if ready && profile.is_ok() {
        eprintln!("  Status: {}", s.green("READY"));
    } else {
        eprintln!("  Status: {}", s.red("NOT READY"));
    }
    Ok(())
}
