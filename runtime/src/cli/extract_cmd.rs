// Copyright 2026 ly-exam Contributors
// SPDX-License-Identifier: Apache-2.0

//! `ly-exam extract`: run the extractor over a saved page, for checking a
//! selector profile without a browser.

use super::output::{self, Styled};
use crate::extraction::{count_entries, extract_record, Record, SelectorProfile, COLUMNS};
use anyhow::{Context, Result};
use std::path::Path;

pub async fn run(file: &Path, selectors: Option<&Path>) -> Result<()> {
    let html = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let profile = SelectorProfile::resolve(selectors)?.compile()?;

    let entries = count_entries(&html, &profile);
    let record = extract_record(&html, &profile);

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "file": file,
            "entries": entries.as_ref().ok(),
            "anchor_error": entries.as_ref().err().map(ToString::to_string),
            "record": record,
        }));
        return Ok(());
    }

    let s = Styled::new();
    match &entries {
        Ok(n) => output::print_check(s.ok_sym(), "Question list", &format!("{n} entries")),
        Err(e) => output::print_check(s.fail_sym(), "Question list", &e.to_string()),
    }
    match &record {
        Some(record) => {
            output::print_check(s.ok_sym(), "Detail panel", record.result.label());
            print_record(&s, record);
        }
        None => output::print_check(s.fail_sym(), "Detail panel", "not found"),
    }
    Ok(())
}

fn print_record(s: &Styled, record: &Record) {
    println!();
    for (name, value) in COLUMNS.iter().zip(record.fields()) {
        let value = if value.is_empty() {
            s.dim("(empty)")
        } else {
            value.to_string()
        };
        println!("  {}  {value}", s.bold(name));
    }
}
