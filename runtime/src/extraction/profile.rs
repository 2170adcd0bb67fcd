// Copyright 2026 ly-exam Contributors
// SPDX-License-Identifier: Apache-2.0

//! Selector profile: the binding between semantic page roles and the review
//! page's markup.
//!
//! Every lookup the walker and extractor make goes through a role in this
//! profile, so a markup change on the host page is absorbed here. The default
//! profile targets the review page's CSS-module class names, which carry a
//! stable prefix followed by a build hash (`_questionType_1x2y3`), hence the
//! `[class^="..."]` prefix selectors.
//!
//! A JSON file can override any subset of roles; missing keys keep their
//! defaults.

use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or compiling a selector profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to read selector profile {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid selector profile {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid CSS selector for role `{role}`: {selector} ({reason})")]
    Selector {
        role: &'static str,
        selector: String,
        reason: String,
    },
}

/// Role → selector mapping for one markup convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorProfile {
    /// Exact trimmed text of the element that heads the question list.
    pub progress_marker_text: String,
    /// Elements considered when searching for the marker text.
    pub progress_marker_scope: String,
    /// Clickable question entries inside the list container.
    pub entry: String,
    /// The detail panel that re-renders after each click.
    pub detail_panel: String,
    pub question_type: String,
    pub question_content: String,
    /// Every option text element, in display order.
    pub option_text: String,
    /// Label inside the correct-answer container.
    pub correct_answer: String,
    /// Label inside the selected-answer container.
    pub selected_answer: String,
    /// Candidates for the analysis block.
    pub analysis_block: String,
    /// Text the analysis block starts with.
    pub analysis_prefix: String,
    /// Label inside the analysis block that holds the analysis text.
    pub analysis_label: String,
}

impl Default for SelectorProfile {
    fn default() -> Self {
        Self {
            progress_marker_text: "考试进度详情".to_string(),
            progress_marker_scope: "div".to_string(),
            entry: r#"[class^="_sheet_"]"#.to_string(),
            detail_panel: r#"[class^="_rightContent"]"#.to_string(),
            question_type: r#"[class^="_questionType"]"#.to_string(),
            question_content: r#"[class^="_questionContent"]"#.to_string(),
            option_text: r#"[class^="_optionText"]"#.to_string(),
            correct_answer: r#"[class^="_correctAnswers"] span"#.to_string(),
            selected_answer: r#"[class^="_selectedAnswer"] span"#.to_string(),
            analysis_block: "div".to_string(),
            analysis_prefix: "解析：".to_string(),
            analysis_label: "span".to_string(),
        }
    }
}

impl SelectorProfile {
    /// Load a profile from a JSON file, layering it over the defaults.
    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ProfileError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ProfileError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load `path` when given, otherwise the default profile.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ProfileError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Parse every CSS role once so lookups never re-parse.
    pub fn compile(&self) -> Result<CompiledProfile, ProfileError> {
        Ok(CompiledProfile {
            progress_marker_text: self.progress_marker_text.clone(),
            progress_marker_scope: parse("progress_marker_scope", &self.progress_marker_scope)?,
            entry: parse("entry", &self.entry)?,
            detail_panel: parse("detail_panel", &self.detail_panel)?,
            question_type: parse("question_type", &self.question_type)?,
            question_content: parse("question_content", &self.question_content)?,
            option_text: parse("option_text", &self.option_text)?,
            correct_answer: parse("correct_answer", &self.correct_answer)?,
            selected_answer: parse("selected_answer", &self.selected_answer)?,
            analysis_block: parse("analysis_block", &self.analysis_block)?,
            analysis_prefix: self.analysis_prefix.clone(),
            analysis_label: parse("analysis_label", &self.analysis_label)?,
        })
    }
}

fn parse(role: &'static str, selector: &str) -> Result<Selector, ProfileError> {
    Selector::parse(selector).map_err(|e| ProfileError::Selector {
        role,
        selector: selector.to_string(),
        reason: format!("{e:?}"),
    })
}

/// A selector profile with every CSS role parsed.
#[derive(Debug, Clone)]
pub struct CompiledProfile {
    pub progress_marker_text: String,
    pub progress_marker_scope: Selector,
    pub entry: Selector,
    pub detail_panel: Selector,
    pub question_type: Selector,
    pub question_content: Selector,
    pub option_text: Selector,
    pub correct_answer: Selector,
    pub selected_answer: Selector,
    pub analysis_block: Selector,
    pub analysis_prefix: String,
    pub analysis_label: Selector,
}
