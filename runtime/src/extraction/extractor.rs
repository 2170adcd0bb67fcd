// Copyright 2026 ly-exam Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTML readers for the review page.
//!
//! All entry points are synchronous and take HTML strings: `scraper`'s types
//! are `!Send`, so the walker fetches markup from the browser, then parses it
//! here without holding a document across an await point.

use super::profile::CompiledProfile;
use super::record::{label_options, Record};
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::debug;

/// A structural anchor the walk depends on is missing.
///
/// Messages are shown to the user verbatim in the page's language.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnchorError {
    #[error("未找到{0}")]
    MarkerNotFound(String),
    #[error("未找到题目列表")]
    QuestionListNotFound,
}

/// Count the question entries listed after the progress marker.
///
/// The marker is the first element in scope whose trimmed text equals the
/// marker text exactly; the list is its next element sibling.
pub fn count_entries(html: &str, profile: &CompiledProfile) -> Result<usize, AnchorError> {
    let document = Html::parse_document(html);

    let marker = document
        .select(&profile.progress_marker_scope)
        .find(|el| js_trim(&text_content(el)) == profile.progress_marker_text)
        .ok_or_else(|| AnchorError::MarkerNotFound(profile.progress_marker_text.clone()))?;

    let list = marker
        .next_siblings()
        .find_map(ElementRef::wrap)
        .ok_or(AnchorError::QuestionListNotFound)?;

    Ok(list.select(&profile.entry).count())
}

/// Read one record out of the first detail panel in `html`.
///
/// `html` may be a whole page or the panel's own outer HTML. Returns `None`
/// when no panel is present; missing fields inside a panel become empty
/// strings.
pub fn extract_record(html: &str, profile: &CompiledProfile) -> Option<Record> {
    let fragment = Html::parse_fragment(html);
    let panel = fragment.select(&profile.detail_panel).next()?;
    Some(read_panel(panel, profile))
}

fn read_panel(panel: ElementRef<'_>, profile: &CompiledProfile) -> Record {
    let first_text = |selector: &Selector| {
        panel
            .select(selector)
            .next()
            .map(|el| js_trim(&text_content(&el)).to_string())
            .unwrap_or_default()
    };

    let question_type = first_text(&profile.question_type);
    let question_content = first_text(&profile.question_content);

    let option_texts: Vec<String> = panel
        .select(&profile.option_text)
        .map(|el| js_trim(&text_content(&el)).to_string())
        .collect();
    let options = label_options(&option_texts);

    let correct_answer = first_text(&profile.correct_answer);
    let my_answer = first_text(&profile.selected_answer);

    let analysis = panel
        .select(&profile.analysis_block)
        .find(|el| js_trim(&text_content(el)).starts_with(&profile.analysis_prefix))
        .and_then(|block| block.select(&profile.analysis_label).next())
        .map(|label| js_trim(&text_content(&label)).to_string())
        .unwrap_or_default();

    debug!(
        question_type = %question_type,
        question_content = %question_content,
        option_count = option_texts.len(),
        correct_answer = %correct_answer,
        my_answer = %my_answer,
        analysis_len = analysis.chars().count(),
        "read detail panel"
    );

    Record::new(
        question_type,
        question_content,
        options,
        correct_answer,
        my_answer,
        analysis,
    )
}

/// Concatenated text of every descendant text node, like DOM `textContent`.
pub fn text_content(el: &ElementRef<'_>) -> String {
    el.text().collect()
}

/// Trim with JavaScript `String.prototype.trim` semantics, which also strips
/// the byte-order mark that Rust's `trim` keeps.
pub fn js_trim(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::profile::SelectorProfile;
    use crate::extraction::record::{AnswerResult, OPTION_SEPARATOR};

    fn profile() -> CompiledProfile {
        SelectorProfile::default().compile().unwrap()
    }

    const PANEL: &str = r#"
        <div class="_rightContent_a1b2">
          <div class="_questionType_x9"> 单选题 </div>
          <div class="_questionContent_x9">
            1+1=?
          </div>
          <div class="_options_q">
            <div class="_option_1"><span class="_optionText_k">1</span></div>
            <div class="_option_1"><span class="_optionText_k"> 2 </span></div>
          </div>
          <div class="_correctAnswers_z">正确答案：<span>B</span></div>
          <div class="_selectedAnswer_z">我的答案：<span>B</span></div>
          <div class="_analysis_w"><div>解析：<span> 一加一等于二 </span></div></div>
        </div>"#;

    #[test]
    fn test_extracts_single_choice_question() {
        let record = extract_record(PANEL, &profile()).expect("panel present");
        assert_eq!(record.question_type, "单选题");
        assert_eq!(record.question_content, "1+1=?");
        assert_eq!(record.options, "A: 1 | B: 2");
        assert_eq!(record.correct_answer, "B");
        assert_eq!(record.my_answer, "B");
        assert_eq!(record.analysis, "一加一等于二");
        assert_eq!(record.result, AnswerResult::Correct);
    }

    #[test]
    fn test_sentinel_answer_is_unanswered() {
        let html = PANEL.replace(
            r#"我的答案：<span>B</span>"#,
            r#"我的答案：<span>未答题</span>"#,
        );
        let record = extract_record(&html, &profile()).unwrap();
        assert_eq!(record.my_answer, "未答题");
        assert_eq!(record.result, AnswerResult::Unanswered);
    }

    #[test]
    fn test_missing_fields_degrade_to_empty() {
        let html = r#"<section class="_rightContent_1"><p>nothing here</p></section>"#;
        let record = extract_record(html, &profile()).unwrap();
        assert_eq!(record.question_type, "");
        assert_eq!(record.question_content, "");
        assert_eq!(record.options, "");
        assert_eq!(record.correct_answer, "");
        assert_eq!(record.my_answer, "");
        assert_eq!(record.analysis, "");
        assert_eq!(record.result, AnswerResult::Unanswered);
    }

    #[test]
    fn test_no_panel_is_none() {
        let html = r#"<div class="_leftContent_1">list</div>"#;
        assert!(extract_record(html, &profile()).is_none());
    }

    #[test]
    fn test_lookups_are_scoped_to_the_panel() {
        let html = r#"
            <div class="_questionType_outside">判断题</div>
            <div class="_rightContent_1">
              <div class="_questionContent_1">stem</div>
            </div>"#;
        let record = extract_record(html, &profile()).unwrap();
        assert_eq!(record.question_type, "");
        assert_eq!(record.question_content, "stem");
    }

    #[test]
    fn test_options_segments_are_sequentially_lettered() {
        let html = r#"
            <div class="_rightContent_1">
              <span class="_optionText_1">alpha</span>
              <span class="_optionText_1">beta, with comma</span>
              <span class="_optionText_1">gamma</span>
              <span class="_optionText_1">delta</span>
            </div>"#;
        let record = extract_record(html, &profile()).unwrap();
        let segments: Vec<&str> = record.options.split(OPTION_SEPARATOR).collect();
        assert_eq!(segments.len(), 4);
        for (idx, segment) in segments.iter().enumerate() {
            let letter = char::from(b'A' + idx as u8);
            assert!(segment.starts_with(&format!("{letter}: ")), "{segment}");
        }
    }

    #[test]
    fn test_analysis_requires_prefix() {
        let html = r#"
            <div class="_rightContent_1">
              <div>备注：<span>not analysis</span></div>
              <div>解析：<span>the reason</span></div>
            </div>"#;
        let record = extract_record(html, &profile()).unwrap();
        assert_eq!(record.analysis, "the reason");
    }

    #[test]
    fn test_analysis_block_without_label_is_empty() {
        let html = r#"<div class="_rightContent_1"><div>解析：plain text</div></div>"#;
        let record = extract_record(html, &profile()).unwrap();
        assert_eq!(record.analysis, "");
    }

    #[test]
    fn test_count_entries_after_marker() {
        let html = r#"
            <html><body>
              <div class="_title">考试进度详情</div>
              <div class="_list">
                <div class="_sheet_item_1">1</div>
                <div class="_sheet_item_1">2</div>
                <div class="_sheet_item_2">3</div>
                <div class="_other">x</div>
              </div>
            </body></html>"#;
        assert_eq!(count_entries(html, &profile()), Ok(3));
    }

    #[test]
    fn test_count_entries_missing_marker() {
        let html = "<html><body><div>答题卡</div><div></div></body></html>";
        assert_eq!(
            count_entries(html, &profile()),
            Err(AnchorError::MarkerNotFound("考试进度详情".to_string()))
        );
    }

    #[test]
    fn test_count_entries_missing_list() {
        let html = "<html><body><div><div> 考试进度详情 </div></div></body></html>";
        assert_eq!(
            count_entries(html, &profile()),
            Err(AnchorError::QuestionListNotFound)
        );
    }

    #[test]
    fn test_marker_must_match_exactly() {
        let html = r#"
            <html><body>
              <div>考试进度详情（共 3 题）</div><div><div class="_sheet_1"></div></div>
            </body></html>"#;
        assert!(matches!(
            count_entries(html, &profile()),
            Err(AnchorError::MarkerNotFound(_))
        ));
    }

    #[test]
    fn test_js_trim_strips_bom_and_nbsp() {
        assert_eq!(js_trim("\u{feff}\u{a0} text \n"), "text");
    }
}
