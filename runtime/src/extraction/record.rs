// Copyright 2026 ly-exam Contributors
// SPDX-License-Identifier: Apache-2.0

//! The scraped question record and its derived result.

use serde::{Deserialize, Serialize};

/// Text shown in the selected-answer slot when nothing was submitted.
pub const UNANSWERED_SENTINEL: &str = "未答题";

/// Separator placed between labelled options.
pub const OPTION_SEPARATOR: &str = " | ";

/// CSV column names, in export order.
pub const COLUMNS: [&str; 7] = [
    "题型",
    "题干",
    "选项",
    "正确答案",
    "我的答案",
    "题目解析",
    "结果",
];

/// Outcome of one question, derived from the two answer fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerResult {
    #[serde(rename = "正确")]
    Correct,
    #[serde(rename = "错误")]
    Incorrect,
    #[serde(rename = "未答题")]
    Unanswered,
}

impl AnswerResult {
    /// Judge a question from its correct answer and the submitted answer.
    ///
    /// Unanswered when the submitted answer is empty or the sentinel text;
    /// otherwise an exact string comparison.
    pub fn judge(correct_answer: &str, my_answer: &str) -> Self {
        if my_answer.is_empty() || my_answer == UNANSWERED_SENTINEL {
            Self::Unanswered
        } else if my_answer == correct_answer {
            Self::Correct
        } else {
            Self::Incorrect
        }
    }

    /// The label written to the result column.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Correct => "正确",
            Self::Incorrect => "错误",
            Self::Unanswered => "未答题",
        }
    }
}

impl std::fmt::Display for AnswerResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One scraped question result.
///
/// Serde names follow the CSV header so exported files read back directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "题型")]
    pub question_type: String,
    #[serde(rename = "题干")]
    pub question_content: String,
    #[serde(rename = "选项")]
    pub options: String,
    #[serde(rename = "正确答案")]
    pub correct_answer: String,
    #[serde(rename = "我的答案")]
    pub my_answer: String,
    #[serde(rename = "题目解析")]
    pub analysis: String,
    #[serde(rename = "结果")]
    pub result: AnswerResult,
}

impl Record {
    /// Build a record, deriving `result` from the answer fields.
    pub fn new(
        question_type: String,
        question_content: String,
        options: String,
        correct_answer: String,
        my_answer: String,
        analysis: String,
    ) -> Self {
        let result = AnswerResult::judge(&correct_answer, &my_answer);
        Self {
            question_type,
            question_content,
            options,
            correct_answer,
            my_answer,
            analysis,
            result,
        }
    }

    /// Field values in column order.
    pub fn fields(&self) -> [&str; 7] {
        [
            &self.question_type,
            &self.question_content,
            &self.options,
            &self.correct_answer,
            &self.my_answer,
            &self.analysis,
            self.result.label(),
        ]
    }
}

/// Render option texts as `A: first | B: second | ...`.
///
/// Labels past `Z` continue through the following code points.
pub fn label_options<S: AsRef<str>>(texts: &[S]) -> String {
    texts
        .iter()
        .enumerate()
        .map(|(idx, text)| {
            let letter = char::from_u32(65 + idx as u32).unwrap_or('?');
            format!("{letter}: {}", text.as_ref())
        })
        .collect::<Vec<_>>()
        .join(OPTION_SEPARATOR)
}
