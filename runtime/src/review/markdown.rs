// Copyright 2026 ly-exam Contributors
// SPDX-License-Identifier: Apache-2.0

//! Markdown review books grouped by question type.

use crate::extraction::{Record, OPTION_SEPARATOR};
use std::collections::BTreeMap;

/// Title of the incorrect-question book.
pub const INCORRECT_TITLE: &str = "瓴羊模拟考错题集";

/// Title of the full question bank.
pub const BANK_TITLE: &str = "瓴羊模拟考题库";

/// Render `records` as a book: a count, then one section per question type
/// (sorted), each question with its options, answer and analysis.
pub fn render_book(title: &str, records: &[Record]) -> String {
    let mut by_type: BTreeMap<&str, Vec<&Record>> = BTreeMap::new();
    for record in records {
        by_type
            .entry(record.question_type.as_str())
            .or_default()
            .push(record);
    }

    let mut parts = vec![
        format!("# {title}\n"),
        format!("总共 {} 道题\n\n---\n", records.len()),
    ];
    for (question_type, questions) in by_type {
        parts.push(format!("\n# {question_type}\n"));
        parts.push(format!("共 {} 道题\n\n---\n", questions.len()));
        for record in questions {
            parts.push(format!("## {}\n", record.question_content));
            // Two trailing spaces force a Markdown line break per option.
            parts.push(format!(
                "{}\n",
                record.options.replace(OPTION_SEPARATOR, "  \n")
            ));
            parts.push(format!("正确答案：{}\n", record.correct_answer));
            parts.push(format!("题目解析：  \n{}\n", record.analysis));
            parts.push("---\n".to_string());
        }
    }
    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(question_type: &str, content: &str) -> Record {
        Record::new(
            question_type.into(),
            content.into(),
            "A: 1 | B: 2".into(),
            "B".into(),
            "A".into(),
            "because".into(),
        )
    }

    #[test]
    fn test_book_groups_by_sorted_type() {
        let book = render_book(
            INCORRECT_TITLE,
            &[
                record("单选题", "q1"),
                record("判断题", "q2"),
                record("单选题", "q3"),
            ],
        );

        assert!(book.starts_with("# 瓴羊模拟考错题集\n\n总共 3 道题\n"));
        let single = book.find("# 单选题").unwrap();
        let judge = book.find("# 判断题").unwrap();
        // BTreeMap order is by code point: 判 (U+5224) < 单 (U+5355).
        assert!(judge < single);
        assert!(book.contains("共 2 道题"));
        assert!(book.find("## q1").unwrap() < book.find("## q3").unwrap());
    }

    #[test]
    fn test_options_become_line_breaks() {
        let book = render_book(BANK_TITLE, &[record("单选题", "q1")]);
        assert!(book.contains("A: 1  \nB: 2\n"));
        assert!(book.contains("正确答案：B\n"));
        assert!(book.contains("题目解析：  \nbecause\n"));
    }

    #[test]
    fn test_empty_book() {
        let book = render_book(BANK_TITLE, &[]);
        assert_eq!(book, "# 瓴羊模拟考题库\n\n总共 0 道题\n\n---\n");
    }
}
