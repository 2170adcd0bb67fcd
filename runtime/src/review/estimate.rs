// Copyright 2026 ly-exam Contributors
// SPDX-License-Identifier: Apache-2.0

//! Question-bank size estimation by capture–recapture.
//!
//! Each exam draws a sample from the bank. For two consecutive exports with
//! `C1` and `C2` distinct questions of which `M` appear in both, the
//! Lincoln–Petersen estimate of the bank size is `N = C1 × C2 / M`. Every
//! consecutive pair yields one estimate; the spread across pairs hints at
//! whether the bank or the draw rules changed.

use super::ExamFile;
use crate::extraction::AnswerResult;
use serde::Serialize;
use std::collections::HashSet;

/// Estimates more than this many standard deviations from the mean are flagged.
pub const OUTLIER_SIGMAS: f64 = 2.0;

/// One estimate from a pair of consecutive exports (indices into the list).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairEstimate {
    pub first: usize,
    pub second: usize,
    pub estimate: f64,
}

/// Summary over every pair that shared at least one question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BankEstimate {
    pub pairs: Vec<PairEstimate>,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl BankEstimate {
    /// Estimated bank size, rounded down.
    pub fn total(&self) -> u64 {
        self.mean.floor() as u64
    }

    /// Distance from the mean in standard deviations; zero when all agree.
    pub fn deviation(&self, estimate: f64) -> f64 {
        if self.std_dev == 0.0 {
            0.0
        } else {
            (estimate - self.mean).abs() / self.std_dev
        }
    }

    pub fn is_outlier(&self, estimate: f64) -> bool {
        self.deviation(estimate) > OUTLIER_SIGMAS
    }

    /// Largest deviation among the pair estimates.
    pub fn max_deviation(&self) -> f64 {
        self.pairs
            .iter()
            .map(|p| self.deviation(p.estimate))
            .fold(0.0, f64::max)
    }
}

/// `C1 × C2 / M`, or `None` when the exports share no question.
pub fn estimate_pair(first: &ExamFile, second: &ExamFile) -> Option<f64> {
    let seen = first.contents();
    let recaptured = second
        .records
        .iter()
        .filter(|r| seen.contains(r.question_content.as_str()))
        .count();
    if recaptured == 0 {
        return None;
    }
    Some((first.records.len() * second.records.len()) as f64 / recaptured as f64)
}

/// Estimate the bank size from consecutive export pairs.
///
/// `None` with fewer than two exports or when no pair overlaps.
pub fn estimate_bank(files: &[ExamFile]) -> Option<BankEstimate> {
    let pairs: Vec<PairEstimate> = files
        .windows(2)
        .enumerate()
        .filter_map(|(i, pair)| {
            estimate_pair(&pair[0], &pair[1]).map(|estimate| PairEstimate {
                first: i,
                second: i + 1,
                estimate,
            })
        })
        .collect();
    if pairs.is_empty() {
        return None;
    }

    let n = pairs.len() as f64;
    let mean = pairs.iter().map(|p| p.estimate).sum::<f64>() / n;
    let variance = pairs
        .iter()
        .map(|p| (p.estimate - mean).powi(2))
        .sum::<f64>()
        / n;
    let min = pairs.iter().map(|p| p.estimate).fold(f64::INFINITY, f64::min);
    let max = pairs
        .iter()
        .map(|p| p.estimate)
        .fold(f64::NEG_INFINITY, f64::max);

    Some(BankEstimate {
        pairs,
        mean,
        std_dev: variance.sqrt(),
        min,
        max,
    })
}

/// How much of the bank has been seen so far.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coverage {
    /// Distinct questions across all exports.
    pub seen: usize,
    /// Distinct questions answered incorrectly in at least one export.
    pub incorrect: usize,
    /// `seen / estimated total`, when an estimate exists.
    pub coverage_rate: Option<f64>,
    /// `incorrect / seen`, when anything was seen.
    pub incorrect_rate: Option<f64>,
}

pub fn coverage(files: &[ExamFile], estimate: Option<&BankEstimate>) -> Coverage {
    let mut seen = HashSet::new();
    let mut incorrect = HashSet::new();
    for record in files.iter().flat_map(|f| &f.records) {
        seen.insert(record.question_content.as_str());
        if record.result == AnswerResult::Incorrect {
            incorrect.insert(record.question_content.as_str());
        }
    }

    let coverage_rate = estimate
        .map(BankEstimate::total)
        .filter(|&total| total > 0)
        .map(|total| seen.len() as f64 / total as f64);
    let incorrect_rate = (!seen.is_empty()).then(|| incorrect.len() as f64 / seen.len() as f64);

    Coverage {
        seen: seen.len(),
        incorrect: incorrect.len(),
        coverage_rate,
        incorrect_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::test_support::record;

    fn file(contents: &[&str]) -> ExamFile {
        ExamFile {
            path: "x".into(),
            records: contents.iter().map(|c| record(c, "正确")).collect(),
        }
    }

    fn range(prefix: &str, from: usize, to: usize) -> Vec<String> {
        (from..to).map(|i| format!("{prefix}{i}")).collect()
    }

    fn file_of(contents: &[String]) -> ExamFile {
        let refs: Vec<&str> = contents.iter().map(String::as_str).collect();
        file(&refs)
    }

    #[test]
    fn test_lincoln_petersen() {
        let first = file_of(&range("q", 0, 50));
        let second = file_of(&range("q", 25, 75));
        assert_eq!(estimate_pair(&first, &second), Some(100.0));
    }

    #[test]
    fn test_disjoint_pair_has_no_estimate() {
        assert_eq!(estimate_pair(&file(&["a"]), &file(&["b"])), None);
    }

    #[test]
    fn test_single_export_has_no_estimate() {
        assert!(estimate_bank(&[file(&["a"])]).is_none());
    }

    #[test]
    fn test_bank_statistics() {
        // 4×4/2 = 8, then 4×4/4 = 4
        let files = vec![
            file(&["a", "b", "c", "d"]),
            file(&["a", "b", "e", "f"]),
            file(&["a", "b", "e", "f"]),
        ];
        let bank = estimate_bank(&files).unwrap();
        assert_eq!(bank.pairs.len(), 2);
        assert_eq!(bank.pairs[0].estimate, 8.0);
        assert_eq!(bank.pairs[1].estimate, 4.0);
        assert_eq!(bank.mean, 6.0);
        assert_eq!(bank.std_dev, 2.0);
        assert_eq!(bank.min, 4.0);
        assert_eq!(bank.max, 8.0);
        assert_eq!(bank.total(), 6);
        assert_eq!(bank.max_deviation(), 1.0);
        assert!(!bank.is_outlier(8.0));
    }

    #[test]
    fn test_agreeing_estimates_have_no_outliers() {
        let files = vec![file(&["a", "b"]), file(&["a", "c"])];
        let bank = estimate_bank(&files).unwrap();
        assert_eq!(bank.std_dev, 0.0);
        assert_eq!(bank.max_deviation(), 0.0);
        assert!(!bank.is_outlier(bank.pairs[0].estimate));
    }

    #[test]
    fn test_coverage_counts_distinct_and_ever_incorrect() {
        let files = vec![
            ExamFile {
                path: "a".into(),
                records: vec![record("q1", "正确"), record("q2", "错误")],
            },
            ExamFile {
                path: "b".into(),
                records: vec![record("q1", "错误"), record("q3", "正确")],
            },
        ];
        let bank = BankEstimate {
            pairs: vec![],
            mean: 6.5,
            std_dev: 0.0,
            min: 6.5,
            max: 6.5,
        };
        let cov = coverage(&files, Some(&bank));
        assert_eq!(cov.seen, 3);
        assert_eq!(cov.incorrect, 2);
        assert_eq!(cov.coverage_rate, Some(0.5));
        assert_eq!(cov.incorrect_rate, Some(2.0 / 3.0));
    }

    #[test]
    fn test_coverage_without_estimate() {
        let cov = coverage(&[], None);
        assert_eq!(cov.seen, 0);
        assert_eq!(cov.coverage_rate, None);
        assert_eq!(cov.incorrect_rate, None);
    }
}
