// Copyright 2026 ly-exam Contributors
// SPDX-License-Identifier: Apache-2.0

//! `ly-exam review`: analysis over every collected export.

use super::output::{self, Styled};
use crate::config;
use crate::export;
use crate::review::estimate::{self, BankEstimate, Coverage, OUTLIER_SIGMAS};
use crate::review::markdown::{self, BANK_TITLE, INCORRECT_TITLE};
use crate::review::{self, ExamFile};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Coverage above which the full question bank is written.
pub const BANK_COVERAGE_THRESHOLD: f64 = 0.9;

pub const INCORRECT_CSV: &str = "incorrect.csv";
pub const INCORRECT_MD: &str = "incorrect.md";
pub const BANK_MD: &str = "question_bank.md";

pub struct ReviewOptions {
    pub records_dir: Option<PathBuf>,
    pub downloads_dir: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub collect: bool,
}

/// Everything one review produced.
#[derive(Debug, Serialize)]
pub struct ReviewReport {
    pub records_dir: PathBuf,
    pub collected: Vec<PathBuf>,
    pub exports: Vec<PathBuf>,
    pub estimate: Option<BankEstimate>,
    pub coverage: Coverage,
    pub written: Vec<PathBuf>,
}

/// Collect, load, estimate and write the review books into `out_dir`.
pub fn review(
    records_dir: &Path,
    downloads_dir: Option<&Path>,
    out_dir: &Path,
) -> Result<ReviewReport> {
    let collected = match downloads_dir {
        Some(downloads) => review::collect_downloads(downloads, records_dir)?,
        None => Vec::new(),
    };

    let paths = review::list_exports(records_dir)?;
    let files = paths
        .iter()
        .map(|p| ExamFile::load(p))
        .collect::<Result<Vec<_>, _>>()?;
    info!(exports = files.len(), "loaded exports");

    let estimate = estimate::estimate_bank(&files);
    let coverage = estimate::coverage(&files, estimate.as_ref());

    let mut written = Vec::new();
    if !files.is_empty() {
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("failed to create {}", out_dir.display()))?;

        let incorrect = review::incorrect_questions(&files);
        let csv_path = out_dir.join(INCORRECT_CSV);
        write(&csv_path, &export::to_csv_bytes(&incorrect)?)?;
        written.push(csv_path);

        let md_path = out_dir.join(INCORRECT_MD);
        write(&md_path, markdown::render_book(INCORRECT_TITLE, &incorrect).as_bytes())?;
        written.push(md_path);

        if coverage
            .coverage_rate
            .is_some_and(|rate| rate > BANK_COVERAGE_THRESHOLD)
        {
            let bank = review::distinct_questions(&files);
            let bank_path = out_dir.join(BANK_MD);
            write(&bank_path, markdown::render_book(BANK_TITLE, &bank).as_bytes())?;
            written.push(bank_path);
        }
    }

    Ok(ReviewReport {
        records_dir: records_dir.to_path_buf(),
        collected,
        exports: paths,
        estimate,
        coverage,
        written,
    })
}

fn write(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "wrote review file");
    Ok(())
}

pub async fn run(options: ReviewOptions) -> Result<()> {
    let records_dir = config::resolve_records_dir(options.records_dir);
    let out_dir = config::resolve_review_dir(options.out_dir);
    let downloads = options
        .collect
        .then(|| options.downloads_dir.unwrap_or_else(config::downloads_dir));

    let report = review(&records_dir, downloads.as_deref(), &out_dir)?;

    if output::is_json() {
        output::print_json(&serde_json::to_value(&report)?);
        return Ok(());
    }
    print_report(&report);
    Ok(())
}

fn print_report(report: &ReviewReport) {
    let s = Styled::new();
    if !report.collected.is_empty() {
        println!("已从下载目录收集 {} 份导出", report.collected.len());
    }
    match report.exports.len() {
        0 => {
            println!(
                "没有找到导出记录 ({})",
                s.dim(&report.records_dir.display().to_string())
            );
            return;
        }
        1 => println!("目前只有一次考试记录，无法估算题库总量"),
        _ => {}
    }

    match &report.estimate {
        Some(bank) => print_estimate(&s, bank, report.exports.len(), &report.coverage),
        None if report.exports.len() > 1 => {
            println!("\n无法估算题库总量，所有对比都没有重复题目")
        }
        None => {}
    }

    if !output::is_quiet() {
        println!();
        for path in &report.written {
            println!("  {} {}", s.ok_sym(), path.display());
        }
    }
}

fn print_estimate(s: &Styled, bank: &BankEstimate, exports: usize, coverage: &Coverage) {
    if !output::is_quiet() {
        println!("\n题库总量估算原理:");
        println!("基于捕获-再捕获方法(Capture-Recapture Method)进行估算");
        println!("计算公式: N = (C₁ × C₂) ÷ M");
        println!("其中:");
        println!("N: 题库总量");
        println!("C₁: 第一次抽取的题目数量");
        println!("C₂: 第二次抽取的题目数量");
        println!("M: 两次抽取中重复出现的题目数量");

        println!("\n题库总量多次估算结果:");
        for (i, pair) in bank.pairs.iter().enumerate() {
            let note = if bank.is_outlier(pair.estimate) {
                s.yellow(" (异常值)")
            } else {
                String::new()
            };
            println!(
                "第{}次估算 (对比第{}份和第{}份文件): {} 道题{note}",
                i + 1,
                pair.first + 1,
                pair.second + 1,
                pair.estimate as u64
            );
        }

        println!("\n统计结果:");
        println!("平均值: {} 道题", bank.mean as u64);
        println!("标准差: {} 道题", bank.std_dev as u64);
        println!("最小值: {} 道题", bank.min as u64);
        println!("最大值: {} 道题", bank.max as u64);
        println!("估算次数: {} 次", bank.pairs.len());
    }

    println!("\n结论:");
    println!("整个题库大约有 {} 道题 (基于 {exports} 份导出)", bank.total());
    match coverage.coverage_rate {
        Some(rate) => println!(
            "目前已刷到 {} 道不同的题 (覆盖率{:.1}%)",
            coverage.seen,
            rate * 100.0
        ),
        None => println!("目前已刷到 {} 道不同的题", coverage.seen),
    }
    if let Some(rate) = coverage.incorrect_rate {
        println!(
            "其中错题集积累了 {} 道题 (错误率{:.1}%)",
            coverage.incorrect,
            rate * 100.0
        );
    }
    if coverage
        .coverage_rate
        .is_some_and(|rate| rate > BANK_COVERAGE_THRESHOLD)
    {
        println!(
            "{}",
            s.green(&format!(
                "题库覆盖率已超过{:.0}%，已生成题库",
                BANK_COVERAGE_THRESHOLD * 100.0
            ))
        );
    }

    let max_deviation = bank.max_deviation();
    if max_deviation > OUTLIER_SIGMAS {
        println!(
            "\n{} 注意: 部分估算值的偏差超过{OUTLIER_SIGMAS}个标准差，可能存在以下原因：",
            s.warn_sym()
        );
        println!("1. 题库在期间可能发生了变化");
        println!("2. 抽题规则可能发生了变化");
        println!("3. 样本量可能不够大");
        println!("4. 最大偏差为 {max_deviation:.1} 个标准差");
    }
}
