// Copyright 2026 ly-exam Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use ly_exam::cli;
use ly_exam::cli::output::{JSON_ENV, NO_COLOR_ENV, QUIET_ENV};
use ly_exam::cli::review_cmd::ReviewOptions;
use ly_exam::cli::BrowserArgs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ly-exam",
    about = "Export answer records from the exam review page to CSV",
    version,
    after_help = "Run 'ly-exam <command> --help' for details on each command."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk the review page once and write the CSV
    Export {
        #[command(flatten)]
        browser: BrowserArgs,
        /// Directory for the CSV (default: current directory)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Add an export button to the review page and export on every click
    Watch {
        #[command(flatten)]
        browser: BrowserArgs,
        /// Directory for the CSVs (default: current directory)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Extract the record shown in a saved review page
    Extract {
        /// Saved HTML of the review page
        file: PathBuf,
        /// JSON file overriding selector roles
        #[arg(long)]
        selectors: Option<PathBuf>,
    },
    /// Estimate the question bank and build the incorrect-question book
    Review {
        /// Directory of collected exports
        #[arg(long)]
        records_dir: Option<PathBuf>,
        /// Where to collect new exports from (default: the Downloads folder)
        #[arg(long)]
        downloads_dir: Option<PathBuf>,
        /// Directory for incorrect.csv and the Markdown books (default: ~/.ly-exam)
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Do not move new exports out of the downloads folder
        #[arg(long)]
        no_collect: bool,
    },
    /// Check environment and diagnose issues
    Doctor {
        /// JSON file overriding selector roles
        #[arg(long)]
        selectors: Option<PathBuf>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global flags via environment variables so all modules can check them
    if cli.json {
        std::env::set_var(JSON_ENV, "1");
    }
    if cli.quiet {
        std::env::set_var(QUIET_ENV, "1");
    }
    if cli.no_color {
        std::env::set_var(NO_COLOR_ENV, "1");
    }
    cli::init_tracing(cli.verbose, cli.quiet)?;

    let result = match cli.command {
        Commands::Export { browser, out_dir } => cli::export_cmd::run(&browser, out_dir).await,
        Commands::Watch { browser, out_dir } => cli::watch_cmd::run(&browser, out_dir).await,
        Commands::Extract { file, selectors } => {
            cli::extract_cmd::run(&file, selectors.as_deref()).await
        }
        Commands::Review {
            records_dir,
            downloads_dir,
            out_dir,
            no_collect,
        } => {
            cli::review_cmd::run(ReviewOptions {
                records_dir,
                downloads_dir,
                out_dir,
                collect: !no_collect,
            })
            .await
        }
        Commands::Doctor { selectors } => cli::doctor::run(selectors.as_deref()).await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "ly-exam", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if cli::output::is_json() {
            cli::output::print_json(&serde_json::json!({
                "error": true,
                "message": format!("{e:#}"),
            }));
        } else {
            eprintln!("  Error: {e:#}");
        }
        std::process::exit(1);
    }

    result
}
