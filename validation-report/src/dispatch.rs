// Copyright (c) The validation-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command dispatch and execution.

use crate::{
    ExpectedError, Result,
    errors::ReportExitCode,
    output::{OutputContext, OutputOpts},
};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use tracing::{debug, info};
use validation_runner::{
    compare::compare,
    config::ValidationConfig,
    run_result::RunResult,
    test_result::TestResult,
    vcs::{UNKNOWN_REF, VcsInfo},
};

/// Summarize validation runs and detect regressions against a baseline.
///
/// Test results are read from JSON files containing an array of test result records.
#[derive(Debug, Parser)]
#[command(
    version,
    styles = crate::output::clap_styles::style(),
    max_term_width = 100
)]
pub struct ReportApp {
    #[clap(flatten)]
    output: OutputOpts,

    #[clap(subcommand)]
    command: Command,
}

impl ReportApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app, writing reports to `writer`.
    ///
    /// Returns the exit code.
    pub fn exec(self, output: OutputContext, writer: &mut dyn Write) -> Result<i32> {
        match self.command {
            Command::Summarize(opts) => opts.exec(output, writer),
            Command::Compare(opts) => opts.exec(output, writer),
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Aggregate test results into a run and print its statistics
    Summarize(SummarizeOpts),

    /// Compare test results against a baseline and report regressions
    ///
    /// Exits with code 1 if any test that passed in the baseline fails in the current run.
    Compare(CompareOpts),
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Repository options")]
struct RepoOpts {
    /// Repository to look up the branch and commit in [default: current directory]
    #[arg(long, value_name = "DIR")]
    repo: Option<Utf8PathBuf>,

    /// Config file [default: <repo>/.config/validation.toml]
    #[arg(long, value_name = "PATH")]
    config: Option<Utf8PathBuf>,
}

impl RepoOpts {
    fn repo_dir(&self) -> &Utf8Path {
        self.repo.as_deref().unwrap_or(Utf8Path::new("."))
    }

    fn load_config(&self) -> Result<ValidationConfig> {
        Ok(ValidationConfig::from_sources(
            self.repo_dir(),
            self.config.as_deref(),
        )?)
    }
}

#[derive(Debug, Args)]
struct SummarizeOpts {
    /// JSON file with the test results of the run
    #[arg(long, value_name = "FILE")]
    results: Utf8PathBuf,

    /// Also write the run record to this file, as JSON
    #[arg(long, value_name = "FILE")]
    record_out: Option<Utf8PathBuf>,

    #[clap(flatten)]
    repo: RepoOpts,
}

impl SummarizeOpts {
    fn exec(self, output: OutputContext, writer: &mut dyn Write) -> Result<i32> {
        let config = self.repo.load_config()?;
        let tests = read_test_results(&self.results)?;
        let run = RunResult::build_in_repo(self.repo.repo_dir(), &config, tests);

        write!(writer, "{}", run.display_stats(&output.stdout_styles()))
            .map_err(|err| ExpectedError::WriteOutputError { err })?;

        if let Some(record_out) = &self.record_out {
            write_record(record_out, &run)?;
            info!("wrote run record to {record_out}");
        }

        Ok(ReportExitCode::OK)
    }
}

#[derive(Debug, Args)]
struct CompareOpts {
    /// JSON file with the test results of the current run
    #[arg(long, value_name = "FILE")]
    current: Utf8PathBuf,

    /// JSON file with the test results of the baseline run
    #[arg(long, value_name = "FILE")]
    baseline: Utf8PathBuf,

    /// Branch the baseline was produced from [default: the configured fallback branch]
    #[arg(long, value_name = "NAME")]
    baseline_branch: Option<String>,

    /// Commit the baseline was produced from
    #[arg(long, value_name = "ID", default_value = UNKNOWN_REF)]
    baseline_commit: String,

    #[clap(flatten)]
    repo: RepoOpts,
}

impl CompareOpts {
    fn exec(self, output: OutputContext, writer: &mut dyn Write) -> Result<i32> {
        let config = self.repo.load_config()?;
        let current = RunResult::build_in_repo(
            self.repo.repo_dir(),
            &config,
            read_test_results(&self.current)?,
        );

        let baseline_branch = self
            .baseline_branch
            .unwrap_or_else(|| config.fallback_branch().to_owned());
        let baseline = RunResult::build(
            VcsInfo::new(baseline_branch, self.baseline_commit),
            read_test_results(&self.baseline)?,
        );

        let report = compare(&current, &baseline);
        let styles = output.stdout_styles();
        write!(
            writer,
            "{}{}",
            current.display_stats(&styles),
            report.display(&styles)
        )
        .map_err(|err| ExpectedError::WriteOutputError { err })?;

        if output.verbose {
            info!(
                "checked {} matching test pairs ({} warnings)",
                report.pairs_checked(),
                report.warning_count()
            );
        }

        if report.has_regressions() {
            Ok(ReportExitCode::REGRESSIONS_FOUND)
        } else {
            Ok(ReportExitCode::OK)
        }
    }
}

fn read_test_results(path: &Utf8Path) -> Result<Vec<TestResult>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|err| ExpectedError::results_read_error(path, err))?;
    let tests: Vec<TestResult> = serde_json::from_str(&contents)
        .map_err(|err| ExpectedError::results_parse_error(path, err))?;
    debug!("read {} test results from {path}", tests.len());
    Ok(tests)
}

fn write_record(path: &Utf8Path, run: &RunResult) -> Result<()> {
    let mut json = serde_json::to_string_pretty(&run.to_record())
        .map_err(|err| ExpectedError::RecordSerializeError { err })?;
    json.push('\n');
    std::fs::write(path, json).map_err(|err| ExpectedError::RecordWriteError {
        path: path.to_owned(),
        err,
    })
}
