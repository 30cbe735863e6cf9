// Copyright (c) The validation-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Human-readable output for runs and comparisons.

use crate::{
    compare::{BaselineComparison, ComparisonReport, CountChange, TestFinding},
    helpers::plural,
    run_result::RunResult,
};
use owo_colors::{OwoColorize, Style};
use std::fmt;

/// Styles for displaying runs and comparisons.
#[derive(Clone, Debug, Default)]
pub struct Styles {
    /// Style for branch and commit identifiers.
    pub vcs: Style,
    /// Style for counts and numbers.
    pub count: Style,
    /// Style for regressions.
    pub regression: Style,
    /// Style for warnings.
    pub warning: Style,
    /// Style for a clean comparison.
    pub passed: Style,
    /// Style for test command lines.
    pub command_line: Style,
}

impl Styles {
    /// Colorizes the styles for terminal output.
    pub fn colorize(&mut self) {
        self.vcs = Style::new().bold().purple();
        self.count = Style::new().bold();
        self.regression = Style::new().bold().red();
        self.warning = Style::new().bold().yellow();
        self.passed = Style::new().bold().green();
        self.command_line = Style::new().cyan();
    }
}

impl RunResult {
    /// Returns a display wrapper that prints aggregate statistics for this run.
    pub fn display_stats<'a>(&'a self, styles: &'a Styles) -> DisplayRunStats<'a> {
        DisplayRunStats { run: self, styles }
    }
}

/// A display wrapper for the statistics of a [`RunResult`].
///
/// Returned by [`RunResult::display_stats`].
#[derive(Clone, Debug)]
pub struct DisplayRunStats<'a> {
    run: &'a RunResult,
    styles: &'a Styles,
}

impl fmt::Display for DisplayRunStats<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let run = self.run;
        let styles = self.styles;
        let counters = run.counters();

        writeln!(f, "validation result for {}", run.vcs().style(styles.vcs))?;
        writeln!(
            f,
            "  passed {}/{} validation {}",
            run.passed_tests().style(styles.count),
            run.total_tests().style(styles.count),
            plural::tests_str(run.total_tests()),
        )?;
        writeln!(
            f,
            "  executed {} total {}",
            counters.total_instr.style(styles.count),
            plural::instructions_str(counters.total_instr),
        )?;
        writeln!(
            f,
            "  executed {} unique {}",
            run.unique_instr().style(styles.count),
            plural::instructions_str(run.unique_instr()),
        )?;
        writeln!(
            f,
            "  encountered {} memory access {} ({} unique)",
            counters.memaccess_error.style(styles.count),
            plural::errors_str(counters.memaccess_error),
            run.memaccess_unique().len().style(styles.count),
        )?;
        writeln!(
            f,
            "  encountered {} total {}:",
            counters.errors.style(styles.count),
            plural::errors_str(counters.errors),
        )?;
        write_breakdown(
            f,
            styles,
            counters.no_impact_err,
            counters.non_critical_err,
            counters.critical_err,
        )?;
        writeln!(
            f,
            "  encountered {} total error {}:",
            counters.cascades.style(styles.count),
            plural::cascades_str(counters.cascades),
        )?;
        write_breakdown(
            f,
            styles,
            counters.no_impact_casc,
            counters.non_critical_casc,
            counters.critical_casc,
        )
    }
}

fn write_breakdown(
    f: &mut fmt::Formatter<'_>,
    styles: &Styles,
    no_impact: u64,
    non_critical: u64,
    critical: u64,
) -> fmt::Result {
    writeln!(f, "      no impact: {}", no_impact.style(styles.count))?;
    writeln!(f, "      non-critical: {}", non_critical.style(styles.count))?;
    writeln!(f, "      critical: {}", critical.style(styles.count))
}

impl ComparisonReport {
    /// Returns a display wrapper that prints every finding and a summary line.
    pub fn display<'a>(&'a self, styles: &'a Styles) -> DisplayComparisonReport<'a> {
        DisplayComparisonReport {
            report: self,
            styles,
        }
    }
}

/// A display wrapper for a [`ComparisonReport`].
///
/// Returned by [`ComparisonReport::display`].
#[derive(Clone, Debug)]
pub struct DisplayComparisonReport<'a> {
    report: &'a ComparisonReport,
    styles: &'a Styles,
}

impl fmt::Display for DisplayComparisonReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        let styles = self.styles;

        writeln!(f, "comparing with validation run from {}", report.baseline().style(styles.vcs))?;

        for finding in report.findings() {
            match finding {
                TestFinding::Regression {
                    command_line,
                    current_retcode,
                    binary_hash_changed,
                } => {
                    writeln!(
                        f,
                        "  {}: {} (exit code {current_retcode})",
                        "REGRESSION".style(styles.regression),
                        command_line.style(styles.command_line),
                    )?;
                    write_binary_hash_note(f, styles, *binary_hash_changed)?;
                }
                TestFinding::IncreasedErrors {
                    command_line,
                    errors,
                    no_impact_err,
                    non_critical_err,
                    binary_hash_changed,
                } => {
                    writeln!(
                        f,
                        "  {}: increased error count on {}: {}",
                        "WARNING".style(styles.warning),
                        command_line.style(styles.command_line),
                        DisplayCountChange(errors, styles),
                    )?;
                    if let Some(change) = no_impact_err {
                        writeln!(
                            f,
                            "      no impact errors increased: {}",
                            DisplayCountChange(change, styles),
                        )?;
                    }
                    if let Some(change) = non_critical_err {
                        writeln!(
                            f,
                            "      non-critical errors increased: {}",
                            DisplayCountChange(change, styles),
                        )?;
                    }
                    write_binary_hash_note(f, styles, *binary_hash_changed)?;
                }
            }
        }

        let regressions = report.regression_count();
        if regressions == 0 {
            writeln!(f, "{}", "no regressions".style(styles.passed))
        } else {
            writeln!(
                f,
                "{} {} encountered",
                regressions.style(styles.regression),
                plural::regressions_str(regressions).style(styles.regression),
            )
        }
    }
}

fn write_binary_hash_note(
    f: &mut fmt::Formatter<'_>,
    styles: &Styles,
    binary_hash_changed: bool,
) -> fmt::Result {
    if binary_hash_changed {
        writeln!(
            f,
            "      {}: binary hashes are not the same",
            "note".style(styles.warning),
        )?;
    }
    Ok(())
}

struct DisplayCountChange<'a>(&'a CountChange, &'a Styles);

impl fmt::Display for DisplayCountChange<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self(change, styles) = self;
        write!(
            f,
            "{} -> {}",
            change.baseline.style(styles.count),
            change.current.style(styles.count),
        )
    }
}

impl BaselineComparison {
    /// Returns a display wrapper for this comparison.
    pub fn display<'a>(&'a self, styles: &'a Styles) -> DisplayBaselineComparison<'a> {
        DisplayBaselineComparison {
            comparison: self,
            styles,
        }
    }
}

/// A display wrapper for a [`BaselineComparison`].
///
/// Returned by [`BaselineComparison::display`].
#[derive(Clone, Debug)]
pub struct DisplayBaselineComparison<'a> {
    comparison: &'a BaselineComparison,
    styles: &'a Styles,
}

impl fmt::Display for DisplayBaselineComparison<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.comparison {
            BaselineComparison::Compared(report) => {
                write!(f, "{}", report.display(self.styles))
            }
            BaselineComparison::NoPreviousRun { branches_tried } => {
                writeln!(
                    f,
                    "no previous run to compare with (looked up: {})",
                    branches_tried.join(", ").style(self.styles.vcs),
                )
            }
        }
    }
}
