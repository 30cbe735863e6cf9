// Copyright (c) The validation-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Regression detection between two validation runs.
//!
//! Tests are matched across runs by their exact command and arguments (see
//! [`TestConfig::identity`](crate::test_result::TestConfig::identity)). Tests present in only one
//! run are never compared. For every matched pair:
//!
//! * If the test exited successfully in the baseline but not in the current run, that's a
//!   *regression*.
//! * Otherwise, if the current run reports more errors than the baseline, that's a warning.
//!
//! Only regressions are counted towards [`ComparisonReport::regression_count`].

use crate::{
    run_result::RunResult,
    store::RunStore,
    test_result::{TestIdentity, TestResult},
    vcs::VcsInfo,
};
use std::collections::HashMap;
use tracing::debug;

/// A change in a counter between the baseline and the current run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CountChange {
    /// The value in the baseline run.
    pub baseline: u64,

    /// The value in the current run.
    pub current: u64,
}

impl CountChange {
    fn increase(baseline: u64, current: u64) -> Option<Self> {
        (current > baseline).then_some(Self { baseline, current })
    }
}

/// The outcome of comparing one test across the baseline and current runs.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TestFinding {
    /// The test passed in the baseline but exits unsuccessfully in the current run.
    Regression {
        /// The command line of the test.
        command_line: String,

        /// The exit code in the current run.
        current_retcode: i32,

        /// Whether the tested binary differs between the two runs.
        binary_hash_changed: bool,
    },

    /// The test reports more errors in the current run than in the baseline.
    IncreasedErrors {
        /// The command line of the test.
        command_line: String,

        /// The change in the total error count.
        errors: CountChange,

        /// The change in no-impact errors, if they increased.
        no_impact_err: Option<CountChange>,

        /// The change in non-critical errors, if they increased.
        non_critical_err: Option<CountChange>,

        /// Whether the tested binary differs between the two runs.
        binary_hash_changed: bool,
    },
}

impl TestFinding {
    /// Returns true if this finding is a regression.
    pub fn is_regression(&self) -> bool {
        matches!(self, Self::Regression { .. })
    }

    /// Returns the command line of the test this finding is about.
    pub fn command_line(&self) -> &str {
        match self {
            Self::Regression { command_line, .. } | Self::IncreasedErrors { command_line, .. } => {
                command_line
            }
        }
    }

    fn check(baseline: &TestResult, current: &TestResult) -> Option<Self> {
        let binary_hash_changed = baseline.binary_hash != current.binary_hash;
        if baseline.retcode == 0 && current.retcode != 0 {
            return Some(Self::Regression {
                command_line: baseline.cfg.command_line(),
                current_retcode: current.retcode,
                binary_hash_changed,
            });
        }

        let (b, c) = (&baseline.counters, &current.counters);
        let errors = CountChange::increase(b.errors, c.errors)?;
        Some(Self::IncreasedErrors {
            command_line: baseline.cfg.command_line(),
            errors,
            no_impact_err: CountChange::increase(b.no_impact_err, c.no_impact_err),
            non_critical_err: CountChange::increase(b.non_critical_err, c.non_critical_err),
            binary_hash_changed,
        })
    }
}

/// The result of comparing a run against a baseline.
///
/// Returned by [`compare`].
#[derive(Clone, Debug)]
pub struct ComparisonReport {
    baseline: VcsInfo,
    pairs_checked: usize,
    findings: Vec<TestFinding>,
}

impl ComparisonReport {
    /// Returns the branch and commit of the baseline run.
    pub fn baseline(&self) -> &VcsInfo {
        &self.baseline
    }

    /// Returns the number of matched test pairs that were checked.
    pub fn pairs_checked(&self) -> usize {
        self.pairs_checked
    }

    /// Returns all findings, ordered by the baseline's test order.
    pub fn findings(&self) -> &[TestFinding] {
        &self.findings
    }

    /// Returns the number of regressions.
    pub fn regression_count(&self) -> usize {
        self.findings.iter().filter(|f| f.is_regression()).count()
    }

    /// Returns the number of tests with increased error counts.
    pub fn warning_count(&self) -> usize {
        self.findings.len() - self.regression_count()
    }

    /// Returns true if any regressions were found.
    pub fn has_regressions(&self) -> bool {
        self.findings.iter().any(TestFinding::is_regression)
    }
}

/// Compares `current` against `baseline`, test by test.
///
/// If a test identity occurs more than once in either run, every combination of matching tests is
/// checked.
pub fn compare(current: &RunResult, baseline: &RunResult) -> ComparisonReport {
    let mut current_by_identity: HashMap<TestIdentity<'_>, Vec<&TestResult>> = HashMap::new();
    for test in current.test_results() {
        current_by_identity
            .entry(test.cfg.identity())
            .or_default()
            .push(test);
    }

    let mut pairs_checked = 0;
    let mut findings = Vec::new();
    for baseline_test in baseline.test_results() {
        let Some(matches) = current_by_identity.get(&baseline_test.cfg.identity()) else {
            continue;
        };
        for current_test in matches {
            pairs_checked += 1;
            findings.extend(TestFinding::check(baseline_test, current_test));
        }
    }

    let report = ComparisonReport {
        baseline: baseline.vcs().clone(),
        pairs_checked,
        findings,
    };
    debug!(
        "compared {} against {}: {} pairs checked, {} regressions, {} warnings",
        current.vcs(),
        baseline.vcs(),
        report.pairs_checked,
        report.regression_count(),
        report.warning_count(),
    );
    report
}

/// The result of [`compare_with_last_run`].
#[derive(Clone, Debug)]
pub enum BaselineComparison {
    /// A baseline was found and compared against.
    Compared(ComparisonReport),

    /// No previous run was found on any of the branches tried, so nothing was compared.
    NoPreviousRun {
        /// The branches that were looked up, in order.
        branches_tried: Vec<String>,
    },
}

impl BaselineComparison {
    /// Returns the comparison report, if a baseline was found.
    pub fn report(&self) -> Option<&ComparisonReport> {
        match self {
            Self::Compared(report) => Some(report),
            Self::NoPreviousRun { .. } => None,
        }
    }

    /// Returns the number of regressions, or `None` if no baseline was found.
    pub fn regression_count(&self) -> Option<usize> {
        self.report().map(ComparisonReport::regression_count)
    }
}

/// Looks up a baseline for `current` in `store` and compares against it.
///
/// The baseline is the last run on `current`'s branch, or if there isn't one, the last run on
/// `fallback_branch`. If neither exists, returns [`BaselineComparison::NoPreviousRun`] without
/// comparing anything.
pub fn compare_with_last_run<S: RunStore + ?Sized>(
    current: &RunResult,
    store: &S,
    fallback_branch: &str,
) -> Result<BaselineComparison, S::Error> {
    let mut branches_tried = vec![current.branch().to_owned()];
    let mut baseline = store.get_last_run(current.branch())?;
    if baseline.is_none() && current.branch() != fallback_branch {
        debug!(
            "no previous run on {}, trying {fallback_branch}",
            current.branch()
        );
        branches_tried.push(fallback_branch.to_owned());
        baseline = store.get_last_run(fallback_branch)?;
    }

    match baseline {
        Some(baseline) => Ok(BaselineComparison::Compared(compare(current, &baseline))),
        None => Ok(BaselineComparison::NoPreviousRun { branches_tried }),
    }
}
