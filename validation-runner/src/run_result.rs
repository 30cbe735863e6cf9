// Copyright (c) The validation-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Run-level aggregates over a batch of test results.
//!
//! A [`RunResult`] is constructed in one of two ways:
//!
//! * [`RunResult::build`] aggregates a fresh batch of [`TestResult`]s and keeps them, so the run
//!   can be exported and compared test by test.
//! * [`RunResult::from_record`] rehydrates a persisted [`RunRecord`]. Rehydrated runs carry the
//!   stored aggregates only and have no test results.
//!
//! A `RunResult` is never modified after construction.

use crate::{
    config::ValidationConfig,
    coverage::CoverageMap,
    errors::ExportError,
    store::RunStore,
    test_result::{TestResult, ValidationCounters},
    vcs::VcsInfo,
};
use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// The persisted form of a [`RunResult`].
///
/// Coverage maps are stored in their text log form (see [`crate::coverage`]), so that a store
/// doesn't need a schema for variable-length coverage data.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct RunRecord {
    /// The branch the run was produced from.
    pub branch: String,

    /// The commit the run was produced from.
    pub commit: String,

    /// Counters summed over qualifying tests.
    #[serde(flatten)]
    pub counters: ValidationCounters,

    /// The number of distinct instructions executed by qualifying tests.
    pub unique_instr: u64,

    /// The number of tests in the run.
    pub total_tests: u64,

    /// The number of qualifying tests in the run.
    pub passed_tests: u64,

    /// Merged instruction coverage in log form.
    pub coverage_log: String,

    /// Merged memory access errors per instruction in log form.
    pub memaccess_unique_log: String,
}

/// Aggregated results for a validation run.
#[derive(Clone, Debug)]
pub struct RunResult {
    vcs: VcsInfo,
    counters: ValidationCounters,
    unique_instr: u64,
    total_tests: u64,
    passed_tests: u64,
    coverage: CoverageMap,
    memaccess_unique: CoverageMap,
    coverage_log: String,
    memaccess_unique_log: String,
    origin: RunOrigin,
}

/// How a [`RunResult`] was constructed.
#[derive(Clone, Debug)]
pub enum RunOrigin {
    /// Aggregated from test results by [`RunResult::build`].
    Fresh {
        /// The test results the run was aggregated from.
        test_results: Vec<TestResult>,
    },

    /// Rehydrated from a stored record by [`RunResult::from_record`].
    Rehydrated,
}

impl RunResult {
    /// Aggregates `test_results` into a run.
    ///
    /// Every test counts towards [`total_tests`](Self::total_tests). Only qualifying tests (see
    /// [`TestResult::is_qualifying`]) contribute to the counters and coverage maps.
    pub fn build(vcs: VcsInfo, test_results: Vec<TestResult>) -> Self {
        let mut counters = ValidationCounters::default();
        let mut coverage = CoverageMap::new();
        let mut memaccess_unique = CoverageMap::new();
        let mut passed_tests = 0;

        for test in test_results.iter().filter(|test| test.is_qualifying()) {
            counters.accumulate(&test.counters);
            coverage.merge(&test.coverage);
            memaccess_unique.merge(&test.memaccess_unique);
            passed_tests += 1;
        }

        let total_tests = test_results.len() as u64;
        debug!("aggregated {passed_tests}/{total_tests} qualifying tests for {vcs}");

        Self {
            vcs,
            counters,
            unique_instr: coverage.len() as u64,
            total_tests,
            passed_tests,
            coverage_log: coverage.to_log(),
            memaccess_unique_log: memaccess_unique.to_log(),
            coverage,
            memaccess_unique,
            origin: RunOrigin::Fresh { test_results },
        }
    }

    /// Aggregates `test_results` into a run, looking up the branch and commit in `repo_dir`.
    ///
    /// If the lookup fails, the branch and commit are recorded as
    /// [`UNKNOWN_REF`](crate::vcs::UNKNOWN_REF).
    pub fn build_in_repo(
        repo_dir: &Utf8Path,
        config: &ValidationConfig,
        test_results: Vec<TestResult>,
    ) -> Self {
        let vcs = VcsInfo::query_or_unknown(repo_dir, config.vcs_program());
        Self::build(vcs, test_results)
    }

    /// Rehydrates a run from its stored record.
    ///
    /// The coverage logs are decoded back into maps. The returned run has no test results.
    pub fn from_record(record: RunRecord) -> Self {
        let RunRecord {
            branch,
            commit,
            counters,
            unique_instr,
            total_tests,
            passed_tests,
            coverage_log,
            memaccess_unique_log,
        } = record;

        let coverage = CoverageMap::from_log(&coverage_log);
        let memaccess_unique = CoverageMap::from_log(&memaccess_unique_log);
        if coverage.len() as u64 != unique_instr {
            warn!(
                "stored run {branch}:{commit} records {unique_instr} unique instructions, \
                 but its coverage log decodes to {}",
                coverage.len()
            );
        }

        Self {
            vcs: VcsInfo { branch, commit },
            counters,
            unique_instr,
            total_tests,
            passed_tests,
            coverage,
            memaccess_unique,
            coverage_log,
            memaccess_unique_log,
            origin: RunOrigin::Rehydrated,
        }
    }

    /// Returns the stored form of this run.
    pub fn to_record(&self) -> RunRecord {
        RunRecord {
            branch: self.vcs.branch.clone(),
            commit: self.vcs.commit.clone(),
            counters: self.counters,
            unique_instr: self.unique_instr,
            total_tests: self.total_tests,
            passed_tests: self.passed_tests,
            coverage_log: self.coverage_log.clone(),
            memaccess_unique_log: self.memaccess_unique_log.clone(),
        }
    }

    /// Writes this run to `store`: first the run-level record, then one record per test result.
    ///
    /// Returns the identifier the store assigned to the run. The first failing insert aborts the
    /// export; see [`ExportError`] for what has been written at that point.
    pub fn write_to_store<S: RunStore + ?Sized>(
        &self,
        store: &mut S,
    ) -> Result<S::RunId, ExportError<S::RunId, S::Error>> {
        let run_id = store
            .insert_run_result(&self.to_record())
            .map_err(ExportError::InsertRun)?;

        let test_results = self.test_results();
        for (index, test) in test_results.iter().enumerate() {
            if let Err(error) = store.insert_test_result(&run_id, test) {
                return Err(ExportError::InsertTest {
                    run_id,
                    index,
                    command_line: test.cfg.command_line(),
                    error,
                });
            }
        }

        debug!(
            "stored run {} as {run_id:?} with {} test results",
            self.vcs,
            test_results.len()
        );
        Ok(run_id)
    }

    /// Returns the branch and commit this run was produced from.
    pub fn vcs(&self) -> &VcsInfo {
        &self.vcs
    }

    /// Returns the branch this run was produced from.
    pub fn branch(&self) -> &str {
        &self.vcs.branch
    }

    /// Returns the commit this run was produced from.
    pub fn commit(&self) -> &str {
        &self.vcs.commit
    }

    /// Returns counters summed over qualifying tests.
    pub fn counters(&self) -> &ValidationCounters {
        &self.counters
    }

    /// Returns the number of distinct instructions executed by qualifying tests.
    pub fn unique_instr(&self) -> u64 {
        self.unique_instr
    }

    /// Returns the number of tests in the run.
    pub fn total_tests(&self) -> u64 {
        self.total_tests
    }

    /// Returns the number of qualifying tests in the run.
    pub fn passed_tests(&self) -> u64 {
        self.passed_tests
    }

    /// Returns merged instruction coverage over qualifying tests.
    pub fn coverage(&self) -> &CoverageMap {
        &self.coverage
    }

    /// Returns merged memory access errors per instruction over qualifying tests.
    pub fn memaccess_unique(&self) -> &CoverageMap {
        &self.memaccess_unique
    }

    /// Returns [`Self::coverage`] in log form.
    pub fn coverage_log(&self) -> &str {
        &self.coverage_log
    }

    /// Returns [`Self::memaccess_unique`] in log form.
    pub fn memaccess_unique_log(&self) -> &str {
        &self.memaccess_unique_log
    }

    /// Returns how this run was constructed.
    pub fn origin(&self) -> &RunOrigin {
        &self.origin
    }

    /// Returns the test results this run was aggregated from.
    ///
    /// Empty for rehydrated runs.
    pub fn test_results(&self) -> &[TestResult] {
        match &self.origin {
            RunOrigin::Fresh { test_results } => test_results,
            RunOrigin::Rehydrated => &[],
        }
    }
}
