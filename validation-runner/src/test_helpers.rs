// Copyright (c) The validation-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    coverage::CoverageMap,
    run_result::{RunRecord, RunResult},
    store::RunStore,
    test_result::{TestConfig, TestResult, ValidationCounters},
    vcs::VcsInfo,
};
use std::{cell::RefCell, collections::BTreeMap};
use thiserror::Error;

/// Builds a passing [`TestResult`] with everything else empty, to be customized.
#[derive(Clone, Debug)]
pub(crate) struct TestResultBuilder {
    result: TestResult,
}

impl TestResultBuilder {
    pub(crate) fn new(command: &str, arguments: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            result: TestResult {
                cfg: TestConfig::new(command, arguments),
                retcode: 0,
                same_output: true,
                counters: ValidationCounters::default(),
                coverage: CoverageMap::new(),
                memaccess_unique: CoverageMap::new(),
                binary_hash: "0000".to_owned(),
            },
        }
    }

    pub(crate) fn retcode(mut self, retcode: i32) -> Self {
        self.result.retcode = retcode;
        self
    }

    pub(crate) fn same_output(mut self, same_output: bool) -> Self {
        self.result.same_output = same_output;
        self
    }

    pub(crate) fn counters(mut self, counters: ValidationCounters) -> Self {
        self.result.counters = counters;
        self
    }

    pub(crate) fn coverage(mut self, coverage: BTreeMap<&str, u64>) -> Self {
        self.result.coverage = to_map(coverage);
        self
    }

    pub(crate) fn memaccess_unique(mut self, memaccess_unique: BTreeMap<&str, u64>) -> Self {
        self.result.memaccess_unique = to_map(memaccess_unique);
        self
    }

    pub(crate) fn binary_hash(mut self, binary_hash: &str) -> Self {
        self.result.binary_hash = binary_hash.to_owned();
        self
    }

    pub(crate) fn build(self) -> TestResult {
        self.result
    }
}

fn to_map(entries: BTreeMap<&str, u64>) -> CoverageMap {
    entries
        .into_iter()
        .map(|(instr, count)| (instr.to_owned(), count))
        .collect()
}

#[derive(Debug, Error)]
#[error("simulated store failure")]
pub(crate) struct VecStoreError;

/// A [`RunStore`] that keeps everything in vectors, with knobs to inject failures.
///
/// Run identifiers are indexes into `runs`.
#[derive(Debug, Default)]
pub(crate) struct VecRunStore {
    pub(crate) runs: Vec<RunRecord>,
    pub(crate) tests: Vec<(u64, TestResult)>,
    pub(crate) fail_run_insert: bool,
    pub(crate) fail_test_insert_at: Option<usize>,
    pub(crate) fail_lookup: bool,
    pub(crate) lookups: RefCell<Vec<String>>,
}

impl VecRunStore {
    /// Returns the branches passed to `get_last_run`, in order.
    pub(crate) fn lookups(&self) -> Vec<String> {
        self.lookups.borrow().clone()
    }
}

impl RunStore for VecRunStore {
    type RunId = u64;
    type Error = VecStoreError;

    fn get_last_run(&self, branch: &str) -> Result<Option<RunResult>, Self::Error> {
        self.lookups.borrow_mut().push(branch.to_owned());
        if self.fail_lookup {
            return Err(VecStoreError);
        }

        let Some((run_id, record)) = self
            .runs
            .iter()
            .enumerate()
            .rev()
            .find(|(_, record)| record.branch == branch)
        else {
            return Ok(None);
        };
        let tests = self
            .tests
            .iter()
            .filter(|(id, _)| *id == run_id as u64)
            .map(|(_, test)| test.clone())
            .collect();
        Ok(Some(RunResult::build(
            VcsInfo::new(&record.branch, &record.commit),
            tests,
        )))
    }

    fn insert_run_result(&mut self, run: &RunRecord) -> Result<Self::RunId, Self::Error> {
        if self.fail_run_insert {
            return Err(VecStoreError);
        }
        self.runs.push(run.clone());
        Ok(self.runs.len() as u64 - 1)
    }

    fn insert_test_result(
        &mut self,
        run_id: &Self::RunId,
        test: &TestResult,
    ) -> Result<(), Self::Error> {
        if self.fail_test_insert_at == Some(self.tests.len()) {
            return Err(VecStoreError);
        }
        self.tests.push((*run_id, test.clone()));
        Ok(())
    }
}
