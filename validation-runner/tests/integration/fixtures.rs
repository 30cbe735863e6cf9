// Copyright (c) The validation-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::{cell::Cell, collections::BTreeMap};
use thiserror::Error;
use validation_runner::{
    coverage::CoverageMap,
    run_result::{RunRecord, RunResult},
    store::RunStore,
    test_result::{TestConfig, TestResult, ValidationCounters},
    vcs::VcsInfo,
};

#[derive(Debug, Error)]
pub(crate) enum JsonStoreError {
    #[error("store connection closed")]
    Closed,
    #[error("failed to (de)serialize row")]
    Serde(#[from] serde_json::Error),
}

/// A [`RunStore`] that keeps each record as a serialized JSON row, the way a table-backed store
/// would.
///
/// Rows are appended in insertion order, so the last matching run row is the most recent.
#[derive(Debug, Default)]
pub(crate) struct JsonRowStore {
    pub(crate) runs: Vec<(u64, String)>,
    pub(crate) tests: Vec<(u64, String)>,
    pub(crate) next_id: u64,
    /// If set, the store closes after accepting this many test rows.
    pub(crate) close_after_tests: Option<usize>,
    pub(crate) lookup_count: Cell<usize>,
}

impl JsonRowStore {
    pub(crate) fn run_rows(&self) -> usize {
        self.runs.len()
    }

    pub(crate) fn test_rows_for(&self, run_id: u64) -> usize {
        self.tests.iter().filter(|(id, _)| *id == run_id).count()
    }

    pub(crate) fn lookup_count(&self) -> usize {
        self.lookup_count.get()
    }
}

impl RunStore for JsonRowStore {
    type RunId = u64;
    type Error = JsonStoreError;

    fn get_last_run(&self, branch: &str) -> Result<Option<RunResult>, Self::Error> {
        self.lookup_count.set(self.lookup_count.get() + 1);

        for (run_id, row) in self.runs.iter().rev() {
            let record: RunRecord = serde_json::from_str(row)?;
            if record.branch != branch {
                continue;
            }
            let tests = self
                .tests
                .iter()
                .filter(|(id, _)| id == run_id)
                .map(|(_, row)| serde_json::from_str(row))
                .collect::<Result<Vec<TestResult>, _>>()?;
            return Ok(Some(RunResult::build(
                VcsInfo::new(record.branch, record.commit),
                tests,
            )));
        }
        Ok(None)
    }

    fn insert_run_result(&mut self, run: &RunRecord) -> Result<Self::RunId, Self::Error> {
        let run_id = self.next_id;
        self.runs.push((run_id, serde_json::to_string(run)?));
        self.next_id += 1;
        Ok(run_id)
    }

    fn insert_test_result(
        &mut self,
        run_id: &Self::RunId,
        test: &TestResult,
    ) -> Result<(), Self::Error> {
        if self.close_after_tests == Some(self.tests.len()) {
            return Err(JsonStoreError::Closed);
        }
        self.tests.push((*run_id, serde_json::to_string(test)?));
        Ok(())
    }
}

pub(crate) fn test_result(
    command: &str,
    arguments: &[&str],
    retcode: i32,
    errors: u64,
    coverage: BTreeMap<&str, u64>,
) -> TestResult {
    TestResult {
        cfg: TestConfig::new(command, arguments.iter().copied()),
        retcode,
        same_output: retcode == 0,
        counters: ValidationCounters {
            total_instr: coverage.values().sum(),
            errors,
            critical_err: errors,
            ..Default::default()
        },
        coverage: coverage
            .into_iter()
            .map(|(instr, count)| (instr.to_owned(), count))
            .collect(),
        memaccess_unique: CoverageMap::new(),
        binary_hash: format!("hash-{command}"),
    }
}
