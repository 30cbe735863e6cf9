// Copyright (c) The validation-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The interface to persistent storage for validation runs.
//!
//! validation-runner doesn't ship a storage backend. Backends implement [`RunStore`], and
//! [`RunResult::write_to_store`] and [`compare_with_last_run`](crate::compare::compare_with_last_run)
//! drive them.
//!
//! Each run is stored as one [`RunRecord`] followed by the [`TestResult`]s it was built from.
//! Stores are not expected to make these inserts atomic.

use crate::{
    run_result::{RunRecord, RunResult},
    test_result::TestResult,
};
use std::fmt;

/// Storage for validation runs.
///
/// Calls are synchronous. Implementations should not retry internally: errors are surfaced to the
/// caller as-is.
pub trait RunStore {
    /// The identifier a store assigns to a run record.
    type RunId: Clone + fmt::Debug;

    /// The error type returned by this store.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the most recently stored run for `branch`, if any.
    ///
    /// To be useful as a comparison baseline, the returned run should have its test results. A
    /// store can do this by reading the stored [`TestResult`]s back and passing them, along with
    /// the stored branch and commit, to [`RunResult::build`]. A run rehydrated with
    /// [`RunResult::from_record`] has no test results, so comparing against it never finds
    /// anything.
    fn get_last_run(&self, branch: &str) -> Result<Option<RunResult>, Self::Error>;

    /// Inserts a run-level record and returns its identifier.
    fn insert_run_result(&mut self, run: &RunRecord) -> Result<Self::RunId, Self::Error>;

    /// Inserts a test result belonging to the run identified by `run_id`.
    fn insert_test_result(
        &mut self,
        run_id: &Self::RunId,
        test: &TestResult,
    ) -> Result<(), Self::Error>;
}
