// Copyright (c) The validation-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Aggregation and regression detection for binary-instrumentation validation runs.
//!
//! A validation run executes a batch of tests under instrumentation. Each test produces a
//! [`TestResult`](test_result::TestResult) carrying error counters and instruction coverage. This
//! crate turns a batch of those into a [`RunResult`](run_result::RunResult), hands it to a
//! [`RunStore`](store::RunStore) for persistence, and compares a run against a previously
//! recorded baseline to flag regressions.
//!
//! The basic flow is:
//!
//! 1. Query the repository for its branch and commit with [`VcsInfo::query`](vcs::VcsInfo::query).
//! 2. Aggregate test results with [`RunResult::build`](run_result::RunResult::build).
//! 3. Compare against the last recorded run with
//!    [`compare_with_last_run`](compare::compare_with_last_run).
//! 4. Persist the run with [`RunResult::write_to_store`](run_result::RunResult::write_to_store).

pub mod compare;
pub mod config;
pub mod coverage;
pub mod display;
pub mod errors;
mod helpers;
pub mod run_result;
pub mod store;
#[cfg(test)]
mod test_helpers;
pub mod test_result;
pub mod vcs;
