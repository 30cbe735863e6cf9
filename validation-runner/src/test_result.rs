// Copyright (c) The validation-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-test execution records.
//!
//! A [`TestResult`] is produced by the harness for every test it runs under instrumentation.
//! Tests are identified across runs by their [`TestConfig`]: the command and its arguments.

use crate::coverage::CoverageMap;
use serde::{Deserialize, Serialize};

/// The command line a validation test was executed with.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub struct TestConfig {
    /// The program that was executed.
    pub command: String,

    /// Arguments passed to the program, in order.
    #[serde(default)]
    pub arguments: Vec<String>,
}

impl TestConfig {
    /// Creates a new `TestConfig`.
    pub fn new(
        command: impl Into<String>,
        arguments: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            command: command.into(),
            arguments: arguments.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the command and its arguments as a shell-quoted string.
    pub fn command_line(&self) -> String {
        shell_words::join(std::iter::once(&self.command).chain(&self.arguments))
    }

    /// Returns the identity used to match this test across runs.
    pub fn identity(&self) -> TestIdentity<'_> {
        TestIdentity {
            command: &self.command,
            arguments: &self.arguments,
        }
    }
}

/// The identity of a test across runs: its exact command and arguments.
///
/// Returned by [`TestConfig::identity`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TestIdentity<'a> {
    /// The program that was executed.
    pub command: &'a str,

    /// Arguments passed to the program.
    pub arguments: &'a [String],
}

/// Instruction and error counters shared by [`TestResult`] and run-level aggregates.
///
/// `errors` is the sum of the three error categories, and `cascades` is the sum of the three
/// cascade categories.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
pub struct ValidationCounters {
    /// Number of instructions executed.
    #[serde(default)]
    pub total_instr: u64,

    /// Total number of errors.
    #[serde(default)]
    pub errors: u64,
    /// Errors that had no observable impact.
    #[serde(default)]
    pub no_impact_err: u64,
    /// Errors that had an impact but weren't critical.
    #[serde(default)]
    pub non_critical_err: u64,
    /// Critical errors.
    #[serde(default)]
    pub critical_err: u64,

    /// Total number of error cascades.
    #[serde(default)]
    pub cascades: u64,
    /// Cascades that had no observable impact.
    #[serde(default)]
    pub no_impact_casc: u64,
    /// Cascades that had an impact but weren't critical.
    #[serde(default)]
    pub non_critical_casc: u64,
    /// Critical cascades.
    #[serde(default)]
    pub critical_casc: u64,

    /// Number of memory access errors.
    #[serde(default)]
    pub memaccess_error: u64,
}

impl ValidationCounters {
    /// Adds every counter in `other` to `self`.
    pub fn accumulate(&mut self, other: &ValidationCounters) {
        let ValidationCounters {
            total_instr,
            errors,
            no_impact_err,
            non_critical_err,
            critical_err,
            cascades,
            no_impact_casc,
            non_critical_casc,
            critical_casc,
            memaccess_error,
        } = other;

        self.total_instr = self.total_instr.saturating_add(*total_instr);
        self.errors = self.errors.saturating_add(*errors);
        self.no_impact_err = self.no_impact_err.saturating_add(*no_impact_err);
        self.non_critical_err = self.non_critical_err.saturating_add(*non_critical_err);
        self.critical_err = self.critical_err.saturating_add(*critical_err);
        self.cascades = self.cascades.saturating_add(*cascades);
        self.no_impact_casc = self.no_impact_casc.saturating_add(*no_impact_casc);
        self.non_critical_casc = self.non_critical_casc.saturating_add(*non_critical_casc);
        self.critical_casc = self.critical_casc.saturating_add(*critical_casc);
        self.memaccess_error = self.memaccess_error.saturating_add(*memaccess_error);
    }
}

/// The outcome of executing a single test under instrumentation.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct TestResult {
    /// The test that was executed.
    pub cfg: TestConfig,

    /// The exit code of the instrumented execution.
    pub retcode: i32,

    /// Whether the instrumented output matched an uninstrumented execution of the same test.
    pub same_output: bool,

    /// Instruction and error counters.
    #[serde(flatten)]
    pub counters: ValidationCounters,

    /// Hit counts per executed instruction.
    #[serde(default)]
    pub coverage: CoverageMap,

    /// Hit counts per instruction that produced a memory access error.
    #[serde(default)]
    pub memaccess_unique: CoverageMap,

    /// A content hash of the tested binary.
    #[serde(default)]
    pub binary_hash: String,
}

impl TestResult {
    /// Returns true if this test contributes to run-level aggregates.
    ///
    /// A test qualifies if it exited successfully and its output matched the uninstrumented
    /// execution.
    pub fn is_qualifying(&self) -> bool {
        self.retcode == 0 && self.same_output
    }
}
