// Copyright (c) The validation-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! General support code for validation-runner.

/// Utilities for pluralizing various words based on count.
pub(crate) mod plural {
    /// Returns "regression" if `count` is 1, otherwise "regressions".
    pub(crate) fn regressions_str(count: usize) -> &'static str {
        if count == 1 {
            "regression"
        } else {
            "regressions"
        }
    }

    /// Returns "test" if `count` is 1, otherwise "tests".
    pub(crate) fn tests_str(count: u64) -> &'static str {
        if count == 1 { "test" } else { "tests" }
    }

    /// Returns "error" if `count` is 1, otherwise "errors".
    pub(crate) fn errors_str(count: u64) -> &'static str {
        if count == 1 { "error" } else { "errors" }
    }

    /// Returns "cascade" if `count` is 1, otherwise "cascades".
    pub(crate) fn cascades_str(count: u64) -> &'static str {
        if count == 1 { "cascade" } else { "cascades" }
    }

    /// Returns "instruction" if `count` is 1, otherwise "instructions".
    pub(crate) fn instructions_str(count: u64) -> &'static str {
        if count == 1 {
            "instruction"
        } else {
            "instructions"
        }
    }
}
