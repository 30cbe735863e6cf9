// Copyright (c) The validation-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line interface for summarizing validation runs and detecting regressions.
//!
//! `validation-report summarize` aggregates a file of test results and prints run statistics.
//! `validation-report compare` compares two files of test results and exits with code 1 if any
//! regressions were found.

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
