// Copyright (c) The validation-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::{NO_HEADING_TARGET, StderrStyles};
use camino::Utf8PathBuf;
use owo_colors::OwoColorize;
use std::error::Error;
use thiserror::Error;
use tracing::error;
use validation_runner::errors::ConfigParseError;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

/// Documented exit codes for `validation-report`.
///
/// Unknown or unexpected failures result in exit code 1 as well.
pub enum ReportExitCode {}

impl ReportExitCode {
    /// No errors occurred, and no regressions were found.
    pub const OK: i32 = 0;

    /// A comparison found one or more regressions.
    pub const REGRESSIONS_FOUND: i32 = 1;

    /// Reading the config or the input files failed.
    pub const SETUP_ERROR: i32 = 96;

    /// Writing output files, stdout or stderr failed.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;
}

// The #[error()] strings are placeholders: errors are meant to be printed with
// display_to_stderr, which colorizes them.

/// An expected error that `validation-report` reports to the user.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("config parse error")]
    ConfigParseError {
        #[from]
        err: ConfigParseError,
    },
    #[error("failed to read test results")]
    ResultsReadError {
        path: Utf8PathBuf,
        #[source]
        err: std::io::Error,
    },
    #[error("failed to parse test results")]
    ResultsParseError {
        path: Utf8PathBuf,
        #[source]
        err: serde_json::Error,
    },
    #[error("failed to serialize run record")]
    RecordSerializeError {
        #[source]
        err: serde_json::Error,
    },
    #[error("failed to write run record")]
    RecordWriteError {
        path: Utf8PathBuf,
        #[source]
        err: std::io::Error,
    },
    #[error("failed to write output")]
    WriteOutputError {
        #[source]
        err: std::io::Error,
    },
}

impl ExpectedError {
    pub(crate) fn results_read_error(path: impl Into<Utf8PathBuf>, err: std::io::Error) -> Self {
        Self::ResultsReadError {
            path: path.into(),
            err,
        }
    }

    pub(crate) fn results_parse_error(
        path: impl Into<Utf8PathBuf>,
        err: serde_json::Error,
    ) -> Self {
        Self::ResultsParseError {
            path: path.into(),
            err,
        }
    }

    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::ConfigParseError { .. }
            | Self::ResultsReadError { .. }
            | Self::ResultsParseError { .. } => ReportExitCode::SETUP_ERROR,
            Self::RecordSerializeError { .. }
            | Self::RecordWriteError { .. }
            | Self::WriteOutputError { .. } => ReportExitCode::WRITE_OUTPUT_ERROR,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match self {
            Self::ConfigParseError { err } => {
                error!(
                    "failed to parse validation config at `{}`",
                    err.config_file().style(styles.bold)
                );
                Some(err.kind() as &dyn Error)
            }
            Self::ResultsReadError { path, err } => {
                error!(
                    "failed to read test results from `{}`",
                    path.style(styles.bold)
                );
                Some(err as &dyn Error)
            }
            Self::ResultsParseError { path, err } => {
                error!(
                    "failed to parse test results in `{}`",
                    path.style(styles.bold)
                );
                Some(err as &dyn Error)
            }
            Self::RecordSerializeError { err } => {
                error!("failed to serialize run record");
                Some(err as &dyn Error)
            }
            Self::RecordWriteError { path, err } => {
                error!("failed to write run record to `{}`", path.style(styles.bold));
                Some(err as &dyn Error)
            }
            Self::WriteOutputError { err } => {
                error!("failed to write output");
                Some(err as &dyn Error)
            }
        };

        while let Some(err) = next_error {
            error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}
