// Copyright (c) The validation-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by validation-runner.

use camino::Utf8PathBuf;
use config::ConfigError;
use std::{fmt, process::ExitStatus};
use thiserror::Error;

/// An error that occurred while querying version control for the current branch and commit.
///
/// Returned by [`VcsInfo::query`](crate::vcs::VcsInfo::query).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VcsQueryError {
    /// The version control command could not be spawned.
    #[error("failed to execute `{program}` in `{repo_dir}`")]
    Spawn {
        /// The program that was executed.
        program: String,

        /// The directory the program was executed in.
        repo_dir: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: std::io::Error,
    },

    /// The version control command exited unsuccessfully.
    #[error("`{program}` in `{repo_dir}` failed with {status}: {}", .stderr.trim())]
    CommandFailed {
        /// The program that was executed.
        program: String,

        /// The directory the program was executed in.
        repo_dir: Utf8PathBuf,

        /// The exit status of the program.
        status: ExitStatus,

        /// Standard error produced by the program, lossily converted to UTF-8.
        stderr: String,
    },

    /// The version control command produced output that isn't valid UTF-8.
    #[error("output of `{program}` is not valid UTF-8")]
    NonUtf8Output {
        /// The program that was executed.
        program: String,

        /// The underlying error.
        #[source]
        error: std::string::FromUtf8Error,
    },

    /// A required status line was missing from the output.
    #[error("status output is missing a `# {header} ...` line")]
    MissingHeader {
        /// The header that was expected, e.g. `branch.oid`.
        header: &'static str,
    },
}

/// An error that occurred while reading validation config.
#[derive(Debug, Error)]
#[error("failed to parse validation config at `{config_file}`")]
#[non_exhaustive]
pub struct ConfigParseError {
    config_file: Utf8PathBuf,
    #[source]
    kind: ConfigParseErrorKind,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: impl Into<Utf8PathBuf>, kind: ConfigParseErrorKind) -> Self {
        Self {
            config_file: config_file.into(),
            kind,
        }
    }

    /// Returns the config file for this error.
    pub fn config_file(&self) -> &Utf8PathBuf {
        &self.config_file
    }

    /// Returns the kind of error this is.
    pub fn kind(&self) -> &ConfigParseErrorKind {
        &self.kind
    }
}

/// The kind of error that occurred while reading validation config.
///
/// Returned by [`ConfigParseError::kind`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigParseErrorKind {
    /// An error occurred while building the config.
    #[error(transparent)]
    BuildError(ConfigError),

    /// An error occurred while deserializing the config.
    #[error(transparent)]
    DeserializeError(serde_path_to_error::Error<ConfigError>),

    /// A config value failed validation.
    #[error("invalid value for `{key}`: {reason}")]
    InvalidValue {
        /// The key that was invalid.
        key: &'static str,

        /// Why the value is invalid.
        reason: &'static str,
    },
}

/// An error that occurred while writing a run to a [`RunStore`](crate::store::RunStore).
///
/// Exporting stops at the first failing insert. Nothing is retried and nothing that was already
/// inserted is rolled back: if the error is [`InsertTest`](Self::InsertTest), the run record and
/// every test before `index` are already in the store under `run_id`.
#[derive(Debug, Error)]
pub enum ExportError<I, E> {
    /// Inserting the run-level record failed. Nothing was written.
    #[error("failed to insert run record")]
    InsertRun(#[source] E),

    /// Inserting a test record failed after the run-level record was written.
    #[error("failed to insert test result {index} (`{command_line}`) for run {run_id:?}")]
    InsertTest {
        /// The identifier the run-level record was stored under.
        run_id: I,

        /// The index of the test result that failed to insert.
        index: usize,

        /// The command line of the test result that failed to insert.
        command_line: String,

        /// The underlying error.
        #[source]
        error: E,
    },
}

/// Displays an error along with the chain of errors that caused it.
pub struct DisplayErrorChain<E> {
    error: E,
}

impl<E: std::error::Error> DisplayErrorChain<E> {
    /// Creates a new `DisplayErrorChain` for `error`.
    pub fn new(error: E) -> Self {
        Self { error }
    }
}

impl<E: std::error::Error> fmt::Display for DisplayErrorChain<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        let mut source = self.error.source();
        if source.is_some() {
            write!(f, "\n  caused by:")?;
        }
        while let Some(error) = source {
            write!(f, "\n  - {error}")?;
            source = error.source();
        }

        Ok(())
    }
}
