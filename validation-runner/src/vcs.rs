// Copyright (c) The validation-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Branch and commit lookup for the repository under validation.
//!
//! The lookup runs `git status -b -uno --porcelain=2` in an explicitly provided directory and
//! extracts the `# branch.oid` and `# branch.head` header lines.

use crate::errors::{DisplayErrorChain, VcsQueryError};
use camino::Utf8Path;
use regex::Regex;
use std::{fmt, sync::LazyLock};
use tracing::{debug, trace, warn};

/// The branch and commit recorded when version control information is unavailable.
pub const UNKNOWN_REF: &str = "UNKNOWN";

static BRANCH_OID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^# branch\.oid ([0-9a-fA-F]+)").expect("branch.oid regex is valid")
});
static BRANCH_HEAD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^# branch\.head (\S+)").expect("branch.head regex is valid")
});

/// The branch and commit a validation run was produced from.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct VcsInfo {
    /// The branch name.
    pub branch: String,

    /// The commit id.
    pub commit: String,
}

impl VcsInfo {
    /// Creates a new `VcsInfo`.
    pub fn new(branch: impl Into<String>, commit: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            commit: commit.into(),
        }
    }

    /// Returns a `VcsInfo` with both the branch and commit set to [`UNKNOWN_REF`].
    pub fn unknown() -> Self {
        Self::new(UNKNOWN_REF, UNKNOWN_REF)
    }

    /// Returns true if either the branch or the commit is [`UNKNOWN_REF`].
    pub fn is_unknown(&self) -> bool {
        self.branch == UNKNOWN_REF || self.commit == UNKNOWN_REF
    }

    /// Queries `program` (normally `git`) for the branch and commit checked out in `repo_dir`.
    pub fn query(repo_dir: &Utf8Path, program: &str) -> Result<Self, VcsQueryError> {
        let expression = duct::cmd(program, ["status", "-b", "-uno", "--porcelain=2"])
            .dir(repo_dir.as_std_path())
            .stdout_capture()
            .stderr_capture()
            .unchecked();
        trace!("executing command: {:?}", expression);

        let output = expression.run().map_err(|error| VcsQueryError::Spawn {
            program: program.to_owned(),
            repo_dir: repo_dir.to_owned(),
            error,
        })?;
        if !output.status.success() {
            return Err(VcsQueryError::CommandFailed {
                program: program.to_owned(),
                repo_dir: repo_dir.to_owned(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let stdout = String::from_utf8(output.stdout).map_err(|error| {
            VcsQueryError::NonUtf8Output {
                program: program.to_owned(),
                error,
            }
        })?;
        let info = Self::parse_porcelain_v2(&stdout)?;
        debug!("repository at {repo_dir} is on {info}");
        Ok(info)
    }

    /// Like [`Self::query`], but returns [`Self::unknown`] if the query fails.
    ///
    /// The failure is logged as a warning.
    pub fn query_or_unknown(repo_dir: &Utf8Path, program: &str) -> Self {
        match Self::query(repo_dir, program) {
            Ok(info) => info,
            Err(error) => {
                warn!(
                    "unable to determine branch and commit, recording them as {UNKNOWN_REF}: {}",
                    DisplayErrorChain::new(error)
                );
                Self::unknown()
            }
        }
    }

    /// Parses the output of `git status --branch --porcelain=2`.
    ///
    /// Both the `# branch.oid <hex>` and the `# branch.head <name>` lines must be present.
    pub fn parse_porcelain_v2(status: &str) -> Result<Self, VcsQueryError> {
        let commit = BRANCH_OID_RE
            .captures(status)
            .ok_or(VcsQueryError::MissingHeader {
                header: "branch.oid",
            })?[1]
            .to_owned();
        let branch = BRANCH_HEAD_RE
            .captures(status)
            .ok_or(VcsQueryError::MissingHeader {
                header: "branch.head",
            })?[1]
            .to_owned();
        Ok(Self { branch, commit })
    }
}

impl fmt::Display for VcsInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.branch, self.commit)
    }
}
