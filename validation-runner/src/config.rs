// Copyright (c) The validation-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for validation runs.

use crate::errors::{ConfigParseError, ConfigParseErrorKind};
use camino::Utf8Path;
use config::{Config, ConfigBuilder, File, FileFormat, builder::DefaultState};
use serde::Deserialize;
use tracing::debug;

/// Configuration for validation runs.
///
/// Read with [`ValidationConfig::from_sources`], which layers repository configuration on top of
/// [`ValidationConfig::DEFAULT_CONFIG`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ValidationConfig {
    inner: ValidationConfigImpl,
}

impl ValidationConfig {
    /// The location of the repository config relative to the repository root.
    pub const CONFIG_PATH: &'static str = ".config/validation.toml";

    /// Contains the default config as a TOML file.
    ///
    /// Repository-specific configuration is layered on top of the default config.
    pub const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// Reads the config from `config_file`, or if not specified from
    /// [`CONFIG_PATH`](Self::CONFIG_PATH) within `repo_dir`.
    ///
    /// An explicitly specified file must exist. If it isn't specified and the repository doesn't
    /// have a config file, the default config is used.
    pub fn from_sources(
        repo_dir: &Utf8Path,
        config_file: Option<&Utf8Path>,
    ) -> Result<Self, ConfigParseError> {
        let (config_file, required) = match config_file {
            Some(config_file) => (config_file.to_owned(), true),
            None => (repo_dir.join(Self::CONFIG_PATH), false),
        };
        debug!("reading validation config from {config_file} (required: {required})");

        let builder = Self::make_default_config()
            .add_source(File::new(config_file.as_str(), FileFormat::Toml).required(required));
        let inner = Self::build_and_deserialize_config(&builder)
            .and_then(|inner| inner.validate().map(|()| inner))
            .map_err(|kind| ConfigParseError::new(&config_file, kind))?;

        Ok(Self { inner })
    }

    /// Returns the default config with the version control program replaced.
    pub fn with_vcs_program(program: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.inner.vcs.program = program.into();
        config
    }

    /// Returns the version control program used to look up the branch and commit.
    pub fn vcs_program(&self) -> &str {
        &self.inner.vcs.program
    }

    /// Returns the branch to compare against when the current branch has no recorded run.
    pub fn fallback_branch(&self) -> &str {
        &self.inner.baseline.fallback_branch
    }

    // ---
    // Helper methods
    // ---

    fn make_default_config() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(Self::DEFAULT_CONFIG, FileFormat::Toml))
    }

    fn build_and_deserialize_config(
        builder: &ConfigBuilder<DefaultState>,
    ) -> Result<ValidationConfigImpl, ConfigParseErrorKind> {
        let config = builder
            .build_cloned()
            .map_err(ConfigParseErrorKind::BuildError)?;

        serde_path_to_error::deserialize(config).map_err(ConfigParseErrorKind::DeserializeError)
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        let inner = Self::build_and_deserialize_config(&Self::make_default_config())
            .expect("default config should be valid");
        Self { inner }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
struct ValidationConfigImpl {
    vcs: VcsConfig,
    baseline: BaselineConfig,
}

impl ValidationConfigImpl {
    fn validate(&self) -> Result<(), ConfigParseErrorKind> {
        if self.vcs.program.trim().is_empty() {
            return Err(ConfigParseErrorKind::InvalidValue {
                key: "vcs.program",
                reason: "must not be empty",
            });
        }
        if self.baseline.fallback_branch.trim().is_empty() {
            return Err(ConfigParseErrorKind::InvalidValue {
                key: "baseline.fallback-branch",
                reason: "must not be empty",
            });
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
struct VcsConfig {
    program: String,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
struct BaselineConfig {
    fallback_branch: String,
}
