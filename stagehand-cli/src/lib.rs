//! stagehand CLI library.
//!
//! Exposes the binary's modules for integration testing.
//! In production, `stagehand` is used as a binary (main.rs).

pub mod cli;
pub mod error;
pub mod logging;
pub mod report;

use std::path::{Path, PathBuf};

use stagehand_core::HarnessConfig;
use stagehand_core::config::{CONFIG_PATH_VAR, DEFAULT_CONFIG_FILE};
use stagehand_core::error::HarnessError;

/// Where the harness configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Named by `STAGEHAND_CONFIG`; the file must exist.
    Explicit(PathBuf),
    /// `stagehand.toml` in the current directory; optional.
    Default(PathBuf),
}

impl ConfigSource {
    /// Resolve the source from `STAGEHAND_CONFIG`.
    pub fn from_env() -> Self {
        Self::from_override(std::env::var_os(CONFIG_PATH_VAR).map(PathBuf::from))
    }

    /// Resolve the source from an optional explicit path.
    pub fn from_override(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) => Self::Explicit(path),
            None => Self::Default(PathBuf::from(DEFAULT_CONFIG_FILE)),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Explicit(path) | Self::Default(path) => path,
        }
    }

    /// Load the configuration.
    ///
    /// Returns the config and whether it was read from a file.
    pub async fn load(&self) -> Result<(HarnessConfig, bool), HarnessError> {
        match self {
            Self::Explicit(path) => Ok((HarnessConfig::load(path).await?, true)),
            Self::Default(path) => {
                let from_file = tokio::fs::try_exists(path).await?;
                Ok((HarnessConfig::load_or_default(path).await?, from_file))
            }
        }
    }
}
