//! Run configuration shared by every pipeline.
//!
//! A `RunConfig` is built once by the caller (the CLI merges an optional JSON
//! file with command-line flags) and handed to each pipeline explicitly.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_FIG_EXTENSION: &str = "svg";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub datadir: PathBuf,
    pub outdir: PathBuf,
    pub ignore_symlinks: bool,
    pub verbose: bool,
    pub fig_extension: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            datadir: PathBuf::from("."),
            outdir: PathBuf::from("."),
            ignore_symlinks: false,
            verbose: false,
            fig_extension: DEFAULT_FIG_EXTENSION.to_string(),
        }
    }
}

impl RunConfig {
    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, RunConfigError> {
        let content = fs::read_to_string(path).map_err(|source| RunConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content).map_err(|source| RunConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn output_path(&self, file_name: impl AsRef<Path>) -> PathBuf {
        self.outdir.join(file_name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunConfigError {
    #[error("failed to read run configuration '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse run configuration '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}
