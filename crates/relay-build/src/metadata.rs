use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Build record consumed by later pipeline jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildMetadata {
    /// Repository of the canonical image, without tag
    pub image: String,
    pub tag: String,
    /// Fully-qualified canonical image reference
    pub target_image: String,
    pub project: String,
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub is_merge_to_integration_branch: bool,
    #[serde(rename = "openShiftEnv")]
    pub open_shift_env: String,
}

impl BuildMetadata {
    /// Write as pretty-printed JSON, creating parent directories.
    pub fn write(&self, path: &Path) -> Result<(), MetadataError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| MetadataError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let json =
            serde_json::to_string_pretty(self).map_err(|e| MetadataError::Serialize { source: e })?;
        std::fs::write(path, json).map_err(|e| MetadataError::Write {
            path: path.to_path_buf(),
            source: e,
        })?;

        tracing::info!(
            path = %path.display(),
            image = %self.target_image,
            "build metadata written"
        );
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self, MetadataError> {
        let content = std::fs::read_to_string(path).map_err(|e| MetadataError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| MetadataError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("failed to serialize build metadata")]
    Serialize { source: serde_json::Error },

    #[error("failed to write build metadata to {path}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read build metadata from {path}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid build metadata at {path}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}
