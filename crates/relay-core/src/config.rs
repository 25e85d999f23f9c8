use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = "relay.toml";

/// relay.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub branches: BranchPolicy,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub release: ReleaseConfig,
}

/// How ref names are classified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchPolicy {
    /// Stable integration branches
    #[serde(default = "default_protected")]
    pub protected: Vec<String>,
    /// Prefix marking a feature branch
    #[serde(default = "default_feature_prefix")]
    pub feature_prefix: String,
    /// Integration branch whose merge requests produce release candidates
    #[serde(default = "default_integration")]
    pub integration: String,
    /// Rule used to flag feature branches
    #[serde(default)]
    pub feature_detection: FeatureDetection,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureDetection {
    /// Ref starts with `feature_prefix`.
    #[default]
    Prefix,
    /// Ref is neither protected nor a tag.
    Unprotected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Dockerfile path
    #[serde(default = "default_dockerfile")]
    pub dockerfile: PathBuf,
    /// Build context directory
    #[serde(default = "default_context")]
    pub context: PathBuf,
    /// Values passed as `--build-arg`
    #[serde(default)]
    pub extra_args: Vec<String>,
    /// Explicit application name; derived from the registry path when unset
    #[serde(default)]
    pub application_name: Option<String>,
    /// Where the build metadata record is written
    #[serde(default = "default_metadata_path")]
    pub metadata_path: PathBuf,
    /// Whether to write the build metadata record at all
    #[serde(default = "default_true")]
    pub emit_metadata: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseConfig {
    /// Shortest ref accepted for a live release
    #[serde(default = "default_min_ref_length")]
    pub min_ref_length: usize,
}

impl Default for BranchPolicy {
    fn default() -> Self {
        Self {
            protected: default_protected(),
            feature_prefix: default_feature_prefix(),
            integration: default_integration(),
            feature_detection: FeatureDetection::default(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            dockerfile: default_dockerfile(),
            context: default_context(),
            extra_args: Vec::new(),
            application_name: None,
            metadata_path: default_metadata_path(),
            emit_metadata: true,
        }
    }
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            min_ref_length: default_min_ref_length(),
        }
    }
}

impl BranchPolicy {
    pub fn is_protected(&self, ref_name: &str) -> bool {
        self.protected.iter().any(|b| b == ref_name)
    }
}

impl RelayConfig {
    /// Load from relay.toml in the given directory, or return defaults if not found.
    pub fn load(project_dir: &Path) -> crate::Result<Self> {
        let config_path = project_dir.join(CONFIG_FILE);
        if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).map_err(|e| crate::Error::ConfigLoad {
                    path: config_path.clone(),
                    source: e,
                })?;
            toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
                path: config_path,
                source: e,
            })
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }
}

fn default_protected() -> Vec<String> {
    ["main", "master", "test", "int", "dev"]
        .into_iter()
        .map(str::to_owned)
        .collect()
}

fn default_feature_prefix() -> String {
    "feature/".to_owned()
}

fn default_integration() -> String {
    "dev".to_owned()
}

fn default_dockerfile() -> PathBuf {
    PathBuf::from("Dockerfile")
}

fn default_context() -> PathBuf {
    PathBuf::from(".")
}

fn default_metadata_path() -> PathBuf {
    PathBuf::from("relay_output.json")
}

fn default_true() -> bool {
    true
}

fn default_min_ref_length() -> usize {
    7
}
