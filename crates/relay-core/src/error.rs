use std::path::PathBuf;

use crate::api::ApiError;
use crate::semver;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("missing required environment variables: {}", names.join(", "))]
    MissingSignals { names: Vec<String> },

    // ── Parsing ──
    #[error("unknown bump type {0:?}: expected patch, minor, or major")]
    UnknownBump(String),

    #[error("unknown environment {0:?}: expected dev, test, int, prod, or development")]
    UnknownEnvironment(String),

    #[error("ref name {ref_name:?} cannot be used in an image path: {reason}")]
    InvalidRefName {
        ref_name: String,
        reason: &'static str,
    },

    #[error("invalid image reference {reference:?}: {reason}")]
    InvalidImageRef {
        reference: String,
        reason: &'static str,
    },

    #[error(transparent)]
    Version(#[from] semver::ParseError),

    // ── Collaborators ──
    #[error("version lookup failed")]
    VersionLookupFailed { source: ApiError },

    #[error(
        "ref {ref_name:?} is too short to be a commit SHA or branch name \
         (minimum {min} characters)"
    )]
    RefTooShort { ref_name: String, min: usize },

    #[error("no ref given and the pipeline context has no commit SHA")]
    MissingRef,

    #[error("failed to create release {tag} from {ref_name}")]
    ReleaseFailed {
        tag: String,
        ref_name: String,
        source: ApiError,
    },
}

impl Error {
    /// Collect the names of missing signals into a single error, or `Ok` if
    /// nothing is missing.
    pub fn check_missing(names: Vec<String>) -> Result<()> {
        if names.is_empty() {
            Ok(())
        } else {
            Err(Self::MissingSignals { names })
        }
    }
}
