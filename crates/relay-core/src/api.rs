//! Contracts for the source-control REST collaborator.
//!
//! Production code uses `relay_gitlab::GitlabClient`; tests use
//! mockall-generated mocks.

use serde::{Deserialize, Serialize};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure talking to the REST API. Never retried.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{operation}: request failed")]
    Transport {
        operation: &'static str,
        source: BoxError,
    },

    #[error("{operation}: HTTP {status}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("{operation}: unexpected response body")]
    Decode {
        operation: &'static str,
        source: BoxError,
    },

    #[error("{operation}: {detail}")]
    NotFound {
        operation: &'static str,
        detail: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagInfo {
    pub name: String,
}

impl TagInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub name: String,
    pub tag_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRequest {
    pub iid: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub target_branch: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub body: String,
}

/// Outcome of an idempotent write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    AlreadyPresent,
}

/// Lists repository tags.
#[allow(async_fn_in_trait)]
pub trait TagSource: Send + Sync {
    async fn list_tags(&self) -> Result<Vec<TagInfo>, ApiError>;
}

/// Tag and release creation.
#[allow(async_fn_in_trait)]
pub trait ReleaseApi: Send + Sync {
    /// Create a tag at `ref_name`. An empty `message` creates a lightweight tag.
    async fn create_tag(&self, name: &str, ref_name: &str, message: &str) -> Result<(), ApiError>;

    async fn create_release(
        &self,
        tag_name: &str,
        ref_name: &str,
        name: &str,
        description: &str,
    ) -> Result<(), ApiError>;

    /// Most recently created release, `None` when the project has none.
    async fn latest_release(&self) -> Result<Option<Release>, ApiError>;
}

/// Merge-request reads and writes.
#[allow(async_fn_in_trait)]
pub trait MergeRequestApi: Send + Sync {
    async fn description(&self, iid: &str) -> Result<String, ApiError>;

    async fn update_description(&self, iid: &str, description: &str) -> Result<(), ApiError>;

    async fn notes(&self, iid: &str) -> Result<Vec<Note>, ApiError>;

    async fn post_note(&self, iid: &str, body: &str) -> Result<(), ApiError>;

    /// Most recently created open merge request.
    async fn latest_open(&self) -> Result<Option<MergeRequest>, ApiError>;

    /// Post `body` as a note unless an equivalent note already exists.
    async fn create_comment(&self, iid: &str, body: &str) -> Result<WriteOutcome, ApiError> {
        let existing = self.notes(iid).await?;
        if existing.iter().any(|n| n.body.trim() == body.trim()) {
            tracing::info!(merge_request = iid, "equivalent comment already present");
            return Ok(WriteOutcome::AlreadyPresent);
        }
        self.post_note(iid, body).await?;
        Ok(WriteOutcome::Created)
    }
}
