//! Release cutting: bump resolution, version computation, tag/release creation.

use crate::api::{MergeRequestApi, ReleaseApi, TagSource};
use crate::bump::{self, BumpDecision, BumpKind, BumpSource, DefaultReason};
use crate::config::ReleaseConfig;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::semver::SemVer;
use crate::version::VersionResolver;

/// Inputs for one release invocation.
#[derive(Debug, Clone, Default)]
pub struct ReleaseRequest {
    /// Explicit bump. When `None` the merge-request checklist decides.
    pub bump: Option<BumpKind>,
    /// Commit SHA or branch to release from. Falls back to the pipeline SHA.
    pub ref_name: Option<String>,
    /// Release name. Defaults to the version string.
    pub name: Option<String>,
    pub description: String,
    /// Merge request whose description is classified when `bump` is `None`.
    pub merge_request_id: Option<String>,
    /// Create only the Git tag, not a release entry.
    pub tag_only: bool,
    pub dry_run: bool,
}

/// Result of a release invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseOutcome {
    pub current: SemVer,
    pub next: SemVer,
    pub bump: BumpKind,
    pub bump_source: BumpSource,
    pub name: String,
    /// `false` for dry runs.
    pub created: bool,
}

impl ReleaseOutcome {
    /// Version string callers capture from the last line of output.
    pub fn version(&self) -> String {
        self.next.to_string()
    }
}

/// Pick the merge request to read: explicit id, then the pipeline's merge
/// request, then the most recent open one. The API is not consulted in
/// dry-run mode.
pub async fn resolve_merge_request_id<M: MergeRequestApi>(
    api: &M,
    explicit: Option<&str>,
    ctx: &Context,
) -> std::result::Result<Option<String>, crate::api::ApiError> {
    if let Some(id) = explicit.filter(|id| !id.trim().is_empty()) {
        return Ok(Some(id.trim().to_owned()));
    }
    if !ctx.merge_request_id.is_empty() {
        return Ok(Some(ctx.merge_request_id.clone()));
    }
    if ctx.dry_run {
        tracing::debug!("dry run, not looking up the latest open merge request");
        return Ok(None);
    }
    let latest = api.latest_open().await?;
    if let Some(mr) = &latest {
        tracing::info!(
            merge_request = mr.iid,
            title = %mr.title,
            "using latest open merge request"
        );
    }
    Ok(latest.map(|mr| mr.iid.to_string()))
}

/// Classify the description of merge request `id`.
///
/// Fetch failures degrade to the Patch default rather than erroring.
pub async fn infer_bump<M: MergeRequestApi>(api: &M, id: Option<&str>) -> BumpDecision {
    let Some(id) = id else {
        return BumpDecision::fallback(DefaultReason::NoMergeRequest);
    };
    match api.description(id).await {
        Ok(description) => bump::classify(&description),
        Err(e) => {
            tracing::warn!(
                merge_request = id,
                error = %e,
                "could not read merge request description"
            );
            BumpDecision::fallback(DefaultReason::LookupFailed)
        }
    }
}

/// Cuts releases against a tag store and merge-request API.
pub struct ReleaseEngine<'a, R, M>
where
    R: TagSource + ReleaseApi,
    M: MergeRequestApi,
{
    releases: &'a R,
    merge_requests: &'a M,
    config: &'a ReleaseConfig,
}

impl<'a, R, M> ReleaseEngine<'a, R, M>
where
    R: TagSource + ReleaseApi,
    M: MergeRequestApi,
{
    pub fn new(releases: &'a R, merge_requests: &'a M, config: &'a ReleaseConfig) -> Self {
        Self {
            releases,
            merge_requests,
            config,
        }
    }

    /// Decide the bump for `request`.
    pub async fn resolve_bump(&self, request: &ReleaseRequest) -> BumpDecision {
        match request.bump {
            Some(kind) => BumpDecision::explicit(kind),
            None => infer_bump(self.merge_requests, request.merge_request_id.as_deref()).await,
        }
    }

    /// Compute the next version and, unless dry-running, create it.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingRef`] / [`Error::RefTooShort`] for an unusable ref on a live run
    /// - [`Error::VersionLookupFailed`] when tags cannot be listed
    /// - [`Error::ReleaseFailed`] when the tag or release cannot be created
    pub async fn release(&self, ctx: &Context, request: &ReleaseRequest) -> Result<ReleaseOutcome> {
        let decision = self.resolve_bump(request).await;

        let ref_name = request
            .ref_name
            .clone()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| ctx.sha.clone());
        if !request.dry_run {
            self.validate_ref(&ref_name)?;
        }

        let (current, next) = VersionResolver::new(self.releases)
            .next_version(decision.kind)
            .await?;
        let version = next.to_string();
        let name = request
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| version.clone());

        let mut outcome = ReleaseOutcome {
            current,
            next,
            bump: decision.kind,
            bump_source: decision.source,
            name,
            created: false,
        };

        if request.dry_run {
            tracing::info!(%current, %next, bump = %decision.kind, "dry run, release not created");
            return Ok(outcome);
        }

        tracing::info!(
            tag = %version,
            ref_name = %ref_name,
            name = %outcome.name,
            "creating release"
        );
        let created = if request.tag_only {
            self.releases
                .create_tag(&version, &ref_name, &request.description)
                .await
        } else {
            self.releases
                .create_release(&version, &ref_name, &outcome.name, &request.description)
                .await
        };
        created.map_err(|source| Error::ReleaseFailed {
            tag: version.clone(),
            ref_name: ref_name.clone(),
            source,
        })?;

        outcome.created = true;
        Ok(outcome)
    }

    fn validate_ref(&self, ref_name: &str) -> Result<()> {
        if ref_name.is_empty() {
            return Err(Error::MissingRef);
        }
        if ref_name.chars().count() < self.config.min_ref_length {
            return Err(Error::RefTooShort {
                ref_name: ref_name.to_owned(),
                min: self.config.min_ref_length,
            });
        }
        Ok(())
    }
}
