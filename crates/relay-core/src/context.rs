//! Pipeline context resolution.
//!
//! [`Context::resolve`] is the single place raw pipeline signals are
//! interpreted. All derived flags are computed there once; downstream code
//! branches on `Context` fields only and receives it by shared reference.

use std::fmt;

use crate::config::{FeatureDetection, RelayConfig};
use crate::signals::{SignalSource, keys};

/// Pipeline source value GitLab uses for merge-request pipelines.
pub const MERGE_REQUEST_EVENT: &str = "merge_request_event";

/// Length of a short SHA derived from the full commit SHA.
const SHORT_SHA_LEN: usize = 8;

/// Immutable snapshot of the triggering pipeline event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    /// Pipeline trigger kind (`push`, `merge_request_event`, ...)
    pub pipeline_source: String,
    /// Branch or tag name
    pub ref_name: String,
    pub sha: String,
    pub short_sha: String,
    /// Merge request IID, empty outside merge-request pipelines
    pub merge_request_id: String,
    pub merge_request_target: String,
    /// Tag name, empty unless this is a tag pipeline
    pub tag: String,
    /// Registry base path, e.g. `registry.example.com/group/app`
    pub registry_image: String,
    pub default_branch: String,
    pub project_path: String,
    pub application_name: String,
    pub feature_branch_prefix: String,
    /// Integration branch whose merge requests produce release candidates
    pub integration_branch: String,
    pub force_push: bool,
    pub dry_run: bool,

    pub is_merge_request: bool,
    pub is_tag: bool,
    pub is_feature_branch: bool,
    pub is_default_branch: bool,
    pub is_protected: bool,
}

/// Tagged classification of an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    MergeRequest,
    TagPush,
    FeatureBranch,
    DefaultBranch,
    ProtectedBranch,
    Other,
}

impl Context {
    /// Build a context from pipeline signals and the branch policy in `config`.
    ///
    /// Never fails: absent signals become empty strings and every derived
    /// flag that depends on them evaluates to `false`.
    pub fn resolve(signals: &impl SignalSource, config: &RelayConfig, dry_run: bool) -> Self {
        let policy = &config.branches;

        let ref_name = signals.or_empty(keys::REF_NAME);
        let tag = signals.or_empty(keys::COMMIT_TAG);
        let sha = signals.or_empty(keys::COMMIT_SHA);
        let short_sha = signals
            .non_empty(keys::COMMIT_SHORT_SHA)
            .unwrap_or_else(|| sha.chars().take(SHORT_SHA_LEN).collect());
        let pipeline_source = signals.or_empty(keys::PIPELINE_SOURCE);
        let merge_request_id = signals.or_empty(keys::MERGE_REQUEST_IID);
        let default_branch = signals.or_empty(keys::DEFAULT_BRANCH);
        let registry_image = signals
            .or_empty(keys::REGISTRY_IMAGE)
            .trim_end_matches('/')
            .to_owned();
        let project_path = signals.or_empty(keys::PROJECT_PATH);

        let feature_branch_prefix = signals
            .non_empty(keys::FEATURE_BRANCH_PREFIX)
            .unwrap_or_else(|| policy.feature_prefix.clone());

        let application_name = signals
            .non_empty(keys::APPLICATION_NAME)
            .or_else(|| config.build.application_name.clone())
            .unwrap_or_else(|| derive_application_name(&registry_image, &project_path));

        let is_tag = !tag.is_empty();
        let is_protected = !ref_name.is_empty() && policy.is_protected(&ref_name);
        let is_feature_branch = !ref_name.is_empty()
            && match policy.feature_detection {
                FeatureDetection::Prefix => {
                    !feature_branch_prefix.is_empty()
                        && ref_name.starts_with(&feature_branch_prefix)
                }
                FeatureDetection::Unprotected => !is_protected && !is_tag,
            };

        let ctx = Self {
            is_merge_request: pipeline_source == MERGE_REQUEST_EVENT,
            is_tag,
            is_feature_branch,
            is_default_branch: !ref_name.is_empty() && ref_name == default_branch,
            is_protected,
            merge_request_target: signals.or_empty(keys::MERGE_REQUEST_TARGET),
            force_push: signals.flag(keys::FORCE_PUSH),
            integration_branch: policy.integration.clone(),
            pipeline_source,
            ref_name,
            sha,
            short_sha,
            merge_request_id,
            tag,
            registry_image,
            default_branch,
            project_path,
            application_name,
            feature_branch_prefix,
            dry_run,
        };

        tracing::debug!(
            ref_name = %ctx.ref_name,
            mode = %ctx.mode(),
            application = %ctx.application_name,
            dry_run = ctx.dry_run,
            "pipeline context resolved"
        );
        ctx
    }

    /// First matching mode in priority order.
    pub fn mode(&self) -> ExecutionMode {
        if self.is_merge_request {
            ExecutionMode::MergeRequest
        } else if self.is_tag {
            ExecutionMode::TagPush
        } else if self.is_feature_branch {
            ExecutionMode::FeatureBranch
        } else if self.is_default_branch {
            ExecutionMode::DefaultBranch
        } else if self.is_protected {
            ExecutionMode::ProtectedBranch
        } else {
            ExecutionMode::Other
        }
    }

    /// Merge request into the integration branch (release-candidate build).
    pub fn is_merge_to_integration(&self) -> bool {
        self.is_merge_request && self.merge_request_target == self.integration_branch
    }

    /// Human-readable one-line description.
    pub fn describe(&self) -> String {
        match self.mode() {
            ExecutionMode::MergeRequest => format!(
                "Merge request !{} into {}",
                self.merge_request_id, self.merge_request_target
            ),
            ExecutionMode::TagPush => format!("Tag push ({})", self.tag),
            ExecutionMode::FeatureBranch => format!("Feature branch ({})", self.ref_name),
            ExecutionMode::DefaultBranch => format!("Push to default branch ({})", self.ref_name),
            ExecutionMode::ProtectedBranch => {
                format!("Push to protected branch ({})", self.ref_name)
            }
            ExecutionMode::Other => "Unknown or unsupported CI context".to_owned(),
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MergeRequest => "merge-request",
            Self::TagPush => "tag-push",
            Self::FeatureBranch => "feature-branch",
            Self::DefaultBranch => "default-branch",
            Self::ProtectedBranch => "protected-branch",
            Self::Other => "other",
        })
    }
}

/// Last `/` segment of the registry path, falling back to the project path.
fn derive_application_name(registry_image: &str, project_path: &str) -> String {
    [registry_image, project_path]
        .into_iter()
        .filter_map(|path| path.trim_end_matches('/').rsplit('/').next())
        .find(|segment| !segment.is_empty())
        .unwrap_or_default()
        .to_owned()
}
