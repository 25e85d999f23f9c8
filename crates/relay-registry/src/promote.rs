//! Promotion: move an already-built image to a new tag without rebuilding.

use std::fmt;
use std::str::FromStr;

use relay_core::{Context, ImageRef};

use crate::client::ImageClient;
use crate::docker::DockerError;
use crate::executor::ImageExecutor;
use crate::operation::ImageOperation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromotionStrategy {
    #[default]
    Standard,
    BlueGreen,
    Canary,
}

impl PromotionStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::BlueGreen => "blue-green",
            Self::Canary => "canary",
        }
    }
}

impl fmt::Display for PromotionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromotionStrategy {
    type Err = PromoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "blue-green" | "bluegreen" | "blue_green" => Ok(Self::BlueGreen),
            "canary" => Ok(Self::Canary),
            other => Err(PromoteError::UnknownStrategy(other.to_owned())),
        }
    }
}

/// A single promotion. Constructed per invocation, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionRequest {
    pub source: ImageRef,
    pub destination: ImageRef,
    /// Also publish the destination's floating `-latest` alias
    pub also_tag_latest: bool,
    pub strategy: PromotionStrategy,
    pub dry_run: bool,
}

impl PromotionRequest {
    /// Resolve `source` and `destination` references; bare tags land in
    /// `registry`.
    pub fn resolve(
        source: &str,
        destination: &str,
        registry: &str,
        also_tag_latest: bool,
        dry_run: bool,
    ) -> relay_core::Result<Self> {
        Ok(Self {
            source: ImageRef::resolve(source, registry)?,
            destination: ImageRef::resolve(destination, registry)?,
            also_tag_latest,
            strategy: PromotionStrategy::Standard,
            dry_run,
        })
    }

    pub fn with_strategy(mut self, strategy: PromotionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Floating alias published after the primary destination, if any.
    pub fn latest_alias(&self) -> Option<ImageRef> {
        self.also_tag_latest
            .then(|| self.destination.latest_alias())
            .flatten()
    }

    /// Operations in execution order: tag and push the destination, then
    /// tag and push the alias.
    pub fn plan(&self) -> Vec<ImageOperation> {
        let source = self.source.to_string();
        let destination = self.destination.to_string();

        let mut ops = vec![
            ImageOperation::tag(&source, &destination),
            ImageOperation::push(&destination),
        ];
        if let Some(alias) = self.latest_alias() {
            let alias = alias.to_string();
            ops.push(ImageOperation::tag(&source, &alias));
            ops.push(ImageOperation::push(alias));
        }
        ops
    }
}

/// What a promotion did, or would do in dry-run mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionReport {
    pub operations: Vec<ImageOperation>,
    pub dry_run: bool,
}

/// Executes [`PromotionRequest`]s through an [`ImageClient`].
pub struct Promoter<'a, E: ImageExecutor> {
    client: &'a ImageClient<E>,
}

impl<'a, E: ImageExecutor> Promoter<'a, E> {
    pub fn new(client: &'a ImageClient<E>) -> Self {
        Self { client }
    }

    /// Promote `request.source` to `request.destination`.
    ///
    /// Steps run in order and stop at the first failure, so a destination
    /// is never pushed without a successful tag. A failure while publishing
    /// the latest alias is returned as [`PromoteError::LatestAliasFailed`];
    /// the primary destination is already published at that point and is
    /// left in place.
    pub async fn promote(
        &self,
        request: &PromotionRequest,
    ) -> Result<PromotionReport, PromoteError> {
        if request.strategy != PromotionStrategy::Standard {
            return Err(PromoteError::NotImplemented {
                strategy: request.strategy,
            });
        }

        let operations = request.plan();

        if request.dry_run {
            for op in &operations {
                tracing::info!(command = %op, "dry run");
            }
            return Ok(PromotionReport {
                operations,
                dry_run: true,
            });
        }

        let source = request.source.to_string();
        let destination = request.destination.to_string();

        self.client
            .tag(&source, &destination)
            .await
            .map_err(|e| PromoteError::Tag {
                from: source.clone(),
                to: destination.clone(),
                source: e,
            })?;
        self.client
            .push(&destination)
            .await
            .map_err(|e| PromoteError::Push {
                image: destination.clone(),
                source: e,
            })?;
        tracing::info!(from = %source, to = %destination, "promoted");

        if let Some(alias) = request.latest_alias() {
            let alias = alias.to_string();
            let published = async {
                self.client.tag(&source, &alias).await?;
                self.client.push(&alias).await
            }
            .await;
            published.map_err(|e| PromoteError::LatestAliasFailed {
                published: destination.clone(),
                alias: alias.clone(),
                source: e,
            })?;
            tracing::info!(alias = %alias, "latest alias published");
        }

        Ok(PromotionReport {
            operations,
            dry_run: false,
        })
    }

    /// End-of-sprint chain: `dev-latest → test-{sha}`, then
    /// `test-latest → int-{sha}`. Latest aliases are always published so the
    /// second stage reads what the first wrote. Aborts on the first failure.
    pub async fn sprint(&self, ctx: &Context) -> Result<PromotionReport, PromoteError> {
        let stages = sprint_requests(ctx)?;
        let mut operations = Vec::new();
        for (stage, request) in stages {
            let report = self
                .promote(&request)
                .await
                .map_err(|e| PromoteError::Sprint {
                    stage,
                    source: Box::new(e),
                })?;
            operations.extend(report.operations);
        }
        Ok(PromotionReport {
            operations,
            dry_run: ctx.dry_run,
        })
    }
}

/// The two sprint stages with their labels.
pub fn sprint_requests(
    ctx: &Context,
) -> Result<Vec<(&'static str, PromotionRequest)>, PromoteError> {
    let sha = &ctx.short_sha;
    let registry = &ctx.registry_image;
    let stage = |from: &str, to: String| {
        PromotionRequest::resolve(from, &to, registry, true, ctx.dry_run)
            .map_err(|e| PromoteError::InvalidRequest { source: e })
    };

    if sha.is_empty() || registry.is_empty() {
        let mut names = Vec::new();
        if registry.is_empty() {
            names.push(relay_core::signals::keys::REGISTRY_IMAGE.to_owned());
        }
        if sha.is_empty() {
            names.push(relay_core::signals::keys::COMMIT_SHORT_SHA.to_owned());
        }
        return Err(PromoteError::InvalidRequest {
            source: relay_core::Error::MissingSignals { names },
        });
    }

    Ok(vec![
        ("dev->test", stage("dev-latest", format!("test-{sha}"))?),
        ("test->int", stage("test-latest", format!("int-{sha}"))?),
    ])
}

#[derive(Debug, thiserror::Error)]
pub enum PromoteError {
    #[error("{strategy} promotion is not implemented; use the standard strategy")]
    NotImplemented { strategy: PromotionStrategy },

    #[error("unknown promotion strategy {0:?}: expected standard, blue-green, or canary")]
    UnknownStrategy(String),

    #[error("invalid promotion request")]
    InvalidRequest { source: relay_core::Error },

    #[error("failed to tag {from} as {to}; nothing was pushed")]
    Tag {
        from: String,
        to: String,
        source: DockerError,
    },

    #[error("failed to push {image}")]
    Push { image: String, source: DockerError },

    #[error("promoted {published}, but publishing latest alias {alias} failed")]
    LatestAliasFailed {
        published: String,
        alias: String,
        source: DockerError,
    },

    #[error("sprint promotion stage {stage} failed")]
    Sprint {
        stage: &'static str,
        source: Box<PromoteError>,
    },
}
