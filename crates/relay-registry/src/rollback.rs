//! Rollback: re-point an environment at a previously published image.

use relay_core::image::LATEST;
use relay_core::signals::keys;
use relay_core::{Context, Environment, ImageRef};

use crate::client::ImageClient;
use crate::docker::DockerError;
use crate::executor::ImageExecutor;
use crate::operation::ImageOperation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbackRequest {
    /// Environment whose pointer is moved
    pub environment: Environment,
    /// Tag of the known-good image
    pub tag: String,
    /// Environment the known-good image was published under; defaults to
    /// `environment`
    pub source_environment: Option<Environment>,
    pub dry_run: bool,
}

/// Resolved source and destination images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbackPlan {
    /// `{registry}/{source_env}/{app}:{tag}`
    pub source: ImageRef,
    /// `{registry}/{env}/{app}:latest`
    pub destination: ImageRef,
    pub dry_run: bool,
}

impl RollbackPlan {
    pub fn resolve(ctx: &Context, request: &RollbackRequest) -> relay_core::Result<Self> {
        let mut missing = Vec::new();
        if ctx.registry_image.is_empty() {
            missing.push(keys::REGISTRY_IMAGE.to_owned());
        }
        if ctx.application_name.is_empty() {
            missing.push(keys::APPLICATION_NAME.to_owned());
        }
        relay_core::Error::check_missing(missing)?;

        let source_env = request.source_environment.unwrap_or(request.environment);
        let source = ImageRef::in_environment(
            &ctx.registry_image,
            source_env,
            &ctx.application_name,
            request.tag.trim(),
        );
        // Round-trip through the parser to reject unusable tags.
        let source: ImageRef = source.to_string().parse()?;
        let destination = ImageRef::in_environment(
            &ctx.registry_image,
            request.environment,
            &ctx.application_name,
            LATEST,
        );

        Ok(Self {
            source,
            destination,
            dry_run: request.dry_run,
        })
    }

    /// Pull, tag, push.
    pub fn operations(&self) -> Vec<ImageOperation> {
        let source = self.source.to_string();
        let destination = self.destination.to_string();
        vec![
            ImageOperation::pull(&source),
            ImageOperation::tag(&source, &destination),
            ImageOperation::push(destination),
        ]
    }
}

/// Run `plan`. The source is pulled first since it was usually built on
/// another runner; a failed pull stops before anything is re-tagged.
pub async fn rollback<E: ImageExecutor>(
    client: &ImageClient<E>,
    plan: &RollbackPlan,
) -> Result<Vec<ImageOperation>, RollbackError> {
    let operations = plan.operations();

    if plan.dry_run {
        for op in &operations {
            tracing::info!(command = %op, "dry run");
        }
        return Ok(operations);
    }

    let source = plan.source.to_string();
    let destination = plan.destination.to_string();

    client
        .pull(&source)
        .await
        .map_err(|e| RollbackError::Pull {
            image: source.clone(),
            source: e,
        })?;
    client
        .tag(&source, &destination)
        .await
        .map_err(|e| RollbackError::Tag {
            from: source.clone(),
            to: destination.clone(),
            source: e,
        })?;
    client
        .push(&destination)
        .await
        .map_err(|e| RollbackError::Push {
            image: destination.clone(),
            source: e,
        })?;

    tracing::info!(from = %source, to = %destination, "rollback complete");
    Ok(operations)
}

#[derive(Debug, thiserror::Error)]
pub enum RollbackError {
    #[error("failed to pull {image}; nothing was re-tagged")]
    Pull { image: String, source: DockerError },

    #[error("failed to tag {from} as {to}")]
    Tag {
        from: String,
        to: String,
        source: DockerError,
    },

    #[error("failed to push {image}")]
    Push { image: String, source: DockerError },
}
