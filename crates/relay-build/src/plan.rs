use std::path::PathBuf;

use relay_core::signals::keys;
use relay_core::{Context, Environment, ImageRef, RelayConfig, SignalSource};

use crate::metadata::BuildMetadata;

/// Everything needed to build and publish one image. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    pub dockerfile: PathBuf,
    pub context: PathBuf,
    /// Values passed as `--build-arg`
    pub extra_args: Vec<String>,
    pub application_name: String,
    pub environment: Environment,
    /// Tag part of the canonical image reference
    pub base_tag: String,
    /// Fully-qualified tags; the first is immutable, the rest are aliases
    pub tags: Vec<String>,
    pub should_push: bool,
    pub dry_run: bool,
    /// Where to write [`BuildMetadata`]; `None` when disabled
    pub metadata_path: Option<PathBuf>,
}

impl BuildPlan {
    /// Derive the plan for `ctx`.
    ///
    /// `RELAY_DOCKERFILE`, `RELAY_BUILD_CONTEXT`, `RELAY_BUILD_EXTRA_ARGS`
    /// and `RELAY_METADATA_PATH` override the `[build]` table.
    pub fn resolve(
        ctx: &Context,
        config: &RelayConfig,
        signals: &impl SignalSource,
    ) -> relay_core::Result<Self> {
        let build = &config.build;

        let dockerfile = signals
            .non_empty(keys::DOCKERFILE)
            .map_or_else(|| build.dockerfile.clone(), PathBuf::from);
        let context = signals
            .non_empty(keys::BUILD_CONTEXT)
            .map_or_else(|| build.context.clone(), PathBuf::from);
        let extra_args = signals
            .non_empty(keys::BUILD_EXTRA_ARGS)
            .map_or_else(
                || build.extra_args.clone(),
                |raw| raw.split_whitespace().map(str::to_owned).collect(),
            );
        let metadata_path = build.emit_metadata.then(|| {
            signals
                .non_empty(keys::METADATA_PATH)
                .map_or_else(|| build.metadata_path.clone(), PathBuf::from)
        });

        let environment = relay_core::route(ctx);
        let tags = relay_core::generate_tags(
            ctx,
            environment,
            &ctx.application_name,
            &ctx.short_sha,
        )?;
        let canonical: ImageRef = tags[0].parse()?;

        let plan = Self {
            dockerfile,
            context,
            extra_args,
            application_name: ctx.application_name.clone(),
            environment,
            base_tag: canonical.tag,
            should_push: should_push(environment, ctx.force_push),
            dry_run: ctx.dry_run,
            tags,
            metadata_path,
        };

        tracing::debug!(
            env = %plan.environment,
            base_tag = %plan.base_tag,
            should_push = plan.should_push,
            "build plan resolved"
        );
        Ok(plan)
    }

    /// The immutable SHA-qualified tag.
    pub fn canonical_tag(&self) -> &str {
        &self.tags[0]
    }

    /// Record handed to later pipeline jobs.
    pub fn metadata(&self, ctx: &Context) -> BuildMetadata {
        let image = self
            .canonical_tag()
            .rsplit_once(':')
            .map_or(self.canonical_tag(), |(repository, _)| repository);

        BuildMetadata {
            image: image.to_owned(),
            tag: self.base_tag.clone(),
            target_image: self.canonical_tag().to_owned(),
            project: ctx.project_path.clone(),
            ref_name: ctx.ref_name.clone(),
            is_merge_to_integration_branch: ctx.is_merge_to_integration(),
            open_shift_env: self.environment.to_string(),
        }
    }
}

/// Images for `dev` stay local unless forced.
pub fn should_push(environment: Environment, force: bool) -> bool {
    environment != Environment::Dev || force
}
