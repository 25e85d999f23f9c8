//! Image tag generation for a build.

use crate::context::Context;
use crate::environment::Environment;
use crate::image::{ImageRef, LATEST};
use crate::signals::keys;

/// Prefix of release-candidate tags.
pub const RC_PREFIX: &str = "rc";

/// Produce the ordered, fully-qualified tags for a build.
///
/// The first entry is the immutable SHA-qualified tag; later entries are
/// floating aliases applied in order. Rules, first match wins:
///
/// 1. merge request into the integration branch:
///    `{registry}/{app}:rc-{sha}`, then `{registry}/{app}:rc-latest`
/// 2. feature namespace: `{registry}/{env}/{ref}:{sha}`; the branch name
///    takes the application slot so concurrent branches never collide.
///    `app_name` is not used here, so an application-name override
///    (`RELAY_APPLICATION_NAME` or `[build] application_name`) never
///    appears in feature image paths
/// 3. otherwise `{registry}/{env}/{app}:{sha}`, followed by
///    `{registry}/{env}/{app}:{tag}` for tag pipelines
///
/// # Errors
///
/// [`crate::Error::MissingSignals`] when the registry path or short SHA is
/// empty, and [`crate::Error::InvalidRefName`] when a ref that would become
/// part of the image path is unusable (contains `:`, `@`, whitespace, or an
/// empty path segment).
pub fn generate_tags(
    ctx: &Context,
    env: Environment,
    app_name: &str,
    short_sha: &str,
) -> crate::Result<Vec<String>> {
    let mut missing = Vec::new();
    if ctx.registry_image.is_empty() {
        missing.push(keys::REGISTRY_IMAGE.to_owned());
    }
    if short_sha.is_empty() {
        missing.push(keys::COMMIT_SHORT_SHA.to_owned());
    }
    crate::Error::check_missing(missing)?;

    let registry = ctx.registry_image.as_str();

    let tags = if ctx.is_merge_to_integration() {
        let repository = format!("{registry}/{app_name}");
        vec![
            ImageRef::new(&repository, format!("{RC_PREFIX}-{short_sha}")),
            ImageRef::new(&repository, format!("{RC_PREFIX}-{LATEST}")),
        ]
    } else if env == Environment::Feature {
        validate_ref_segment(&ctx.ref_name)?;
        vec![ImageRef::new(
            format!("{registry}/{env}/{}", ctx.ref_name),
            short_sha,
        )]
    } else {
        let mut tags = vec![ImageRef::in_environment(registry, env, app_name, short_sha)];
        if ctx.is_tag && ctx.tag != short_sha {
            validate_ref_segment(&ctx.tag)?;
            tags.push(ImageRef::in_environment(registry, env, app_name, &ctx.tag));
        }
        tags
    };

    let tags: Vec<String> = tags.iter().map(ToString::to_string).collect();
    tracing::debug!(?tags, %env, "image tags generated");
    Ok(tags)
}

fn validate_ref_segment(ref_name: &str) -> crate::Result<()> {
    let reason = if ref_name.is_empty() {
        Some("ref name is empty")
    } else if ref_name.contains(':') {
        Some("contains ':'")
    } else if ref_name.contains('@') {
        Some("contains '@'")
    } else if ref_name.contains(char::is_whitespace) {
        Some("contains whitespace")
    } else if ref_name.split('/').any(str::is_empty) {
        Some("has an empty path segment")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(crate::Error::InvalidRefName {
            ref_name: ref_name.to_owned(),
            reason,
        }),
        None => Ok(()),
    }
}
