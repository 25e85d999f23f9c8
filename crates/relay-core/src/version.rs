//! Next-version computation from existing repository tags.

use crate::api::TagSource;
use crate::bump::BumpKind;
use crate::error::{Error, Result};
use crate::semver::SemVer;

/// Reads tags from a [`TagSource`] and derives current and next versions.
///
/// Never writes: callers decide whether to create the resulting tag.
pub struct VersionResolver<'a, T: TagSource> {
    tags: &'a T,
}

impl<'a, T: TagSource> VersionResolver<'a, T> {
    pub fn new(tags: &'a T) -> Self {
        Self { tags }
    }

    /// Highest semantic-version tag, or [`SemVer::ZERO`] when none exists.
    ///
    /// Tags that are not strict `MAJOR.MINOR.PATCH` are skipped.
    ///
    /// # Errors
    ///
    /// [`Error::VersionLookupFailed`] when the tag listing fails.
    pub async fn latest_version(&self) -> Result<SemVer> {
        let tags = self
            .tags
            .list_tags()
            .await
            .map_err(|source| Error::VersionLookupFailed { source })?;

        let mut skipped = 0usize;
        let latest = tags
            .iter()
            .filter_map(|tag| match tag.name.parse::<SemVer>() {
                Ok(version) => Some(version),
                Err(e) => {
                    tracing::trace!(tag = %tag.name, error = %e, "skipping non-semantic tag");
                    skipped += 1;
                    None
                }
            })
            .max();

        tracing::debug!(total = tags.len(), skipped, "tags scanned");

        match latest {
            Some(version) => Ok(version),
            None => {
                tracing::warn!(baseline = %SemVer::ZERO, "no semantic version tags found");
                Ok(SemVer::ZERO)
            }
        }
    }

    /// `(current, current.increment(bump))`.
    pub async fn next_version(&self, bump: BumpKind) -> Result<(SemVer, SemVer)> {
        let current = self.latest_version().await?;
        let next = current.increment(bump);
        tracing::debug!(%current, %next, %bump, "next version computed");
        Ok((current, next))
    }
}
