//! Image reference naming.

use std::fmt;
use std::str::FromStr;

use crate::environment::Environment;

/// Floating tag every environment repository carries.
pub const LATEST: &str = "latest";

/// A `repository:tag` image reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef {
    pub repository: String,
    pub tag: String,
}

impl ImageRef {
    pub fn new(repository: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            tag: tag.into(),
        }
    }

    /// `{registry}/{env}/{app}:{tag}`
    pub fn in_environment(registry: &str, env: Environment, app: &str, tag: &str) -> Self {
        Self::new(format!("{registry}/{env}/{app}"), tag)
    }

    /// Resolve a user-supplied reference.
    ///
    /// A bare tag (no `/` and no `:`) is placed in `default_repository`;
    /// anything else is parsed as a full reference.
    pub fn resolve(reference: &str, default_repository: &str) -> crate::Result<Self> {
        let reference = reference.trim();
        if !reference.is_empty() && !reference.contains(['/', ':']) {
            if default_repository.is_empty() {
                return Err(crate::Error::InvalidImageRef {
                    reference: reference.to_owned(),
                    reason: "bare tag given but no registry image is configured",
                });
            }
            validate_tag(reference, reference)?;
            return Ok(Self::new(default_repository, reference));
        }
        reference.parse()
    }

    /// The same repository under a different tag.
    pub fn with_tag(&self, tag: impl Into<String>) -> Self {
        Self::new(self.repository.clone(), tag)
    }

    /// Floating alias published next to this reference during promotion.
    ///
    /// `test-abc1234` becomes `test-latest`; any other tag `t` becomes
    /// `t-latest`. Returns `None` when this reference already is the alias.
    pub fn latest_alias(&self) -> Option<Self> {
        let alias = match self.tag.split_once('-') {
            Some((prefix, _)) if prefix.parse::<Environment>().is_ok() => {
                format!("{prefix}-{LATEST}")
            }
            _ => format!("{}-{LATEST}", self.tag),
        };
        (alias != self.tag).then(|| self.with_tag(alias))
    }
}

impl FromStr for ImageRef {
    type Err = crate::Error;

    /// The tag separator is the last `:` after the last `/`, so registry
    /// hosts with ports (`host:5000/app:1.0`) parse correctly. A reference
    /// without a tag gets `latest`, as with `docker`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| crate::Error::InvalidImageRef {
            reference: s.to_owned(),
            reason,
        };

        if s.is_empty() {
            return Err(invalid("reference is empty"));
        }
        if s.contains(char::is_whitespace) {
            return Err(invalid("reference contains whitespace"));
        }

        let path_start = s.rfind('/').map_or(0, |i| i + 1);
        let (repository, tag) = match s[path_start..].rfind(':') {
            Some(i) => (&s[..path_start + i], &s[path_start + i + 1..]),
            None => (s, LATEST),
        };

        if repository.is_empty() || repository.split('/').any(str::is_empty) {
            return Err(invalid("repository path has an empty segment"));
        }
        validate_tag(s, tag)?;
        Ok(Self::new(repository, tag))
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}

fn validate_tag(reference: &str, tag: &str) -> crate::Result<()> {
    if tag.is_empty() {
        return Err(crate::Error::InvalidImageRef {
            reference: reference.to_owned(),
            reason: "tag is empty",
        });
    }
    if !tag
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(crate::Error::InvalidImageRef {
            reference: reference.to_owned(),
            reason: "tag may only contain letters, digits, '_', '.', and '-'",
        });
    }
    Ok(())
}
