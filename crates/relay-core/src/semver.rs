//! Strict `MAJOR.MINOR.PATCH` versions.
//!
//! Only three dot-separated non-negative integers are accepted. Prefixes
//! (`v1.2.3`), pre-release and build suffixes are rejected so that tag
//! listings containing them are treated as non-semantic and skipped.

use std::fmt;
use std::str::FromStr;

use crate::bump::BumpKind;

/// A semantic version triple.
///
/// Ordering is lexicographic on `(major, minor, patch)`, which is exactly
/// the field declaration order used by the derived [`Ord`].
///
/// # Examples
///
/// ```
/// use relay_core::{BumpKind, SemVer};
///
/// let current: SemVer = "1.3.0".parse().unwrap();
/// assert_eq!(current.increment(BumpKind::Minor).to_string(), "1.4.0");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SemVer {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

/// Which component of a version string failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Major,
    Minor,
    Patch,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Patch => "patch",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid version {input:?}: expected MAJOR.MINOR.PATCH, found {found} component(s)")]
    Arity { input: String, found: usize },

    #[error(
        "invalid version {input:?}: {component} component {value:?} is not a non-negative integer"
    )]
    Component {
        input: String,
        component: Component,
        value: String,
    },

    #[error("invalid version {input:?}: {component} component {value:?} has a leading zero")]
    LeadingZero {
        input: String,
        component: Component,
        value: String,
    },

    #[error("invalid version {input:?}: {component} component {value:?} exceeds {max}")]
    OutOfRange {
        input: String,
        component: Component,
        value: String,
        max: u64,
    },
}

/// Largest component [`SemVer::from_str`] accepts. Parsed versions can
/// therefore always be incremented.
pub const MAX_COMPONENT: u64 = u32::MAX as u64;

impl SemVer {
    /// The baseline used when a repository has no semantic tags yet.
    pub const ZERO: Self = Self::new(0, 0, 0);

    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Return the version that follows `self` for the given bump.
    ///
    /// Parsed components are bounded by [`MAX_COMPONENT`]; a hand-built
    /// `u64::MAX` component saturates instead of wrapping to zero.
    pub fn increment(self, bump: BumpKind) -> Self {
        match bump {
            BumpKind::Major => Self::new(self.major.saturating_add(1), 0, 0),
            BumpKind::Minor => Self::new(self.major, self.minor.saturating_add(1), 0),
            BumpKind::Patch => Self::new(self.major, self.minor, self.patch.saturating_add(1)),
        }
    }
}

impl FromStr for SemVer {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        let [major, minor, patch] = parts.as_slice() else {
            return Err(ParseError::Arity {
                input: s.to_owned(),
                found: parts.len(),
            });
        };

        Ok(Self {
            major: parse_component(s, major, Component::Major)?,
            minor: parse_component(s, minor, Component::Minor)?,
            patch: parse_component(s, patch, Component::Patch)?,
        })
    }
}

/// `u64::from_str` accepts a leading `+`, so digits are checked explicitly.
/// Leading zeros are rejected so that formatting a parsed value reproduces
/// its input.
fn parse_component(input: &str, value: &str, component: Component) -> Result<u64, ParseError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::Component {
            input: input.to_owned(),
            component,
            value: value.to_owned(),
        });
    }
    if value.len() > 1 && value.starts_with('0') {
        return Err(ParseError::LeadingZero {
            input: input.to_owned(),
            component,
            value: value.to_owned(),
        });
    }

    let out_of_range = || ParseError::OutOfRange {
        input: input.to_owned(),
        component,
        value: value.to_owned(),
        max: MAX_COMPONENT,
    };
    match value.parse::<u64>() {
        Ok(n) if n <= MAX_COMPONENT => Ok(n),
        Ok(_) => Err(out_of_range()),
        // all digits, so the only failure is overflow
        Err(e) => {
            tracing::trace!(value, error = %e, "version component overflows u64");
            Err(out_of_range())
        }
    }
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
