//! Bump intent extraction from merge-request text.
//!
//! A merge request opts into a bump level by ticking one box of the release
//! checklist ([`RELEASE_CHECKLIST`]). The checklist is recognised by its
//! guard marker; boxes outside a checklist block are ignored.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

/// Guard marker that opens the release checklist block.
pub const CHECKLIST_MARKER: &str = "[relay]";

/// Release checklist appended to merge-request descriptions.
pub const RELEASE_CHECKLIST: &str = include_str!("../assets/release_checklist.md");

static CHECKED_BOX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^\s*-\s*\[x\]\s*\*\*(patch|minor|major)\*\*")
        .expect("checkbox pattern is a valid regex")
});

/// Magnitude of a semantic version increase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BumpKind {
    #[default]
    Patch,
    Minor,
    Major,
}

impl BumpKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Patch => "patch",
            Self::Minor => "minor",
            Self::Major => "major",
        }
    }
}

impl fmt::Display for BumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BumpKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "patch" => Ok(Self::Patch),
            "minor" => Ok(Self::Minor),
            "major" => Ok(Self::Major),
            _ => Err(crate::Error::UnknownBump(s.to_owned())),
        }
    }
}

/// Why a bump fell back to the Patch default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultReason {
    /// The text carries no `[relay]` checklist.
    MissingMarker,
    /// The checklist is present but no box is ticked.
    NoBoxChecked,
    /// No merge request was available to read.
    NoMergeRequest,
    /// The merge request could not be fetched.
    LookupFailed,
}

impl fmt::Display for DefaultReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MissingMarker => "no release checklist found",
            Self::NoBoxChecked => "no version checkbox checked",
            Self::NoMergeRequest => "no merge request context available",
            Self::LookupFailed => "merge request description could not be fetched",
        })
    }
}

/// Where a bump decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpSource {
    /// Supplied explicitly by the caller.
    Explicit,
    /// Read from a ticked checklist box.
    Checkbox,
    /// Policy default; callers should surface the reason as a warning.
    Default(DefaultReason),
}

impl fmt::Display for BumpSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit => f.write_str("explicit"),
            Self::Checkbox => f.write_str("checklist"),
            Self::Default(reason) => write!(f, "default ({reason})"),
        }
    }
}

/// A bump level together with its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BumpDecision {
    pub kind: BumpKind,
    pub source: BumpSource,
}

impl BumpDecision {
    pub fn explicit(kind: BumpKind) -> Self {
        Self {
            kind,
            source: BumpSource::Explicit,
        }
    }

    /// The Patch default. Logged at warning level so an intentional default
    /// is distinguishable from a misread checklist.
    pub fn fallback(reason: DefaultReason) -> Self {
        tracing::warn!(%reason, "defaulting to patch bump");
        Self {
            kind: BumpKind::Patch,
            source: BumpSource::Default(reason),
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self.source, BumpSource::Default(_))
    }
}

/// Classify a merge-request description or comment body.
///
/// The checklist block starts at the first line beginning with
/// [`CHECKLIST_MARKER`]. Within it, the first ticked box in document order
/// wins; several ticked boxes are not treated as an error.
pub fn classify(text: &str) -> BumpDecision {
    let Some(block) = checklist_block(text) else {
        return BumpDecision::fallback(DefaultReason::MissingMarker);
    };

    let Some(captures) = CHECKED_BOX.captures(block) else {
        return BumpDecision::fallback(DefaultReason::NoBoxChecked);
    };

    let kind = match captures[1].to_ascii_lowercase().as_str() {
        "major" => BumpKind::Major,
        "minor" => BumpKind::Minor,
        _ => BumpKind::Patch,
    };
    tracing::debug!(bump = %kind, "bump read from checklist");

    BumpDecision {
        kind,
        source: BumpSource::Checkbox,
    }
}

/// Whether `text` already carries the release checklist.
pub fn has_checklist(text: &str) -> bool {
    checklist_block(text).is_some()
}

/// `description` with the release checklist appended, or `None` when it
/// already carries one.
pub fn append_checklist(description: &str) -> Option<String> {
    if has_checklist(description) {
        return None;
    }
    let body = description.trim_end();
    if body.is_empty() {
        return Some(RELEASE_CHECKLIST.to_owned());
    }
    Some(format!("{body}\n\n{RELEASE_CHECKLIST}"))
}

fn checklist_block(text: &str) -> Option<&str> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.trim_start().starts_with(CHECKLIST_MARKER) {
            return Some(&text[offset..]);
        }
        offset += line.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checklist(patch: bool, minor: bool, major: bool) -> String {
        let mark = |b: bool| if b { "x" } else { " " };
        format!(
            "[relay] Please check **one** to indicate the semantic versioning level \
             of this release\n\
             - [{}] **Patch** (*.*.x) - Bug fixes only\n\
             - [{}] **Minor** (*.x.*) - New functionality\n\
             - [{}] **Major** (x.*.*) - Breaking changes\n",
            mark(patch),
            mark(minor),
            mark(major),
        )
    }

    #[test]
    fn single_checked_box() {
        assert_eq!(classify(&checklist(true, false, false)).kind, BumpKind::Patch);
        assert_eq!(classify(&checklist(false, true, false)).kind, BumpKind::Minor);
        assert_eq!(classify(&checklist(false, false, true)).kind, BumpKind::Major);
        assert_eq!(
            classify(&checklist(false, false, true)).source,
            BumpSource::Checkbox
        );
    }

    #[test]
    fn major_among_unchecked_lines() {
        let decision = classify(&checklist(false, false, true));
        assert_eq!(decision.kind, BumpKind::Major);
        assert!(!decision.is_default());
    }

    #[test]
    fn first_checked_box_wins() {
        assert_eq!(classify(&checklist(false, true, true)).kind, BumpKind::Minor);
        assert_eq!(classify(&checklist(true, true, true)).kind, BumpKind::Patch);
    }

    #[test]
    fn nothing_checked_defaults_to_patch() {
        let decision = classify(&checklist(false, false, false));
        assert_eq!(decision.kind, BumpKind::Patch);
        assert_eq!(
            decision.source,
            BumpSource::Default(DefaultReason::NoBoxChecked)
        );
    }

    #[test]
    fn missing_marker_defaults_to_patch() {
        let decision = classify("- [x] **Major** but no checklist marker");
        assert_eq!(decision.kind, BumpKind::Patch);
        assert_eq!(
            decision.source,
            BumpSource::Default(DefaultReason::MissingMarker)
        );
    }

    #[test]
    fn empty_text_defaults_to_patch() {
        assert_eq!(classify("").kind, BumpKind::Patch);
        assert!(classify("").is_default());
    }

    #[test]
    fn case_insensitive_checkbox() {
        let text = "[relay] pick one\n- [X] **MINOR** new things\n";
        assert_eq!(classify(text).kind, BumpKind::Minor);
    }

    #[test]
    fn checklist_appended_after_description() {
        let text = format!(
            "Adds login flow.\n\n- [x] **Major** unrelated todo above the block\n\n{}",
            checklist(false, true, false)
        );
        assert_eq!(classify(&text).kind, BumpKind::Minor);
    }

    #[test]
    fn bundled_checklist_is_recognised_but_unchecked() {
        assert!(has_checklist(RELEASE_CHECKLIST));
        assert_eq!(
            classify(RELEASE_CHECKLIST).source,
            BumpSource::Default(DefaultReason::NoBoxChecked)
        );
    }

    #[test]
    fn append_checklist_is_idempotent() {
        let once = append_checklist("Adds login.").unwrap();
        assert!(once.starts_with("Adds login.\n\n[relay]"));
        assert_eq!(append_checklist(&once), None);
        assert_eq!(append_checklist("").as_deref(), Some(RELEASE_CHECKLIST));
    }

    #[test]
    fn bump_kind_from_str() {
        assert_eq!("Minor".parse::<BumpKind>().unwrap(), BumpKind::Minor);
        assert_eq!(" major ".parse::<BumpKind>().unwrap(), BumpKind::Major);
        let err = "huge".parse::<BumpKind>().unwrap_err();
        assert!(err.to_string().contains("huge"), "got: {err}");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn text_without_marker_is_always_patch(s in "[^\\[]{0,200}") {
                let decision = classify(&s);
                prop_assert_eq!(decision.kind, BumpKind::Patch);
                prop_assert!(decision.is_default());
            }

            #[test]
            fn classify_never_panics(s in "\\PC{0,300}") {
                let _ = classify(&s);
            }
        }
    }
}
