//! Core types for relay.
//!
//! This crate resolves a CI invocation into a [`Context`], routes it to an
//! [`Environment`], generates image tags, and computes semantic versions
//! from repository tags and merge-request checklists. External systems are
//! reached only through the traits in [`api`].

pub mod api;
pub mod bump;
pub mod config;
pub mod context;
pub mod environment;
pub mod error;
pub mod image;
pub mod release;
pub mod semver;
pub mod signals;
pub mod tags;
pub mod version;

pub use api::{ApiError, MergeRequestApi, ReleaseApi, TagInfo, TagSource, WriteOutcome};
pub use bump::{BumpDecision, BumpKind, BumpSource, DefaultReason};
pub use config::{BranchPolicy, BuildConfig, FeatureDetection, ReleaseConfig, RelayConfig};
pub use context::{Context, ExecutionMode};
pub use environment::{Environment, route};
pub use error::{Error, Result};
pub use image::ImageRef;
pub use release::{ReleaseEngine, ReleaseOutcome, ReleaseRequest};
pub use semver::SemVer;
pub use signals::{EnvSignals, SignalSource};
pub use tags::generate_tags;
pub use version::VersionResolver;
