//! GitLab REST implementation of the relay-core API traits.
//!
//! Covers repository tags, releases, merge-request descriptions and
//! notes, and protected branches for a single project.

pub mod client;
pub mod config;
pub mod error;

pub use client::{GitlabClient, Project, ProtectedBranch};
pub use config::{GitlabConfig, TokenKind};
pub use error::GitlabError;
