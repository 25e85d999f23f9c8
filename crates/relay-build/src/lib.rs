//! Build planning for relay.
//!
//! # Build pipeline
//!
//! ```text
//! relay build
//!   1. Context   ── Context::resolve(signals, relay.toml)
//!   2. Plan      ── BuildPlan::resolve() → environment, tags, should_push
//!   3. Build     ── docker build -t <tag>... -f <dockerfile> <context>
//!   4. Metadata  ── relay_output.json for later jobs
//! relay push
//!   5. Login     ── docker login --password-stdin
//!   6. Push      ── docker push <tag> (each plan tag, in order)
//!   7. Logout    ── best-effort
//! ```
//!
//! Push is skipped for `dev` images unless `RELAY_FORCE_PUSH=true`.

pub mod metadata;
pub mod plan;

pub use metadata::{BuildMetadata, MetadataError};
pub use plan::BuildPlan;
