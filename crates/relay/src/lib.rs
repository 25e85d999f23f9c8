//! Build once, promote the same artifact through every environment.
//!
//! This is the unified facade crate that re-exports all Relay sub-crates.
//! Use feature flags to control which components are included.
//!
//! # Feature flags
//!
//! | Feature | Default | Crate | Description |
//! |---------|---------|-------|-------------|
//! | `core` | yes | `relay-core` | Context, routing, tags, versions, release engine |
//! | `build` | yes | `relay-build` | Build plans and the metadata artifact |
//! | `registry` | yes | `relay-registry` | Docker operations, promotion, rollback |
//! | `gitlab` | yes | `relay-gitlab` | GitLab REST client |
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use relay::{Context, EnvSignals, RelayConfig, generate_tags, route};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RelayConfig::load(Path::new("."))?;
//! let ctx = Context::resolve(&EnvSignals, &config, true);
//! let env = route(&ctx);
//! for tag in generate_tags(&ctx, env, &ctx.application_name, &ctx.short_sha)? {
//!     println!("{tag}");
//! }
//! # Ok(())
//! # }
//! ```

// Core types flattened into root namespace for convenience.
#[cfg(feature = "core")]
pub use relay_core::*;

/// Build plans and the `relay_output.json` artifact.
#[cfg(feature = "build")]
pub mod build {
    pub use relay_build::*;
}

/// Image operations through `docker`, promotion, and rollback.
#[cfg(feature = "registry")]
pub mod registry {
    pub use relay_registry::*;
}

/// GitLab tags, releases, merge requests, and protected branches.
#[cfg(feature = "gitlab")]
pub mod gitlab {
    pub use relay_gitlab::*;
}
