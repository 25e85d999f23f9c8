mod build;
mod bump;
mod context;
mod doctor;
mod promote;
mod protected_branches;
mod push;
mod release;
mod rollback;
mod update_mr;

use std::path::Path;

use relay_core::{Context, EnvSignals, RelayConfig};
use relay_gitlab::GitlabClient;

pub use build::build;
pub use bump::bump;
pub use context::context;
pub use doctor::doctor;
pub use promote::{promote, promote_sprint};
pub use protected_branches::protected_branches;
pub use push::push;
pub use release::{release_create, release_infer_bump};
pub use rollback::rollback;
pub use update_mr::update_mr;

/// `relay.toml` from the working directory and the pipeline context.
pub(crate) fn load(dry_run: bool) -> anyhow::Result<(RelayConfig, Context)> {
    let config = RelayConfig::load(Path::new("."))?;
    let ctx = Context::resolve(&EnvSignals, &config, dry_run);
    Ok((config, ctx))
}

pub(crate) fn gitlab() -> anyhow::Result<GitlabClient> {
    Ok(GitlabClient::from_signals(&EnvSignals)?)
}
