//! Container image operations for relay.
//!
//! Every `docker` invocation goes through an [`ImageExecutor`], so
//! promotion and rollback sequences can be verified without a daemon.
//! Both engines only ever re-tag and re-push; nothing here rebuilds an
//! image that already exists.

pub mod client;
pub mod credentials;
pub mod docker;
pub mod executor;
pub mod operation;
pub mod promote;
pub mod rollback;

pub use client::{CheckResult, DoctorReport, ImageClient};
pub use credentials::RegistryCredentials;
pub use docker::DockerError;
pub use executor::{ImageExecutor, RealExecutor};
pub use operation::ImageOperation;
pub use promote::{
    PromoteError, PromotionReport, PromotionRequest, PromotionStrategy, Promoter,
};
pub use rollback::{RollbackError, RollbackPlan, RollbackRequest, rollback};
