//! Ambient pipeline variables.
//!
//! Every component reads CI variables through a [`SignalSource`] handed to
//! it by the caller; nothing below the binary touches the process
//! environment directly. Tests pass a `HashMap`.

use std::collections::HashMap;

/// Well-known variable names.
pub mod keys {
    pub const PIPELINE_SOURCE: &str = "CI_PIPELINE_SOURCE";
    pub const REF_NAME: &str = "CI_COMMIT_REF_NAME";
    pub const COMMIT_SHA: &str = "CI_COMMIT_SHA";
    pub const COMMIT_SHORT_SHA: &str = "CI_COMMIT_SHORT_SHA";
    pub const COMMIT_TAG: &str = "CI_COMMIT_TAG";
    pub const MERGE_REQUEST_IID: &str = "CI_MERGE_REQUEST_IID";
    pub const MERGE_REQUEST_TARGET: &str = "CI_MERGE_REQUEST_TARGET_BRANCH_NAME";
    pub const REGISTRY: &str = "CI_REGISTRY";
    pub const REGISTRY_IMAGE: &str = "CI_REGISTRY_IMAGE";
    pub const REGISTRY_USER: &str = "CI_REGISTRY_USER";
    pub const REGISTRY_PASSWORD: &str = "CI_REGISTRY_PASSWORD";
    pub const JOB_TOKEN: &str = "CI_JOB_TOKEN";
    pub const DEFAULT_BRANCH: &str = "CI_DEFAULT_BRANCH";
    pub const PROJECT_PATH: &str = "CI_PROJECT_PATH";
    pub const PROJECT_ID: &str = "CI_PROJECT_ID";
    pub const API_V4_URL: &str = "CI_API_V4_URL";
    pub const GITLAB_CI: &str = "GITLAB_CI";

    pub const APPLICATION_NAME: &str = "RELAY_APPLICATION_NAME";
    pub const FEATURE_BRANCH_PREFIX: &str = "RELAY_FEATURE_BRANCH_PREFIX";
    pub const FORCE_PUSH: &str = "RELAY_FORCE_PUSH";
    pub const DOCKERFILE: &str = "RELAY_DOCKERFILE";
    pub const BUILD_CONTEXT: &str = "RELAY_BUILD_CONTEXT";
    pub const BUILD_EXTRA_ARGS: &str = "RELAY_BUILD_EXTRA_ARGS";
    pub const METADATA_PATH: &str = "RELAY_METADATA_PATH";
    pub const TOKEN: &str = "RELAY_TOKEN";

    pub const GITLAB_BASE_URL: &str = "GITLAB_BASE_URL";
    pub const GITLAB_API_TOKEN: &str = "GITLAB_API_TOKEN";
    pub const GITLAB_PROJECT_ID: &str = "GITLAB_PROJECT_ID";
    pub const GITLAB_TIMEOUT_SECONDS: &str = "GITLAB_CLIENT_TIMEOUT_SECONDS";
}

/// Key-value lookup of pipeline variables. Pure read.
pub trait SignalSource {
    fn get(&self, key: &str) -> Option<String>;

    /// Value of `key`, treating empty and whitespace-only values as absent.
    fn non_empty(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| !v.trim().is_empty())
    }

    /// `true` only for the literal value `"true"` (case-insensitive).
    fn flag(&self, key: &str) -> bool {
        self.get(key)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    }

    /// Value of `key` or an empty string.
    fn or_empty(&self, key: &str) -> String {
        self.get(key).unwrap_or_default()
    }
}

/// Reads from the process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSignals;

impl SignalSource for EnvSignals {
    fn get(&self, key: &str) -> Option<String> {
        // arch-lint: allow(no-silent-result-drop) reason="unset or non-UTF-8 means absent"
        std::env::var(key).ok()
    }
}

impl SignalSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

impl SignalSource for HashMap<&str, &str> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).map(|v| (*v).to_owned())
    }
}

impl<S: SignalSource + ?Sized> SignalSource for &S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}
