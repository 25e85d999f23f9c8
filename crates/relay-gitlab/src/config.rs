use std::fmt;
use std::time::Duration;

use relay_core::SignalSource;
use relay_core::signals::keys;
use reqwest::Url;
use secrecy::SecretString;

use crate::error::GitlabError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const API_SUFFIX: &str = "/api/v4";

/// Which header carries the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `CI_JOB_TOKEN`, sent as `JOB-TOKEN`
    Job,
    /// Personal, project or impersonation token, sent as `PRIVATE-TOKEN`
    Private,
}

impl TokenKind {
    pub fn header(self) -> &'static str {
        match self {
            Self::Job => "JOB-TOKEN",
            Self::Private => "PRIVATE-TOKEN",
        }
    }
}

#[derive(Clone)]
pub struct GitlabConfig {
    /// API root, always ending in `/api/v4`
    pub api_url: Url,
    pub token: SecretString,
    pub token_kind: TokenKind,
    /// Numeric id or `group/project` path
    pub project_id: String,
    pub timeout: Duration,
}

impl fmt::Debug for GitlabConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitlabConfig")
            .field("api_url", &self.api_url.as_str())
            .field("token", &"[REDACTED]")
            .field("token_kind", &self.token_kind)
            .field("project_id", &self.project_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GitlabConfig {
    /// Read connection settings.
    ///
    /// Inside a pipeline (`GITLAB_CI=true`): `CI_API_V4_URL`, `RELAY_TOKEN`
    /// or else `CI_JOB_TOKEN`, and `CI_PROJECT_ID`. Elsewhere:
    /// `GITLAB_BASE_URL`, `GITLAB_API_TOKEN` and `GITLAB_PROJECT_ID`.
    /// `GITLAB_CLIENT_TIMEOUT_SECONDS` overrides the 10 second timeout.
    ///
    /// # Errors
    ///
    /// [`GitlabError::MissingCredentials`] naming every absent variable, or
    /// [`GitlabError::InvalidBaseUrl`].
    pub fn from_signals(signals: &impl SignalSource) -> Result<Self, GitlabError> {
        let in_pipeline = signals.flag(keys::GITLAB_CI);

        let (base_key, project_key) = if in_pipeline {
            (keys::API_V4_URL, keys::PROJECT_ID)
        } else {
            (keys::GITLAB_BASE_URL, keys::GITLAB_PROJECT_ID)
        };
        let base_url = signals.non_empty(base_key);
        let project_id = signals.non_empty(project_key);
        let token = if in_pipeline {
            signals
                .non_empty(keys::TOKEN)
                .map(|t| (t, TokenKind::Private))
                .or_else(|| signals.non_empty(keys::JOB_TOKEN).map(|t| (t, TokenKind::Job)))
        } else {
            signals
                .non_empty(keys::GITLAB_API_TOKEN)
                .map(|t| (t, TokenKind::Private))
        };

        let mut missing = Vec::new();
        if base_url.is_none() {
            missing.push(base_key.to_owned());
        }
        if token.is_none() {
            missing.push(if in_pipeline {
                format!("{} (or {})", keys::JOB_TOKEN, keys::TOKEN)
            } else {
                keys::GITLAB_API_TOKEN.to_owned()
            });
        }
        if project_id.is_none() {
            missing.push(project_key.to_owned());
        }

        let (Some(base_url), Some((token, token_kind)), Some(project_id)) =
            (base_url, token, project_id)
        else {
            return Err(GitlabError::MissingCredentials { names: missing });
        };

        let config = Self {
            api_url: api_url(&base_url)?,
            token: SecretString::from(token),
            token_kind,
            project_id,
            timeout: timeout(signals),
        };
        tracing::debug!(
            api_url = %config.api_url,
            project = %config.project_id,
            token_kind = ?config.token_kind,
            "gitlab config resolved"
        );
        Ok(config)
    }
}

/// Normalise a base URL (with or without `/api/v4`) to the API root.
pub fn api_url(base: &str) -> Result<Url, GitlabError> {
    let trimmed = base.trim().trim_end_matches('/');
    let root = trimmed.strip_suffix(API_SUFFIX).unwrap_or(trimmed);

    let invalid = |reason: String| GitlabError::InvalidBaseUrl {
        url: base.to_owned(),
        reason,
    };

    let url = Url::parse(&format!("{root}{API_SUFFIX}")).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot be a base".to_owned()));
    }
    Ok(url)
}

fn timeout(signals: &impl SignalSource) -> Duration {
    let Some(raw) = signals.non_empty(keys::GITLAB_TIMEOUT_SECONDS) else {
        return DEFAULT_TIMEOUT;
    };
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Duration::from_secs(secs),
        Ok(_) => {
            tracing::warn!(value = %raw, "GitLab timeout must be positive, using default");
            DEFAULT_TIMEOUT
        }
        Err(e) => {
            tracing::warn!(
                value = %raw,
                error = %e,
                "ignoring invalid GitLab timeout, using default"
            );
            DEFAULT_TIMEOUT
        }
    }
}
