use relay_core::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum GitlabError {
    #[error("missing GitLab settings: {}", names.join(", "))]
    MissingCredentials { names: Vec<String> },

    #[error("invalid GitLab base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to build HTTP client")]
    Client { source: reqwest::Error },

    #[error("{operation}: request failed")]
    Request {
        operation: &'static str,
        source: reqwest::Error,
    },

    #[error("{operation}: HTTP {status}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("{operation}: unexpected response body")]
    Decode {
        operation: &'static str,
        source: reqwest::Error,
    },
}

impl From<GitlabError> for ApiError {
    fn from(err: GitlabError) -> Self {
        match err {
            GitlabError::Request { operation, source } => ApiError::Transport {
                operation,
                source: Box::new(source),
            },
            GitlabError::Status {
                operation,
                status,
                body,
            } => ApiError::Status {
                operation,
                status,
                body,
            },
            GitlabError::Decode { operation, source } => ApiError::Decode {
                operation,
                source: Box::new(source),
            },
            other => ApiError::Transport {
                operation: "gitlab client",
                source: Box::new(other),
            },
        }
    }
}
