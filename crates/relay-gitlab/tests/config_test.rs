use std::collections::HashMap;

use proptest::prelude::*;
use relay_core::ApiError;
use relay_gitlab::config::api_url;
use relay_gitlab::{GitlabClient, GitlabError, TokenKind};

#[test]
fn base_url_with_or_without_api_suffix() {
    for base in [
        "https://gitlab.example.com",
        "https://gitlab.example.com/",
        "https://gitlab.example.com/api/v4",
        "https://gitlab.example.com/api/v4/",
    ] {
        assert_eq!(
            api_url(base).unwrap().as_str(),
            "https://gitlab.example.com/api/v4",
            "base {base}"
        );
    }
}

#[test]
fn self_hosted_subpath_is_kept() {
    let url = api_url("https://example.com/gitlab/api/v4").unwrap();
    assert_eq!(url.as_str(), "https://example.com/gitlab/api/v4");
}

#[test]
fn pipeline_missing_token_names_both_variables() {
    let signals = HashMap::from([
        ("GITLAB_CI", "true"),
        ("CI_API_V4_URL", "https://gitlab.example.com/api/v4"),
        ("CI_PROJECT_ID", "9"),
    ]);
    let err = GitlabClient::from_signals(&signals).err().unwrap();
    match err {
        GitlabError::MissingCredentials { names } => {
            assert_eq!(names, vec!["CI_JOB_TOKEN (or RELAY_TOKEN)".to_owned()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn client_exposes_resolved_config() {
    let signals = HashMap::from([
        ("GITLAB_CI", "true"),
        ("CI_API_V4_URL", "https://gitlab.example.com/api/v4"),
        ("CI_JOB_TOKEN", "job"),
        ("CI_PROJECT_ID", "9"),
    ]);
    let client = GitlabClient::from_signals(&signals).unwrap();
    assert_eq!(client.config().token_kind, TokenKind::Job);
    assert_eq!(client.config().project_id, "9");
}

#[test]
fn status_errors_keep_code_and_body() {
    let err: ApiError = GitlabError::Status {
        operation: "create tag",
        status: 400,
        body: "Tag 1.0.0 already exists".to_owned(),
    }
    .into();
    match err {
        ApiError::Status { status, body, .. } => {
            assert_eq!(status, 400);
            assert!(body.contains("already exists"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn configuration_errors_become_transport_errors() {
    let err: ApiError = GitlabError::MissingCredentials {
        names: vec!["GITLAB_API_TOKEN".to_owned()],
    }
    .into();
    assert!(matches!(err, ApiError::Transport { .. }));
}

proptest! {
    #[test]
    fn project_ids_never_leak_path_separators(
        group in "[a-z][a-z0-9-]{0,8}",
        name in "[a-z][a-z0-9-]{0,8}",
    ) {
        let project = format!("{group}/{name}");
        let signals = HashMap::from([
            ("GITLAB_BASE_URL", "https://gitlab.example.com"),
            ("GITLAB_API_TOKEN", "t"),
            ("GITLAB_PROJECT_ID", project.as_str()),
        ]);
        let client = GitlabClient::from_signals(&signals).unwrap();
        let url = client.project_url(&["releases"]).unwrap();
        let segments: Vec<&str> = url.path_segments().unwrap().collect();
        prop_assert_eq!(segments.len(), 5);
        prop_assert_eq!(segments[3], format!("{group}%2F{name}"));
    }
}
