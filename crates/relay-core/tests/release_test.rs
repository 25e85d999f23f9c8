use std::collections::HashMap;

use mockall::mock;
use mockall::predicate::eq;
use relay_core::api::{
    ApiError, MergeRequest, MergeRequestApi, Note, Release, ReleaseApi, TagInfo, TagSource,
    WriteOutcome,
};
use relay_core::bump::RELEASE_CHECKLIST;
use relay_core::release::{infer_bump, resolve_merge_request_id};
use relay_core::{
    BumpKind, BumpSource, Context, DefaultReason, Error, ReleaseConfig, ReleaseEngine,
    ReleaseRequest, RelayConfig, SemVer,
};

mock! {
    Releases {}

    impl TagSource for Releases {
        async fn list_tags(&self) -> Result<Vec<TagInfo>, ApiError>;
    }

    impl ReleaseApi for Releases {
        async fn create_tag(
            &self,
            name: &str,
            ref_name: &str,
            message: &str,
        ) -> Result<(), ApiError>;
        async fn create_release(
            &self,
            tag_name: &str,
            ref_name: &str,
            name: &str,
            description: &str,
        ) -> Result<(), ApiError>;
        async fn latest_release(&self) -> Result<Option<Release>, ApiError>;
    }
}

mock! {
    MergeRequests {}

    impl MergeRequestApi for MergeRequests {
        async fn description(&self, iid: &str) -> Result<String, ApiError>;
        async fn update_description(&self, iid: &str, description: &str) -> Result<(), ApiError>;
        async fn notes(&self, iid: &str) -> Result<Vec<Note>, ApiError>;
        async fn post_note(&self, iid: &str, body: &str) -> Result<(), ApiError>;
        async fn latest_open(&self) -> Result<Option<MergeRequest>, ApiError>;
    }
}

const SHA: &str = "0123456789abcdef0123456789abcdef01234567";

fn context(vars: &[(&str, &str)], dry_run: bool) -> Context {
    let signals: HashMap<&str, &str> = vars.iter().copied().collect();
    Context::resolve(&signals, &RelayConfig::default(), dry_run)
}

fn releases_with_tags(names: &'static [&'static str]) -> MockReleases {
    let mut mock = MockReleases::new();
    mock.expect_list_tags()
        .returning(move || Ok(names.iter().map(|n| TagInfo::new(*n)).collect()));
    mock
}

fn api_failure(operation: &'static str) -> ApiError {
    ApiError::Status {
        operation,
        status: 500,
        body: "boom".to_owned(),
    }
}

fn checked(kind: &str) -> String {
    RELEASE_CHECKLIST.replace(&format!("- [ ] **{kind}**"), &format!("- [x] **{kind}**"))
}

// ── Bump resolution ──

#[tokio::test]
async fn explicit_bump_skips_merge_request_lookup() {
    let mut releases = releases_with_tags(&["1.2.3"]);
    releases
        .expect_create_release()
        .with(eq("2.0.0"), eq(SHA), eq("2.0.0"), eq(""))
        .times(1)
        .returning(|_, _, _, _| Ok(()));
    let merge_requests = MockMergeRequests::new();
    let config = ReleaseConfig::default();
    let ctx = context(&[("CI_COMMIT_SHA", SHA)], false);

    let request = ReleaseRequest {
        bump: Some(BumpKind::Major),
        merge_request_id: Some("7".to_owned()),
        ..Default::default()
    };
    let outcome = ReleaseEngine::new(&releases, &merge_requests, &config)
        .release(&ctx, &request)
        .await
        .unwrap();

    assert_eq!(outcome.bump_source, BumpSource::Explicit);
    assert_eq!(outcome.next, SemVer::new(2, 0, 0));
    assert!(outcome.created);
    assert_eq!(outcome.version(), "2.0.0");
}

#[tokio::test]
async fn bump_inferred_from_checklist() {
    let mut releases = releases_with_tags(&["1.2.3", "1.3.0", "0.9.9"]);
    releases
        .expect_create_release()
        .with(eq("1.4.0"), eq("main-branch"), eq("Sprint 12"), eq("notes"))
        .times(1)
        .returning(|_, _, _, _| Ok(()));
    let mut merge_requests = MockMergeRequests::new();
    merge_requests
        .expect_description()
        .with(eq("42"))
        .returning(|_| Ok(format!("Adds export.\n\n{}", checked("Minor"))));
    let config = ReleaseConfig::default();
    let ctx = context(&[], false);

    let request = ReleaseRequest {
        ref_name: Some("main-branch".to_owned()),
        name: Some("Sprint 12".to_owned()),
        description: "notes".to_owned(),
        merge_request_id: Some("42".to_owned()),
        ..Default::default()
    };
    let outcome = ReleaseEngine::new(&releases, &merge_requests, &config)
        .release(&ctx, &request)
        .await
        .unwrap();

    assert_eq!(outcome.current, SemVer::new(1, 3, 0));
    assert_eq!(outcome.next, SemVer::new(1, 4, 0));
    assert_eq!(outcome.bump, BumpKind::Minor);
    assert_eq!(outcome.bump_source, BumpSource::Checkbox);
    assert_eq!(outcome.name, "Sprint 12");
}

#[tokio::test]
async fn no_merge_request_defaults_to_patch() {
    let releases = releases_with_tags(&["0.1.0"]);
    let merge_requests = MockMergeRequests::new();
    let config = ReleaseConfig::default();
    let ctx = context(&[], true);

    let request = ReleaseRequest {
        dry_run: true,
        ..Default::default()
    };
    let outcome = ReleaseEngine::new(&releases, &merge_requests, &config)
        .release(&ctx, &request)
        .await
        .unwrap();

    assert_eq!(outcome.bump, BumpKind::Patch);
    assert_eq!(
        outcome.bump_source,
        BumpSource::Default(DefaultReason::NoMergeRequest)
    );
    assert_eq!(outcome.next.to_string(), "0.1.1");
}

#[tokio::test]
async fn description_lookup_failure_defaults_to_patch() {
    let mut merge_requests = MockMergeRequests::new();
    merge_requests
        .expect_description()
        .returning(|_| Err(api_failure("get merge request")));

    let decision = infer_bump(&merge_requests, Some("9")).await;
    assert_eq!(decision.kind, BumpKind::Patch);
    assert_eq!(
        decision.source,
        BumpSource::Default(DefaultReason::LookupFailed)
    );
}

#[tokio::test]
async fn unticked_checklist_defaults_to_patch() {
    let mut merge_requests = MockMergeRequests::new();
    merge_requests
        .expect_description()
        .returning(|_| Ok(RELEASE_CHECKLIST.to_owned()));

    let decision = infer_bump(&merge_requests, Some("9")).await;
    assert!(decision.is_default());
    assert_eq!(
        decision.source,
        BumpSource::Default(DefaultReason::NoBoxChecked)
    );
}

// ── Dry run and ref validation ──

#[tokio::test]
async fn dry_run_never_creates() {
    let releases = releases_with_tags(&["3.1.4"]);
    let merge_requests = MockMergeRequests::new();
    let config = ReleaseConfig::default();
    let ctx = context(&[], true);

    let request = ReleaseRequest {
        bump: Some(BumpKind::Minor),
        ref_name: Some("abc".to_owned()),
        dry_run: true,
        ..Default::default()
    };
    let outcome = ReleaseEngine::new(&releases, &merge_requests, &config)
        .release(&ctx, &request)
        .await
        .unwrap();

    assert!(!outcome.created);
    assert_eq!(outcome.next.to_string(), "3.2.0");
}

#[tokio::test]
async fn short_ref_is_rejected_on_live_run() {
    let releases = MockReleases::new();
    let merge_requests = MockMergeRequests::new();
    let config = ReleaseConfig::default();
    let ctx = context(&[], false);

    let request = ReleaseRequest {
        bump: Some(BumpKind::Patch),
        ref_name: Some("abc12".to_owned()),
        ..Default::default()
    };
    let err = ReleaseEngine::new(&releases, &merge_requests, &config)
        .release(&ctx, &request)
        .await
        .unwrap_err();

    assert!(
        matches!(err, Error::RefTooShort { ref ref_name, min: 7 } if ref_name == "abc12"),
        "got: {err}"
    );
}

#[tokio::test]
async fn missing_ref_without_pipeline_sha_is_rejected() {
    let releases = MockReleases::new();
    let merge_requests = MockMergeRequests::new();
    let config = ReleaseConfig::default();
    let ctx = context(&[], false);

    let request = ReleaseRequest {
        bump: Some(BumpKind::Patch),
        ..Default::default()
    };
    let err = ReleaseEngine::new(&releases, &merge_requests, &config)
        .release(&ctx, &request)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::MissingRef), "got: {err}");
}

// ── Collaborator failures ──

#[tokio::test]
async fn release_creation_failure_names_tag_and_ref() {
    let mut releases = releases_with_tags(&["1.0.0"]);
    releases
        .expect_create_release()
        .returning(|_, _, _, _| Err(api_failure("create release")));
    let merge_requests = MockMergeRequests::new();
    let config = ReleaseConfig::default();
    let ctx = context(&[("CI_COMMIT_SHA", SHA)], false);

    let request = ReleaseRequest {
        bump: Some(BumpKind::Patch),
        ..Default::default()
    };
    let err = ReleaseEngine::new(&releases, &merge_requests, &config)
        .release(&ctx, &request)
        .await
        .unwrap_err();

    match err {
        Error::ReleaseFailed { tag, ref_name, .. } => {
            assert_eq!(tag, "1.0.1");
            assert_eq!(ref_name, SHA);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn tag_only_creates_a_git_tag() {
    let mut releases = releases_with_tags(&["1.0.0"]);
    releases
        .expect_create_tag()
        .with(eq("1.1.0"), eq(SHA), eq("hotfix batch"))
        .times(1)
        .returning(|_, _, _| Ok(()));
    releases.expect_create_release().never();
    let merge_requests = MockMergeRequests::new();
    let config = ReleaseConfig::default();
    let ctx = context(&[("CI_COMMIT_SHA", SHA)], false);

    let request = ReleaseRequest {
        bump: Some(BumpKind::Minor),
        description: "hotfix batch".to_owned(),
        tag_only: true,
        ..Default::default()
    };
    let outcome = ReleaseEngine::new(&releases, &merge_requests, &config)
        .release(&ctx, &request)
        .await
        .unwrap();
    assert!(outcome.created);
}

// ── Merge request resolution ──

#[tokio::test]
async fn merge_request_id_resolution_order() {
    let mut merge_requests = MockMergeRequests::new();
    merge_requests.expect_latest_open().times(1).returning(|| {
        Ok(Some(MergeRequest {
            iid: 99,
            title: "Latest".to_owned(),
            description: None,
            target_branch: None,
        }))
    });

    let in_mr = context(&[("CI_MERGE_REQUEST_IID", "12")], false);
    let plain = context(&[], false);

    let explicit = resolve_merge_request_id(&merge_requests, Some("5"), &in_mr)
        .await
        .unwrap();
    assert_eq!(explicit.as_deref(), Some("5"));

    let from_ctx = resolve_merge_request_id(&merge_requests, None, &in_mr)
        .await
        .unwrap();
    assert_eq!(from_ctx.as_deref(), Some("12"));

    let latest = resolve_merge_request_id(&merge_requests, None, &plain)
        .await
        .unwrap();
    assert_eq!(latest.as_deref(), Some("99"));
}

#[tokio::test]
async fn dry_run_does_not_query_latest_merge_request() {
    let mut merge_requests = MockMergeRequests::new();
    merge_requests.expect_latest_open().never();

    let ctx = context(&[], true);
    let id = resolve_merge_request_id(&merge_requests, None, &ctx)
        .await
        .unwrap();
    assert!(id.is_none());
}

// ── Idempotent comment ──

#[tokio::test]
async fn create_comment_skips_existing_note() {
    let mut merge_requests = MockMergeRequests::new();
    merge_requests.expect_notes().returning(|_| {
        Ok(vec![Note {
            body: format!("{RELEASE_CHECKLIST}\n"),
        }])
    });
    merge_requests.expect_post_note().never();

    let outcome = merge_requests
        .create_comment("3", RELEASE_CHECKLIST)
        .await
        .unwrap();
    assert_eq!(outcome, WriteOutcome::AlreadyPresent);
}

#[tokio::test]
async fn create_comment_posts_when_absent() {
    let mut merge_requests = MockMergeRequests::new();
    merge_requests.expect_notes().returning(|_| {
        Ok(vec![Note {
            body: "LGTM".to_owned(),
        }])
    });
    merge_requests
        .expect_post_note()
        .with(eq("3"), eq(RELEASE_CHECKLIST))
        .times(1)
        .returning(|_, _| Ok(()));

    let outcome = merge_requests
        .create_comment("3", RELEASE_CHECKLIST)
        .await
        .unwrap();
    assert_eq!(outcome, WriteOutcome::Created);
}
