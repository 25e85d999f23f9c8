use relay_core::{FeatureDetection, RelayConfig};
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn load_returns_defaults_when_no_config_file() {
    let tmp = TempDir::new().unwrap();
    let config = RelayConfig::load(tmp.path()).unwrap();

    assert_eq!(
        config.branches.protected,
        vec!["main", "master", "test", "int", "dev"]
    );
    assert_eq!(config.branches.feature_prefix, "feature/");
    assert_eq!(config.branches.integration, "dev");
    assert_eq!(config.branches.feature_detection, FeatureDetection::Prefix);
    assert_eq!(config.build.dockerfile, PathBuf::from("Dockerfile"));
    assert_eq!(config.build.context, PathBuf::from("."));
    assert!(config.build.extra_args.is_empty());
    assert!(config.build.application_name.is_none());
    assert_eq!(config.build.metadata_path, PathBuf::from("relay_output.json"));
    assert!(config.build.emit_metadata);
    assert_eq!(config.release.min_ref_length, 7);
}

#[test]
fn load_parses_full_config() {
    let tmp = TempDir::new().unwrap();
    let toml = r#"
[branches]
protected = ["main", "release"]
feature_prefix = "feat-"
integration = "develop"
feature_detection = "unprotected"

[build]
dockerfile = "docker/Dockerfile.prod"
context = "app"
extra_args = ["VERSION=1", "PROFILE=release"]
application_name = "billing"
metadata_path = "out/meta.json"
emit_metadata = false

[release]
min_ref_length = 10
"#;
    std::fs::write(tmp.path().join("relay.toml"), toml).unwrap();

    let config = RelayConfig::load(tmp.path()).unwrap();

    assert_eq!(config.branches.protected, vec!["main", "release"]);
    assert_eq!(config.branches.feature_prefix, "feat-");
    assert_eq!(config.branches.integration, "develop");
    assert_eq!(
        config.branches.feature_detection,
        FeatureDetection::Unprotected
    );
    assert_eq!(
        config.build.dockerfile,
        PathBuf::from("docker/Dockerfile.prod")
    );
    assert_eq!(config.build.context, PathBuf::from("app"));
    assert_eq!(config.build.extra_args, vec!["VERSION=1", "PROFILE=release"]);
    assert_eq!(config.build.application_name.as_deref(), Some("billing"));
    assert_eq!(config.build.metadata_path, PathBuf::from("out/meta.json"));
    assert!(!config.build.emit_metadata);
    assert_eq!(config.release.min_ref_length, 10);
}

#[test]
fn load_partial_config_fills_defaults() {
    let tmp = TempDir::new().unwrap();
    let toml = r#"
[branches]
integration = "develop"
"#;
    std::fs::write(tmp.path().join("relay.toml"), toml).unwrap();

    let config = RelayConfig::load(tmp.path()).unwrap();

    assert_eq!(config.branches.integration, "develop");
    assert_eq!(config.branches.feature_prefix, "feature/");
    assert_eq!(config.build.dockerfile, PathBuf::from("Dockerfile"));
    assert_eq!(config.release.min_ref_length, 7);
}

#[test]
fn load_rejects_invalid_toml() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("relay.toml"), "[branches\nprotected = 1").unwrap();

    let err = RelayConfig::load(tmp.path()).unwrap_err();
    assert!(
        matches!(err, relay_core::Error::ConfigParse { .. }),
        "got: {err}"
    );
}

#[test]
fn is_protected_matches_exact_names() {
    let config = RelayConfig::default();
    assert!(config.branches.is_protected("main"));
    assert!(config.branches.is_protected("dev"));
    assert!(!config.branches.is_protected("main2"));
    assert!(!config.branches.is_protected("feature/main"));
}
