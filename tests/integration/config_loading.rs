//! Integration tests for configuration loading through the public loader.

use protobatch::config::ConfigLoader;
use protobatch::error::ApiError;
use protobatch::generation::FailurePolicy;
use protobatch::job::Target;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_workspace_file_is_picked_up() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("protobatch.toml"),
        r#"
[generator]
targets = ["python"]
failure_policy = "continue_on_failure"

[logging]
level = "debug"
"#,
    )
    .unwrap();

    let config = ConfigLoader::load(temp.path()).unwrap();
    assert_eq!(config.generator.targets, vec![Target::Python]);
    assert_eq!(
        config.generator.failure_policy,
        FailurePolicy::ContinueOnFailure
    );
    assert_eq!(config.logging.level, "debug");
    assert_eq!(
        ConfigLoader::workspace_config_path(temp.path()),
        temp.path().join("protobatch.toml")
    );
}

#[test]
fn test_unknown_target_is_config_error() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("bad.toml");
    fs::write(&file, "[generator]\ntargets = [\"cobol\"]\n").unwrap();

    let result = ConfigLoader::load_from_file(&file);
    assert!(matches!(result, Err(ApiError::ConfigError(_))));
}

#[test]
fn test_zero_timeout_fails_validation() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("zero.toml");
    fs::write(&file, "[probe]\ntimeout_secs = 0\n").unwrap();

    let config = ConfigLoader::load_from_file(&file).unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("probe.timeout_secs"));
}
