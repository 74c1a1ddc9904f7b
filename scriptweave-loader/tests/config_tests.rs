use pretty_assertions::assert_eq;
use scriptweave_loader::{
    CyclePolicy, LoadError, LoaderConfig, DEFAULT_FETCH_TIMEOUT_MS, MAX_CONTENT_SIZE,
};
use std::time::Duration;
use tempfile::NamedTempFile;

#[test]
fn defaults() {
    let config = LoaderConfig::default();
    assert_eq!(config.base_url, "http://localhost/");
    assert_eq!(config.fetch_timeout_ms, Some(DEFAULT_FETCH_TIMEOUT_MS));
    assert_eq!(config.max_content_size, MAX_CONTENT_SIZE);
    assert_eq!(config.cycle_policy, CyclePolicy::Error);
    assert!(config.user_agent.starts_with("scriptweave/"));
    assert_eq!(config.fetch_timeout(), Some(Duration::from_secs(30)));
}

#[test]
fn base_is_validated() {
    assert_eq!(
        LoaderConfig::with_base("http://h/app/").base().unwrap().as_str(),
        "http://h/app/"
    );
    assert!(matches!(
        LoaderConfig::with_base("h/app").base(),
        Err(LoadError::InvalidUrl(_))
    ));
}

#[test]
fn partial_json_file_keeps_defaults() {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(
        file.path(),
        r#"{ "base_url": "https://cdn.example/js/", "cycle_policy": "skip", "fetch_timeout_ms": null }"#,
    )
    .unwrap();

    let config = LoaderConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.base_url, "https://cdn.example/js/");
    assert_eq!(config.cycle_policy, CyclePolicy::Skip);
    assert_eq!(config.fetch_timeout(), None);
    assert_eq!(config.max_content_size, MAX_CONTENT_SIZE);
}

#[test]
fn malformed_json_is_config_error() {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(file.path(), "{ not json").unwrap();
    assert!(matches!(
        LoaderConfig::from_json_file(file.path()),
        Err(LoadError::Config(_))
    ));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        LoaderConfig::from_json_file(&dir.path().join("absent.json")),
        Err(LoadError::Io(_))
    ));
}

#[test]
fn cycle_policy_from_str() {
    assert_eq!("error".parse::<CyclePolicy>().unwrap(), CyclePolicy::Error);
    assert_eq!("Skip".parse::<CyclePolicy>().unwrap(), CyclePolicy::Skip);
    assert!(matches!(
        "ignore".parse::<CyclePolicy>(),
        Err(LoadError::Config(_))
    ));
}

#[test]
fn file_fields_layer_over_given_defaults() {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(file.path(), r#"{ "max_content_size": 10 }"#).unwrap();

    let defaults = LoaderConfig::with_base("file:///srv/js/");
    let config = LoaderConfig::from_json_file_over(file.path(), &defaults).unwrap();
    assert_eq!(config.base_url, "file:///srv/js/");
    assert_eq!(config.max_content_size, 10);
    assert_eq!(config.fetch_timeout_ms, defaults.fetch_timeout_ms);
}

#[test]
fn non_object_json_is_config_error() {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(file.path(), "[1, 2]").unwrap();
    assert!(matches!(
        LoaderConfig::from_json_file(file.path()),
        Err(LoadError::Config(_))
    ));
}
