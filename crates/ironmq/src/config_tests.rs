//! Tests for client configuration.

use super::*;
use std::io::Write;

fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
    Some(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

fn write_config_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_defaults() {
    let config = ClientConfig::new("project", "secret");
    assert_eq!(config.cloud, Cloud::aws_us_east());
    assert_eq!(config.api_version, DEFAULT_API_VERSION);
    assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    assert!(config.user_agent.starts_with("ironmq-rust/"));
    assert!(config.validate().is_ok());
}

#[test]
fn test_base_url() {
    let config = ClientConfig::new("4ffa", "secret");
    assert_eq!(
        config.base_url(),
        "https://mq-aws-us-east-1.iron.io:443/1/projects/4ffa/"
    );

    let config = ClientConfig::new("p", "t").with_cloud(Cloud::new("http", "localhost", 8080));
    assert_eq!(config.base_url(), "http://localhost:8080/1/projects/p/");
}

#[test]
fn test_debug_redacts_token() {
    let config = ClientConfig::new("project", "super-secret-token");
    let rendered = format!("{:?}", config);
    assert!(rendered.contains("project"));
    assert!(!rendered.contains("super-secret-token"));
    assert!(rendered.contains("[REDACTED]"));
}

#[test]
fn test_validate_rejects_missing_credentials() {
    let err = ClientConfig::new("", "token").validate().unwrap_err();
    assert!(matches!(err, ConfigurationError::Missing { ref key } if key == "project_id"));

    let err = ClientConfig::new("project", "  ").validate().unwrap_err();
    assert!(matches!(err, ConfigurationError::Missing { ref key } if key == "token"));
}

#[test]
fn test_validate_rejects_bad_endpoint() {
    let config = ClientConfig::new("p", "t").with_cloud(Cloud::new("ftp", "host", 21));
    assert!(matches!(
        config.validate(),
        Err(ConfigurationError::Invalid { .. })
    ));

    let config = ClientConfig::new("p", "t").with_timeout(Duration::ZERO);
    assert!(matches!(
        config.validate(),
        Err(ConfigurationError::Invalid { .. })
    ));
}

#[test]
fn test_load_from_environment() {
    let config = ClientConfig::load_from(
        None,
        env(&[
            ("IRON_PROJECT_ID", "env-project"),
            ("IRON_TOKEN", "env-token"),
            ("IRON_HOST", "mq.example.com"),
            ("IRON_PORT", "8443"),
            ("IRON_TIMEOUT_SECS", "5"),
        ]),
    )
    .unwrap();

    assert_eq!(config.project_id, "env-project");
    assert_eq!(config.token, "env-token");
    assert_eq!(config.cloud.host, "mq.example.com");
    assert_eq!(config.cloud.port, 8443);
    assert_eq!(config.cloud.scheme, "https");
    assert_eq!(config.timeout, Duration::from_secs(5));
}

#[test]
fn test_load_from_file_with_environment_override() {
    let file = write_config_file(
        r#"{"project_id": "file-project", "token": "file-token", "host": "mq-rackspace-dfw.iron.io"}"#,
    );

    let config =
        ClientConfig::load_from(Some(file.path()), env(&[("IRON_TOKEN", "env-token")])).unwrap();

    assert_eq!(config.project_id, "file-project");
    assert_eq!(config.token, "env-token");
    assert_eq!(config.cloud, Cloud::rackspace_dfw());
}

#[test]
fn test_load_reports_missing_token() {
    let err = ClientConfig::load_from(None, env(&[("IRON_PROJECT_ID", "p")])).unwrap_err();
    assert!(matches!(err, ConfigurationError::Missing { ref key } if key == "token"));
}

#[test]
fn test_load_reports_unreadable_file() {
    let file = write_config_file("{ not json");
    let err = ClientConfig::load_from(Some(file.path()), env(&[])).unwrap_err();
    assert!(matches!(err, ConfigurationError::Parsing { .. }));
}
