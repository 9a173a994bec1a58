//! Tests for error handling

use mayaguide_config::ConfigError;
use std::io;

#[test]
fn test_io_error_display() {
    let err = ConfigError::Io(io::Error::new(io::ErrorKind::NotFound, "file not found"));
    let display = err.to_string();
    assert!(display.contains("config I/O error"));
    assert!(display.contains("file not found"));
}

#[test]
fn test_json_error_display() {
    let json_err = serde_json::from_str::<serde_json::Value>("{invalid").unwrap_err();
    let err = ConfigError::Json(json_err);
    assert!(err.to_string().starts_with("invalid config"));
}

#[test]
fn test_invalid_error_display() {
    let err = ConfigError::Invalid("guide.timeout_secs must be greater than 0".to_string());
    assert_eq!(
        err.to_string(),
        "invalid config value: guide.timeout_secs must be greater than 0"
    );
}

#[test]
fn test_io_error_from() {
    let err: ConfigError = io::Error::new(io::ErrorKind::PermissionDenied, "no permission").into();
    assert!(matches!(err, ConfigError::Io(_)));
}
