//! Tests for error types

use bids_events::Error;

#[test]
fn test_malformed_log_error() {
    let error = Error::MalformedLog("required column(s) missing: [\"TTime\"]".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Malformed log"));
    assert!(error_str.contains("TTime"));
}

#[test]
fn test_missing_marker_error() {
    let error = Error::MissingMarker {
        labels: vec!["END".to_string()],
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("missing"));
    assert!(error_str.contains("END"));
}

#[test]
fn test_ambiguous_marker_error() {
    let error = Error::AmbiguousMarker {
        label: "FMRI_T0".to_string(),
        count: 2,
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("FMRI_T0"));
    assert!(error_str.contains("2 rows"));
}

#[test]
fn test_negative_onset_error() {
    let error = Error::NegativeOnset {
        trial: 4,
        onset: -0.5,
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("Trial 4"));
    assert!(error_str.contains("-0.5"));
}

#[test]
fn test_invalid_config_error() {
    let error = Error::InvalidConfig("start and end marker are both END".to_string());
    assert!(format!("{error}").starts_with("Invalid configuration"));
}

#[test]
fn test_io_error_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let error: Error = io_error.into();
    let error_str = format!("{error}");
    assert!(error_str.contains("IO error"));
}

#[test]
fn test_manifest_error_conversion() {
    let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let error: Error = json_error.into();
    assert!(format!("{error}").contains("Manifest error"));
}

#[test]
fn test_other_error() {
    let error = Error::Other("custom error message".to_string());
    let error_str = format!("{error}");
    assert_eq!(error_str, "custom error message");
}

#[test]
fn test_result_type_alias_error() {
    fn returns_error() -> bids_events::Result<i32> {
        Err(Error::Other("test error".to_string()))
    }

    let result = returns_error();
    assert!(result.is_err());
}
