/*!
 * Tests for error types and their conversions
 */

use subsyncer::errors::{AlignError, AppError, ConfigError, ProviderError, SubtitleError};

#[test]
fn test_alignError_code_shouldBeStable() {
    assert_eq!(AlignError::EmptyReference.code(), "empty-reference");
    assert_eq!(AlignError::EmptyCaption.code(), "empty-caption");
}

#[test]
fn test_alignError_display_shouldDescribeTrack() {
    assert_eq!(AlignError::EmptyReference.to_string(), "Reference track has no usable cues");
    assert_eq!(AlignError::EmptyCaption.to_string(), "Caption track has no usable cues");
}

#[test]
fn test_configError_display_shouldNameField() {
    let err = ConfigError::InvalidValue {
        field: "same_tolerant_ratio",
        reason: "must be within 0.0..=1.0, got 2".to_string(),
    };

    assert_eq!(
        err.to_string(),
        "Invalid value for same_tolerant_ratio: must be within 0.0..=1.0, got 2"
    );
    assert_eq!(ConfigError::TooManyProfiles(7).to_string(), "Too many match profiles: 7 (max 5)");
}

#[test]
fn test_providerError_display_shouldIncludeStatus() {
    let err = ProviderError::ApiError {
        status_code: 503,
        message: "Service Unavailable".to_string(),
    };

    assert_eq!(err.to_string(), "Server responded with error: 503 - Service Unavailable");
}

#[test]
fn test_appError_fromProviderError_shouldWrap() {
    let err: AppError = ProviderError::RequestFailed("timeout".to_string()).into();

    assert!(matches!(err, AppError::Provider(_)));
    assert_eq!(err.to_string(), "Provider error: Request failed: timeout");
}

#[test]
fn test_appError_fromAlignAndSubtitleErrors_shouldWrap() {
    let align: AppError = AlignError::EmptyCaption.into();
    let subtitle: AppError = SubtitleError::InvalidTimestamp("1:2".to_string()).into();

    assert_eq!(align.to_string(), "Alignment error: Caption track has no usable cues");
    assert_eq!(subtitle.to_string(), "Subtitle error: Invalid timestamp format: 1:2");
}

#[test]
fn test_appError_fromIoError_shouldBecomeFileError() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.ass");

    let err: AppError = io.into();

    assert!(matches!(err, AppError::File(ref message) if message.contains("missing.ass")));
}

#[test]
fn test_appError_fromAnyhow_shouldBecomeUnknown() {
    let err: AppError = anyhow::anyhow!("something odd").into();

    assert_eq!(err.to_string(), "Unknown error: something odd");
}
