//! Assertion helpers for tests.

use base64::Engine as _;
use image::ImageFormat;
use pretty_assertions::assert_eq;

use acuarela::services::SessionState;

/// Decode a base64 JPEG payload and return its pixel dimensions
pub fn payload_dimensions(data: &str) -> (u32, u32) {
    assert!(
        !data.starts_with("data:"),
        "Payload must not carry a data-URI prefix"
    );
    let jpeg = base64::engine::general_purpose::STANDARD
        .decode(data)
        .expect("payload should be valid base64");
    let img = image::load_from_memory_with_format(&jpeg, ImageFormat::Jpeg)
        .expect("payload should be a JPEG");
    (img.width(), img.height())
}

/// Assert the session failed with a message containing `needle`
pub fn assert_failed_with(state: &SessionState, needle: &str) {
    match state {
        SessionState::Failed(message) => {
            assert!(!message.is_empty(), "Failure message should not be empty");
            assert!(
                message.contains(needle),
                "Expected failure mentioning {needle:?}, got {message:?}"
            );
        }
        other => panic!("Expected Failed state, got {other:?}"),
    }
}

/// Assert the session is in the given lifecycle state
pub fn assert_label(state: &SessionState, expected: &str) {
    assert_eq!(state.label(), expected, "Unexpected state: {state:?}");
}
