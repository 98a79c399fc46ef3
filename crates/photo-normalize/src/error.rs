use thiserror::Error;

/// Failure while turning a raw image into a payload.
///
/// All variants are terminal for the attempt that produced them; the
/// caller is expected to ask for a different file rather than retry.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode JPEG: {0}")]
    Encode(String),

    #[error("Image too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },
}

impl NormalizeError {
    /// True for failures caused by the input file itself.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::TooLarge { .. })
    }
}
