use base64::Engine as _;

use crate::{Dimensions, NormalizeError};

const FALLBACK_MIME: &str = "application/octet-stream";

/// A user-supplied image file, not yet decoded.
#[derive(Debug, Clone)]
pub struct RawImage {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl RawImage {
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
        }
    }

    /// Build a raw image, guessing the MIME type from the file's magic bytes.
    pub fn sniff(bytes: Vec<u8>) -> Self {
        let mime = image::guess_format(&bytes)
            .map(|format| format.to_mime_type())
            .unwrap_or(FALLBACK_MIME);
        Self::new(bytes, mime)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// True for `image/<subtype>` MIME types (case-insensitive).
    pub fn is_image_mime(&self) -> bool {
        self.mime.split_once('/').is_some_and(|(kind, subtype)| {
            kind.trim().eq_ignore_ascii_case("image") && !subtype.trim().is_empty()
        })
    }
}

/// The transport-ready form of an image: base64 JPEG with no data-URI prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPayload {
    /// Base64 (standard alphabet, padded) JPEG bytes
    pub data: String,
    pub width: u32,
    pub height: u32,
}

impl NormalizedPayload {
    /// Encode JPEG bytes as a payload.
    pub fn from_jpeg(jpeg: &[u8], dimensions: Dimensions) -> Self {
        Self {
            data: base64::engine::general_purpose::STANDARD.encode(jpeg),
            width: dimensions.width,
            height: dimensions.height,
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// Decode the payload back into JPEG bytes.
    pub fn to_jpeg(&self) -> Result<Vec<u8>, NormalizeError> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.data)
            .map_err(|e| NormalizeError::Decode(format!("invalid base64 payload: {e}")))
    }

    /// Length of the encoded string in bytes.
    pub fn encoded_len(&self) -> usize {
        self.data.len()
    }
}
