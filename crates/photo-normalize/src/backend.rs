//! The decode/resize/encode capability used by [`Normalizer`](crate::Normalizer).

use crate::{Dimensions, NormalizeError};

/// Pixel operations needed by the normalization pipeline.
///
/// Implementations own their bitmap representation; the pipeline only
/// moves bitmaps between the three steps and asks for their size.
pub trait ImageBackend: Send + Sync {
    type Bitmap;

    /// Decode an encoded image file into a bitmap.
    fn decode(&self, bytes: &[u8]) -> Result<Self::Bitmap, NormalizeError>;

    fn dimensions(&self, bitmap: &Self::Bitmap) -> Dimensions;

    /// Resample to exactly `target`.
    fn resize(
        &self,
        bitmap: &Self::Bitmap,
        target: Dimensions,
    ) -> Result<Self::Bitmap, NormalizeError>;

    /// Encode as baseline JPEG. `quality` is on the encoder's 1-100 scale.
    fn encode_jpeg(&self, bitmap: &Self::Bitmap, quality: u8) -> Result<Vec<u8>, NormalizeError>;
}

/// Recorded backend invocation.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Decode { len: usize },
    Resize { from: Dimensions, to: Dimensions },
    Encode { dimensions: Dimensions, quality: u8 },
}

/// Backend whose "bitmaps" are just their dimensions.
///
/// Decodes every input to `decoded` (or fails when it is `None`) and records
/// each call so tests can assert on the pipeline's decisions.
#[cfg(test)]
pub struct MockBackend {
    pub decoded: Option<Dimensions>,
    pub fail_encode: bool,
    pub calls: std::sync::Mutex<Vec<BackendCall>>,
}

#[cfg(test)]
impl MockBackend {
    pub fn decoding_to(width: u32, height: u32) -> Self {
        Self {
            decoded: Some(Dimensions::new(width, height)),
            fail_encode: false,
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn undecodable() -> Self {
        Self {
            decoded: None,
            fail_encode: false,
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[cfg(test)]
impl ImageBackend for MockBackend {
    type Bitmap = Dimensions;

    fn decode(&self, bytes: &[u8]) -> Result<Dimensions, NormalizeError> {
        self.record(BackendCall::Decode { len: bytes.len() });
        self.decoded
            .ok_or_else(|| NormalizeError::Decode("mock: not an image".to_string()))
    }

    fn dimensions(&self, bitmap: &Dimensions) -> Dimensions {
        *bitmap
    }

    fn resize(&self, bitmap: &Dimensions, target: Dimensions) -> Result<Dimensions, NormalizeError> {
        self.record(BackendCall::Resize {
            from: *bitmap,
            to: target,
        });
        Ok(target)
    }

    fn encode_jpeg(&self, bitmap: &Dimensions, quality: u8) -> Result<Vec<u8>, NormalizeError> {
        self.record(BackendCall::Encode {
            dimensions: *bitmap,
            quality,
        });
        if self.fail_encode {
            return Err(NormalizeError::Encode("mock: encoder unavailable".to_string()));
        }
        Ok(format!("jpeg:{bitmap}:q{quality}").into_bytes())
    }
}
