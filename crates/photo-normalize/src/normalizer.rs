//! The normalization pipeline.

use crate::{
    target_dimensions, ImageBackend, NormalizeError, NormalizedPayload, RawImage, RustBackend,
    DEFAULT_MAX_INPUT_BYTES, DEFAULT_QUALITY, MAX_WIDTH,
};

/// Tuning for [`Normalizer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizerOptions {
    /// Widest allowed output in pixels
    pub max_width: u32,
    /// JPEG quality on the 0-1 scale
    pub quality: f32,
    /// Inputs larger than this are rejected before decoding
    pub max_input_bytes: usize,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        Self {
            max_width: MAX_WIDTH,
            quality: DEFAULT_QUALITY,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
        }
    }
}

impl NormalizerOptions {
    /// Quality mapped onto the encoder's 1-100 scale.
    pub fn jpeg_quality(&self) -> u8 {
        let quality = if self.quality.is_finite() {
            self.quality.clamp(0.0, 1.0)
        } else {
            DEFAULT_QUALITY
        };
        ((quality * 100.0).round() as u8).max(1)
    }
}

/// Anything that can turn a [`RawImage`] into a [`NormalizedPayload`].
pub trait Normalize: Send + Sync {
    fn normalize(&self, raw: &RawImage) -> Result<NormalizedPayload, NormalizeError>;
}

/// Decode, downscale and re-encode images through an [`ImageBackend`].
pub struct Normalizer<B = RustBackend> {
    backend: B,
    options: NormalizerOptions,
}

impl Normalizer<RustBackend> {
    pub fn new(options: NormalizerOptions) -> Self {
        Self::with_backend(RustBackend, options)
    }
}

impl Default for Normalizer<RustBackend> {
    fn default() -> Self {
        Self::new(NormalizerOptions::default())
    }
}

impl<B> Normalizer<B> {
    pub fn with_backend(backend: B, options: NormalizerOptions) -> Self {
        Self { backend, options }
    }

    pub fn options(&self) -> &NormalizerOptions {
        &self.options
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn check_input(&self, raw: &RawImage) -> Result<(), NormalizeError> {
        if raw.is_empty() {
            return Err(NormalizeError::Decode("file is empty".to_string()));
        }
        if !raw.is_image_mime() {
            return Err(NormalizeError::Decode(format!(
                "unsupported media type: {}",
                raw.mime
            )));
        }
        if raw.len() > self.options.max_input_bytes {
            return Err(NormalizeError::TooLarge {
                size: raw.len(),
                max: self.options.max_input_bytes,
            });
        }
        Ok(())
    }
}

impl<B: ImageBackend> Normalize for Normalizer<B> {
    fn normalize(&self, raw: &RawImage) -> Result<NormalizedPayload, NormalizeError> {
        self.check_input(raw)?;

        let bitmap = self.backend.decode(&raw.bytes)?;
        let source = self.backend.dimensions(&bitmap);
        if source.is_empty() {
            return Err(NormalizeError::Decode(format!(
                "image has no pixels ({source})"
            )));
        }

        let target = target_dimensions(source, self.options.max_width);
        let quality = self.options.jpeg_quality();

        let jpeg = if target == source {
            self.backend.encode_jpeg(&bitmap, quality)?
        } else {
            let resized = self.backend.resize(&bitmap, target)?;
            self.backend.encode_jpeg(&resized, quality)?
        };

        let payload = NormalizedPayload::from_jpeg(&jpeg, target);

        tracing::debug!(
            mime = %raw.mime,
            input_bytes = raw.len(),
            source = %source,
            target = %target,
            quality,
            jpeg_bytes = jpeg.len(),
            payload_bytes = payload.encoded_len(),
            "Image normalized"
        );

        Ok(payload)
    }
}
