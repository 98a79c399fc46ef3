//! Production backend built on the `image` crate.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;

use crate::{Dimensions, ImageBackend, NormalizeError};

/// Pure-Rust decode, triangle-filter resize and baseline JPEG encode.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustBackend;

impl ImageBackend for RustBackend {
    type Bitmap = DynamicImage;

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, NormalizeError> {
        image::load_from_memory(bytes).map_err(|e| NormalizeError::Decode(e.to_string()))
    }

    fn dimensions(&self, bitmap: &DynamicImage) -> Dimensions {
        Dimensions::new(bitmap.width(), bitmap.height())
    }

    fn resize(
        &self,
        bitmap: &DynamicImage,
        target: Dimensions,
    ) -> Result<DynamicImage, NormalizeError> {
        Ok(bitmap.resize_exact(target.width, target.height, FilterType::Triangle))
    }

    fn encode_jpeg(&self, bitmap: &DynamicImage, quality: u8) -> Result<Vec<u8>, NormalizeError> {
        // JPEG has no alpha channel
        let rgb = bitmap.to_rgb8();
        let mut jpeg_bytes = Vec::new();

        JpegEncoder::new_with_quality(&mut jpeg_bytes, quality)
            .encode(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                image::ColorType::Rgb8.into(),
            )
            .map_err(|e| NormalizeError::Encode(e.to_string()))?;

        Ok(jpeg_bytes)
    }
}
