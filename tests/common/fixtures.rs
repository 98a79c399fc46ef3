//! Test fixtures: encoded images and service responses.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

use acuarela::RawImage;

/// Scenario response used across the flow tests
pub fn palette_json() -> serde_json::Value {
    serde_json::json!({
        "colors": [
            { "name": "Azul cobalto", "hex": "#1E3A8A", "reason": "sombra" }
        ],
        "advice": "Usa más agua"
    })
}

/// Encode a gradient test image in the given format
pub fn encoded_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 90])
    });
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), format)
        .unwrap();
    buf
}

/// A valid JPEG photo as selected from a file picker
pub fn jpeg_photo(width: u32, height: u32) -> RawImage {
    RawImage::new(encoded_image(width, height, ImageFormat::Jpeg), "image/jpeg")
}

/// A file that claims to be a JPEG but is not
pub fn corrupt_photo() -> RawImage {
    RawImage::new(b"\xff\xd8 this is not really a jpeg".to_vec(), "image/jpeg")
}
