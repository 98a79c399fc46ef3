//! photo-normalize: bounded-size JPEG payloads from arbitrary photographs
//!
//! Turns a user-selected image file into a compact, base64-encoded JPEG
//! whose width never exceeds a fixed maximum, ready to be embedded in a
//! JSON request body.
//!
//! # Quick Start
//!
//! ```no_run
//! use photo_normalize::{Normalize, Normalizer, RawImage};
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let normalizer = Normalizer::default();
//! let payload = normalizer.normalize(&RawImage::sniff(bytes)).unwrap();
//!
//! assert!(payload.width <= 1024);
//! ```
//!
//! # Pipeline
//!
//! ```text
//! RawImage (bytes + MIME)
//!     |
//!     +--> guards            (empty, non-image MIME, size cap)
//!     |
//!   decode                  (ImageBackend::decode)
//!     |
//!   resize                  (only when wider than max_width, never upscales)
//!     |
//!   encode_jpeg             (quality on the 0-1 scale)
//!     |
//!   base64                  -> NormalizedPayload
//! ```
//!
//! # Backends
//!
//! The decode/resize/encode steps go through the [`ImageBackend`] trait so
//! the pipeline can be driven without real pixel data. [`RustBackend`] is
//! the production implementation built on the `image` crate.

mod backend;
mod dimensions;
mod error;
mod normalizer;
mod payload;
mod rust_backend;

pub use backend::ImageBackend;
#[cfg(test)]
pub(crate) use backend::MockBackend;
pub use dimensions::{target_dimensions, Dimensions};
pub use error::NormalizeError;
pub use normalizer::{Normalize, Normalizer, NormalizerOptions};
pub use payload::{NormalizedPayload, RawImage};
pub use rust_backend::RustBackend;

/// Maximum payload width in pixels.
pub const MAX_WIDTH: u32 = 1024;

/// Default JPEG quality on the 0-1 scale.
pub const DEFAULT_QUALITY: f32 = 0.8;

/// Default upper bound on raw input size (20 MiB).
pub const DEFAULT_MAX_INPUT_BYTES: usize = 20 * 1024 * 1024;
