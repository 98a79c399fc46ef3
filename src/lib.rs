//! Acuarela - watercolor palette assistant
//!
//! Normalizes a photograph, sends it to a palette inference service and
//! manages the select/analyze/retry lifecycle around it.
//! This library exposes modules for integration testing.

pub mod error;
pub mod models;
pub mod services;

pub use photo_normalize::{NormalizedPayload, RawImage};
