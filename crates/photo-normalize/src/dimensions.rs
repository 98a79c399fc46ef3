//! Dimension math for the downscale step.

use std::fmt;

/// Pixel dimensions of a bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True if either side is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Compute the output size for a source image.
///
/// `scale = min(1, max_width / width)`; both sides are multiplied by the
/// scale and rounded to the nearest pixel (never below 1). Sources already
/// at or below `max_width` come back unchanged.
pub fn target_dimensions(source: Dimensions, max_width: u32) -> Dimensions {
    let max_width = max_width.max(1);
    if source.width <= max_width {
        return source;
    }

    let scale = f64::from(max_width) / f64::from(source.width);
    let height = (f64::from(source.height) * scale).round() as u32;

    Dimensions {
        width: max_width,
        height: height.max(1),
    }
}
