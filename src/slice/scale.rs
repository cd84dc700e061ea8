//! Linear intensity rescaling from raw bit depth to the 8-bit display range.
//!
//! The map goes from the theoretical full-scale range of a `B`-bit sample,
//! not from the observed range of a plane:
//!
//! ```text
//! scaled = (new_max - new_min) / (2^B - 1 - img_min) * (raw - img_min) + new_min
//! ```
//!
//! Samples are assumed to already lie in `[img_min, 2^B - 1]`. Results are
//! truncated towards zero when converted to 8-bit pixels.

use image::{GrayImage, Luma};

use crate::volume::Plane;

/// Lower bound of the display range.
pub const DISPLAY_MIN: f64 = 0.0;

/// Upper bound of the display range.
pub const DISPLAY_MAX: f64 = 255.0;

/// A precomputed linear map between two intensity ranges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    quotient: f64,
    img_min: f64,
    new_min: f64,
}

impl LinearScale {
    /// Map `[img_min, 2^bits - 1]` onto `[new_min, new_max]`.
    pub fn new(bits: u32, img_min: f64, new_min: f64, new_max: f64) -> Self {
        let img_max = full_scale(bits);
        Self {
            quotient: (new_max - new_min) / (img_max - img_min),
            img_min,
            new_min,
        }
    }

    /// Map a full `bits`-bit range onto `[0, 255]`.
    pub fn to_display(bits: u32) -> Self {
        Self::new(bits, 0.0, DISPLAY_MIN, DISPLAY_MAX)
    }

    pub fn apply(&self, raw: f64) -> f64 {
        self.quotient * (raw - self.img_min) + self.new_min
    }
}

/// `2^bits - 1`
pub fn full_scale(bits: u32) -> f64 {
    2f64.powi(bits as i32) - 1.0
}

/// Rescale one value.
pub fn scale_value(raw: f64, bits: u32, img_min: f64, new_min: f64, new_max: f64) -> f64 {
    LinearScale::new(bits, img_min, new_min, new_max).apply(raw)
}

/// Rescale a raw plane to 8 bits, truncating each scaled value.
pub fn rescale_plane(plane: &Plane, bits: u32) -> GrayImage {
    let scale = LinearScale::to_display(bits);
    GrayImage::from_fn(plane.width(), plane.height(), |x, y| {
        let raw = plane.get_pixel(x, y)[0];
        Luma([scale.apply(f64::from(raw)) as u8])
    })
}
