use std::sync::Arc;

use image::RgbImage;

use crate::foundation::error::{DarkroomError, DarkroomResult};

/// A shared, read-only image buffer flowing through the pipeline.
///
/// Pixels are 8-bit RGB, interleaved, row-major, top-left origin. Every
/// transform's compute function assumes this channel convention.
///
/// Cloning a `Frame` is cheap (reference-counted); the pixel data itself is
/// immutable. A transform that needs to edit pixels copies first via
/// [`Frame::to_rgb_image`] and wraps the result in a new `Frame`. This
/// single-owner/read-only-sharing rule is what makes output caching safe
/// without locks.
#[derive(Clone, Debug)]
pub struct Frame {
    pixels: Arc<RgbImage>,
}

impl Frame {
    /// Wrap an owned RGB8 image. Fails if either dimension is zero.
    pub fn new(pixels: RgbImage) -> DarkroomResult<Self> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(DarkroomError::validation(
                "frame width and height must be > 0",
            ));
        }
        Ok(Self {
            pixels: Arc::new(pixels),
        })
    }

    /// Build a uniformly colored frame. Handy for sources in tests and demos.
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> DarkroomResult<Self> {
        if width == 0 || height == 0 {
            return Err(DarkroomError::validation(
                "frame width and height must be > 0",
            ));
        }
        Ok(Self {
            pixels: Arc::new(RgbImage::from_pixel(width, height, image::Rgb(rgb))),
        })
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Read-only view of the underlying image.
    pub fn as_image(&self) -> &RgbImage {
        &self.pixels
    }

    /// Owned copy of the pixel data, for transforms that edit in place.
    pub fn to_rgb_image(&self) -> RgbImage {
        (*self.pixels).clone()
    }

    /// Stable 64-bit digest over dimensions and raw pixel bytes.
    ///
    /// Equal frames produce equal fingerprints across runs and processes;
    /// used by hosts and tests to check bit-identical recompute output.
    pub fn fingerprint(&self) -> u64 {
        // FNV-1a 64.
        let mut h = 0xcbf2_9ce4_8422_2325u64;
        let mut write = |bytes: &[u8]| {
            for &b in bytes {
                h ^= u64::from(b);
                h = h.wrapping_mul(0x0000_0100_0000_01B3);
            }
        };
        write(&self.width().to_le_bytes());
        write(&self.height().to_le_bytes());
        write(self.pixels.as_raw());
        h
    }
}

impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
            || (self.width() == other.width()
                && self.height() == other.height()
                && self.pixels.as_raw() == other.pixels.as_raw())
    }
}

impl Eq for Frame {}

#[cfg(test)]
#[path = "../../tests/unit/foundation/frame.rs"]
mod tests;
