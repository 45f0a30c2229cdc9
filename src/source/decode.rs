use std::path::Path;

use anyhow::Context;

use crate::foundation::error::DarkroomResult;
use crate::foundation::frame::Frame;

/// Decode encoded image bytes (PNG, JPEG, ...) into an RGB8 [`Frame`].
///
/// All IO and decoding is front-loaded here; no decoding happens inside a
/// refresh pass.
pub fn decode_frame(bytes: &[u8]) -> DarkroomResult<Frame> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Frame::new(dyn_img.to_rgb8())
}

/// Read and decode an image file into an RGB8 [`Frame`].
pub fn load_frame(path: impl AsRef<Path>) -> DarkroomResult<Frame> {
    let path = path.as_ref();
    let bytes =
        std::fs::read(path).with_context(|| format!("read image file '{}'", path.display()))?;
    decode_frame(&bytes)
}

#[cfg(test)]
#[path = "../../tests/unit/source/decode.rs"]
mod tests;
