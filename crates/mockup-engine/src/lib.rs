//! Garment mockup engine.
//!
//! Chroma-key extraction of printed designs, multiply-blend recoloring of
//! garment mockups, aspect-preserving resize and stencil pasting. All
//! operations are pure functions over in-memory pixel buffers; file I/O is
//! left to the caller.

pub mod codec;
pub mod color;
pub mod compose;
pub mod options;
pub mod pipeline;
pub mod recolor;
pub mod resize;
pub mod segment;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use codec::{DecoderRegistry, FrameDecoder, RasterDecoder, encode_png};
pub use color::{Hsv, Rgb, hex_to_hsv, hsv_to_hex, parse_hex};
pub use compose::{PasteMode, Pasted, Placement, paste, place};
pub use options::{MockupOptions, SegmentOptions};
pub use pipeline::{MockupRender, extract_design, render_mockup};
pub use recolor::{recolor, recolor_rgb, shading_map};
pub use resize::resize_preserving_aspect;
pub use segment::{HsvRange, Tolerance, compute_window, segment, segment_with};

/// Errors that can occur while segmenting or compositing images.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid color format: {0}")]
    InvalidColorFormat(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Unsupported pixel layout: {0}")]
    UnsupportedPixelLayout(String),

    #[error("No decoder registered for media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Encode error: {0}")]
    Encode(String),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Reject images with a zero width or height.
pub(crate) fn ensure_non_empty(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(EngineError::InvalidImage(format!(
            "image has zero area ({width}x{height})"
        )));
    }
    Ok(())
}

/// Human-readable name of a `DynamicImage` layout, used in error messages.
pub(crate) fn layout_name(img: &image::DynamicImage) -> String {
    format!("{:?}", img.color())
}
