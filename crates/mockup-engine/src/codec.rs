//! Decoding and encoding at the edge of the engine.
//!
//! Decoders are chosen by declared media type, so container formats the
//! `image` crate cannot read (HEIC/HEIF) can be plugged in by the caller.
//! Every decoder hands back either `ImageRgb8` or `ImageRgba8`; the rest of
//! the engine only branches on channel count.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbaImage};
use tracing::debug;

use crate::{EngineError, Result, ensure_non_empty};

/// A decoder for one or more media types.
pub trait FrameDecoder: Send + Sync {
    /// Media types (e.g. `image/png`) this decoder accepts.
    fn media_types(&self) -> &[&'static str];

    /// Decode `bytes` into a pixel buffer.
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage>;
}

/// PNG and JPEG decoding through the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct RasterDecoder;

impl FrameDecoder for RasterDecoder {
    fn media_types(&self) -> &[&'static str] {
        &["image/png", "image/jpeg", "image/jpg"]
    }

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage> {
        let img = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| EngineError::Decode(format!("failed to guess image format: {e}")))?
            .decode()
            .map_err(|e| EngineError::Decode(e.to_string()))?;
        Ok(normalize_layout(img))
    }
}

/// Media-type keyed set of decoders.
pub struct DecoderRegistry {
    decoders: Vec<Box<dyn FrameDecoder>>,
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(RasterDecoder);
        registry
    }
}

impl DecoderRegistry {
    /// A registry with no decoders.
    pub fn empty() -> Self {
        Self {
            decoders: Vec::new(),
        }
    }

    /// Add a decoder. Later registrations win for a shared media type.
    pub fn register(&mut self, decoder: impl FrameDecoder + 'static) {
        self.decoders.push(Box::new(decoder));
    }

    /// Whether some decoder accepts `media_type`.
    pub fn supports(&self, media_type: &str) -> bool {
        self.find(media_type).is_some()
    }

    /// Decode `bytes` declared as `media_type`.
    pub fn decode(&self, media_type: &str, bytes: &[u8]) -> Result<DynamicImage> {
        let decoder = self
            .find(media_type)
            .ok_or_else(|| EngineError::UnsupportedMediaType(media_type.to_string()))?;

        let img = decoder.decode(bytes)?;
        ensure_non_empty(img.width(), img.height())?;
        debug!(
            media_type,
            width = img.width(),
            height = img.height(),
            has_alpha = img.color().has_alpha(),
            "Decoded image"
        );
        Ok(normalize_layout(img))
    }

    fn find(&self, media_type: &str) -> Option<&dyn FrameDecoder> {
        let wanted = media_type.trim();
        self.decoders
            .iter()
            .rev()
            .find(|d| d.media_types().iter().any(|t| t.eq_ignore_ascii_case(wanted)))
            .map(|d| &**d)
    }
}

/// Collapse any decoded layout to 8-bit RGB or RGBA, keeping alpha if present.
pub fn normalize_layout(img: DynamicImage) -> DynamicImage {
    match img {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => img,
        other if other.color().has_alpha() => DynamicImage::ImageRgba8(other.to_rgba8()),
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    }
}

/// Encode an RGBA buffer as PNG bytes.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| EngineError::Encode(e.to_string()))?;
    Ok(buf.into_inner())
}
