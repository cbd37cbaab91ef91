//! HEIC/HEIF design decoding through the system libheif.
//!
//! Phone photos of a design usually arrive as HEIC. The primary image is
//! decoded to interleaved 8-bit RGB, or RGBA when the file carries alpha.

use image::{DynamicImage, RgbImage, RgbaImage};
use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};
use mockup_engine::{EngineError, FrameDecoder, Result};

/// [`FrameDecoder`] for `image/heic` and `image/heif`.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeifDecoder;

impl FrameDecoder for HeifDecoder {
    fn media_types(&self) -> &[&'static str] {
        &["image/heic", "image/heif"]
    }

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage> {
        let heif_err = |e: libheif_rs::HeifError| EngineError::Decode(format!("heif: {e}"));

        let ctx = HeifContext::read_from_bytes(bytes).map_err(heif_err)?;
        let handle = ctx.primary_image_handle().map_err(heif_err)?;
        let has_alpha = handle.has_alpha_channel();
        let chroma = if has_alpha {
            RgbChroma::Rgba
        } else {
            RgbChroma::Rgb
        };

        let lib = LibHeif::new();
        let img = lib
            .decode(&handle, ColorSpace::Rgb(chroma), None)
            .map_err(heif_err)?;
        let planes = img.planes();
        let plane = planes
            .interleaved
            .ok_or_else(|| EngineError::Decode("heif: no interleaved plane".into()))?;

        tracing::debug!(
            width = plane.width,
            height = plane.height,
            stride = plane.stride,
            has_alpha,
            "Decoded HEIF primary image"
        );

        from_interleaved(plane.data, plane.stride, plane.width, plane.height, has_alpha)
    }
}

/// Copy an interleaved 8-bit plane into a tightly packed image buffer.
///
/// `stride` is the byte length of one row in `data`, padding included.
fn from_interleaved(
    data: &[u8],
    stride: usize,
    width: u32,
    height: u32,
    has_alpha: bool,
) -> Result<DynamicImage> {
    let channels = if has_alpha { 4 } else { 3 };
    let row_len = width as usize * channels;
    let needed = match height as usize {
        0 => 0,
        rows => stride * (rows - 1) + row_len,
    };
    if stride < row_len || data.len() < needed {
        return Err(EngineError::Decode(format!(
            "heif: plane of {} bytes too small for {width}x{height} with stride {stride}",
            data.len()
        )));
    }

    let mut packed = Vec::with_capacity(row_len * height as usize);
    for row in data.chunks(stride).take(height as usize) {
        packed.extend_from_slice(&row[..row_len]);
    }

    let too_small = || EngineError::Decode("heif: pixel buffer size mismatch".into());
    if has_alpha {
        RgbaImage::from_raw(width, height, packed)
            .map(DynamicImage::ImageRgba8)
            .ok_or_else(too_small)
    } else {
        RgbImage::from_raw(width, height, packed)
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(too_small)
    }
}
