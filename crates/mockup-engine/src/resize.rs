//! Aspect-ratio-preserving resize for design placement.
//!
//! Uses Lanczos3 filtering; the output height is the rounded product of the
//! source height and the width ratio.

use image::DynamicImage;
use image::imageops::FilterType;
use tracing::debug;

use crate::{EngineError, Result, ensure_non_empty};

/// Resize an image to `target_width` while maintaining aspect ratio.
///
/// Fails with [`EngineError::InvalidDimensions`] when the target width is zero
/// or the derived height rounds down to zero. An image already at the target
/// width is returned as a copy.
pub fn resize_preserving_aspect(img: &DynamicImage, target_width: u32) -> Result<DynamicImage> {
    let (orig_w, orig_h) = (img.width(), img.height());
    ensure_non_empty(orig_w, orig_h)?;

    let target_height = scaled_height(orig_w, orig_h, target_width);
    if target_width == 0 || target_height == 0 {
        return Err(EngineError::InvalidDimensions {
            width: target_width,
            height: target_height,
        });
    }

    if orig_w == target_width {
        debug!(width = target_width, "Image already at target width, skipping resize");
        return Ok(img.clone());
    }

    debug!(
        orig_w,
        orig_h,
        new_width = target_width,
        new_height = target_height,
        "Resizing image to target width"
    );

    Ok(img.resize_exact(target_width, target_height, FilterType::Lanczos3))
}

/// Height that keeps `width x height` proportional at `target_width`.
pub fn scaled_height(width: u32, height: u32, target_width: u32) -> u32 {
    if width == 0 {
        return 0;
    }
    let ratio = f64::from(target_width) / f64::from(width);
    (f64::from(height) * ratio).round() as u32
}
