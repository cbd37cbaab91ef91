//! End-to-end helpers: extract a design, then render it onto a mockup.

use image::{DynamicImage, RgbaImage};
use tracing::{debug, info};

use crate::compose::{PasteMode, Placement, place};
use crate::options::{MockupOptions, SegmentOptions};
use crate::recolor::recolor_rgb;
use crate::segment::segment_with;
use crate::{EngineError, Result, ensure_non_empty, layout_name};

/// A finished mockup.
#[derive(Debug, Clone)]
pub struct MockupRender {
    pub image: RgbaImage,
    pub placement: Placement,
    pub paste_mode: PasteMode,
}

/// Remove the keyed backdrop from a photographed design.
///
/// RGBA inputs are flattened to RGB first; the key decides transparency.
pub fn extract_design(photo: &DynamicImage, options: &SegmentOptions) -> Result<RgbaImage> {
    let rgb = match photo {
        DynamicImage::ImageRgb8(_) => photo.clone(),
        DynamicImage::ImageRgba8(_) => {
            debug!("Dropping alpha channel before keying");
            DynamicImage::ImageRgb8(photo.to_rgb8())
        }
        other => return Err(EngineError::UnsupportedPixelLayout(layout_name(other))),
    };
    segment_with(&rgb, options)
}

/// Recolor `mockup` (if requested) and paste `design` onto it.
pub fn render_mockup(
    mockup: &DynamicImage,
    design: &DynamicImage,
    options: &MockupOptions,
) -> Result<MockupRender> {
    ensure_non_empty(mockup.width(), mockup.height())?;

    let base = match (options.garment_color, mockup) {
        (Some(color), _) => {
            info!(color = %color, "Recoloring mockup");
            recolor_rgb(mockup, color)?
        }
        (None, DynamicImage::ImageRgba8(rgba)) => rgba.clone(),
        (None, DynamicImage::ImageRgb8(_)) => mockup.to_rgba8(),
        (None, other) => return Err(EngineError::UnsupportedPixelLayout(layout_name(other))),
    };

    let placement = options.resolve_placement(base.width(), base.height());
    info!(
        x = placement.x,
        y = placement.y,
        width = placement.width,
        "Placing design"
    );

    let pasted = place(&base, design, &placement)?;
    Ok(MockupRender {
        image: pasted.image,
        placement,
        paste_mode: pasted.mode,
    })
}
