//! Image composition: place a design onto a mockup canvas.
//!
//! Pasting works on a copy of the canvas. Foregrounds with an alpha channel
//! are pasted through a hard stencil; flat RGB foregrounds overwrite their
//! whole rectangle.

use image::{DynamicImage, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::resize::resize_preserving_aspect;
use crate::{EngineError, Result, ensure_non_empty, layout_name};

/// Fraction of the canvas width the design occupies by default (2/5).
const DEFAULT_WIDTH_RATIO: (u64, u64) = (2, 5);
/// Fraction of the canvas height at which the design's top edge sits by default (7/20).
const DEFAULT_TOP_RATIO: (u64, u64) = (7, 20);

/// How a foreground was transferred onto the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteMode {
    /// Alpha used as an on/off stencil.
    Stencil,
    /// No alpha channel: the whole rectangle was copied.
    Rectangle,
}

/// Result of a paste: the new canvas plus how it was produced.
#[derive(Debug, Clone)]
pub struct Pasted {
    pub image: RgbaImage,
    pub mode: PasteMode,
}

impl Pasted {
    /// True when the foreground had no alpha and was pasted as a rectangle.
    pub fn is_rectangle(&self) -> bool {
        self.mode == PasteMode::Rectangle
    }
}

/// Where and how large the design lands on the canvas.
///
/// The height follows from the design's aspect ratio. Offsets may be negative
/// or push the design past the canvas edge; the overhang is clipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub x: i64,
    pub y: i64,
    pub width: u32,
}

impl Placement {
    pub const fn new(x: i64, y: i64, width: u32) -> Self {
        Self { x, y, width }
    }

    /// Default placement on a `canvas_w x canvas_h` canvas: 40% of the canvas
    /// width, centered horizontally, top edge at 35% of the canvas height.
    pub fn centered(canvas_w: u32, canvas_h: u32) -> Self {
        let (wn, wd) = DEFAULT_WIDTH_RATIO;
        let (tn, td) = DEFAULT_TOP_RATIO;
        let width = (u64::from(canvas_w) * wn / wd) as u32;
        let x = (i64::from(canvas_w) - i64::from(width)) / 2;
        let y = (u64::from(canvas_h) * tn / td) as i64;
        Self { x, y, width }
    }
}

/// Paste `foreground` onto a copy of `canvas` with its top-left at (`x`, `y`).
///
/// RGBA foregrounds: every pixel with alpha > 0 replaces the canvas color and
/// the canvas alpha becomes the larger of the two; alpha 0 leaves the canvas
/// untouched. Partial alpha is not blended.
///
/// RGB foregrounds: the whole rectangle is copied as opaque pixels and a
/// warning is logged; the returned [`PasteMode::Rectangle`] carries the same
/// signal to the caller.
pub fn paste(canvas: &RgbaImage, foreground: &DynamicImage, x: i64, y: i64) -> Result<Pasted> {
    ensure_non_empty(canvas.width(), canvas.height())?;
    ensure_non_empty(foreground.width(), foreground.height())?;

    let mut out = canvas.clone();
    let mode = match foreground {
        DynamicImage::ImageRgba8(fg) => {
            debug!(x, y, width = fg.width(), height = fg.height(), "Stencil paste");
            for (fx, fy, pixel) in fg.enumerate_pixels() {
                if pixel[3] == 0 {
                    continue;
                }
                if let Some((tx, ty)) = target(&out, x, y, fx, fy) {
                    let dst = out.get_pixel(tx, ty);
                    let alpha = dst[3].max(pixel[3]);
                    out.put_pixel(tx, ty, Rgba([pixel[0], pixel[1], pixel[2], alpha]));
                }
            }
            PasteMode::Stencil
        }
        DynamicImage::ImageRgb8(fg) => {
            warn!(
                x,
                y,
                width = fg.width(),
                height = fg.height(),
                "Design has no alpha channel; pasting the whole rectangle"
            );
            for (fx, fy, pixel) in fg.enumerate_pixels() {
                if let Some((tx, ty)) = target(&out, x, y, fx, fy) {
                    out.put_pixel(tx, ty, Rgba([pixel[0], pixel[1], pixel[2], 255]));
                }
            }
            PasteMode::Rectangle
        }
        other => return Err(EngineError::UnsupportedPixelLayout(layout_name(other))),
    };

    Ok(Pasted { image: out, mode })
}

/// Resize `foreground` to `placement.width` and paste it at the placement offset.
pub fn place(canvas: &RgbaImage, foreground: &DynamicImage, placement: &Placement) -> Result<Pasted> {
    let resized = resize_preserving_aspect(foreground, placement.width)?;
    paste(canvas, &resized, placement.x, placement.y)
}

/// Canvas coordinate for foreground pixel (`fx`, `fy`), if it lands inside.
fn target(canvas: &RgbaImage, x: i64, y: i64, fx: u32, fy: u32) -> Option<(u32, u32)> {
    let tx = x + i64::from(fx);
    let ty = y + i64::from(fy);
    let inside = (0..i64::from(canvas.width())).contains(&tx)
        && (0..i64::from(canvas.height())).contains(&ty);
    inside.then(|| (tx as u32, ty as u32))
}
