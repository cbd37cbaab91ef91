//! Chroma-key segmentation.
//!
//! Pixels whose HSV coordinates fall inside a tolerance window around the
//! key color are treated as background and made transparent. The remaining
//! foreground mask is cleaned with morphological opening and closing before
//! it becomes the alpha channel.

use image::{DynamicImage, GrayImage, Luma, RgbImage, Rgba, RgbaImage};
use imageproc::distance_transform::Norm;
use imageproc::morphology;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color::{HUE_MAX, Hsv, Rgb, rgb_to_hsv};
use crate::options::SegmentOptions;
use crate::{EngineError, Result, ensure_non_empty, layout_name};

/// Mask value for foreground (kept) pixels.
pub const FOREGROUND: u8 = 255;
/// Mask value for background (removed) pixels.
pub const BACKGROUND: u8 = 0;

/// Per-channel tolerance around a key color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tolerance {
    pub hue: u8,
    pub saturation: u8,
    pub value: u8,
}

impl Tolerance {
    pub const fn new(hue: u8, saturation: u8, value: u8) -> Self {
        Self {
            hue,
            saturation,
            value,
        }
    }

    /// Zero-width window: only the exact key color matches.
    pub const fn exact() -> Self {
        Self::new(0, 0, 0)
    }
}

/// Inclusive HSV bounds of the background color band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HsvRange {
    pub lower: Hsv,
    pub upper: Hsv,
}

impl HsvRange {
    /// The whole HSV space; every pixel matches.
    pub const FULL: HsvRange = HsvRange {
        lower: Hsv { h: 0, s: 0, v: 0 },
        upper: Hsv {
            h: HUE_MAX,
            s: 255,
            v: 255,
        },
    };

    /// Whether `hsv` lies inside the band on all three channels.
    pub fn contains(&self, hsv: Hsv) -> bool {
        (self.lower.h..=self.upper.h).contains(&hsv.h)
            && (self.lower.s..=self.upper.s).contains(&hsv.s)
            && (self.lower.v..=self.upper.v).contains(&hsv.v)
    }
}

/// Compute the background band around `base`, clamped to each channel's range.
///
/// Hue does not wrap: a window around hue 2 with tolerance 5 spans 0..=7,
/// not 177..=179 plus 0..=7.
pub fn compute_window(base: Hsv, tolerance: Tolerance) -> HsvRange {
    let upper_hue = base.h.min(HUE_MAX).saturating_add(tolerance.hue).min(HUE_MAX);
    HsvRange {
        lower: Hsv {
            h: base.h.min(HUE_MAX).saturating_sub(tolerance.hue),
            s: base.s.saturating_sub(tolerance.saturation),
            v: base.v.saturating_sub(tolerance.value),
        },
        upper: Hsv {
            h: upper_hue,
            s: base.s.saturating_add(tolerance.saturation),
            v: base.v.saturating_add(tolerance.value),
        },
    }
}

/// Remove the keyed background from an RGB image.
///
/// Returns an RGBA copy whose color channels are untouched and whose alpha is
/// the cleaned foreground mask. Opening runs before closing; either step is
/// skipped when its iteration count is zero.
pub fn segment(
    image: &DynamicImage,
    range: HsvRange,
    open_iterations: u8,
    close_iterations: u8,
) -> Result<RgbaImage> {
    let rgb = match image {
        DynamicImage::ImageRgb8(rgb) => rgb,
        other => {
            return Err(EngineError::InvalidImage(format!(
                "segmentation needs 3-channel RGB input, got {}",
                layout_name(other)
            )));
        }
    };
    ensure_non_empty(rgb.width(), rgb.height())?;

    debug!(
        width = rgb.width(),
        height = rgb.height(),
        ?range,
        open_iterations,
        close_iterations,
        "Segmenting image"
    );

    let mask = build_mask(rgb, range);
    let mask = clean_mask(&mask, open_iterations, close_iterations);
    apply_mask(rgb, &mask)
}

/// Segment using a resolved options struct.
pub fn segment_with(image: &DynamicImage, options: &SegmentOptions) -> Result<RgbaImage> {
    segment(
        image,
        options.window(),
        options.open_iterations,
        options.close_iterations,
    )
}

/// Foreground candidate mask: 255 where the pixel is outside the background band.
pub fn build_mask(rgb: &RgbImage, range: HsvRange) -> GrayImage {
    let mut mask = GrayImage::new(rgb.width(), rgb.height());
    for (x, y, pixel) in rgb.enumerate_pixels() {
        let hsv = rgb_to_hsv(Rgb::from(*pixel));
        let value = if range.contains(hsv) {
            BACKGROUND
        } else {
            FOREGROUND
        };
        mask.put_pixel(x, y, Luma([value]));
    }
    mask
}

/// Morphological cleanup with a 3x3 square element.
///
/// `iterations` passes of a 3x3 square are equivalent to a single pass with
/// an L-infinity radius of `iterations`, which is how imageproc expresses it.
/// Pixels outside the image never count as background.
pub fn clean_mask(mask: &GrayImage, open_iterations: u8, close_iterations: u8) -> GrayImage {
    let mut cleaned = mask.clone();
    if open_iterations > 0 {
        cleaned = morphology::open(&cleaned, Norm::LInf, open_iterations);
    }
    if close_iterations > 0 {
        cleaned = morphology::close(&cleaned, Norm::LInf, close_iterations);
    }
    cleaned
}

/// Attach `mask` to `rgb` as its alpha channel.
pub fn apply_mask(rgb: &RgbImage, mask: &GrayImage) -> Result<RgbaImage> {
    if rgb.dimensions() != mask.dimensions() {
        return Err(EngineError::InvalidImage(format!(
            "mask is {:?} but image is {:?}",
            mask.dimensions(),
            rgb.dimensions()
        )));
    }

    let mut out = RgbaImage::new(rgb.width(), rgb.height());
    for ((src, alpha), dst) in rgb.pixels().zip(mask.pixels()).zip(out.pixels_mut()) {
        *dst = Rgba([src[0], src[1], src[2], alpha[0]]);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::hex_to_hsv;

    const MAGENTA: image::Rgb<u8> = image::Rgb([217, 1, 102]);
    const BLUE: image::Rgb<u8> = image::Rgb([0, 0, 255]);

    fn solid(width: u32, height: u32, color: image::Rgb<u8>) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, color))
    }

    /// Solid image with a single differently colored pixel in the center.
    fn with_center_pixel(size: u32, fill: image::Rgb<u8>, center: image::Rgb<u8>) -> DynamicImage {
        let mut img = RgbImage::from_pixel(size, size, fill);
        img.put_pixel(size / 2, size / 2, center);
        DynamicImage::ImageRgb8(img)
    }

    fn magenta_window() -> HsvRange {
        compute_window(hex_to_hsv("#D90166").unwrap(), Tolerance::exact())
    }

    fn alphas(img: &RgbaImage) -> Vec<u8> {
        img.pixels().map(|p| p[3]).collect()
    }

    #[test]
    fn test_compute_window_clamps_each_channel() {
        let range = compute_window(Hsv { h: 5, s: 250, v: 10 }, Tolerance::new(10, 10, 20));
        assert_eq!(range.lower, Hsv { h: 0, s: 240, v: 0 });
        assert_eq!(range.upper, Hsv { h: 15, s: 255, v: 30 });
    }

    #[test]
    fn test_compute_window_hue_does_not_wrap() {
        let range = compute_window(Hsv { h: 175, s: 100, v: 100 }, Tolerance::new(10, 0, 0));
        assert_eq!(range.lower.h, 165);
        assert_eq!(range.upper.h, HUE_MAX);
        assert!(!range.contains(Hsv { h: 2, s: 100, v: 100 }));
    }

    #[test]
    fn test_full_window_makes_everything_transparent() {
        let mut img = RgbImage::new(6, 4);
        for (x, y, p) in img.enumerate_pixels_mut() {
            *p = image::Rgb([(x * 40) as u8, (y * 60) as u8, 128]);
        }
        let range = compute_window(Hsv { h: 90, s: 128, v: 128 }, Tolerance::new(255, 255, 255));
        assert_eq!(range, HsvRange::FULL);

        let out = segment(&DynamicImage::ImageRgb8(img), range, 0, 0).unwrap();
        assert!(alphas(&out).iter().all(|&a| a == BACKGROUND));
    }

    #[test]
    fn test_absent_key_color_keeps_everything_opaque() {
        let out = segment(&solid(8, 8, BLUE), magenta_window(), 2, 2).unwrap();
        assert!(alphas(&out).iter().all(|&a| a == FOREGROUND));
    }

    #[test]
    fn test_color_channels_are_preserved() {
        let img = with_center_pixel(5, MAGENTA, BLUE);
        let out = segment(&img, magenta_window(), 0, 0).unwrap();
        assert_eq!(out.get_pixel(2, 2), &Rgba([0, 0, 255, 255]));
        assert_eq!(out.get_pixel(0, 0), &Rgba([217, 1, 102, 0]));
    }

    #[test]
    fn test_opening_removes_isolated_speckle() {
        let img = with_center_pixel(9, MAGENTA, BLUE);

        let raw = segment(&img, magenta_window(), 0, 0).unwrap();
        assert_eq!(raw.get_pixel(4, 4)[3], FOREGROUND);

        let opened = segment(&img, magenta_window(), 1, 0).unwrap();
        assert!(alphas(&opened).iter().all(|&a| a == BACKGROUND));
    }

    #[test]
    fn test_closing_fills_isolated_hole() {
        let img = with_center_pixel(9, BLUE, MAGENTA);

        let raw = segment(&img, magenta_window(), 0, 0).unwrap();
        assert_eq!(raw.get_pixel(4, 4)[3], BACKGROUND);

        let closed = segment(&img, magenta_window(), 0, 1).unwrap();
        assert!(alphas(&closed).iter().all(|&a| a == FOREGROUND));
    }

    #[test]
    fn test_segment_rejects_rgba_input() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(4, 4));
        assert!(matches!(
            segment(&img, HsvRange::FULL, 0, 0),
            Err(EngineError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_segment_rejects_empty_image() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(0, 3));
        assert!(matches!(
            segment(&img, HsvRange::FULL, 0, 0),
            Err(EngineError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_apply_mask_rejects_mismatched_sizes() {
        let rgb = RgbImage::new(4, 4);
        let mask = GrayImage::new(3, 4);
        assert!(apply_mask(&rgb, &mask).is_err());
    }
}
