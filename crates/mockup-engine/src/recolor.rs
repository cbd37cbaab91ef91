//! Garment recoloring.
//!
//! The original colors are reduced to a grayscale shading map, which is then
//! multiply-blended with a flat target color. Folds, shadows and highlights
//! survive; the original hue does not.

use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage};
use tracing::debug;

use crate::color::{Rgb, parse_hex};
use crate::{EngineError, Result, ensure_non_empty, layout_name};

/// Recolor a mockup to the `#RRGGBB` color `hex`.
pub fn recolor(shape: &DynamicImage, hex: &str) -> Result<RgbaImage> {
    let target = parse_hex(hex)?;
    recolor_rgb(shape, target)
}

/// Recolor a mockup to `target`, keeping its alpha channel.
///
/// RGB inputs produce a fully opaque result.
pub fn recolor_rgb(shape: &DynamicImage, target: Rgb) -> Result<RgbaImage> {
    let shading = shading_map(shape)?;
    let alpha = |x: u32, y: u32| match shape {
        DynamicImage::ImageRgba8(rgba) => rgba.get_pixel(x, y)[3],
        _ => 255,
    };

    debug!(
        width = shading.width(),
        height = shading.height(),
        color = %target,
        "Recoloring mockup"
    );

    let mut out = RgbaImage::new(shading.width(), shading.height());
    for (x, y, gray) in shading.enumerate_pixels() {
        let g = gray[0];
        out.put_pixel(
            x,
            y,
            Rgba([
                multiply(target.r, g),
                multiply(target.g, g),
                multiply(target.b, g),
                alpha(x, y),
            ]),
        );
    }
    Ok(out)
}

/// Grayscale shading map of the color channels (alpha is ignored).
pub fn shading_map(shape: &DynamicImage) -> Result<GrayImage> {
    ensure_non_empty(shape.width(), shape.height())?;

    let luma_at = |r: u8, g: u8, b: u8| Luma([Rgb::new(r, g, b).luma()]);
    match shape {
        DynamicImage::ImageRgb8(rgb) => Ok(GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
            let p = rgb.get_pixel(x, y);
            luma_at(p[0], p[1], p[2])
        })),
        DynamicImage::ImageRgba8(rgba) => {
            Ok(GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
                let p = rgba.get_pixel(x, y);
                luma_at(p[0], p[1], p[2])
            }))
        }
        other => Err(EngineError::UnsupportedPixelLayout(layout_name(other))),
    }
}

/// Multiply blend of two 8-bit channels, rounded to nearest.
fn multiply(a: u8, b: u8) -> u8 {
    ((u16::from(a) * u16::from(b) + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn gradient_rgba(width: u32, height: u32) -> DynamicImage {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 30) as u8, (y * 50) as u8, ((x + y) * 20) as u8, (x * 40) as u8])
        });
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn test_multiply_blend_extremes() {
        assert_eq!(multiply(255, 255), 255);
        assert_eq!(multiply(255, 0), 0);
        assert_eq!(multiply(0, 200), 0);
        assert_eq!(multiply(255, 77), 77);
        // 158 * 128 / 255 = 79.3
        assert_eq!(multiply(158, 128), 79);
    }

    #[test]
    fn test_recolor_white_reproduces_shading_map() {
        let shape = gradient_rgba(6, 4);
        let shading = shading_map(&shape).unwrap();
        let out = recolor(&shape, "#FFFFFF").unwrap();

        for (x, y, p) in out.enumerate_pixels() {
            let g = shading.get_pixel(x, y)[0];
            assert_eq!([p[0], p[1], p[2]], [g, g, g], "pixel ({x}, {y})");
        }
    }

    #[test]
    fn test_recolor_preserves_alpha_and_dimensions() {
        let shape = gradient_rgba(5, 3);
        let out = recolor(&shape, "#9E9E16").unwrap();
        assert_eq!(out.dimensions(), (5, 3));

        let src = shape.to_rgba8();
        for (x, y, p) in out.enumerate_pixels() {
            assert_eq!(p[3], src.get_pixel(x, y)[3]);
        }
    }

    #[test]
    fn test_recolor_rgb_input_is_opaque() {
        let shape = DynamicImage::ImageRgb8(RgbImage::from_pixel(3, 3, image::Rgb([200, 10, 10])));
        let out = recolor(&shape, "#00FF00").unwrap();
        assert!(out.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn test_recolor_white_garment_takes_target_color() {
        let shape = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, image::Rgb([255, 255, 255])));
        let out = recolor(&shape, "#9E9E16").unwrap();
        assert!(out.pixels().all(|p| *p == Rgba([158, 158, 22, 255])));
    }

    #[test]
    fn test_recolor_scales_target_by_luma() {
        let shape = DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, image::Rgb([180, 60, 20])));
        let gray = Rgb::new(180, 60, 20).luma();
        let out = recolor_rgb(&shape, Rgb::new(0, 0, 255)).unwrap();
        assert_eq!(out.get_pixel(0, 0), &Rgba([0, 0, multiply(255, gray), 255]));
    }

    #[test]
    fn test_recolor_rejects_bad_hex() {
        let shape = gradient_rgba(2, 2);
        assert!(matches!(
            recolor(&shape, "#12"),
            Err(EngineError::InvalidColorFormat(_))
        ));
    }

    #[test]
    fn test_recolor_rejects_unsupported_layout() {
        let shape = DynamicImage::ImageLuma8(GrayImage::new(2, 2));
        assert!(matches!(
            recolor(&shape, "#FFFFFF"),
            Err(EngineError::UnsupportedPixelLayout(_))
        ));
    }

    #[test]
    fn test_recolor_rejects_empty_image() {
        let shape = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        assert!(matches!(
            recolor(&shape, "#FFFFFF"),
            Err(EngineError::InvalidImage(_))
        ));
    }
}
