use image::{DynamicImage, RgbImage};

use crate::color::{Rgb, hex_to_hsv, parse_hex};
use crate::options::SegmentOptions;
use crate::segment::{Tolerance, compute_window, segment};
use crate::{EngineError, extract_design};

#[test]
fn test_magenta_square_becomes_fully_transparent() {
    let magenta: image::Rgb<u8> = parse_hex("#D90166").unwrap().into();
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 100, magenta));

    let range = compute_window(hex_to_hsv("#D90166").unwrap(), Tolerance::exact());
    let out = segment(&img, range, 0, 0).unwrap();

    assert_eq!(out.dimensions(), (100, 100));
    assert!(out.pixels().all(|p| p[3] == 0));
    // Color channels survive even where alpha is zero.
    assert_eq!(out.get_pixel(50, 50).0, [217, 1, 102, 0]);
}

#[test]
fn test_design_on_noisy_backdrop() {
    // Magenta backdrop with slightly varying shades, a blue 6x6 design in the
    // middle, and one stray blue speckle in the corner.
    let mut img = RgbImage::from_fn(20, 20, |x, y| {
        let jitter = ((x + y) % 3) as u8;
        image::Rgb([215 + jitter, 1, 100 + jitter])
    });
    for y in 7..13 {
        for x in 7..13 {
            img.put_pixel(x, y, image::Rgb([20, 40, 200]));
        }
    }
    img.put_pixel(2, 2, image::Rgb([20, 40, 200]));

    let options = SegmentOptions::new()
        .with_key_color(Rgb::new(217, 1, 102))
        .with_tolerance(Tolerance::new(5, 20, 20))
        .with_open_iterations(1)
        .with_close_iterations(1);
    let out = extract_design(&DynamicImage::ImageRgb8(img), &options).unwrap();

    assert_eq!(out.get_pixel(2, 2)[3], 0, "speckle should be opened away");
    assert_eq!(out.get_pixel(0, 19)[3], 0);
    for y in 7..13 {
        for x in 7..13 {
            assert_eq!(out.get_pixel(x, y)[3], 255, "design pixel ({x}, {y})");
        }
    }
    let opaque = out.pixels().filter(|p| p[3] == 255).count();
    assert_eq!(opaque, 36);
}

#[test]
fn test_extract_accepts_rgba_photo() {
    let photo = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
        4,
        4,
        image::Rgba([0, 0, 255, 0]),
    ));
    let out = extract_design(&photo, &SegmentOptions::default()).unwrap();
    assert!(out.pixels().all(|p| p[3] == 255));
}

#[test]
fn test_extract_rejects_gray_photo() {
    let photo = DynamicImage::ImageLuma8(image::GrayImage::new(4, 4));
    assert!(matches!(
        extract_design(&photo, &SegmentOptions::default()),
        Err(EngineError::UnsupportedPixelLayout(_))
    ));
}
