use image::{DynamicImage, Rgba, RgbaImage};

/// Mockup stand-in: a horizontal gray ramp with a transparent left column.
fn test_mockup(width: u32, height: u32) -> DynamicImage {
    let img = RgbaImage::from_fn(width, height, |x, _| {
        let shade = 120 + (x * 135 / width) as u8;
        let alpha = if x == 0 { 0 } else { 255 };
        Rgba([shade, shade, shade, alpha])
    });
    DynamicImage::ImageRgba8(img)
}

mod extract;
