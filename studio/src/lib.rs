//! File-level glue around the mockup engine.
//!
//! Reads the mockup and design files, picks a decoder from the file
//! extension, runs extraction and rendering, and writes the PNG result.

pub mod config;
#[cfg(feature = "heif")]
pub mod heif;

use std::path::{Path, PathBuf};

use anyhow::Context;
use image::DynamicImage;
use mockup_engine::{
    DecoderRegistry, MockupOptions, PasteMode, encode_png, extract_design, render_mockup,
};

pub use config::StudioConfig;

/// Load .env from multiple candidate paths.
pub fn load_dotenv() {
    let candidates = [".env", "../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}

/// Load .env and the runtime configuration.
pub fn init_config() -> Result<StudioConfig, anyhow::Error> {
    load_dotenv();
    let config = StudioConfig::load()?;
    tracing::info!(
        mockup = %config.mockup_path.display(),
        design = %config.design_path.display(),
        extract = config.extract_design,
        "Configuration loaded"
    );
    Ok(config)
}

/// Decoders for every input format this build supports.
///
/// PNG and JPEG always; HEIC/HEIF with the `heif` feature.
pub fn decoder_registry() -> DecoderRegistry {
    #[allow(unused_mut)]
    let mut registry = DecoderRegistry::default();
    #[cfg(feature = "heif")]
    registry.register(heif::HeifDecoder);
    registry
}

/// Media type for `path`, guessed from its extension.
pub fn media_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string()
}

/// Read and decode an image file.
pub fn read_image(registry: &DecoderRegistry, path: &Path) -> Result<DynamicImage, anyhow::Error> {
    let media_type = media_type_for(path);
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let img = registry
        .decode(&media_type, &bytes)
        .with_context(|| format!("decoding {} as {media_type}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        media_type,
        width = img.width(),
        height = img.height(),
        "Loaded image"
    );
    Ok(img)
}

/// Render one mockup as described by `config` and write it to disk.
///
/// Returns the output path.
pub fn run(config: &StudioConfig, registry: &DecoderRegistry) -> Result<PathBuf, anyhow::Error> {
    let mockup = read_image(registry, &config.mockup_path)?;
    let mut design = read_image(registry, &config.design_path)?;

    if config.extract_design {
        tracing::info!(key = ?config.segment.key_color, "Extracting design");
        design = DynamicImage::ImageRgba8(extract_design(&design, &config.segment)?);
    }

    let options = MockupOptions::new()
        .with_garment_color(config.garment_color)
        .with_placement(config.placement(mockup.width(), mockup.height()));
    let render = render_mockup(&mockup, &design, &options)?;

    if render.paste_mode == PasteMode::Rectangle {
        tracing::warn!(
            "Design image is not transparent; the whole image box was pasted. \
             Use a transparent PNG or enable EXTRACT_DESIGN."
        );
    }

    let png = encode_png(&render.image)?;
    if let Some(parent) = config.output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&config.output_path, png)
        .with_context(|| format!("writing {}", config.output_path.display()))?;

    tracing::info!(output = %config.output_path.display(), "Mockup written");
    Ok(config.output_path.clone())
}
