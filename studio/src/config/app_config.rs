//! Runtime configuration loaded from environment variables.

use std::path::PathBuf;

use anyhow::bail;
use mockup_engine::options::{DEFAULT_GARMENT_COLOR, DEFAULT_KEY_COLOR};
use mockup_engine::{Placement, Rgb, SegmentOptions, Tolerance, parse_hex};

use super::validation::validate_setting;

/// Runtime configuration for one mockup render.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    pub mockup_path: PathBuf,
    pub design_path: PathBuf,
    pub output_path: PathBuf,
    /// `None` keeps the mockup's original colors.
    pub garment_color: Option<Rgb>,
    /// Run chroma-key extraction on the design before placing it.
    pub extract_design: bool,
    pub segment: SegmentOptions,
    pub design_width: Option<u32>,
    pub offset_x: Option<i64>,
    pub offset_y: Option<i64>,
}

impl StudioConfig {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self, anyhow::Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let g = |key: &str| -> Result<String, anyhow::Error> {
            let value = lookup(key).unwrap_or_default().trim().to_string();
            validate_setting(key, &value)
                .map_err(|e| anyhow::anyhow!("validation error for {key}: {e}"))?;
            Ok(value)
        };

        let mockup_path = g("MOCKUP_PATH")?;
        let design_path = g("DESIGN_PATH")?;
        if mockup_path.is_empty() || design_path.is_empty() {
            bail!("MOCKUP_PATH and DESIGN_PATH must both be set");
        }

        let garment_color = {
            let v = g("GARMENT_COLOR")?;
            if v.is_empty() {
                Some(DEFAULT_GARMENT_COLOR)
            } else if v.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(parse_hex(&v)?)
            }
        };

        let key_color = {
            let v = g("KEY_COLOR")?;
            if v.is_empty() { DEFAULT_KEY_COLOR } else { parse_hex(&v)? }
        };

        let defaults = SegmentOptions::default();
        let tolerance = Tolerance::new(
            parse_or(&g("HUE_TOLERANCE")?, defaults.tolerance.hue)?,
            parse_or(&g("SATURATION_TOLERANCE")?, defaults.tolerance.saturation)?,
            parse_or(&g("VALUE_TOLERANCE")?, defaults.tolerance.value)?,
        );
        let segment = SegmentOptions::new()
            .with_key_color(key_color)
            .with_tolerance(tolerance)
            .with_open_iterations(parse_or(&g("OPEN_ITERATIONS")?, defaults.open_iterations)?)
            .with_close_iterations(parse_or(&g("CLOSE_ITERATIONS")?, defaults.close_iterations)?);

        let output_path = {
            let v = g("OUTPUT_PATH")?;
            if v.is_empty() {
                PathBuf::from(default_output_name(garment_color))
            } else {
                PathBuf::from(v)
            }
        };

        Ok(Self {
            mockup_path: PathBuf::from(mockup_path),
            design_path: PathBuf::from(design_path),
            output_path,
            garment_color,
            extract_design: g("EXTRACT_DESIGN")? == "true",
            segment,
            design_width: parse_opt(&g("DESIGN_WIDTH")?)?,
            offset_x: parse_opt(&g("OFFSET_X")?)?,
            offset_y: parse_opt(&g("OFFSET_Y")?)?,
        })
    }

    /// Placement on a `canvas_w x canvas_h` canvas.
    ///
    /// Missing values fall back to the centered default, so setting only
    /// `OFFSET_Y` moves the design vertically and keeps it centered.
    pub fn placement(&self, canvas_w: u32, canvas_h: u32) -> Placement {
        let centered = Placement::centered(canvas_w, canvas_h);
        let width = self.design_width.unwrap_or(centered.width);
        let x = self
            .offset_x
            .unwrap_or_else(|| (i64::from(canvas_w) - i64::from(width)) / 2);
        Placement::new(x, self.offset_y.unwrap_or(centered.y), width)
    }
}

/// Download name used for renders: `mockup_<RRGGBB>.png`.
fn default_output_name(garment_color: Option<Rgb>) -> String {
    match garment_color {
        Some(color) => format!("mockup_{}.png", color.to_hex().trim_start_matches('#')),
        None => "mockup.png".into(),
    }
}

fn parse_or<T: std::str::FromStr>(s: &str, default: T) -> Result<T, anyhow::Error> {
    if s.is_empty() {
        return Ok(default);
    }
    s.parse().map_err(|_| anyhow::anyhow!("invalid value: {s}"))
}

fn parse_opt<T: std::str::FromStr>(s: &str) -> Result<Option<T>, anyhow::Error> {
    if s.is_empty() {
        return Ok(None);
    }
    s.parse()
        .map(Some)
        .map_err(|_| anyhow::anyhow!("invalid value: {s}"))
}
