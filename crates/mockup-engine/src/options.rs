//! Tuning options for extraction and mockup rendering.
//!
//! These are plain immutable values handed to each call; a front end maps its
//! sliders and pickers onto them. Both structs deserialize with defaults for
//! missing fields so saved presets survive new options being added.

use serde::{Deserialize, Serialize};

use crate::color::{Hsv, Rgb};
use crate::compose::Placement;
use crate::segment::{HsvRange, Tolerance, compute_window};

/// Default key color, the magenta backdrop of the reference photos (#D90166).
pub const DEFAULT_KEY_COLOR: Rgb = Rgb::new(0xD9, 0x01, 0x66);

/// Default garment color (#9E9E16).
pub const DEFAULT_GARMENT_COLOR: Rgb = Rgb::new(0x9E, 0x9E, 0x16);

/// Options for chroma-key extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentOptions {
    /// Background color to remove, in quantized HSV.
    pub key_color: Hsv,

    /// Per-channel half-width of the background band.
    pub tolerance: Tolerance,

    /// Opening passes (speckle removal). Zero disables the step.
    pub open_iterations: u8,

    /// Closing passes (hole filling). Zero disables the step.
    pub close_iterations: u8,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            key_color: DEFAULT_KEY_COLOR.to_hsv(),
            tolerance: Tolerance::new(10, 40, 40),
            open_iterations: 2,
            close_iterations: 2,
        }
    }
}

impl SegmentOptions {
    /// Create options with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the key color from RGB.
    pub fn with_key_color(mut self, color: Rgb) -> Self {
        self.key_color = color.to_hsv();
        self
    }

    /// Builder: set the key color directly in HSV.
    pub fn with_key_hsv(mut self, hsv: Hsv) -> Self {
        self.key_color = hsv;
        self
    }

    /// Builder: set the tolerance window.
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Builder: set the opening pass count.
    pub fn with_open_iterations(mut self, n: u8) -> Self {
        self.open_iterations = n;
        self
    }

    /// Builder: set the closing pass count.
    pub fn with_close_iterations(mut self, n: u8) -> Self {
        self.close_iterations = n;
        self
    }

    /// The background band these options select.
    pub fn window(&self) -> HsvRange {
        compute_window(self.key_color, self.tolerance)
    }
}

/// Options for rendering a design onto a mockup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockupOptions {
    /// Recolor the mockup to this color first; `None` keeps its original colors.
    pub garment_color: Option<Rgb>,

    /// Where the design goes; `None` uses [`Placement::centered`].
    pub placement: Option<Placement>,
}

impl Default for MockupOptions {
    fn default() -> Self {
        Self {
            garment_color: Some(DEFAULT_GARMENT_COLOR),
            placement: None,
        }
    }
}

impl MockupOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set or clear the garment color.
    pub fn with_garment_color(mut self, color: Option<Rgb>) -> Self {
        self.garment_color = color;
        self
    }

    /// Builder: set an explicit placement.
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = Some(placement);
        self
    }

    /// Placement to use on a canvas of the given size.
    pub fn resolve_placement(&self, canvas_w: u32, canvas_h: u32) -> Placement {
        self.placement
            .unwrap_or_else(|| Placement::centered(canvas_w, canvas_h))
    }
}
