//! Halftone rendering parameters.
//!
//! These options control the screen geometry (sample box, dot scale, angles),
//! the colour separation strength, and the resampling quality.

use serde::{Deserialize, Serialize};

use crate::{DEFAULT_COLOR_ANGLES, DEFAULT_GREYSCALE_ANGLE, DEFAULT_SAMPLE, HalftoneError, Result};

/// Resampling used when rotating planes by angles that are not quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationFilter {
    /// Point sampling. Keeps dot edges hard.
    #[default]
    Nearest,
    Bilinear,
}

/// Filter used to shrink the supersampled canvas when antialiasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownsampleFilter {
    /// Exact average over each supersample block.
    #[default]
    Area,
    Lanczos3,
}

/// Ceilings on the memory a single render may allocate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderLimits {
    /// Largest working canvas (in pixels) any one channel may allocate.
    pub max_canvas_pixels: u64,
}

impl Default for RenderLimits {
    fn default() -> Self {
        Self {
            max_canvas_pixels: 1 << 28,
        }
    }
}

/// Configuration for one halftone render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HalftoneParams {
    /// Sample box edge length in source pixels.
    pub sample: u32,

    /// Dot size multiplier. The largest dot is `sample * scale` pixels wide,
    /// which is also the number of distinguishable dot sizes.
    pub scale: u32,

    /// How much of the gray component (0..=100) moves from CMY into K.
    pub percentage: f32,

    /// Screen rotation in degrees, one per channel (4 for colour, 1 for grayscale).
    pub angles: Vec<i32>,

    /// Render a single luminance screen instead of four CMYK screens.
    pub greyscale: bool,

    /// Draw at 4x size and shrink afterwards to smooth dot edges.
    pub antialias: bool,

    pub rotation: RotationFilter,

    pub downsample: DownsampleFilter,

    pub limits: RenderLimits,
}

impl Default for HalftoneParams {
    fn default() -> Self {
        Self {
            sample: DEFAULT_SAMPLE,
            scale: 1,
            percentage: 0.0,
            angles: DEFAULT_COLOR_ANGLES.to_vec(),
            greyscale: false,
            antialias: false,
            rotation: RotationFilter::default(),
            downsample: DownsampleFilter::default(),
            limits: RenderLimits::default(),
        }
    }
}

impl HalftoneParams {
    /// Colour (CMYK) parameters with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grayscale parameters with a single default screen angle.
    pub fn for_greyscale() -> Self {
        Self {
            angles: vec![DEFAULT_GREYSCALE_ANGLE],
            greyscale: true,
            ..Self::default()
        }
    }

    /// Builder: set sample box size.
    pub fn with_sample(mut self, val: u32) -> Self {
        self.sample = val;
        self
    }

    /// Builder: set dot scale.
    pub fn with_scale(mut self, val: u32) -> Self {
        self.scale = val;
        self
    }

    /// Builder: set gray component replacement percentage.
    pub fn with_percentage(mut self, val: f32) -> Self {
        self.percentage = val;
        self
    }

    /// Builder: set screen angles.
    pub fn with_angles(mut self, val: impl Into<Vec<i32>>) -> Self {
        self.angles = val.into();
        self
    }

    /// Builder: set grayscale flag. Angles are left untouched.
    pub fn with_greyscale(mut self, val: bool) -> Self {
        self.greyscale = val;
        self
    }

    /// Builder: set antialias flag.
    pub fn with_antialias(mut self, val: bool) -> Self {
        self.antialias = val;
        self
    }

    /// Builder: set rotation filter.
    pub fn with_rotation(mut self, val: RotationFilter) -> Self {
        self.rotation = val;
        self
    }

    /// Builder: set downsample filter.
    pub fn with_downsample(mut self, val: DownsampleFilter) -> Self {
        self.downsample = val;
        self
    }

    /// Builder: set canvas ceiling.
    pub fn with_max_canvas_pixels(mut self, val: u64) -> Self {
        self.limits.max_canvas_pixels = val;
        self
    }

    /// Number of screens this configuration renders.
    pub fn channel_count(&self) -> usize {
        if self.greyscale { 1 } else { 4 }
    }

    /// Dot scale actually used while drawing (supersampled when antialiasing),
    /// or `None` if it does not fit in a `u32`.
    pub fn working_scale(&self) -> Option<u32> {
        if self.antialias {
            self.scale.checked_mul(crate::SUPERSAMPLE_FACTOR)
        } else {
            Some(self.scale)
        }
    }

    /// Check every parameter, reporting all problems at once.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if self.sample < 1 {
            problems.push(format!("sample must be at least 1, got {}", self.sample));
        }
        if self.scale < 1 {
            problems.push(format!("scale must be at least 1, got {}", self.scale));
        }
        if !self.percentage.is_finite() || !(0.0..=100.0).contains(&self.percentage) {
            problems.push(format!(
                "percentage must be between 0 and 100, got {}",
                self.percentage
            ));
        }

        let expected = self.channel_count();
        if self.angles.len() != expected {
            let mode = if self.greyscale { "grayscale" } else { "color" };
            problems.push(format!(
                "angles must hold exactly {expected} value(s) in {mode} mode, got {}",
                self.angles.len()
            ));
        }

        if self.limits.max_canvas_pixels == 0 {
            problems.push("max_canvas_pixels must be greater than 0".into());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(HalftoneError::InvalidParameters(problems))
        }
    }
}
