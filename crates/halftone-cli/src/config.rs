//! Parameter loading: defaults, then an optional JSON file, then flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use halftone::{DEFAULT_COLOR_ANGLES, DEFAULT_GREYSCALE_ANGLE, DownsampleFilter, HalftoneParams, RotationFilter};

/// Parameter overrides collected from the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub sample: Option<u32>,
    pub scale: Option<u32>,
    pub percentage: Option<f32>,
    pub angles: Option<Vec<i32>>,
    pub greyscale: bool,
    pub antialias: bool,
    pub rotation: Option<RotationFilter>,
    pub downsample: Option<DownsampleFilter>,
    pub max_canvas_pixels: Option<u64>,
}

/// Build the render parameters.
///
/// Switching to grayscale without explicit angles picks the single default
/// grayscale angle, and vice versa for colour.
pub fn load_params(overrides: &Overrides) -> Result<HalftoneParams> {
    let mut params = match &overrides.config {
        Some(path) => read_params_file(path)?,
        None => HalftoneParams::default(),
    };

    if let Some(v) = overrides.sample {
        params.sample = v;
    }
    if let Some(v) = overrides.scale {
        params.scale = v;
    }
    if let Some(v) = overrides.percentage {
        params.percentage = v;
    }
    if overrides.greyscale {
        params.greyscale = true;
    }
    if overrides.antialias {
        params.antialias = true;
    }
    if let Some(v) = overrides.rotation {
        params.rotation = v;
    }
    if let Some(v) = overrides.downsample {
        params.downsample = v;
    }
    if let Some(v) = overrides.max_canvas_pixels {
        params.limits.max_canvas_pixels = v;
    }

    match &overrides.angles {
        Some(angles) => params.angles = angles.clone(),
        None if params.angles.len() != params.channel_count() => {
            params.angles = if params.greyscale {
                vec![DEFAULT_GREYSCALE_ANGLE]
            } else {
                DEFAULT_COLOR_ANGLES.to_vec()
            };
        }
        None => {}
    }

    params.validate()?;
    Ok(params)
}

fn read_params_file(path: &Path) -> Result<HalftoneParams> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid config file {}", path.display()))
}

/// Default output path: `<stem>_halftone.<ext>` next to the input.
pub fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".into());
    let name = match input.extension() {
        Some(ext) => format!("{stem}_halftone.{}", ext.to_string_lossy()),
        None => format!("{stem}_halftone"),
    };
    input.with_file_name(name)
}
