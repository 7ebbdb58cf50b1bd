//! halftone - render images as rotated dot screens.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use halftone::{DownsampleFilter, RotationFilter};
use tracing_subscriber::EnvFilter;

mod config;

use config::Overrides;

#[derive(Parser)]
#[command(name = "halftone")]
#[command(author, version, about = "Render an image as a CMYK or grayscale halftone")]
#[command(long_about = "
Render an image as variable-size dots on rotated screens.

Examples:
  halftone photo.jpg                          # CMYK at 75,15,45,0, writes photo_halftone.jpg
  halftone photo.jpg --angles 15,75,0,45      # custom C,M,Y,K screen angles
  halftone photo.jpg --greyscale --angles 45  # single screen at 45 degrees
  halftone photo.png -s 8 -x 2 --antialias -p 100 -o out.png
")]
struct Cli {
    /// Input image
    input: PathBuf,

    /// Output image (default: <input>_halftone.<ext>)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON file with render parameters; flags take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sample box size in source pixels
    #[arg(short, long)]
    sample: Option<u32>,

    /// Dot size multiplier
    #[arg(short = 'x', long)]
    scale: Option<u32>,

    /// Gray component replacement, 0-100
    #[arg(short, long)]
    percentage: Option<f32>,

    /// Screen angles in degrees (4 for color, 1 for grayscale)
    #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true)]
    angles: Option<Vec<i32>>,

    /// Render a single grayscale screen
    #[arg(short, long)]
    greyscale: bool,

    /// Smooth dot edges by supersampling
    #[arg(long)]
    antialias: bool,

    /// Rotation resampling
    #[arg(long, value_enum)]
    rotation: Option<RotationArg>,

    /// Antialias downsampling filter
    #[arg(long, value_enum)]
    downsample: Option<DownsampleArg>,

    /// Largest working canvas per channel, in pixels
    #[arg(long)]
    max_canvas_pixels: Option<u64>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum RotationArg {
    Nearest,
    Bilinear,
}

#[derive(Clone, Copy, ValueEnum)]
enum DownsampleArg {
    Area,
    Lanczos3,
}

impl From<RotationArg> for RotationFilter {
    fn from(arg: RotationArg) -> Self {
        match arg {
            RotationArg::Nearest => RotationFilter::Nearest,
            RotationArg::Bilinear => RotationFilter::Bilinear,
        }
    }
}

impl From<DownsampleArg> for DownsampleFilter {
    fn from(arg: DownsampleArg) -> Self {
        match arg {
            DownsampleArg::Area => DownsampleFilter::Area,
            DownsampleArg::Lanczos3 => DownsampleFilter::Lanczos3,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let params = config::load_params(&Overrides {
        config: cli.config,
        sample: cli.sample,
        scale: cli.scale,
        percentage: cli.percentage,
        angles: cli.angles,
        greyscale: cli.greyscale,
        antialias: cli.antialias,
        rotation: cli.rotation.map(Into::into),
        downsample: cli.downsample.map(Into::into),
        max_canvas_pixels: cli.max_canvas_pixels,
    })?;

    let output = cli.output.unwrap_or_else(|| config::default_output(&cli.input));
    tracing::info!(input = %cli.input.display(), output = %output.display(), "Starting halftone");

    let format = halftone_io::make_to_file(&cli.input, &output, &params).with_context(|| {
        format!("Failed to halftone {} into {}", cli.input.display(), output.display())
    })?;

    tracing::info!(output = %output.display(), ?format, "Done");
    Ok(())
}
