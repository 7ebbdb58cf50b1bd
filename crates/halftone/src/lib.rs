//! Dot-screen halftoning for continuous-tone raster images.
//!
//! Separates an RGB raster into CMYK (with optional gray component
//! replacement) or a single luminance plane, renders every plane as
//! variable-diameter dots on a rotated screen, and reassembles the result.

pub mod antialias;
pub mod compose;
pub mod geometry;
pub mod params;
pub mod raster;
pub mod render;
pub mod screen;
pub mod separate;

// Re-exports for convenience
pub use antialias::SUPERSAMPLE_FACTOR;
pub use params::{DownsampleFilter, HalftoneParams, RenderLimits, RotationFilter};
pub use raster::{Channel, ColorImage, RasterPlane};
pub use render::render;
pub use separate::{gray_component_replacement, rgb_to_cmyk};

/// Default sample box edge length in source pixels.
pub const DEFAULT_SAMPLE: u32 = 10;

/// Default screen angles for colour mode (cyan, magenta, yellow, key).
pub const DEFAULT_COLOR_ANGLES: [i32; 4] = [75, 15, 45, 0];

/// Default screen angle for grayscale mode.
pub const DEFAULT_GREYSCALE_ANGLE: i32 = 0;

/// Errors that can occur while rendering a halftone.
#[derive(Debug, thiserror::Error)]
pub enum HalftoneError {
    #[error("Invalid halftone parameters: {}", .0.join("; "))]
    InvalidParameters(Vec<String>),

    #[error("Source image is empty ({width}x{height})")]
    EmptySource { width: u32, height: u32 },

    #[error(
        "Working canvas for {channel} channel needs {required} pixels, limit is {limit}"
    )]
    ResourceExceeded {
        channel: Channel,
        required: u64,
        limit: u64,
    },

    #[error("Canvas of {width}x{height} at scale {scale} overflows")]
    CanvasOverflow { width: u32, height: u32, scale: u32 },

    #[error("Expected {expected} channel planes, got {actual}")]
    ChannelMismatch { expected: usize, actual: usize },

    #[error("Channel planes differ in size: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("Crop of {crop:?} does not fit inside canvas of {canvas:?}")]
    CropOutOfBounds { canvas: (u32, u32), crop: (u32, u32) },
}

/// Result type alias for halftone operations.
pub type Result<T> = std::result::Result<T, HalftoneError>;
