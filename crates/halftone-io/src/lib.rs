//! File and byte-stream plumbing around the halftone renderer.
//!
//! Decodes images (sniffing the container format), flattens transparency
//! onto an opaque background, and encodes rendered halftones.

pub mod decode;
pub mod encode;

use std::path::Path;
use std::time::Instant;

use halftone::{ColorImage, HalftoneError, HalftoneParams};
use image::{ImageFormat, Rgb};
use tracing::info;

// Re-exports for convenience
pub use decode::{Decoded, decode_bytes, flatten, read_image};
pub use encode::{encode, write_image};

/// Background transparent pixels are flattened onto.
pub const DEFAULT_BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Errors that can occur while reading, rendering or writing images.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Failed to encode image as {format:?}: {source}")]
    Encode {
        format: ImageFormat,
        #[source]
        source: image::ImageError,
    },

    #[error("Unsupported source: {0}")]
    UnsupportedSource(String),

    #[error(transparent)]
    Halftone(#[from] HalftoneError),
}

/// Result type alias for halftone-io operations.
pub type Result<T> = std::result::Result<T, IoError>;

/// An encoded halftone and the container it was encoded in.
#[derive(Debug, Clone)]
pub struct Halftoned {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

/// Read the image at `path`, render it as a halftone, and encode the result
/// in the same container format as the source.
pub fn make(path: impl AsRef<Path>, params: &HalftoneParams) -> Result<Halftoned> {
    make_with_background(path, params, DEFAULT_BACKGROUND)
}

/// Like [`make`], flattening transparency onto `background`.
pub fn make_with_background(
    path: impl AsRef<Path>,
    params: &HalftoneParams,
    background: Rgb<u8>,
) -> Result<Halftoned> {
    let path = path.as_ref();
    let started = Instant::now();

    let (halftone, format) = read_and_render(path, params, background)?;
    let bytes = encode(halftone, format)?;

    info!(
        path = %path.display(),
        ?format,
        bytes = bytes.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Halftone image made"
    );

    Ok(Halftoned { bytes, format })
}

/// Read the image at `input`, render it as a halftone, and write it to
/// `output`.
///
/// The container follows the extension of `output`; when it names no known
/// format the source's container is kept. Returns the format written.
pub fn make_to_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    params: &HalftoneParams,
) -> Result<ImageFormat> {
    let (input, output) = (input.as_ref(), output.as_ref());
    let started = Instant::now();

    let (halftone, source_format) = read_and_render(input, params, DEFAULT_BACKGROUND)?;
    let format = ImageFormat::from_path(output).unwrap_or(source_format);
    write_image(halftone, output, Some(format))?;

    info!(
        input = %input.display(),
        output = %output.display(),
        ?format,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Halftone image written"
    );
    Ok(format)
}

fn read_and_render(
    path: &Path,
    params: &HalftoneParams,
    background: Rgb<u8>,
) -> Result<(ColorImage, ImageFormat)> {
    // Fail on bad parameters before paying for the decode
    params.validate()?;

    let decoded = read_image(path, background)?;
    let halftone = halftone::render(&decoded.image, params)?;
    Ok((halftone, decoded.format))
}
