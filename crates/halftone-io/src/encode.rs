//! Encoding of rendered halftones.

use std::io::Cursor;
use std::path::Path;

use halftone::ColorImage;
use image::ImageFormat;
use tracing::debug;

use crate::{IoError, Result};

/// Encode `image` in `format`.
///
/// Grayscale is written as a single-channel image; CMYK is converted to RGB
/// first.
pub fn encode(image: ColorImage, format: ImageFormat) -> Result<Vec<u8>> {
    let (width, height) = image.dimensions();
    debug!(width, height, ?format, grayscale = image.is_grayscale(), "Encoding halftone");

    let mut out = Cursor::new(Vec::new());
    image
        .into_dynamic()
        .write_to(&mut out, format)
        .map_err(|source| IoError::Encode { format, source })?;
    Ok(out.into_inner())
}

/// Encode `image` and write it to `path`.
///
/// The format is taken from `format`, or from the file extension if `None`.
pub fn write_image(image: ColorImage, path: impl AsRef<Path>, format: Option<ImageFormat>) -> Result<()> {
    let path = path.as_ref();
    let format = match format {
        Some(f) => f,
        None => ImageFormat::from_path(path).map_err(|_| {
            IoError::UnsupportedSource(format!("no image format for {}", path.display()))
        })?,
    };
    let bytes = encode(image, format)?;
    std::fs::write(path, bytes)?;
    Ok(())
}
