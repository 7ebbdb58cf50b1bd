//! Image decoding and transparency flattening.

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageFormat, ImageReader, Rgb, RgbImage};
use tracing::debug;

use crate::{IoError, Result};

/// A decoded, fully opaque source image.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub image: RgbImage,
    /// Container format the bytes were sniffed as.
    pub format: ImageFormat,
}

/// Read and decode the image file at `path`.
pub fn read_image(path: impl AsRef<Path>, background: Rgb<u8>) -> Result<Decoded> {
    let path = path.as_ref();
    debug!(path = %path.display(), "Reading source image");
    let bytes = std::fs::read(path)?;
    decode_bytes(&bytes, background)
}

/// Decode an in-memory image, detecting its format from the content.
///
/// Any alpha channel is flattened onto `background`.
pub fn decode_bytes(bytes: &[u8], background: Rgb<u8>) -> Result<Decoded> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    let format = reader
        .format()
        .ok_or_else(|| IoError::UnsupportedSource("unrecognised image format".into()))?;

    let img = reader.decode().map_err(IoError::Decode)?;
    debug!(
        width = img.width(),
        height = img.height(),
        ?format,
        color = ?img.color(),
        "Decoded source image"
    );

    Ok(Decoded {
        image: flatten(&img, background),
        format,
    })
}

/// Composite `img` over an opaque `background`, dropping the alpha channel.
pub fn flatten(img: &DynamicImage, background: Rgb<u8>) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let pixel = rgba.get_pixel(x, y);
        blend_pixel(&background, pixel.0, pixel.0[3])
    })
}

fn blend_pixel(bg: &Rgb<u8>, fg: [u8; 4], alpha: u8) -> Rgb<u8> {
    let a = u32::from(alpha);
    let inv = 255 - a;
    let mix = |f: u8, b: u8| ((u32::from(f) * a + u32::from(b) * inv + 127) / 255) as u8;
    Rgb([mix(fg[0], bg[0]), mix(fg[1], bg[1]), mix(fg[2], bg[2])])
}
