//! Colour separation: RGB to CMYK with gray component replacement.

use image::{GrayImage, Luma, RgbImage};
use tracing::debug;

use crate::raster::RasterPlane;

/// Naive RGB to CMYK conversion.
///
/// Each of C, M, Y is the complement of the matching RGB channel and K is 0.
pub fn rgb_to_cmyk(img: &RgbImage) -> [RasterPlane; 4] {
    let (width, height) = img.dimensions();
    debug!(width, height, "Separating RGB into CMYK");

    let mut cyan = GrayImage::new(width, height);
    let mut magenta = GrayImage::new(width, height);
    let mut yellow = GrayImage::new(width, height);
    let key = GrayImage::new(width, height);

    for (x, y, pixel) in img.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        cyan.put_pixel(x, y, Luma([255 - r]));
        magenta.put_pixel(x, y, Luma([255 - g]));
        yellow.put_pixel(x, y, Luma([255 - b]));
    }

    [cyan, magenta, yellow, key]
}

/// Separate an RGB image into CMYK, moving `percentage` of the gray
/// component shared by C, M and Y into the K plane.
///
/// For every pixel, `gray = floor(min(C, M, Y) * percentage / 100)` is
/// subtracted from C, M and Y and becomes K. A percentage of 0 returns the
/// naive conversion unchanged, e.g. at 100%: `(41, 100, 255, 0) -> (0, 59, 214, 41)`.
pub fn gray_component_replacement(img: &RgbImage, percentage: f32) -> [RasterPlane; 4] {
    let mut planes = rgb_to_cmyk(img);
    if percentage <= 0.0 {
        return planes;
    }

    debug!(percentage, "Applying gray component replacement");

    let [cyan, magenta, yellow, key] = &mut planes;
    let pixels = cyan
        .pixels_mut()
        .zip(magenta.pixels_mut())
        .zip(yellow.pixels_mut())
        .zip(key.pixels_mut());

    for (((c, m), y), k) in pixels {
        let gray = gray_component(c.0[0], m.0[0], y.0[0], percentage);
        // gray <= min(C, M, Y), so the subtractions cannot underflow
        c.0[0] -= gray;
        m.0[0] -= gray;
        y.0[0] -= gray;
        k.0[0] = gray;
    }

    planes
}

/// Share of the common CMY component to move into K.
fn gray_component(c: u8, m: u8, y: u8, percentage: f32) -> u8 {
    let min = c.min(m).min(y);
    let gray = (f64::from(min) * f64::from(percentage) / 100.0).floor();
    (gray as u8).min(min)
}
