//! Supersampling antialiasing.
//!
//! Dots are drawn without antialiasing, so smooth edges come from drawing
//! `SUPERSAMPLE_FACTOR` times larger and shrinking the finished screen.

use image::GrayImage;
use image::imageops::{self, FilterType};
use rayon::prelude::*;
use tracing::debug;

use crate::params::DownsampleFilter;

/// Linear supersampling factor applied to the dot scale when antialiasing.
pub const SUPERSAMPLE_FACTOR: u32 = 4;

/// Shrink `img` by an integer `factor` on both axes.
///
/// Trailing rows or columns that do not fill a whole block are dropped.
pub fn downsample(img: &GrayImage, factor: u32, filter: DownsampleFilter) -> GrayImage {
    let (orig_w, orig_h) = img.dimensions();
    let factor = factor.max(1);
    let (width, height) = (orig_w / factor, orig_h / factor);

    debug!(orig_w, orig_h, width, height, ?filter, "Downsampling supersampled screen");

    if factor == 1 {
        return img.clone();
    }

    match filter {
        DownsampleFilter::Area => area_average(img, factor, width, height),
        DownsampleFilter::Lanczos3 => {
            let cropped = imageops::crop_imm(img, 0, 0, width * factor, height * factor).to_image();
            imageops::resize(&cropped, width, height, FilterType::Lanczos3)
        }
    }
}

/// Each output pixel is the rounded mean of its `factor x factor` block.
fn area_average(img: &GrayImage, factor: u32, width: u32, height: u32) -> GrayImage {
    let mut out = GrayImage::new(width, height);
    if out.is_empty() {
        return out;
    }

    let src_stride = img.width() as usize;
    let raw = img.as_raw();
    let block = factor * factor;
    let f = factor as usize;

    let buffer: &mut [u8] = &mut out;
    buffer
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, px) in row.iter_mut().enumerate() {
                let mut sum = 0u32;
                for dy in 0..f {
                    let start = (y * f + dy) * src_stride + x * f;
                    sum += raw[start..start + f].iter().map(|&v| u32::from(v)).sum::<u32>();
                }
                *px = ((sum + block / 2) / block) as u8;
            }
        });

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    /// Checkerboard of `cell`-sized squares alternating 0 and 255.
    fn create_checker_image(width: u32, height: u32, cell: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            if (x / cell + y / cell) % 2 == 0 { Luma([255]) } else { Luma([0]) }
        })
    }

    #[test]
    fn test_downsample_dimensions_cancel_factor() {
        let img = GrayImage::new(80, 40);
        for filter in [DownsampleFilter::Area, DownsampleFilter::Lanczos3] {
            let out = downsample(&img, SUPERSAMPLE_FACTOR, filter);
            assert_eq!(out.dimensions(), (20, 10));
        }
    }

    #[test]
    fn test_area_average_exact_blocks() {
        // Every 4x4 block is uniform
        let img = create_checker_image(16, 8, 4);
        let out = downsample(&img, 4, DownsampleFilter::Area);
        assert_eq!(out.get_pixel(0, 0).0[0], 255);
        assert_eq!(out.get_pixel(1, 0).0[0], 0);
        assert_eq!(out.get_pixel(1, 1).0[0], 255);
    }

    #[test]
    fn test_area_average_mixes_edges() {
        // 1-pixel checkerboard averages to mid gray
        let img = create_checker_image(8, 8, 1);
        let out = downsample(&img, 4, DownsampleFilter::Area);
        for p in out.pixels() {
            assert_eq!(p.0[0], 128);
        }
    }

    #[test]
    fn test_area_average_drops_partial_blocks() {
        let img = GrayImage::from_pixel(10, 9, Luma([200]));
        let out = downsample(&img, 4, DownsampleFilter::Area);
        assert_eq!(out.dimensions(), (2, 2));
        assert!(out.pixels().all(|p| p.0[0] == 200));
    }

    #[test]
    fn test_factor_one_is_identity() {
        let img = create_checker_image(6, 6, 2);
        assert_eq!(downsample(&img, 1, DownsampleFilter::Lanczos3), img);
    }
}
