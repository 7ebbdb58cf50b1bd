//! Dot-screen rendering of a single plane.
//!
//! The plane is rotated onto the screen angle, sampled in square boxes, each
//! box becomes one dot, and the dot canvas is rotated back and cropped to the
//! original footprint.

use image::{GrayImage, Luma, imageops};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use rayon::prelude::*;
use tracing::debug;

use crate::geometry::{self, Dot, Extent, SampleBox, SampleGrid};
use crate::params::RotationFilter;
use crate::raster::RasterPlane;
use crate::{HalftoneError, Result};

/// Ink value of a drawn dot.
const INK: u8 = 255;

/// Screen settings for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Screen {
    /// Sample box edge in (rotated) source pixels.
    pub sample: u32,
    /// Destination pixels per source pixel.
    pub scale: u32,
    /// Screen angle in degrees, counter-clockwise.
    pub angle: i32,
    pub rotation: RotationFilter,
}

impl Screen {
    /// Edge of the destination cell one sample box is drawn into, or `None`
    /// if it does not fit in a `u32`.
    pub fn cell_size(&self) -> Option<u32> {
        self.sample.checked_mul(self.scale)
    }

    /// `extent` magnified by the dot scale.
    fn magnify(&self, extent: Extent) -> Result<Extent> {
        extent.scaled(self.scale).ok_or(HalftoneError::CanvasOverflow {
            width: extent.width,
            height: extent.height,
            scale: self.scale,
        })
    }
}

/// Render `plane` as a dot screen.
///
/// `footprint` is the size of the original image; the result is exactly
/// `footprint * screen.scale`.
pub fn render_screen(plane: &RasterPlane, footprint: Extent, screen: &Screen) -> Result<RasterPlane> {
    debug!(
        width = plane.width(),
        height = plane.height(),
        angle = screen.angle,
        sample = screen.sample,
        scale = screen.scale,
        "Rendering dot screen"
    );

    let rotated = rotate_expand(plane, screen.angle, screen.rotation);
    let dots = draw_dots(&rotated, screen)?;
    let derotated = rotate_expand(&dots, -screen.angle, screen.rotation);

    let target = screen.magnify(footprint)?;
    let window = geometry::centered_crop(Extent::of(&derotated), target)?;
    debug!(
        canvas_w = derotated.width(),
        canvas_h = derotated.height(),
        x = window.x,
        y = window.y,
        "Cropping de-rotated screen"
    );

    Ok(imageops::crop_imm(&derotated, window.x, window.y, window.width, window.height).to_image())
}

/// Rotate `img` counter-clockwise by `angle` degrees about its centre,
/// growing the canvas so nothing is clipped. Uncovered pixels are 0.
pub fn rotate_expand(img: &GrayImage, angle: i32, filter: RotationFilter) -> GrayImage {
    match geometry::normalize_angle(angle) {
        0 => img.clone(),
        90 => imageops::rotate270(img),
        180 => imageops::rotate180(img),
        270 => imageops::rotate90(img),
        a => warp_expand(img, a, filter),
    }
}

fn warp_expand(img: &GrayImage, angle: i32, filter: RotationFilter) -> GrayImage {
    let source = Extent::of(img);
    let target = geometry::rotated_extent(source, angle);

    // Pixel-index coordinates: the centre of an n-pixel axis is (n - 1) / 2.
    let centre = |n: u32| (n as f32 - 1.0) / 2.0;
    // `Projection::rotate` turns clockwise on screen.
    let projection = Projection::translate(centre(target.width), centre(target.height))
        * Projection::rotate(-(angle as f32).to_radians())
        * Projection::translate(-centre(source.width), -centre(source.height));

    let interpolation = match filter {
        RotationFilter::Nearest => Interpolation::Nearest,
        RotationFilter::Bilinear => Interpolation::Bilinear,
    };

    let mut out = GrayImage::new(target.width, target.height);
    warp_into(img, &projection, interpolation, Luma([0]), &mut out);
    out
}

/// Draw one dot per sample box of `rotated` onto a canvas `screen.scale`
/// times larger.
///
/// Rows of cells are drawn in parallel; each owns a disjoint band of the
/// canvas since a dot never leaves its cell.
pub fn draw_dots(rotated: &GrayImage, screen: &Screen) -> Result<GrayImage> {
    let source = Extent::of(rotated);
    let grid = SampleGrid::new(source, screen.sample);
    let size = screen.magnify(source)?;
    let cell = screen.cell_size().ok_or(HalftoneError::CanvasOverflow {
        width: screen.sample,
        height: screen.sample,
        scale: screen.scale,
    })?;
    let mut canvas = GrayImage::new(size.width, size.height);

    let stride = canvas.width() as usize;
    let band_len = stride * cell as usize;
    if band_len == 0 || canvas.is_empty() {
        return Ok(canvas);
    }

    let buffer: &mut [u8] = &mut canvas;
    buffer
        .par_chunks_mut(band_len)
        .enumerate()
        .for_each(|(row, band)| {
            let band_height = (band.len() / stride) as u32;
            for sample_box in grid.row(row as u32) {
                let diameter = geometry::dot_diameter(box_mean(rotated, &sample_box), cell);
                let dot = Dot::in_cell(sample_box.x * screen.scale, 0, cell, diameter);
                fill_dot(band, stride as u32, band_height, &dot);
            }
        });

    Ok(canvas)
}

/// Mean intensity of the pixels inside `sample_box`.
pub fn box_mean(img: &GrayImage, sample_box: &SampleBox) -> f64 {
    let count = u64::from(sample_box.width) * u64::from(sample_box.height);
    if count == 0 {
        return 0.0;
    }

    let stride = img.width() as usize;
    let raw = img.as_raw();
    let sum: u64 = (sample_box.y..sample_box.y + sample_box.height)
        .map(|y| {
            let start = y as usize * stride + sample_box.x as usize;
            raw[start..start + sample_box.width as usize]
                .iter()
                .map(|&v| u64::from(v))
                .sum::<u64>()
        })
        .sum();

    sum as f64 / count as f64
}

/// Ink every pixel of `band` covered by `dot`. Band rows are `stride` wide.
fn fill_dot(band: &mut [u8], stride: u32, band_height: u32, dot: &Dot) {
    if dot.radius <= 0.0 {
        return;
    }
    let (x0, y0, x1, y1) = dot.pixel_bounds(stride, band_height);
    let width = stride as usize;
    for py in y0..y1 {
        let start = py as usize * width;
        let row = &mut band[start..start + width];
        for px in x0..x1 {
            if dot.covers(px, py) {
                row[px as usize] = INK;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_plane(width: u32, height: u32, value: u8) -> GrayImage {
        GrayImage::from_pixel(width, height, Luma([value]))
    }

    fn ink_count(img: &GrayImage) -> usize {
        img.pixels().filter(|p| p.0[0] > 0).count()
    }

    fn screen(sample: u32, scale: u32, angle: i32) -> Screen {
        Screen {
            sample,
            scale,
            angle,
            rotation: RotationFilter::Nearest,
        }
    }

    #[test]
    fn test_box_mean_full_and_partial() {
        let mut img = create_plane(4, 3, 0);
        img.put_pixel(3, 2, Luma([200]));
        img.put_pixel(2, 2, Luma([100]));

        let full = SampleBox { x: 0, y: 0, width: 4, height: 3 };
        assert_eq!(box_mean(&img, &full), 300.0 / 12.0);

        // Only the pixels present are averaged
        let partial = SampleBox { x: 2, y: 2, width: 2, height: 1 };
        assert_eq!(box_mean(&img, &partial), 150.0);
    }

    #[test]
    fn test_rotate_expand_zero_is_identity() {
        let mut img = create_plane(5, 3, 10);
        img.put_pixel(4, 0, Luma([99]));
        assert_eq!(rotate_expand(&img, 0, RotationFilter::Nearest), img);
        assert_eq!(rotate_expand(&img, 360, RotationFilter::Bilinear), img);
    }

    #[test]
    fn test_rotate_expand_quarter_turn_is_counter_clockwise() {
        let mut img = create_plane(4, 2, 0);
        img.put_pixel(3, 0, Luma([50])); // top-right
        let rotated = rotate_expand(&img, 90, RotationFilter::Nearest);
        assert_eq!(rotated.dimensions(), (2, 4));
        // Counter-clockwise: top-right moves to top-left
        assert_eq!(rotated.get_pixel(0, 0).0[0], 50);

        let back = rotate_expand(&rotated, -90, RotationFilter::Nearest);
        assert_eq!(back, img);
    }

    #[test]
    fn test_rotate_expand_grows_canvas_for_oblique_angles() {
        let img = create_plane(10, 10, 255);
        let rotated = rotate_expand(&img, 45, RotationFilter::Nearest);
        assert_eq!(rotated.dimensions(), (16, 16));
        // Centre keeps its content, corners are new blank canvas
        assert_eq!(rotated.get_pixel(8, 8).0[0], 255);
        assert_eq!(rotated.get_pixel(0, 0).0[0], 0);
    }

    #[test]
    fn test_draw_dots_canvas_size() {
        let canvas = draw_dots(&create_plane(13, 7, 128), &screen(5, 3, 0)).unwrap();
        assert_eq!(canvas.dimensions(), (39, 21));
    }

    #[test]
    fn test_draw_dots_rejects_overflowing_scale() {
        let err = draw_dots(&create_plane(4, 4, 128), &screen(10, u32::MAX / 2, 0)).unwrap_err();
        assert!(matches!(
            err,
            HalftoneError::CanvasOverflow { width: 4, height: 4, .. }
        ));

        // Canvas fits but the cell edge does not
        let err = draw_dots(&create_plane(1, 1, 128), &screen(u32::MAX, 2, 0)).unwrap_err();
        assert!(matches!(err, HalftoneError::CanvasOverflow { .. }));
    }

    #[test]
    fn test_cell_size_is_checked() {
        assert_eq!(screen(10, 3, 0).cell_size(), Some(30));
        assert_eq!(screen(10, u32::MAX / 2, 0).cell_size(), None);
    }

    #[test]
    fn test_render_screen_rejects_overflowing_footprint() {
        let plane = create_plane(2, 2, 0);
        let err = render_screen(&plane, Extent::new(u32::MAX, 2), &screen(1, 2, 0)).unwrap_err();
        assert!(matches!(err, HalftoneError::CanvasOverflow { .. }));
    }

    #[test]
    fn test_draw_dots_one_dot_per_box() {
        let mut img = create_plane(20, 10, 0);
        for y in 0..10 {
            for x in 10..20 {
                img.put_pixel(x, y, Luma([255]));
            }
        }
        let canvas = draw_dots(&img, &screen(10, 1, 0)).unwrap();
        // Left box is black: no ink. Right box is white: a full dot.
        assert_eq!(canvas.get_pixel(5, 5).0[0], 0);
        assert_eq!(canvas.get_pixel(15, 5).0[0], INK);
        assert_eq!(canvas.get_pixel(10, 4).0[0], INK);
        assert_eq!(canvas.get_pixel(10, 0).0[0], 0);
    }

    #[test]
    fn test_draw_dots_brighter_box_never_inks_less() {
        let mut last = 0;
        for value in (0..=255u32).step_by(15) {
            let canvas = draw_dots(&create_plane(8, 8, value as u8), &screen(8, 2, 0)).unwrap();
            let ink = ink_count(&canvas);
            assert!(ink >= last, "value {value}: {ink} < {last}");
            last = ink;
        }
    }

    #[test]
    fn test_partial_box_dot_is_clipped_to_canvas() {
        // 15 wide with sample 10: second column box is 5 pixels wide
        let canvas = draw_dots(&create_plane(15, 10, 255), &screen(10, 1, 0)).unwrap();
        assert_eq!(canvas.dimensions(), (15, 10));
        assert_eq!(canvas.get_pixel(14, 5).0[0], INK);
    }

    #[test]
    fn test_render_screen_matches_footprint() {
        let plane = create_plane(23, 17, 90);
        for angle in [0, 15, 45, 90, 200] {
            let out = render_screen(&plane, Extent::new(23, 17), &screen(4, 2, angle)).unwrap();
            assert_eq!(out.dimensions(), (46, 34), "angle {angle}");
        }
    }

    #[test]
    fn test_render_screen_black_has_no_ink() {
        let plane = create_plane(10, 10, 0);
        let out = render_screen(&plane, Extent::new(10, 10), &screen(3, 2, 30)).unwrap();
        assert_eq!(ink_count(&out), 0);
    }
}
