//! Screen geometry: canvas extents through rotation, the centred crop, the
//! sample box grid and dot placement.
//!
//! Nothing here touches pixels, so the alignment arithmetic of the screen
//! renderer can be checked on its own.

use crate::{HalftoneError, Result};

/// Values this close to an integer are treated as that integer when sizing
/// rotated canvases, so `cos(90°)`-style rounding noise does not add a pixel.
const SNAP_EPSILON: f64 = 1e-9;

/// Width and height of a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Extent of an existing image.
    pub fn of<I: image::GenericImageView>(img: &I) -> Self {
        let (width, height) = img.dimensions();
        Self { width, height }
    }

    pub fn pixels(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Extent multiplied by `factor`, or `None` on overflow.
    pub fn scaled(&self, factor: u32) -> Option<Self> {
        Some(Self {
            width: self.width.checked_mul(factor)?,
            height: self.height.checked_mul(factor)?,
        })
    }

    pub fn as_tuple(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Angle in degrees reduced to `0..360`.
pub fn normalize_angle(angle: i32) -> i32 {
    angle.rem_euclid(360)
}

/// Extent of a canvas rotated by `angle` degrees about its centre, expanded
/// so that no content is clipped.
///
/// Quarter turns are exact. Other angles use the bounding box of the rotated
/// corners, `ceil(max) - floor(min)` on each axis. Saturates at `u32::MAX`.
pub fn rotated_extent(extent: Extent, angle: i32) -> Extent {
    checked_rotated_extent(extent, angle).unwrap_or(Extent::new(u32::MAX, u32::MAX))
}

/// Like [`rotated_extent`], but `None` when the rotated canvas does not fit
/// in `u32` dimensions.
pub fn checked_rotated_extent(extent: Extent, angle: i32) -> Option<Extent> {
    match normalize_angle(angle) {
        0 | 180 => Some(extent),
        90 | 270 => Some(Extent::new(extent.height, extent.width)),
        a => {
            let theta = f64::from(a).to_radians();
            let (sin, cos) = (theta.sin().abs(), theta.cos().abs());
            let (w, h) = (f64::from(extent.width), f64::from(extent.height));

            let half_w = (w * cos + h * sin) / 2.0;
            let half_h = (w * sin + h * cos) / 2.0;
            let (cx, cy) = (w / 2.0, h / 2.0);

            let span = |centre: f64, half: f64| {
                let hi = snap(centre + half).ceil();
                let lo = snap(centre - half).floor();
                let len = hi - lo;
                (len <= f64::from(u32::MAX)).then_some(len as u32)
            };
            Some(Extent::new(span(cx, half_w)?, span(cy, half_h)?))
        }
    }
}

fn snap(v: f64) -> f64 {
    let r = v.round();
    if (v - r).abs() < SNAP_EPSILON { r } else { v }
}

/// A rectangle to cut out of a larger canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropWindow {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// The window of size `inner` centred in `outer`.
///
/// Odd leftovers go to the right and bottom edges.
pub fn centered_crop(outer: Extent, inner: Extent) -> Result<CropWindow> {
    if inner.width > outer.width || inner.height > outer.height {
        return Err(HalftoneError::CropOutOfBounds {
            canvas: outer.as_tuple(),
            crop: inner.as_tuple(),
        });
    }
    Ok(CropWindow {
        x: (outer.width - inner.width) / 2,
        y: (outer.height - inner.height) / 2,
        width: inner.width,
        height: inner.height,
    })
}

/// Largest canvas (in pixels) one channel allocates while being screened:
/// the dot canvas drawn at `scale`, or the de-rotated canvas it is turned
/// back into, whichever is bigger.
///
/// `None` when any size the screen computes (cell edge, dot canvas,
/// de-rotated canvas or final footprint) overflows `u32`.
pub fn working_canvas_pixels(footprint: Extent, angle: i32, sample: u32, scale: u32) -> Option<u64> {
    sample.checked_mul(scale)?;
    footprint.scaled(scale)?;
    let dots = checked_rotated_extent(footprint, angle)?.scaled(scale)?;
    let derotated = checked_rotated_extent(dots, -angle)?;
    Some(dots.pixels().max(derotated.pixels()))
}

/// One sample box, clipped to the plane it was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Grid of `sample x sample` boxes over a plane, anchored at (0, 0).
///
/// The last column and row hold partial boxes when the plane is not a
/// multiple of `sample`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleGrid {
    pub extent: Extent,
    pub sample: u32,
}

impl SampleGrid {
    pub fn new(extent: Extent, sample: u32) -> Self {
        Self {
            extent,
            sample: sample.max(1),
        }
    }

    pub fn columns(&self) -> u32 {
        self.extent.width.div_ceil(self.sample)
    }

    pub fn rows(&self) -> u32 {
        self.extent.height.div_ceil(self.sample)
    }

    /// Boxes of grid row `row`, left to right.
    pub fn row(&self, row: u32) -> impl Iterator<Item = SampleBox> + '_ {
        let y = row * self.sample;
        let height = self.sample.min(self.extent.height.saturating_sub(y));
        (0..self.columns()).map(move |col| {
            let x = col * self.sample;
            SampleBox {
                x,
                y,
                width: self.sample.min(self.extent.width - x),
                height,
            }
        })
    }

    /// All boxes, left to right then top to bottom.
    pub fn boxes(&self) -> impl Iterator<Item = SampleBox> + '_ {
        (0..self.rows()).flat_map(move |row| self.row(row))
    }
}

/// Dot diameter for a box whose mean intensity is `mean` (0..=255), drawn in
/// a cell `cell_size` pixels wide.
///
/// Uses `sqrt(mean / 255)` so the inked area, not the diameter, follows the
/// intensity.
pub fn dot_diameter(mean: f64, cell_size: u32) -> f64 {
    let fraction = (mean.clamp(0.0, 255.0) / 255.0).sqrt();
    fraction * f64::from(cell_size)
}

/// A filled circle centred in its destination cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dot {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
}

impl Dot {
    /// Dot of `diameter` centred in the square cell with top-left
    /// (`cell_x`, `cell_y`) and edge `cell_size`.
    pub fn in_cell(cell_x: u32, cell_y: u32, cell_size: u32, diameter: f64) -> Self {
        let half = f64::from(cell_size) / 2.0;
        Self {
            cx: f64::from(cell_x) + half,
            cy: f64::from(cell_y) + half,
            radius: diameter / 2.0,
        }
    }

    /// Whether pixel (`px`, `py`) is inked, judged at the pixel centre.
    pub fn covers(&self, px: u32, py: u32) -> bool {
        let dx = f64::from(px) + 0.5 - self.cx;
        let dy = f64::from(py) + 0.5 - self.cy;
        dx * dx + dy * dy < self.radius * self.radius
    }

    /// Half-open pixel range `(x0, y0, x1, y1)` that may be inked, clipped to
    /// `width x height`.
    pub fn pixel_bounds(&self, width: u32, height: u32) -> (u32, u32, u32, u32) {
        let clip = |v: f64, max: u32| v.clamp(0.0, f64::from(max)) as u32;
        (
            clip((self.cx - self.radius).floor(), width),
            clip((self.cy - self.radius).floor(), height),
            clip((self.cx + self.radius).ceil(), width),
            clip((self.cy + self.radius).ceil(), height),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rotated_extent_identity_and_quarter_turns() {
        let e = Extent::new(30, 20);
        assert_eq!(rotated_extent(e, 0), e);
        assert_eq!(rotated_extent(e, 360), e);
        assert_eq!(rotated_extent(e, 180), e);
        assert_eq!(rotated_extent(e, 90), Extent::new(20, 30));
        assert_eq!(rotated_extent(e, -90), Extent::new(20, 30));
    }

    #[test]
    fn test_rotated_extent_diagonal() {
        // 10 * sqrt(2) = 14.14 centred on 5 spans -2.07..12.07
        assert_eq!(rotated_extent(Extent::new(10, 10), 45), Extent::new(16, 16));
        assert_eq!(rotated_extent(Extent::new(10, 10), -45), Extent::new(16, 16));
    }

    #[test]
    fn test_rotated_extent_never_shrinks_area() {
        let e = Extent::new(37, 11);
        for angle in (0..360).step_by(5) {
            let r = rotated_extent(e, angle);
            assert!(r.pixels() >= e.pixels(), "angle {angle}: {r:?}");
        }
    }

    #[test]
    fn test_round_trip_always_contains_footprint() {
        let footprint = Extent::new(23, 17);
        for angle in [0, 7, 15, 30, 45, 75, 90, 133, 200, 315, -15] {
            for scale in [1, 2, 4] {
                let dots = rotated_extent(footprint, angle).scaled(scale).unwrap();
                let back = rotated_extent(dots, -angle);
                let target = footprint.scaled(scale).unwrap();
                assert!(
                    centered_crop(back, target).is_ok(),
                    "angle {angle} scale {scale}: {back:?} < {target:?}"
                );
            }
        }
    }

    #[test]
    fn test_centered_crop_is_symmetric() {
        let w = centered_crop(Extent::new(30, 21), Extent::new(20, 10)).unwrap();
        assert_eq!(
            w,
            CropWindow {
                x: 5,
                y: 5,
                width: 20,
                height: 10
            }
        );
    }

    #[test]
    fn test_centered_crop_same_size_has_no_offset() {
        let w = centered_crop(Extent::new(20, 20), Extent::new(20, 20)).unwrap();
        assert_eq!((w.x, w.y), (0, 0));
    }

    #[test]
    fn test_centered_crop_rejects_larger_window() {
        let err = centered_crop(Extent::new(10, 10), Extent::new(11, 10)).unwrap_err();
        assert!(matches!(err, HalftoneError::CropOutOfBounds { .. }));
    }

    #[test]
    fn test_working_canvas_pixels() {
        let footprint = Extent::new(20, 20);
        assert_eq!(working_canvas_pixels(footprint, 0, 10, 1), Some(400));
        assert_eq!(working_canvas_pixels(footprint, 0, 10, 4), Some(6400));
        assert!(working_canvas_pixels(footprint, 45, 10, 1).unwrap() > 400);
    }

    #[test]
    fn test_working_canvas_pixels_overflow() {
        let footprint = Extent::new(4, 4);
        assert_eq!(working_canvas_pixels(Extent::new(u32::MAX, 1), 0, 1, 2), None);
        assert_eq!(working_canvas_pixels(footprint, 0, 10, u32::MAX / 2), None);
        // Dot canvas fits, cell edge does not
        assert_eq!(working_canvas_pixels(footprint, 0, u32::MAX, 2), None);
        // At 45 degrees the 1416px rotated canvas scales to 4_248_000_000 (fits),
        // but turning it back grows it past u32::MAX
        let square = Extent::new(1000, 1000);
        assert_eq!(rotated_extent(square, 45), Extent::new(1416, 1416));
        assert!(working_canvas_pixels(square, 0, 1, 3_000_000).is_some());
        assert_eq!(working_canvas_pixels(square, 45, 1, 3_000_000), None);
    }

    #[test]
    fn test_checked_rotated_extent_overflow() {
        let huge = Extent::new(u32::MAX, u32::MAX);
        assert_eq!(checked_rotated_extent(huge, 90), Some(huge));
        assert_eq!(checked_rotated_extent(huge, 30), None);
        assert_eq!(rotated_extent(huge, 30), huge);
    }

    #[test]
    fn test_sample_grid_exact_multiple() {
        let grid = SampleGrid::new(Extent::new(20, 20), 10);
        assert_eq!((grid.columns(), grid.rows()), (2, 2));
        let boxes: Vec<_> = grid.boxes().collect();
        assert_eq!(boxes.len(), 4);
        assert_eq!(boxes[1], SampleBox { x: 10, y: 0, width: 10, height: 10 });
        assert_eq!(boxes[2], SampleBox { x: 0, y: 10, width: 10, height: 10 });
    }

    #[test]
    fn test_sample_grid_partial_boxes_are_clipped() {
        let grid = SampleGrid::new(Extent::new(25, 12), 10);
        assert_eq!((grid.columns(), grid.rows()), (3, 2));
        let last = grid.boxes().last().unwrap();
        assert_eq!(last, SampleBox { x: 20, y: 10, width: 5, height: 2 });
        let covered: u64 = grid
            .boxes()
            .map(|b| u64::from(b.width) * u64::from(b.height))
            .sum();
        assert_eq!(covered, 25 * 12);
    }

    #[test]
    fn test_dot_diameter_transfer() {
        assert_eq!(dot_diameter(0.0, 10), 0.0);
        assert_relative_eq!(dot_diameter(255.0, 10), 10.0);
        // A quarter of the intensity gives half the diameter
        assert_relative_eq!(dot_diameter(255.0 / 4.0, 20), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_dot_diameter_is_monotonic() {
        let mut last = 0.0;
        for mean in 0..=255 {
            let d = dot_diameter(f64::from(mean), 7);
            assert!(d >= last, "mean {mean}: {d} < {last}");
            last = d;
        }
    }

    #[test]
    fn test_full_dot_touches_cell_edges() {
        let dot = Dot::in_cell(20, 0, 20, 20.0);
        assert!(dot.covers(20, 9));
        assert!(dot.covers(39, 10));
        assert!(dot.covers(29, 0));
        assert!(dot.covers(30, 19));
        assert!(!dot.covers(20, 0));
        assert!(!dot.covers(40, 10));
        assert_eq!(dot.pixel_bounds(100, 100), (20, 0, 40, 20));
    }

    #[test]
    fn test_zero_dot_covers_nothing() {
        // odd cell puts the centre on a pixel centre
        let dot = Dot::in_cell(0, 0, 5, 0.0);
        assert!(!dot.covers(2, 2));
    }
}
