//! Reassembly of per-channel screens into the final image.

use crate::raster::{ColorImage, RasterPlane};
use crate::{HalftoneError, Result};

/// Assemble screened planes, given in channel order, into a [`ColorImage`].
///
/// Grayscale takes exactly one plane and passes it through; colour takes
/// exactly four (C, M, Y, K). All planes must share one size.
pub fn compose(planes: Vec<RasterPlane>, greyscale: bool) -> Result<ColorImage> {
    let expected = if greyscale { 1 } else { 4 };
    if planes.len() != expected {
        return Err(HalftoneError::ChannelMismatch {
            expected,
            actual: planes.len(),
        });
    }

    let size = planes[0].dimensions();
    if let Some(odd) = planes.iter().find(|p| p.dimensions() != size) {
        return Err(HalftoneError::DimensionMismatch {
            expected: size,
            actual: odd.dimensions(),
        });
    }

    if greyscale {
        let mut planes = planes;
        return Ok(ColorImage::Grayscale(planes.remove(0)));
    }

    let planes: [RasterPlane; 4] = planes
        .try_into()
        .map_err(|rest: Vec<RasterPlane>| HalftoneError::ChannelMismatch {
            expected,
            actual: rest.len(),
        })?;
    Ok(ColorImage::Cmyk(planes))
}
