//! Halftone orchestration.
//!
//! Validates parameters, separates the source into planes, screens every
//! plane independently and assembles the result.

use std::time::Instant;

use image::RgbImage;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::antialias::{self, SUPERSAMPLE_FACTOR};
use crate::compose::compose;
use crate::geometry::{self, Extent};
use crate::params::HalftoneParams;
use crate::raster::{self, Channel, ColorImage, RasterPlane};
use crate::screen::{self, Screen};
use crate::separate::gray_component_replacement;
use crate::{HalftoneError, Result};


/// Render `source` as a halftone.
///
/// Returns one plane for grayscale or four CMYK planes for colour, each
/// `(width * scale, height * scale)`. Parameters and resource limits are
/// checked before any pixel work starts.
pub fn render(source: &RgbImage, params: &HalftoneParams) -> Result<ColorImage> {
    params.validate()?;

    let footprint = Extent::of(source);
    if footprint.is_empty() {
        return Err(HalftoneError::EmptySource {
            width: footprint.width,
            height: footprint.height,
        });
    }

    let channels = Channel::for_mode(params.greyscale);
    check_limits(footprint, channels, params)?;

    let started = Instant::now();
    let planes = separate(source, params);

    let screens = planes
        .par_iter()
        .zip(params.angles.par_iter())
        .zip(channels.par_iter())
        .map(|((plane, &angle), &channel)| render_channel(plane, footprint, channel, angle, params))
        .collect::<Result<Vec<_>>>()?;

    let image = compose(screens, params.greyscale)?;
    let (width, height) = image.dimensions();
    info!(
        width,
        height,
        channels = image.channel_count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Halftone rendered"
    );
    Ok(image)
}

/// Split the source into the planes to be screened, in channel order.
fn separate(source: &RgbImage, params: &HalftoneParams) -> Vec<RasterPlane> {
    if params.greyscale {
        vec![raster::luminance(source)]
    } else {
        gray_component_replacement(source, params.percentage).into()
    }
}

/// Screen one plane, shrinking it again when antialiasing.
fn render_channel(
    plane: &RasterPlane,
    footprint: Extent,
    channel: Channel,
    angle: i32,
    params: &HalftoneParams,
) -> Result<RasterPlane> {
    debug!(%channel, angle, "Rendering channel");

    let scale = params.working_scale().ok_or(HalftoneError::CanvasOverflow {
        width: footprint.width,
        height: footprint.height,
        scale: params.scale,
    })?;
    let screen = Screen {
        sample: params.sample,
        scale,
        angle,
        rotation: params.rotation,
    };
    let dots = screen::render_screen(plane, footprint, &screen)?;

    if params.antialias {
        Ok(antialias::downsample(&dots, SUPERSAMPLE_FACTOR, params.downsample))
    } else {
        Ok(dots)
    }
}

/// Reject renders whose working canvas would exceed the configured ceiling.
///
/// A canvas whose size does not fit the pixel arithmetic at all is rejected
/// whatever the ceiling, reported as `u64::MAX` required pixels.
fn check_limits(footprint: Extent, channels: &[Channel], params: &HalftoneParams) -> Result<()> {
    let limit = params.limits.max_canvas_pixels;
    let scale = params.working_scale();

    for (&channel, &angle) in channels.iter().zip(&params.angles) {
        let required = scale
            .and_then(|scale| geometry::working_canvas_pixels(footprint, angle, params.sample, scale));
        match required {
            Some(required) if required <= limit => {}
            _ => {
                return Err(HalftoneError::ResourceExceeded {
                    channel,
                    required: required.unwrap_or(u64::MAX),
                    limit,
                });
            }
        }
    }
    Ok(())
}
