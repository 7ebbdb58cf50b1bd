//! Raster types shared by every stage of the halftone pipeline.

use std::fmt;

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};

/// A single-channel intensity plane, samples in 0..=255.
pub type RasterPlane = GrayImage;

/// Ink channel a plane belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Gray,
    Cyan,
    Magenta,
    Yellow,
    Key,
}

impl Channel {
    /// CMYK channels in plane order.
    pub const CMYK: [Channel; 4] = [Channel::Cyan, Channel::Magenta, Channel::Yellow, Channel::Key];

    /// Channels rendered for the given mode, in plane order.
    pub fn for_mode(greyscale: bool) -> &'static [Channel] {
        if greyscale {
            &[Channel::Gray]
        } else {
            &Self::CMYK
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Channel::Gray => "gray",
            Channel::Cyan => "cyan",
            Channel::Magenta => "magenta",
            Channel::Yellow => "yellow",
            Channel::Key => "key",
        };
        f.write_str(name)
    }
}

/// A rendered (or separated) image: one gray plane or four CMYK planes.
///
/// All planes of one image share the same dimensions.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorImage {
    Grayscale(RasterPlane),
    Cmyk([RasterPlane; 4]),
}

impl ColorImage {
    /// Planes in channel order.
    pub fn planes(&self) -> &[RasterPlane] {
        match self {
            ColorImage::Grayscale(plane) => std::slice::from_ref(plane),
            ColorImage::Cmyk(planes) => planes,
        }
    }

    /// Consume the image, returning its planes in channel order.
    pub fn into_planes(self) -> Vec<RasterPlane> {
        match self {
            ColorImage::Grayscale(plane) => vec![plane],
            ColorImage::Cmyk(planes) => planes.into(),
        }
    }

    /// Plane for `channel`, if this image carries it.
    pub fn plane(&self, channel: Channel) -> Option<&RasterPlane> {
        match (self, channel) {
            (ColorImage::Grayscale(plane), Channel::Gray) => Some(plane),
            (ColorImage::Cmyk(planes), Channel::Cyan) => Some(&planes[0]),
            (ColorImage::Cmyk(planes), Channel::Magenta) => Some(&planes[1]),
            (ColorImage::Cmyk(planes), Channel::Yellow) => Some(&planes[2]),
            (ColorImage::Cmyk(planes), Channel::Key) => Some(&planes[3]),
            _ => None,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.planes().len()
    }

    pub fn is_grayscale(&self) -> bool {
        matches!(self, ColorImage::Grayscale(_))
    }

    /// Width and height shared by all planes.
    pub fn dimensions(&self) -> (u32, u32) {
        self.planes()[0].dimensions()
    }

    /// Convert to RGB for display or encoding.
    ///
    /// CMYK uses `R = (255 - C) * (255 - K) / 255` (likewise G, B); a gray
    /// plane is replicated into all three channels.
    pub fn to_rgb(&self) -> RgbImage {
        let (width, height) = self.dimensions();
        match self {
            ColorImage::Grayscale(plane) => RgbImage::from_fn(width, height, |x, y| {
                let v = plane.get_pixel(x, y).0[0];
                Rgb([v, v, v])
            }),
            ColorImage::Cmyk([c, m, y, k]) => RgbImage::from_fn(width, height, |px, py| {
                let nk = 255 - u32::from(k.get_pixel(px, py).0[0]);
                let ink = |plane: &RasterPlane| {
                    let v = u32::from(plane.get_pixel(px, py).0[0]);
                    ((255 - v) * nk / 255) as u8
                };
                Rgb([ink(c), ink(m), ink(y)])
            }),
        }
    }

    /// Convert into a `DynamicImage` ready for encoding.
    ///
    /// Grayscale stays single channel; CMYK is converted with [`ColorImage::to_rgb`].
    pub fn into_dynamic(self) -> DynamicImage {
        match self {
            ColorImage::Grayscale(plane) => DynamicImage::ImageLuma8(plane),
            cmyk @ ColorImage::Cmyk(_) => DynamicImage::ImageRgb8(cmyk.to_rgb()),
        }
    }
}

/// Luminance plane of an RGB raster, using ITU-R 601 weights
/// (0.299, 0.587, 0.114) in 16-bit fixed point, rounded.
pub fn luminance(img: &RgbImage) -> RasterPlane {
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        let [r, g, b] = img.get_pixel(x, y).0;
        let weighted = u32::from(r) * 19595 + u32::from(g) * 38470 + u32::from(b) * 7471;
        Luma([((weighted + 0x8000) >> 16) as u8])
    })
}
