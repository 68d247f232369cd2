//! Imaging collaborator seam.
//!
//! The rendering core manipulates an opaque [`Canvas`] and describes pixel
//! work (decode, resize, composite, encode) through the [`Imaging`] trait.
//! The core never reads pixels itself; [`RasterImaging`] is the production
//! implementation on top of `image`, `usvg`/`resvg` and `tiny-skia`.

mod raster;

pub use raster::RasterImaging;

use bytes::Bytes;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the imaging collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImagingError {
    /// The byte buffer could not be decoded as an image.
    #[error("failed to decode image: {0}")]
    Decode(String),
    /// The intrinsic size of an image could not be determined.
    #[error("could not determine image size")]
    SizeUndetectable,
    /// Encoding the canvas failed.
    #[error("failed to encode image: {0}")]
    Encode(String),
    /// An SVG overlay payload is malformed.
    #[error("invalid SVG overlay: {0}")]
    Svg(String),
}

/// How an icon is fit into its drawn size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Fill the target box preserving aspect ratio, cropping overflow.
    #[default]
    Cover,
    /// Fit inside the target box preserving aspect ratio.
    Contain,
    /// Stretch to the exact target size.
    Fill,
}

/// Output byte formats for [`Imaging::encode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    Jpeg,
    WebP,
}

/// One item to composite onto a canvas.
///
/// The payload is either a raster image or an SVG document, sniffed by its
/// leading bytes. Placement may be partially or fully off-canvas; the
/// collaborator clips.
#[derive(Debug, Clone)]
pub struct Overlay {
    pub bytes: Bytes,
    pub left: i64,
    pub top: i64,
}

/// An opaque RGBA canvas handle.
///
/// Created transparent. The pixel accessors exist for [`Imaging`]
/// implementations and external encoders; the rendering core only passes
/// the handle around.
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    /// Creates a fully transparent canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    /// Canvas width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Canvas height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Pixel access for imaging collaborators.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Mutable pixel access for imaging collaborators.
    pub fn image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }
}

/// Pixel-codec operations the rendering core delegates.
pub trait Imaging: Send + Sync {
    /// Intrinsic width/height of an encoded image.
    fn metadata(&self, bytes: &[u8]) -> Result<(u32, u32), ImagingError>;

    /// Resizes an encoded image to `width`×`height` under `fit`,
    /// returning PNG bytes.
    fn resize(
        &self,
        bytes: &[u8],
        width: u32,
        height: u32,
        fit: FitMode,
    ) -> Result<Bytes, ImagingError>;

    /// Composites overlays onto the canvas in order, clipping at the
    /// canvas edges.
    fn composite(&self, canvas: &mut Canvas, overlays: &[Overlay]) -> Result<(), ImagingError>;

    /// Encodes the canvas into the requested byte format.
    fn encode(&self, canvas: &Canvas, format: OutputFormat) -> Result<Bytes, ImagingError>;
}
