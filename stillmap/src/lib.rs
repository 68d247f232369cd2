//! Stillmap - static raster map rendering
//!
//! This library renders static map images from slippy-map tile servers:
//! it resolves a viewport from explicit parameters or from the features
//! placed on the map, fetches and stitches base tiles, composites marker
//! icons and draws vector overlays (lines, polygons, circles, text) via
//! SVG rasterization.
//!
//! The entry point is [`StaticMapRenderer`]; [`RenderOptions`] carries the
//! full option set with documented defaults.

pub mod cache;
pub mod compose;
pub mod extent;
pub mod feature;
pub mod fetch;
pub mod geometry;
pub mod imaging;
pub mod projection;
pub mod render;

pub use feature::{
    Bound, Circle, Coordinate, Extent, Feature, FeatureError, IconSource, Line, Marker,
    MultiPolygon, Text,
};
pub use imaging::{Canvas, FitMode, Imaging, ImagingError, OutputFormat, RasterImaging};
pub use render::{RenderError, RenderOptions, StaticMapRenderer, TileLayer, ZoomRange};
