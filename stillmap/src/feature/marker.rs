//! Marker features: icon images anchored at a coordinate.

use std::path::PathBuf;

use bytes::Bytes;

use super::{Coordinate, Extent};
use crate::imaging::FitMode;

/// Where a marker's icon pixels come from.
#[derive(Debug, Clone)]
pub enum IconSource {
    /// Read from the filesystem at render time.
    Path(PathBuf),
    /// Supplied in memory.
    Bytes(Bytes),
}

/// An icon image anchored at a geographic coordinate.
///
/// The anchor defaults to the bottom center of the drawn icon, the usual
/// pin convention. When neither an explicit nor an intrinsic size is known,
/// the intrinsic size is auto-detected from the icon bytes at render time;
/// a marker whose size cannot be determined at all is a render error.
#[derive(Debug, Clone)]
pub struct Marker {
    coord: Option<Coordinate>,
    icon: IconSource,
    width: Option<u32>,
    height: Option<u32>,
    draw_width: Option<u32>,
    draw_height: Option<u32>,
    offset_x: Option<f64>,
    offset_y: Option<f64>,
    resize_mode: FitMode,
}

impl Marker {
    /// Creates a marker whose icon is read from a file at render time.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(IconSource::Path(path.into()))
    }

    /// Creates a marker from in-memory icon bytes.
    pub fn from_bytes(bytes: Bytes) -> Self {
        Self::new(IconSource::Bytes(bytes))
    }

    fn new(icon: IconSource) -> Self {
        Self {
            coord: None,
            icon,
            width: None,
            height: None,
            draw_width: None,
            draw_height: None,
            offset_x: None,
            offset_y: None,
            resize_mode: FitMode::Cover,
        }
    }

    /// Sets the anchor coordinate.
    pub fn with_coordinate(mut self, coord: Coordinate) -> Self {
        self.coord = Some(coord);
        self
    }

    /// Declares the intrinsic pixel size of the icon, skipping
    /// auto-detection at render time.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Sets the size the icon is drawn at; the icon is resized to fit.
    pub fn with_drawn_size(mut self, width: u32, height: u32) -> Self {
        self.draw_width = Some(width);
        self.draw_height = Some(height);
        self
    }

    /// Overrides the anchor offset in pixels from the icon's top-left.
    pub fn with_offset(mut self, x: f64, y: f64) -> Self {
        self.offset_x = Some(x);
        self.offset_y = Some(y);
        self
    }

    /// Sets how the icon is fit into its drawn size.
    pub fn with_resize_mode(mut self, mode: FitMode) -> Self {
        self.resize_mode = mode;
        self
    }

    /// The anchor coordinate, if one was set.
    pub fn coordinate(&self) -> Option<Coordinate> {
        self.coord
    }

    /// The icon source.
    pub fn icon(&self) -> &IconSource {
        &self.icon
    }

    /// The declared intrinsic size, if any.
    pub fn declared_size(&self) -> Option<(u32, u32)> {
        Some((self.width?, self.height?))
    }

    /// The explicitly requested drawn size, if any.
    pub fn requested_drawn_size(&self) -> Option<(u32, u32)> {
        Some((self.draw_width?, self.draw_height?))
    }

    /// The size the icon will be drawn at, from the explicit drawn size or
    /// the declared intrinsic size. `None` when auto-detection is needed.
    pub fn drawn_size(&self) -> Option<(u32, u32)> {
        self.requested_drawn_size().or_else(|| self.declared_size())
    }

    /// The fit mode used when resizing the icon.
    pub fn resize_mode(&self) -> FitMode {
        self.resize_mode
    }

    /// The anchor offset in pixels from the icon's top-left, given the size
    /// the icon is drawn at. Defaults to bottom center.
    pub fn offset(&self, drawn_width: u32, drawn_height: u32) -> (f64, f64) {
        (
            self.offset_x.unwrap_or(drawn_width as f64 / 2.0),
            self.offset_y.unwrap_or(drawn_height as f64),
        )
    }

    /// Pixel padding around the anchor as `[left, down, right, up]`.
    ///
    /// Consumed by the extent resolver to keep the whole icon inside the
    /// padded canvas when fitting a zoom. Markers without a known size
    /// contribute no padding.
    pub fn extent_px(&self) -> [f64; 4] {
        let Some((width, height)) = self.drawn_size() else {
            return [0.0; 4];
        };
        let (offset_x, offset_y) = self.offset(width, height);
        [
            offset_x,
            height as f64 - offset_y,
            width as f64 - offset_x,
            offset_y,
        ]
    }

    /// Point extent at the anchor coordinate, when one is set.
    pub fn extent(&self) -> Option<Extent> {
        self.coord.map(Extent::from_point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn icon() -> Bytes {
        Bytes::from_static(b"\x89PNG\r\n")
    }

    #[test]
    fn test_default_anchor_is_bottom_center() {
        let marker = Marker::from_bytes(icon()).with_size(24, 32);
        assert_eq!(marker.offset(24, 32), (12.0, 32.0));
    }

    #[test]
    fn test_extent_px_default_anchor() {
        let marker = Marker::from_bytes(icon()).with_size(24, 32);
        // left, down, right, up
        assert_eq!(marker.extent_px(), [12.0, 0.0, 12.0, 32.0]);
    }

    #[test]
    fn test_extent_px_custom_offset() {
        let marker = Marker::from_bytes(icon())
            .with_size(24, 32)
            .with_offset(0.0, 16.0);
        assert_eq!(marker.extent_px(), [0.0, 16.0, 24.0, 16.0]);
    }

    #[test]
    fn test_extent_px_without_size_is_zero() {
        let marker = Marker::from_bytes(icon());
        assert_eq!(marker.extent_px(), [0.0; 4]);
    }

    #[test]
    fn test_drawn_size_prefers_explicit() {
        let marker = Marker::from_bytes(icon())
            .with_size(64, 64)
            .with_drawn_size(24, 24);
        assert_eq!(marker.drawn_size(), Some((24, 24)));
    }

    #[test]
    fn test_no_coordinate_means_no_extent() {
        assert!(Marker::from_bytes(icon()).extent().is_none());
    }
}
