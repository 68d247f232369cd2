//! Resolved viewport for one render: center, zoom and canvas geometry.

/// The pixel frame of a render.
///
/// Converts fractional tile coordinates (the projection's output space)
/// into canvas pixels relative to the resolved center.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    /// Center as a fractional tile X coordinate.
    pub center_x: f64,
    /// Center as a fractional tile Y coordinate.
    pub center_y: f64,
    /// Resolved zoom level.
    pub zoom: u8,
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Tile edge length in pixels.
    pub tile_size: u32,
}

impl Viewport {
    /// Converts a fractional tile X coordinate to a canvas pixel X.
    pub fn x_to_px(&self, x: f64) -> f64 {
        (x - self.center_x) * self.tile_size as f64 + self.width as f64 / 2.0
    }

    /// Converts a fractional tile Y coordinate to a canvas pixel Y.
    pub fn y_to_px(&self, y: f64) -> f64 {
        (y - self.center_y) * self.tile_size as f64 + self.height as f64 / 2.0
    }
}
