//! Text label features.

use super::{width_or_default, Coordinate, Extent, FeatureError};

/// Default outline (stroke) color for text.
pub const DEFAULT_TEXT_COLOR: &str = "#000000BB";

/// Default fill color for text.
pub const DEFAULT_TEXT_FILL: &str = "#000000";

/// Default stroke width for text, in pixels.
pub const DEFAULT_TEXT_WIDTH: f64 = 1.0;

/// Default font size, in pixels.
pub const DEFAULT_TEXT_SIZE: f64 = 12.0;

/// Default font family.
pub const DEFAULT_TEXT_FONT: &str = "Arial";

/// Default SVG text anchor.
pub const DEFAULT_TEXT_ANCHOR: &str = "start";

/// A text label anchored at a geographic coordinate.
#[derive(Debug, Clone)]
pub struct Text {
    coord: Coordinate,
    content: String,
    /// Outline color.
    pub color: String,
    /// Fill color.
    pub fill: String,
    /// Outline stroke width in pixels.
    pub width: f64,
    /// Font size in pixels.
    pub font_size: f64,
    /// Font family name.
    pub font_family: String,
    /// SVG `text-anchor` value (`start`, `middle` or `end`).
    pub anchor: String,
    /// Pixel offset applied to the anchor position.
    pub offset_x: f64,
    /// Pixel offset applied to the anchor position.
    pub offset_y: f64,
}

impl Text {
    /// Creates a text label at `coord`.
    ///
    /// Fails with [`FeatureError::InvalidFeature`] on a non-finite
    /// coordinate.
    pub fn new(coord: Coordinate, content: impl Into<String>) -> Result<Self, FeatureError> {
        if !coord.is_finite() {
            return Err(FeatureError::InvalidFeature(
                "text coordinate is not finite".to_string(),
            ));
        }
        Ok(Self {
            coord,
            content: content.into(),
            color: DEFAULT_TEXT_COLOR.to_string(),
            fill: DEFAULT_TEXT_FILL.to_string(),
            width: DEFAULT_TEXT_WIDTH,
            font_size: DEFAULT_TEXT_SIZE,
            font_family: DEFAULT_TEXT_FONT.to_string(),
            anchor: DEFAULT_TEXT_ANCHOR.to_string(),
            offset_x: 0.0,
            offset_y: 0.0,
        })
    }

    /// Sets the outline color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Sets the fill color.
    pub fn with_fill(mut self, fill: impl Into<String>) -> Self {
        self.fill = fill.into();
        self
    }

    /// Sets the stroke width; non-finite values fall back to the default.
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width_or_default(Some(width), DEFAULT_TEXT_WIDTH);
        self
    }

    /// Sets the font size.
    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    /// Sets the font family.
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    /// Sets the SVG text anchor.
    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = anchor.into();
        self
    }

    /// Sets the pixel offset of the label relative to its coordinate.
    pub fn with_offset(mut self, x: f64, y: f64) -> Self {
        self.offset_x = x;
        self.offset_y = y;
        self
    }

    /// The anchor coordinate.
    pub fn coordinate(&self) -> Coordinate {
        self.coord
    }

    /// The label content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Point extent at the anchor coordinate.
    pub fn extent(&self) -> Extent {
        Extent::from_point(self.coord)
    }
}
