//! Circle features with a radius in meters.

use super::{width_or_default, Coordinate, Extent, FeatureError};

/// Default stroke color for circles.
pub const DEFAULT_CIRCLE_COLOR: &str = "#000000BB";

/// Default stroke width for circles, in pixels.
pub const DEFAULT_CIRCLE_WIDTH: f64 = 3.0;

/// Kilometers per degree of latitude.
const KM_PER_DEGREE_LAT: f64 = 110.574;

/// Kilometers per degree of longitude at the equator.
const KM_PER_DEGREE_LON: f64 = 111.320;

/// A circle centered on a geographic coordinate.
#[derive(Debug, Clone)]
pub struct Circle {
    coord: Coordinate,
    radius: f64,
    /// Stroke color, any SVG color string.
    pub color: String,
    /// Fill color; `None` renders no fill.
    pub fill: Option<String>,
    /// Stroke width in pixels.
    pub width: f64,
}

impl Circle {
    /// Creates a circle from a center coordinate and a radius in meters.
    ///
    /// Fails with [`FeatureError::InvalidFeature`] when the coordinate is
    /// non-finite or the radius is not a finite positive number.
    pub fn new(coord: Coordinate, radius: f64) -> Result<Self, FeatureError> {
        if !coord.is_finite() {
            return Err(FeatureError::InvalidFeature(
                "circle coordinate is not finite".to_string(),
            ));
        }
        if !radius.is_finite() || radius <= 0.0 {
            return Err(FeatureError::InvalidFeature(format!(
                "circle radius must be finite and positive, got {radius}"
            )));
        }
        Ok(Self {
            coord,
            radius,
            color: DEFAULT_CIRCLE_COLOR.to_string(),
            fill: None,
            width: DEFAULT_CIRCLE_WIDTH,
        })
    }

    /// Sets the stroke color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Sets the fill color.
    pub fn with_fill(mut self, fill: impl Into<String>) -> Self {
        self.fill = Some(fill.into());
        self
    }

    /// Sets the stroke width; non-finite values fall back to the default.
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width_or_default(Some(width), DEFAULT_CIRCLE_WIDTH);
        self
    }

    /// The center coordinate.
    pub fn coordinate(&self) -> Coordinate {
        self.coord
    }

    /// The radius in meters.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Bounding box derived from the radius: a plain degree offset in
    /// latitude and a latitude-corrected degree offset in longitude.
    pub fn extent(&self) -> Extent {
        let radius_km = self.radius / 1000.0;
        let lat_offset = radius_km / KM_PER_DEGREE_LAT;
        let lon_offset =
            radius_km / (KM_PER_DEGREE_LON * (self.coord.lat.to_radians()).cos());
        Extent::new(
            self.coord.lon - lon_offset,
            self.coord.lat - lat_offset,
            self.coord.lon + lon_offset,
            self.coord.lat + lat_offset,
        )
    }
}
