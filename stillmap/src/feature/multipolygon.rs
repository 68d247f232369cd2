//! Multipolygon features: several rings rendered as one even-odd shape.

use super::{width_or_default, Coordinate, Extent, FeatureError};
use crate::feature::line::{DEFAULT_LINE_COLOR, DEFAULT_LINE_WIDTH};

/// A set of polygon rings sharing one style.
///
/// Rings are rendered with the even-odd fill rule, so an inner ring punches
/// a hole into an outer ring.
#[derive(Debug, Clone)]
pub struct MultiPolygon {
    rings: Vec<Vec<Coordinate>>,
    /// Stroke color, any SVG color string.
    pub color: String,
    /// Stroke width in pixels.
    pub width: f64,
    /// Fill color; `None` renders no fill.
    pub fill: Option<String>,
}

impl MultiPolygon {
    /// Creates a multipolygon from its rings.
    ///
    /// Each ring must be a closed polygon: at least 3 points with equal
    /// first/last coordinate, all finite.
    pub fn new(rings: Vec<Vec<Coordinate>>) -> Result<Self, FeatureError> {
        if rings.is_empty() {
            return Err(FeatureError::InvalidFeature(
                "multipolygon needs at least one ring".to_string(),
            ));
        }
        for ring in &rings {
            if ring.len() < 3 {
                return Err(FeatureError::InvalidFeature(format!(
                    "multipolygon ring needs at least 3 coordinates, got {}",
                    ring.len()
                )));
            }
            if ring.first() != ring.last() {
                return Err(FeatureError::InvalidFeature(
                    "multipolygon ring is not closed".to_string(),
                ));
            }
            if ring.iter().any(|c| !c.is_finite()) {
                return Err(FeatureError::InvalidFeature(
                    "multipolygon coordinate is not finite".to_string(),
                ));
            }
        }
        Ok(Self {
            rings,
            color: DEFAULT_LINE_COLOR.to_string(),
            width: DEFAULT_LINE_WIDTH,
            fill: None,
        })
    }

    /// Sets the stroke color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Sets the stroke width; non-finite values fall back to the default.
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width_or_default(Some(width), DEFAULT_LINE_WIDTH);
        self
    }

    /// Sets the fill color.
    pub fn with_fill(mut self, fill: impl Into<String>) -> Self {
        self.fill = Some(fill.into());
        self
    }

    /// The polygon rings.
    pub fn rings(&self) -> &[Vec<Coordinate>] {
        &self.rings
    }

    /// Coordinate-wise min/max over every ring.
    pub fn extent(&self) -> Extent {
        self.rings
            .iter()
            .flatten()
            .fold(Extent::empty(), |extent, coord| {
                extent.union(&Extent::from_point(*coord))
            })
    }
}
