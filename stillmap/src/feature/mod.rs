//! Map feature model.
//!
//! Value types for everything that can be placed on a map: markers, lines
//! and polygons, multipolygons, circles, text labels and explicit bounds.
//! Every feature is immutable after construction and exposes its geographic
//! [`Extent`] through [`Feature::extent`].

mod bound;
mod circle;
mod line;
mod marker;
mod multipolygon;
mod text;

pub use bound::Bound;
pub use circle::Circle;
pub use line::Line;
pub use marker::{IconSource, Marker};
pub use multipolygon::MultiPolygon;
pub use text::Text;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by feature construction and feature-level queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeatureError {
    /// The feature's shape data is malformed (bad radius, non-finite
    /// coordinate, too few points).
    #[error("invalid feature: {0}")]
    InvalidFeature(String),
    /// A marker has no coordinate but one is required.
    #[error("marker has no coordinate")]
    MissingCoordinate,
}

/// A geographic coordinate in degrees.
///
/// Serializes as a `[longitude, latitude]` pair. Never mutated in place;
/// transformations produce new coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    /// Longitude in degrees.
    pub lon: f64,
    /// Latitude in degrees.
    pub lat: f64,
}

impl Coordinate {
    /// Creates a coordinate from longitude and latitude in degrees.
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Returns true when both components are finite.
    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from(pair: [f64; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(coord: Coordinate) -> Self {
        [coord.lon, coord.lat]
    }
}

/// An axis-aligned geographic bounding box.
///
/// Serializes as `[min_lon, min_lat, max_lon, max_lat]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Extent {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Extent {
    /// Creates an extent from its four bounds.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// The empty extent: the identity element for [`Extent::union`].
    ///
    /// Inverted infinities, so any union with a real extent yields that
    /// extent and a never-unioned extent fails [`Extent::is_valid`].
    pub fn empty() -> Self {
        Self {
            min_lon: f64::INFINITY,
            min_lat: f64::INFINITY,
            max_lon: f64::NEG_INFINITY,
            max_lat: f64::NEG_INFINITY,
        }
    }

    /// A degenerate extent covering a single point.
    pub fn from_point(coord: Coordinate) -> Self {
        Self {
            min_lon: coord.lon,
            min_lat: coord.lat,
            max_lon: coord.lon,
            max_lat: coord.lat,
        }
    }

    /// The smallest extent covering every coordinate in `coords`.
    ///
    /// Returns the empty extent for an empty slice.
    pub fn from_coords<'a>(coords: impl IntoIterator<Item = &'a Coordinate>) -> Self {
        coords
            .into_iter()
            .fold(Self::empty(), |extent, coord| {
                extent.union(&Self::from_point(*coord))
            })
    }

    /// The smallest extent covering both `self` and `other`.
    pub fn union(&self, other: &Extent) -> Extent {
        Extent {
            min_lon: self.min_lon.min(other.min_lon),
            min_lat: self.min_lat.min(other.min_lat),
            max_lon: self.max_lon.max(other.max_lon),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }

    /// True when all bounds are finite and none are inverted.
    pub fn is_valid(&self) -> bool {
        self.min_lon.is_finite()
            && self.min_lat.is_finite()
            && self.max_lon.is_finite()
            && self.max_lat.is_finite()
            && self.min_lon <= self.max_lon
            && self.min_lat <= self.max_lat
    }

    /// The midpoint of the extent.
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }
}

impl From<[f64; 4]> for Extent {
    fn from(bounds: [f64; 4]) -> Self {
        Self::new(bounds[0], bounds[1], bounds[2], bounds[3])
    }
}

impl From<Extent> for [f64; 4] {
    fn from(extent: Extent) -> Self {
        [
            extent.min_lon,
            extent.min_lat,
            extent.max_lon,
            extent.max_lat,
        ]
    }
}

/// A map feature, tagged by kind.
#[derive(Debug, Clone)]
pub enum Feature {
    Marker(Marker),
    Line(Line),
    MultiPolygon(MultiPolygon),
    Circle(Circle),
    Text(Text),
    Bound(Bound),
}

impl Feature {
    /// The geographic bounding box of this feature.
    ///
    /// Markers contribute their point extent here; the zoom-aware pixel
    /// padding lives in the extent resolver. Fails with
    /// [`FeatureError::MissingCoordinate`] for a marker without a coordinate.
    pub fn extent(&self) -> Result<Extent, FeatureError> {
        match self {
            Feature::Marker(marker) => {
                let coord = marker
                    .coordinate()
                    .ok_or(FeatureError::MissingCoordinate)?;
                Ok(Extent::from_point(coord))
            }
            Feature::Line(line) => Ok(line.extent()),
            Feature::MultiPolygon(multipolygon) => Ok(multipolygon.extent()),
            Feature::Circle(circle) => Ok(circle.extent()),
            Feature::Text(text) => Ok(text.extent()),
            Feature::Bound(bound) => Ok(bound.extent()),
        }
    }
}

/// Resolves an optional stroke/outline width against a per-kind default.
///
/// Non-finite and missing widths both fall back to the default.
pub(crate) fn width_or_default(width: Option<f64>, default: f64) -> f64 {
    match width {
        Some(w) if w.is_finite() => w,
        _ => default,
    }
}
