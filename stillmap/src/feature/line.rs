//! Line and polygon features.
//!
//! Both shapes share one representation: a coordinate list whose first and
//! last points coincide is a polygon, anything else is a line. Open lines
//! are expanded so that every leg between consecutive waypoints follows the
//! great-circle arc rather than a straight Mercator segment.

use super::{width_or_default, Coordinate, Extent, FeatureError};
use crate::geometry::{geodesic_points, DEFAULT_GEODESIC_SEGMENTS};

/// Default stroke color for lines.
pub const DEFAULT_LINE_COLOR: &str = "#000000BB";

/// Default stroke width for lines, in pixels.
pub const DEFAULT_LINE_WIDTH: f64 = 3.0;

/// A polyline or polygon feature.
#[derive(Debug, Clone)]
pub struct Line {
    coords: Vec<Coordinate>,
    is_polygon: bool,
    smooth: bool,
    /// Stroke color, any SVG color string.
    pub color: String,
    /// Stroke width in pixels.
    pub width: f64,
    /// Fill color; `None` renders no fill.
    pub fill: Option<String>,
    /// Dash pattern as alternating on/off pixel lengths.
    pub stroke_dasharray: Option<Vec<u32>>,
}

impl Line {
    /// Creates a line or polygon from a coordinate list.
    ///
    /// Equal first/last coordinates classify the shape as a polygon and the
    /// coordinates are kept verbatim. Otherwise each consecutive pair is
    /// expanded into a geodesic sub-line; segments are stitched without
    /// duplicating their shared endpoints, so multi-waypoint routes still
    /// follow great-circle arcs between waypoints.
    ///
    /// Fails with [`FeatureError::InvalidFeature`] for fewer than 2 points
    /// or non-finite coordinates.
    pub fn new(coords: Vec<Coordinate>) -> Result<Self, FeatureError> {
        if coords.len() < 2 {
            return Err(FeatureError::InvalidFeature(format!(
                "line needs at least 2 coordinates, got {}",
                coords.len()
            )));
        }
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(FeatureError::InvalidFeature(
                "line coordinate is not finite".to_string(),
            ));
        }

        let is_polygon = coords.first() == coords.last();
        let smooth = !is_polygon && coords.len() == 2;
        let coords = if is_polygon {
            coords
        } else {
            Self::expand_geodesic(&coords)
        };

        Ok(Self {
            coords,
            is_polygon,
            smooth,
            color: DEFAULT_LINE_COLOR.to_string(),
            width: DEFAULT_LINE_WIDTH,
            fill: None,
            stroke_dasharray: None,
        })
    }

    /// Expands every waypoint pair into a geodesic sub-line.
    fn expand_geodesic(coords: &[Coordinate]) -> Vec<Coordinate> {
        let mut expanded: Vec<Coordinate> = Vec::new();
        for pair in coords.windows(2) {
            let segment = geodesic_points(
                [pair[0].lat, pair[0].lon],
                [pair[1].lat, pair[1].lon],
                DEFAULT_GEODESIC_SEGMENTS,
            );
            // Skip the shared endpoint on all but the first segment.
            let skip = usize::from(!expanded.is_empty());
            expanded.extend(
                segment
                    .into_iter()
                    .skip(skip)
                    .map(|p| Coordinate::new(p[0], p[1])),
            );
        }
        expanded
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

    /// Sets the dash pattern.
    pub fn with_dasharray(mut self, dasharray: Vec<u32>) -> Self {
        self.stroke_dasharray = Some(dasharray);
        self
    }

    /// The (possibly geodesic-expanded) coordinate list.
    pub fn coords(&self) -> &[Coordinate] {
        &self.coords
    }

    /// True when first and last coordinates coincide.
    pub fn is_polygon(&self) -> bool {
        self.is_polygon
    }

    /// True when the line was built from exactly two waypoints and should
    /// receive the cosmetic pixel-space smoothing pass at render time.
    pub fn smooth(&self) -> bool {
        self.smooth
    }

    /// Coordinate-wise min/max bounding box.
    pub fn extent(&self) -> Extent {
        Extent::from_coords(&self.coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lon: f64, lat: f64) -> Coordinate {
        Coordinate::new(lon, lat)
    }

    #[test]
    fn test_polygon_classification_keeps_coords_verbatim() {
        let ring = vec![
            coord(0.0, 0.0),
            coord(1.0, 0.0),
            coord(1.0, 1.0),
            coord(0.0, 0.0),
        ];
        let polygon = Line::new(ring.clone()).unwrap();
        assert!(polygon.is_polygon());
        assert_eq!(polygon.coords(), ring.as_slice());
    }

    #[test]
    fn test_open_line_expands_geodesically() {
        let line = Line::new(vec![coord(2.3522, 48.8566), coord(-74.0060, 40.7128)]).unwrap();
        assert!(!line.is_polygon());
        assert_eq!(line.coords().len(), DEFAULT_GEODESIC_SEGMENTS + 1);
        assert!(line.smooth());
    }

    #[test]
    fn test_multi_waypoint_route_stitches_without_duplicates() {
        let line = Line::new(vec![
            coord(0.0, 0.0),
            coord(10.0, 10.0),
            coord(20.0, 0.0),
        ])
        .unwrap();
        // Two legs of 71 points sharing one endpoint.
        assert_eq!(line.coords().len(), 2 * (DEFAULT_GEODESIC_SEGMENTS + 1) - 1);
        assert!(!line.smooth());

        let coords = line.coords();
        for pair in coords.windows(2) {
            assert_ne!(pair[0], pair[1], "adjacent duplicate after stitching");
        }
    }

    #[test]
    fn test_expanded_line_preserves_waypoints() {
        let start = coord(2.3522, 48.8566);
        let end = coord(13.4050, 52.5200);
        let line = Line::new(vec![start, end]).unwrap();
        let coords = line.coords();

        let first = coords[0];
        let last = coords[coords.len() - 1];
        assert!((first.lon - start.lon).abs() < 1e-9);
        assert!((first.lat - start.lat).abs() < 1e-9);
        assert!((last.lon - end.lon).abs() < 1e-9);
        assert!((last.lat - end.lat).abs() < 1e-9);
    }

    #[test]
    fn test_too_few_points_rejected() {
        let result = Line::new(vec![coord(0.0, 0.0)]);
        assert!(matches!(result, Err(FeatureError::InvalidFeature(_))));
    }

    #[test]
    fn test_non_finite_coordinate_rejected() {
        let result = Line::new(vec![coord(f64::NAN, 0.0), coord(1.0, 1.0)]);
        assert!(matches!(result, Err(FeatureError::InvalidFeature(_))));
    }

    #[test]
    fn test_non_finite_width_falls_back_to_default() {
        let line = Line::new(vec![coord(0.0, 0.0), coord(1.0, 1.0)])
            .unwrap()
            .with_width(f64::NAN);
        assert_eq!(line.width, DEFAULT_LINE_WIDTH);
    }

    #[test]
    fn test_extent_covers_all_points() {
        let line = Line::new(vec![
            coord(0.0, 0.0),
            coord(4.0, 2.0),
            coord(2.0, -3.0),
        ])
        .unwrap();
        let extent = line.extent();
        assert!(extent.min_lon <= 0.0 && extent.max_lon >= 4.0);
        assert!(extent.min_lat <= -3.0 && extent.max_lat >= 2.0);
    }
}
