//! SVG fragment builders for vector features.
//!
//! Pure functions turning one feature plus the current viewport into a
//! markup fragment. Lines built from two waypoints get a cosmetic
//! pixel-space smoothing pass (Douglas-Peucker then Chaikin) before path
//! generation; this is independent of the geodesic expansion already done
//! in degree space.

use crate::compose::Viewport;
use crate::feature::{Circle, Coordinate, FeatureError, Line, MultiPolygon, Text};
use crate::geometry::{chaikin_smooth, douglas_peucker};
use crate::projection::{lat_to_y, lon_to_x, meters_to_px};

/// Perpendicular tolerance for the cosmetic simplification pass, in pixels.
const SIMPLIFY_EPSILON_PX: f64 = 1.0;

/// Chaikin iterations for the cosmetic smoothing pass.
const SMOOTH_ITERATIONS: usize = 2;

/// Projects a coordinate into canvas pixels.
fn to_px(coord: &Coordinate, viewport: &Viewport) -> [f64; 2] {
    [
        viewport.x_to_px(lon_to_x(coord.lon, viewport.zoom)),
        viewport.y_to_px(lat_to_y(coord.lat, viewport.zoom)),
    ]
}

/// Builds SVG path data from pixel points, optionally closing the path.
fn path_data(points: &[[f64; 2]], close: bool) -> String {
    let mut data = String::new();
    for (i, point) in points.iter().enumerate() {
        let command = if i == 0 { 'M' } else { 'L' };
        data.push_str(&format!("{command}{:.2} {:.2} ", point[0], point[1]));
    }
    if close {
        data.push('Z');
    }
    data.trim_end().to_string()
}

/// Escapes text content for embedding in SVG.
fn escape_text(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&apos;".to_string(),
            other => other.to_string(),
        })
        .collect()
}

fn dasharray_attr(dasharray: &Option<Vec<u32>>) -> String {
    match dasharray {
        Some(lengths) if !lengths.is_empty() => {
            let joined = lengths
                .iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            format!(" stroke-dasharray=\"{joined}\"")
        }
        _ => String::new(),
    }
}

/// Renders a line or polygon to an SVG path fragment.
pub fn line_to_svg(line: &Line, viewport: &Viewport) -> String {
    let mut points: Vec<[f64; 2]> = line
        .coords()
        .iter()
        .map(|coord| to_px(coord, viewport))
        .collect();

    if line.smooth() {
        points = chaikin_smooth(
            &douglas_peucker(&points, SIMPLIFY_EPSILON_PX),
            SMOOTH_ITERATIONS,
        );
    }

    format!(
        "<path d=\"{}\" stroke=\"{}\" stroke-width=\"{}\" fill=\"{}\"{}/>",
        path_data(&points, line.is_polygon()),
        line.color,
        line.width,
        line.fill.as_deref().unwrap_or("none"),
        dasharray_attr(&line.stroke_dasharray),
    )
}

/// Renders a multipolygon to one even-odd path fragment.
///
/// All rings share a single path so inner rings punch holes.
pub fn multipolygon_to_svg(multipolygon: &MultiPolygon, viewport: &Viewport) -> String {
    let data = multipolygon
        .rings()
        .iter()
        .map(|ring| {
            let points: Vec<[f64; 2]> =
                ring.iter().map(|coord| to_px(coord, viewport)).collect();
            path_data(&points, true)
        })
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        "<path d=\"{}\" fill-rule=\"evenodd\" stroke=\"{}\" stroke-width=\"{}\" fill=\"{}\"/>",
        data,
        multipolygon.color,
        multipolygon.width,
        multipolygon.fill.as_deref().unwrap_or("none"),
    )
}

/// Renders a circle to an SVG fragment.
///
/// Fails fast with [`FeatureError::InvalidFeature`] if the projected
/// position or radius is not finite.
pub fn circle_to_svg(circle: &Circle, viewport: &Viewport) -> Result<String, FeatureError> {
    let coord = circle.coordinate();
    let [cx, cy] = to_px(&coord, viewport);
    let radius = meters_to_px(circle.radius(), viewport.zoom, coord.lat);

    if !cx.is_finite() || !cy.is_finite() || !radius.is_finite() {
        return Err(FeatureError::InvalidFeature(
            "circle projects to a non-finite position".to_string(),
        ));
    }

    Ok(format!(
        "<circle cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{radius:.2}\" stroke=\"{}\" stroke-width=\"{}\" fill=\"{}\"/>",
        circle.color,
        circle.width,
        circle.fill.as_deref().unwrap_or("none"),
    ))
}

/// Renders a text label to an SVG fragment.
///
/// Fails fast with [`FeatureError::InvalidFeature`] if the projected
/// position is not finite.
pub fn text_to_svg(text: &Text, viewport: &Viewport) -> Result<String, FeatureError> {
    let coord = text.coordinate();
    let [px, py] = to_px(&coord, viewport);
    if !px.is_finite() || !py.is_finite() {
        return Err(FeatureError::InvalidFeature(
            "text projects to a non-finite position".to_string(),
        ));
    }

    let x = px + text.offset_x;
    let y = py + text.offset_y;
    Ok(format!(
        "<text x=\"{x:.2}\" y=\"{y:.2}\" font-family=\"{}\" font-size=\"{}\" text-anchor=\"{}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\">{}</text>",
        text.font_family,
        text.font_size,
        text.anchor,
        text.fill,
        text.color,
        text.width,
        escape_text(text.content()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::{lat_to_y, lon_to_x};

    fn viewport() -> Viewport {
        Viewport {
            center_x: lon_to_x(0.0, 5),
            center_y: lat_to_y(0.0, 5),
            zoom: 5,
            width: 512,
            height: 512,
            tile_size: 256,
        }
    }

    #[test]
    fn test_line_fragment_shape() {
        let line = Line::new(vec![Coordinate::new(0.0, 0.0), Coordinate::new(5.0, 5.0)])
            .unwrap()
            .with_color("#ff0000")
            .with_width(2.0);
        let fragment = line_to_svg(&line, &viewport());
        assert!(fragment.starts_with("<path d=\"M"));
        assert!(fragment.contains("stroke=\"#ff0000\""));
        assert!(fragment.contains("stroke-width=\"2\""));
        assert!(fragment.contains("fill=\"none\""));
        assert!(!fragment.contains('Z'));
    }

    #[test]
    fn test_polygon_path_is_closed() {
        let polygon = Line::new(vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 0.0),
            Coordinate::new(1.0, 1.0),
            Coordinate::new(0.0, 0.0),
        ])
        .unwrap()
        .with_fill("#00ff00");
        let fragment = line_to_svg(&polygon, &viewport());
        assert!(fragment.contains('Z'));
        assert!(fragment.contains("fill=\"#00ff00\""));
    }

    #[test]
    fn test_dasharray_attribute() {
        let line = Line::new(vec![Coordinate::new(0.0, 0.0), Coordinate::new(2.0, 2.0)])
            .unwrap()
            .with_dasharray(vec![4, 2]);
        let fragment = line_to_svg(&line, &viewport());
        assert!(fragment.contains("stroke-dasharray=\"4 2\""));
    }

    #[test]
    fn test_two_point_line_is_smoothed() {
        // The geodesic expansion yields 71 nearly collinear pixel points;
        // smoothing simplifies then rounds them, so the path must not
        // contain one command per original point.
        let line =
            Line::new(vec![Coordinate::new(0.0, 0.0), Coordinate::new(40.0, 30.0)]).unwrap();
        assert!(line.smooth());
        let fragment = line_to_svg(&line, &viewport());
        let commands = fragment.matches('L').count();
        assert!(commands < 70, "expected simplification, got {commands} segments");
    }

    #[test]
    fn test_multipolygon_evenodd_single_path() {
        let ring = |offset: f64| {
            vec![
                Coordinate::new(offset, offset),
                Coordinate::new(offset + 1.0, offset),
                Coordinate::new(offset + 1.0, offset + 1.0),
                Coordinate::new(offset, offset),
            ]
        };
        let mp = MultiPolygon::new(vec![ring(0.0), ring(0.25)])
            .unwrap()
            .with_fill("#0000ff");
        let fragment = multipolygon_to_svg(&mp, &viewport());
        assert_eq!(fragment.matches("<path").count(), 1);
        assert!(fragment.contains("fill-rule=\"evenodd\""));
        assert_eq!(fragment.matches('Z').count(), 2);
    }

    #[test]
    fn test_circle_fragment() {
        let circle = Circle::new(Coordinate::new(0.0, 0.0), 10_000.0)
            .unwrap()
            .with_fill("#aa0000");
        let fragment = circle_to_svg(&circle, &viewport()).unwrap();
        assert!(fragment.starts_with("<circle"));
        assert!(fragment.contains("fill=\"#aa0000\""));
    }

    #[test]
    fn test_text_escapes_content() {
        let text = Text::new(Coordinate::new(0.0, 0.0), "Fish & <Chips>").unwrap();
        let fragment = text_to_svg(&text, &viewport()).unwrap();
        assert!(fragment.contains("Fish &amp; &lt;Chips&gt;"));
    }

    #[test]
    fn test_text_offset_applied() {
        let vp = viewport();
        let plain = Text::new(Coordinate::new(0.0, 0.0), "x").unwrap();
        let offset = Text::new(Coordinate::new(0.0, 0.0), "x")
            .unwrap()
            .with_offset(10.0, -5.0);
        let plain_fragment = text_to_svg(&plain, &vp).unwrap();
        let offset_fragment = text_to_svg(&offset, &vp).unwrap();
        assert!(plain_fragment.contains("x=\"256.00\""));
        assert!(offset_fragment.contains("x=\"266.00\""));
        assert!(offset_fragment.contains("y=\"251.00\""));
    }
}
