//! Polyline geometry operations.
//!
//! Great-circle interpolation between two points, Douglas-Peucker
//! simplification and Chaikin corner-cutting smoothing. The functions here
//! operate on plain `[f64; 2]` pairs and are unit-agnostic: simplification
//! and smoothing work the same on degree-space and pixel-space polylines.
//!
//! # Axis ordering
//!
//! **[`geodesic_points`] takes its endpoints as `[lat, lon]` but produces
//! points as `[lon, lat]`.** This asymmetry is deliberate and load-bearing:
//! callers feed `[lat, lon]` waypoint pairs in and receive render-ready
//! `[lon, lat]` coordinates out. Mixing the two orders up is the most common
//! integration mistake with this module; double-check call sites.

use std::f64::consts::PI;

/// Default number of segments used when expanding a geodesic line.
pub const DEFAULT_GEODESIC_SEGMENTS: usize = 70;

/// Interpolates a great-circle line between two points on the sphere.
///
/// # Arguments
///
/// * `start` - Start point as `[lat, lon]` in degrees
/// * `end` - End point as `[lat, lon]` in degrees
/// * `segments` - Number of segments; the result has `segments + 1` points
///
/// # Returns
///
/// `segments + 1` points as `[lon, lat]` in degrees (note the swapped axis
/// order, see the module docs), spaced evenly along the great circle.
///
/// Coincident endpoints yield `segments + 1` identical (not deduplicated)
/// copies of the start point. This case is decided on the input degrees:
/// for many coordinates the law-of-cosines dot product rounds just below
/// 1.0 and leaves a spurious ~1e-8 central angle, and slerping through it
/// would perturb the output by an ulp.
pub fn geodesic_points(start: [f64; 2], end: [f64; 2], segments: usize) -> Vec<[f64; 2]> {
    if start == end {
        return vec![[start[1], start[0]]; segments + 1];
    }

    let lat1 = start[0] * PI / 180.0;
    let lon1 = start[1] * PI / 180.0;
    let lat2 = end[0] * PI / 180.0;
    let lon2 = end[1] * PI / 180.0;

    // Central angle via the spherical law of cosines.
    let central_angle = (lat1.sin() * lat2.sin()
        + lat1.cos() * lat2.cos() * (lon1 - lon2).cos())
    .clamp(-1.0, 1.0)
    .acos();

    let mut points = Vec::with_capacity(segments + 1);
    for step in 0..=segments {
        if central_angle == 0.0 {
            points.push([start[1], start[0]]);
            continue;
        }

        let fraction = step as f64 / segments as f64;
        let a = ((1.0 - fraction) * central_angle).sin() / central_angle.sin();
        let b = (fraction * central_angle).sin() / central_angle.sin();

        let x = a * lat1.cos() * lon1.cos() + b * lat2.cos() * lon2.cos();
        let y = a * lat1.cos() * lon1.sin() + b * lat2.cos() * lon2.sin();
        let z = a * lat1.sin() + b * lat2.sin();

        let lat = z.atan2((x * x + y * y).sqrt());
        let lon = y.atan2(x);
        points.push([lon * 180.0 / PI, lat * 180.0 / PI]);
    }
    points
}

/// Perpendicular distance from `point` to the line through `a` and `b`.
///
/// Falls back to the point-to-point distance when `a` and `b` coincide.
fn perpendicular_distance(point: [f64; 2], a: [f64; 2], b: [f64; 2]) -> f64 {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    let length_sq = dx * dx + dy * dy;
    if length_sq == 0.0 {
        return ((point[0] - a[0]).powi(2) + (point[1] - a[1]).powi(2)).sqrt();
    }
    (dx * (a[1] - point[1]) - dy * (a[0] - point[0])).abs() / length_sq.sqrt()
}

/// Simplifies a polyline with the Douglas-Peucker algorithm.
///
/// Points within `epsilon` perpendicular distance of the simplified chord
/// are dropped. The first and last points are always retained, and inputs
/// with fewer than 3 points are returned unchanged.
///
/// Uses an explicit work stack instead of recursion so that pathological
/// inputs cannot overflow the call stack.
pub fn douglas_peucker(points: &[[f64; 2]], epsilon: f64) -> Vec<[f64; 2]> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;

    let mut stack = vec![(0usize, points.len() - 1)];
    while let Some((first, last)) = stack.pop() {
        let mut max_distance = 0.0;
        let mut index = first;
        for i in (first + 1)..last {
            let distance = perpendicular_distance(points[i], points[first], points[last]);
            if distance > max_distance {
                max_distance = distance;
                index = i;
            }
        }
        if max_distance > epsilon {
            keep[index] = true;
            stack.push((first, index));
            stack.push((index, last));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(point, kept)| kept.then_some(*point))
        .collect()
}

/// Smooths a polyline with Chaikin corner cutting.
///
/// Each iteration replaces every segment `[p0, p1]` with its 1/4 and 3/4
/// interpolants; the original first and last points are preserved across all
/// iterations. Inputs with fewer than 2 points are returned unchanged.
pub fn chaikin_smooth(points: &[[f64; 2]], iterations: usize) -> Vec<[f64; 2]> {
    if points.len() < 2 {
        return points.to_vec();
    }

    let mut current = points.to_vec();
    for _ in 0..iterations {
        let mut next = Vec::with_capacity(current.len() * 2);
        next.push(current[0]);
        for pair in current.windows(2) {
            let (p0, p1) = (pair[0], pair[1]);
            next.push([
                0.75 * p0[0] + 0.25 * p1[0],
                0.75 * p0[1] + 0.25 * p1[1],
            ]);
            next.push([
                0.25 * p0[0] + 0.75 * p1[0],
                0.25 * p0[1] + 0.75 * p1[1],
            ]);
        }
        next.push(current[current.len() - 1]);
        current = next;
    }
    current
}
