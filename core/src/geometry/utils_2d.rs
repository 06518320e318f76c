//! 2D geometry utilities shared by the sketch constraints.
//!
//! Everything here is a pure function of its inputs. Functions that would
//! divide by a near-zero length return `None` instead, so callers can treat the
//! degenerate case as "no correction this step".

use super::{Point2, Vector2, EPSILON};
use std::f64::consts::PI;

// =============================================================================
// Point Operations
// =============================================================================

/// Midpoint between two 2D points.
#[inline]
pub fn midpoint(p1: &Point2, p2: &Point2) -> Point2 {
    nalgebra::center(p1, p2)
}

/// Arithmetic mean of a set of points. `None` for an empty set.
pub fn centroid(points: &[Point2]) -> Option<Point2> {
    if points.is_empty() {
        return None;
    }
    let sum = points.iter().fold(Vector2::zeros(), |acc, p| acc + p.coords);
    Some(Point2::from(sum / points.len() as f64))
}

/// Rotate `point` about `pivot` by `angle` radians (counter-clockwise).
pub fn rotate_about(point: &Point2, pivot: &Point2, angle: f64) -> Point2 {
    let (sin, cos) = angle.sin_cos();
    let d = point - pivot;
    Point2::new(
        pivot.x + d.x * cos - d.y * sin,
        pivot.y + d.x * sin + d.y * cos,
    )
}

// =============================================================================
// Vector Operations
// =============================================================================

/// 2D cross product (z-component of 3D cross product).
/// Positive if v2 is counter-clockwise from v1.
#[inline]
pub fn cross_2d(v1: &Vector2, v2: &Vector2) -> f64 {
    v1.x * v2.y - v1.y * v2.x
}

/// Unit vector, or `None` when the input is shorter than [`EPSILON`].
#[inline]
pub fn try_normalize(v: &Vector2) -> Option<Vector2> {
    let len = v.norm();
    if len < EPSILON {
        None
    } else {
        Some(v / len)
    }
}

/// Perpendicular vector (90° counter-clockwise rotation).
#[inline]
pub fn perpendicular_ccw(v: &Vector2) -> Vector2 {
    Vector2::new(-v.y, v.x)
}

// =============================================================================
// Angles
// =============================================================================

/// Wrap an angle into `(-π, π]`.
pub fn wrap_angle(mut angle: f64) -> f64 {
    while angle <= -PI {
        angle += 2.0 * PI;
    }
    while angle > PI {
        angle -= 2.0 * PI;
    }
    angle
}

/// Direction angle of the segment `start -> end`, as returned by `atan2`.
#[inline]
pub fn segment_angle(start: &Point2, end: &Point2) -> f64 {
    let d = end - start;
    d.y.atan2(d.x)
}

/// Endpoints of a segment with the given midpoint, length and direction angle.
pub fn segment_at_angle(mid: &Point2, length: f64, angle: f64) -> (Point2, Point2) {
    let half = Vector2::new(angle.cos(), angle.sin()) * (length * 0.5);
    (mid - half, mid + half)
}

// =============================================================================
// Line Operations
// =============================================================================

/// Orthogonal projection of `point` onto the infinite line through `start` and `end`.
/// `None` for a degenerate line.
pub fn project_onto_line(start: &Point2, end: &Point2, point: &Point2) -> Option<Point2> {
    let d = end - start;
    let len_sq = d.norm_squared();
    if len_sq < EPSILON {
        return None;
    }
    let t = (point - start).dot(&d) / len_sq;
    Some(start + d * t)
}

/// Distance from `point` to the infinite line through `start` and `end`.
/// A degenerate line degrades to the distance from its start point.
pub fn distance_point_to_line(start: &Point2, end: &Point2, point: &Point2) -> f64 {
    match project_onto_line(start, end, point) {
        Some(foot) => nalgebra::distance(point, &foot),
        None => nalgebra::distance(point, start),
    }
}

/// Nearest point to `point` on the segment from `start` to `end`.
/// `None` for a degenerate segment.
pub fn closest_point_on_segment(start: &Point2, end: &Point2, point: &Point2) -> Option<Point2> {
    let d = end - start;
    let len_sq = d.norm_squared();
    if len_sq < EPSILON {
        return None;
    }
    let t = ((point - start).dot(&d) / len_sq).clamp(0.0, 1.0);
    Some(start + d * t)
}

/// Signed distance from `point` to the line, measured along the line's
/// counter-clockwise unit normal. Returns the distance and that normal.
pub fn signed_distance_to_line(start: &Point2, end: &Point2, point: &Point2) -> Option<(f64, Vector2)> {
    let dir = try_normalize(&(end - start))?;
    let normal = perpendicular_ccw(&dir);
    Some(((point - start).dot(&normal), normal))
}
