use crate::geometry::Polygon;
use crate::math::polygon_2d::{cross_2d, left_normal, Winding};
use crate::math::{LocalFrame, Point2, Vector2, TOLERANCE};

/// Maximum miter distance as a multiple of the setback distance. Sharper
/// corners are clamped to this instead of dividing by a vanishing sine.
pub const MITER_LIMIT: f64 = 4.0;

/// Insets a building outline by moving every vertex along its corner bisector.
///
/// # Algorithm
///
/// For each vertex, in a local metric frame centred on it:
/// 1. Unit vectors toward the previous and next vertex
/// 2. Convex/concave classification from the cross product and the winding order
/// 3. Normalized bisector, negated for concave corners
/// 4. Miter length `distance / sin(angle / 2)`, clamped to [`MITER_LIMIT`]
///
/// The output keeps the vertex count and order of the input. Self-intersections
/// produced by very small or near-colinear outlines are not removed.
#[derive(Debug)]
pub struct InwardSetback<'a> {
    polygon: &'a Polygon,
    distance: f64,
}

impl<'a> InwardSetback<'a> {
    /// Creates a new inward setback operation. `distance` is in meters.
    #[must_use]
    pub fn new(polygon: &'a Polygon, distance: f64) -> Self {
        Self { polygon, distance }
    }

    /// Executes the setback.
    ///
    /// Returns an empty polygon (and logs a warning) for fewer than 3 vertices
    /// or a negative distance. A zero distance returns the outline unchanged.
    #[must_use]
    pub fn execute(&self) -> Polygon {
        if self.polygon.is_degenerate() {
            tracing::warn!(
                vertices = self.polygon.len(),
                "inward setback needs at least 3 vertices"
            );
            return Polygon::empty();
        }
        if !self.distance.is_finite() || self.distance < 0.0 {
            tracing::warn!(distance = self.distance, "inward setback distance must be non-negative");
            return Polygon::empty();
        }
        if self.distance < TOLERANCE {
            return self.polygon.clone();
        }

        let winding = self.polygon.winding();
        let points = self.polygon.points();
        let n = points.len();

        let inset = (0..n)
            .map(|i| {
                let prev = points[(i + n - 1) % n];
                let curr = points[i];
                let next = points[(i + 1) % n];

                let frame = LocalFrame::east_north(curr);
                let to_prev = frame.to_local(prev).coords;
                let to_next = frame.to_local(next).coords;

                match corner_offset(to_prev, to_next, winding, self.distance) {
                    Some(offset) => frame.to_geo(Point2::from(offset)),
                    None => curr,
                }
            })
            .collect();

        Polygon::new(inset)
    }
}

/// Displacement of one corner, or `None` when an adjacent edge has zero length.
fn corner_offset(to_prev: Vector2, to_next: Vector2, winding: Winding, distance: f64) -> Option<Vector2> {
    let prev_len = to_prev.norm();
    let next_len = to_next.norm();
    if prev_len < TOLERANCE || next_len < TOLERANCE {
        return None;
    }
    let u_prev = to_prev / prev_len;
    let u_next = to_next / next_len;

    let bisector = u_prev + u_next;
    let bisector_len = bisector.norm();
    if bisector_len < TOLERANCE {
        // Colinear vertex: step straight off the incoming edge.
        let inward = left_normal(-u_prev) * -winding.outward_multiplier();
        return Some(inward * distance);
    }
    let bisector = bisector / bisector_len;

    let cross = cross_2d(&u_prev, &u_next);
    let dot = u_prev.dot(&u_next);
    let convex = if cross.abs() < TOLERANCE {
        dot > 0.0
    } else {
        match winding {
            Winding::CounterClockwise => cross < 0.0,
            Winding::Clockwise => cross > 0.0,
        }
    };
    let inward = if convex { bisector } else { -bisector };

    let angle = dot.clamp(-1.0, 1.0).acos();
    let half_sin = (angle * 0.5).sin();
    let miter = if half_sin * MITER_LIMIT < 1.0 {
        distance * MITER_LIMIT
    } else {
        distance / half_sin
    };

    Some(inward * miter)
}
