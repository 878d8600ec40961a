use crate::geometry::Polygon;
use crate::math::intersect_2d::{line_line_intersect_2d, point_at};
use crate::math::polygon_2d::{left_normal, segment_direction};
use crate::math::{LocalFrame, Point2, Vector2, TOLERANCE};

/// Grows an obstruction outline outward by a fixed clearance.
///
/// # Algorithm
///
/// 1. Translate every edge along its left normal scaled by
///    `distance * winding.outward_multiplier()`, which always points away
///    from the interior regardless of the input winding
/// 2. Intersect each pair of consecutive offset edges to get the new vertex
///
/// Unlike a bisector miter, intersecting offset edges keeps every edge exactly
/// `distance` from its source edge, which holds up better at acute corners
/// when expanding.
#[derive(Debug)]
pub struct OutwardSetback<'a> {
    polygon: &'a Polygon,
    distance: f64,
}

/// An edge translated away from the polygon, or `None` for a zero-length edge.
type OffsetEdge = Option<(Point2, Vector2)>;

impl<'a> OutwardSetback<'a> {
    /// Creates a new outward setback operation. `distance` is in meters.
    #[must_use]
    pub fn new(polygon: &'a Polygon, distance: f64) -> Self {
        Self { polygon, distance }
    }

    /// Executes the setback. Vertex `i` of the result is the expansion of vertex `i`
    /// of the input.
    ///
    /// Returns an empty polygon (and logs a warning) for fewer than 3 vertices
    /// or a negative distance. A zero distance returns the outline unchanged.
    #[must_use]
    pub fn execute(&self) -> Polygon {
        if self.polygon.is_degenerate() {
            tracing::warn!(
                vertices = self.polygon.len(),
                "outward setback needs at least 3 vertices"
            );
            return Polygon::empty();
        }
        if !self.distance.is_finite() || self.distance < 0.0 {
            tracing::warn!(distance = self.distance, "outward setback distance must be non-negative");
            return Polygon::empty();
        }
        if self.distance < TOLERANCE {
            return self.polygon.clone();
        }
        let Some(center) = self.polygon.vertex_centroid() else {
            return Polygon::empty();
        };

        let frame = LocalFrame::east_north(center);
        let points = self.polygon.to_local(&frame);
        let n = points.len();
        let shift = self.distance * self.polygon.winding().outward_multiplier();

        let edges: Vec<OffsetEdge> = (0..n)
            .map(|i| {
                let a = points[i];
                let dir = segment_direction(&a, &points[(i + 1) % n])?;
                Some((a + left_normal(dir) * shift, dir))
            })
            .collect();

        let expanded = (0..n)
            .map(|i| {
                let prev = edges[(i + n - 1) % n];
                let next = edges[i];
                let vertex = match (prev, next) {
                    (Some(prev), Some(next)) => corner(prev, next, points[i]),
                    _ => points[i],
                };
                frame.to_geo(vertex)
            })
            .collect();

        Polygon::new(expanded)
    }
}

/// Intersection of two consecutive offset edges meeting near `vertex`.
///
/// Parallel edges fall back to the midpoint of their two translated copies of `vertex`.
fn corner(prev: (Point2, Vector2), next: (Point2, Vector2), vertex: Point2) -> Point2 {
    let (prev_start, prev_dir) = prev;
    let (next_start, next_dir) = next;
    match line_line_intersect_2d(&prev_start, &prev_dir, &next_start, &next_dir) {
        Some((t, _)) => point_at(&prev_start, &prev_dir, t),
        None => {
            // `next_start` is `vertex` translated by the next edge's normal; the
            // previous edge's copy of `vertex` lies on its line at the same offset.
            let prev_copy = prev_start + prev_dir * prev_dir.dot(&(vertex - prev_start));
            Point2::from((prev_copy.coords + next_start.coords) * 0.5)
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::geodesy::{GeodesyProvider, SphericalGeodesy};
    use crate::geometry::GeoPoint;

    fn local_polygon(frame: &LocalFrame, pts: &[(f64, f64)]) -> Polygon {
        Polygon::new(pts.iter().map(|&(x, y)| frame.to_geo(Point2::new(x, y))).collect())
    }

    fn frame() -> LocalFrame {
        LocalFrame::east_north(GeoPoint::new(38.75, -121.25))
    }

    #[test]
    fn square_grows_by_distance() {
        let f = frame();
        let square = local_polygon(&f, &[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]);
        let grown = OutwardSetback::new(&square, 1.0).execute();
        assert_eq!(grown.len(), 4);
        let first = f.to_local(grown.points()[0]);
        assert_abs_diff_eq!(first.x, -1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(first.y, -1.0, epsilon = 1e-3);
        let third = f.to_local(grown.points()[2]);
        assert_abs_diff_eq!(third.x, 5.0, epsilon = 1e-3);
        assert_abs_diff_eq!(third.y, 5.0, epsilon = 1e-3);
    }

    #[test]
    fn both_windings_grow_outward() {
        let f = frame();
        let geodesy = SphericalGeodesy::new();
        let tri = local_polygon(&f, &[(0.0, 0.0), (6.0, 0.0), (2.0, 5.0)]);
        for input in [tri.clone(), tri.reversed()] {
            let grown = OutwardSetback::new(&input, 0.6).execute();
            for p in tri.points() {
                assert!(geodesy.contains_location(*p, &grown));
            }
        }
    }

    #[test]
    fn windings_are_congruent() {
        let f = frame();
        let tri = local_polygon(&f, &[(0.0, 0.0), (6.0, 0.0), (2.0, 5.0)]);
        let a = OutwardSetback::new(&tri, 0.6).execute();
        let b = OutwardSetback::new(&tri.reversed(), 0.6).execute();
        let n = a.len();
        for (i, p) in a.points().iter().enumerate() {
            // Reversal maps vertex i to n - 1 - i.
            let q = b.points()[n - 1 - i];
            assert_abs_diff_eq!(p.lat, q.lat, epsilon = 1e-9);
            assert_abs_diff_eq!(p.lng, q.lng, epsilon = 1e-9);
        }
    }

    #[test]
    fn colinear_vertex_uses_midpoint() {
        let f = frame();
        let poly = local_polygon(&f, &[(0.0, 0.0), (2.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]);
        let grown = OutwardSetback::new(&poly, 1.0).execute();
        let mid = f.to_local(grown.points()[1]);
        assert_abs_diff_eq!(mid.x, 2.0, epsilon = 1e-3);
        assert_abs_diff_eq!(mid.y, -1.0, epsilon = 1e-3);
    }

    #[test]
    fn zero_length_edge_keeps_vertex() {
        let f = frame();
        let poly = local_polygon(&f, &[(0.0, 0.0), (0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]);
        let grown = OutwardSetback::new(&poly, 1.0).execute();
        assert_eq!(grown.len(), 5);
        let kept = f.to_local(grown.points()[1]);
        assert_abs_diff_eq!(kept.x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(kept.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn degenerate_inputs_yield_empty() {
        let f = frame();
        let line = local_polygon(&f, &[(0.0, 0.0), (4.0, 0.0)]);
        assert!(OutwardSetback::new(&line, 1.0).execute().is_empty());
        let square = local_polygon(&f, &[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]);
        assert!(OutwardSetback::new(&square, f64::NAN).execute().is_empty());
    }
}
