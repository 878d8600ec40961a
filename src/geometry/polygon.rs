use crate::math::polygon_2d::{signed_area_2d, Winding};
use crate::math::{LocalFrame, Point2};

use super::{GeoBounds, GeoPoint};

/// An implicitly closed geodetic polygon.
///
/// The winding order is derived once from the signed area when the polygon is
/// built and travels with it, so offset and containment code never recompute it.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    points: Vec<GeoPoint>,
    winding: Winding,
}

impl Polygon {
    /// Creates a polygon and derives its winding order.
    #[must_use]
    pub fn new(points: Vec<GeoPoint>) -> Self {
        let winding = Winding::from_signed_area(planar_signed_area(&points));
        Self { points, winding }
    }

    /// An empty polygon, the result of degenerate operations.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            points: Vec::new(),
            winding: Winding::CounterClockwise,
        }
    }

    #[must_use]
    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Fewer than 3 vertices: no interior.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 3
    }

    #[must_use]
    pub fn winding(&self) -> Winding {
        self.winding
    }

    /// Iterates `(start, end)` pairs for every edge, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (GeoPoint, GeoPoint)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    #[must_use]
    pub fn bounds(&self) -> Option<GeoBounds> {
        GeoBounds::enclosing(&self.points)
    }

    /// Vertex average, or `None` for an empty polygon.
    #[must_use]
    pub fn vertex_centroid(&self) -> Option<GeoPoint> {
        if self.points.is_empty() {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let n = self.points.len() as f64;
        let (lat, lng) = self
            .points
            .iter()
            .fold((0.0, 0.0), |(lat, lng), p| (lat + p.lat, lng + p.lng));
        Some(GeoPoint::new(lat / n, lng / n))
    }

    /// Projects every vertex into a local metric frame.
    #[must_use]
    pub fn to_local(&self, frame: &LocalFrame) -> Vec<Point2> {
        self.points.iter().map(|p| frame.to_local(*p)).collect()
    }

    /// Same vertices in the opposite order.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self::new(self.points.iter().rev().copied().collect())
    }
}

impl From<Vec<GeoPoint>> for Polygon {
    fn from(points: Vec<GeoPoint>) -> Self {
        Self::new(points)
    }
}

/// Signed area with longitude as `x` and latitude as `y`.
///
/// Only the sign is used; the cosine scaling of longitude cannot flip it.
fn planar_signed_area(points: &[GeoPoint]) -> f64 {
    let planar: Vec<Point2> = points.iter().map(|p| Point2::new(p.lng, p.lat)).collect();
    signed_area_2d(&planar)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 0.001),
            GeoPoint::new(0.001, 0.001),
            GeoPoint::new(0.001, 0.0),
        ]
    }

    #[test]
    fn winding_is_derived_once() {
        let ccw = Polygon::new(square());
        assert_eq!(ccw.winding(), Winding::CounterClockwise);
        assert_eq!(ccw.reversed().winding(), Winding::Clockwise);
    }

    #[test]
    fn edges_close_the_ring() {
        let poly = Polygon::new(square());
        let edges: Vec<_> = poly.edges().collect();
        assert_eq!(edges.len(), 4);
        assert_eq!(edges[3].1, poly.points()[0]);
    }

    #[test]
    fn degenerate_polygon() {
        assert!(Polygon::new(square()[..2].to_vec()).is_degenerate());
        assert!(Polygon::empty().is_empty());
        assert!(Polygon::empty().vertex_centroid().is_none());
    }
}
