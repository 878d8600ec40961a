use geo::{Bearing, Contains, Destination, Distance, HaversineMeasure, LineString, Point};

use crate::geometry::{GeoPoint, Polygon};
use crate::math::normalize_degrees;

use super::GeodesyProvider;

/// Equatorial earth radius used by common web-map geometry libraries.
pub const EARTH_RADIUS_METERS: f64 = 6_378_137.0;

/// Haversine geodesy on a sphere of [`EARTH_RADIUS_METERS`], with planar
/// containment in degree space.
#[derive(Debug, Clone, Copy, Default)]
pub struct SphericalGeodesy;

impl SphericalGeodesy {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn metric() -> HaversineMeasure {
        HaversineMeasure::new(EARTH_RADIUS_METERS)
    }
}

fn to_point(p: GeoPoint) -> Point<f64> {
    Point::new(p.lng, p.lat)
}

fn to_geo_polygon(polygon: &Polygon) -> geo::Polygon<f64> {
    let ring: LineString<f64> = polygon.points().iter().map(|p| (p.lng, p.lat)).collect();
    geo::Polygon::new(ring, Vec::new())
}

impl GeodesyProvider for SphericalGeodesy {
    fn distance_between(&self, a: GeoPoint, b: GeoPoint) -> f64 {
        Self::metric().distance(to_point(a), to_point(b))
    }

    fn heading_between(&self, a: GeoPoint, b: GeoPoint) -> f64 {
        normalize_degrees(Self::metric().bearing(to_point(a), to_point(b)))
    }

    fn offset(&self, origin: GeoPoint, distance: f64, heading: f64) -> GeoPoint {
        let p = Self::metric().destination(to_point(origin), heading, distance);
        GeoPoint::new(p.y(), p.x())
    }

    fn contains_location(&self, point: GeoPoint, polygon: &Polygon) -> bool {
        if polygon.is_degenerate() {
            return false;
        }
        to_geo_polygon(polygon).contains(&to_point(point))
    }
}
