//! Spherical-geometry primitives consumed by the layout engine.
//!
//! The engine only talks to the [`GeodesyProvider`] trait. [`SphericalGeodesy`]
//! is the bundled implementation; map integrations can supply their own.

mod spherical;

pub use spherical::{SphericalGeodesy, EARTH_RADIUS_METERS};

use crate::geometry::{GeoPoint, Polygon};

/// Distance, heading, offset and containment on the globe.
pub trait GeodesyProvider {
    /// Great-circle distance in meters.
    fn distance_between(&self, a: GeoPoint, b: GeoPoint) -> f64;

    /// Initial heading from `a` to `b` in degrees, in `[0, 360)`.
    fn heading_between(&self, a: GeoPoint, b: GeoPoint) -> f64;

    /// Point reached by travelling `distance` meters from `origin` along `heading` degrees.
    fn offset(&self, origin: GeoPoint, distance: f64, heading: f64) -> GeoPoint;

    /// Whether `point` lies inside `polygon`.
    fn contains_location(&self, point: GeoPoint, polygon: &Polygon) -> bool;
}

impl<G: GeodesyProvider + ?Sized> GeodesyProvider for &G {
    fn distance_between(&self, a: GeoPoint, b: GeoPoint) -> f64 {
        (**self).distance_between(a, b)
    }

    fn heading_between(&self, a: GeoPoint, b: GeoPoint) -> f64 {
        (**self).heading_between(a, b)
    }

    fn offset(&self, origin: GeoPoint, distance: f64, heading: f64) -> GeoPoint {
        (**self).offset(origin, distance, heading)
    }

    fn contains_location(&self, point: GeoPoint, polygon: &Polygon) -> bool {
        (**self).contains_location(point, polygon)
    }
}
