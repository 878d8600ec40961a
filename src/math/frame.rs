use crate::geometry::GeoPoint;

use super::{Point2, METERS_PER_DEGREE};

/// A local metric frame anchored at a geodetic origin and rotated to a compass heading.
///
/// Geodetic offsets are converted with an equirectangular approximation
/// (longitude scaled by the cosine of the origin latitude). The `x` axis points
/// along `heading`, the `y` axis points 90° counter-clockwise from it, so the
/// frame keeps the handedness of east/north and signed areas keep their sign.
#[derive(Debug, Clone, Copy)]
pub struct LocalFrame {
    origin: GeoPoint,
    heading: f64,
    cos_lat: f64,
    cos_phi: f64,
    sin_phi: f64,
}

impl LocalFrame {
    /// Creates a frame at `origin` whose `x` axis follows `heading` (degrees, clockwise from north).
    #[must_use]
    pub fn new(origin: GeoPoint, heading: f64) -> Self {
        // Math angle of the heading direction, counter-clockwise from east.
        let phi = (90.0 - heading).to_radians();
        Self {
            origin,
            heading,
            cos_lat: origin.lat.to_radians().cos(),
            cos_phi: phi.cos(),
            sin_phi: phi.sin(),
        }
    }

    /// Creates an unrotated frame: `x` east, `y` north.
    #[must_use]
    pub fn east_north(origin: GeoPoint) -> Self {
        Self::new(origin, 90.0)
    }

    #[must_use]
    pub fn origin(&self) -> GeoPoint {
        self.origin
    }

    #[must_use]
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// Projects a geodetic point into the frame (meters).
    #[must_use]
    pub fn to_local(&self, point: GeoPoint) -> Point2 {
        let east = (point.lng - self.origin.lng) * METERS_PER_DEGREE * self.cos_lat;
        let north = (point.lat - self.origin.lat) * METERS_PER_DEGREE;
        Point2::new(
            east * self.cos_phi + north * self.sin_phi,
            -east * self.sin_phi + north * self.cos_phi,
        )
    }

    /// Converts frame coordinates (meters) back to a geodetic point.
    #[must_use]
    pub fn to_geo(&self, local: Point2) -> GeoPoint {
        let east = local.x * self.cos_phi - local.y * self.sin_phi;
        let north = local.x * self.sin_phi + local.y * self.cos_phi;
        GeoPoint::new(
            self.origin.lat + north / METERS_PER_DEGREE,
            self.origin.lng + east / (METERS_PER_DEGREE * self.cos_lat),
        )
    }
}
