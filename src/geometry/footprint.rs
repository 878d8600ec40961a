use serde::Serialize;

use super::{GeoPoint, Polygon};

/// Four corners of one placed panel, in walk order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Footprint {
    pub corners: [GeoPoint; 4],
}

impl Footprint {
    #[must_use]
    pub fn new(corners: [GeoPoint; 4]) -> Self {
        Self { corners }
    }

    /// Average of the four corners.
    #[must_use]
    pub fn center(&self) -> GeoPoint {
        let (lat, lng) = self
            .corners
            .iter()
            .fold((0.0, 0.0), |(lat, lng), p| (lat + p.lat, lng + p.lng));
        GeoPoint::new(lat * 0.25, lng * 0.25)
    }

    #[must_use]
    pub fn to_polygon(&self) -> Polygon {
        Polygon::new(self.corners.to_vec())
    }
}
