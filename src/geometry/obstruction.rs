use crate::geodesy::GeodesyProvider;
use crate::operations::offset::OutwardSetback;

use super::{GeoPoint, Polygon};

/// A rooftop obstruction (HVAC unit, skylight, vent) and its clearance zone.
#[derive(Debug, Clone)]
pub struct Obstruction {
    outline: Polygon,
    height: f64,
    setback: Polygon,
    setback_distance: f64,
}

impl Obstruction {
    /// Creates an obstruction and derives its outward setback polygon.
    ///
    /// A malformed outline yields an empty setback (logged by the offset
    /// operation), which then never blocks a panel.
    #[must_use]
    pub fn new(outline: Polygon, height: f64, setback_distance: f64) -> Self {
        let setback = OutwardSetback::new(&outline, setback_distance).execute();
        Self {
            outline,
            height,
            setback,
            setback_distance,
        }
    }

    #[must_use]
    pub fn outline(&self) -> &Polygon {
        &self.outline
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    #[must_use]
    pub fn setback(&self) -> &Polygon {
        &self.setback
    }

    #[must_use]
    pub fn setback_distance(&self) -> f64 {
        self.setback_distance
    }

    /// Whether `point` falls inside the clearance zone.
    #[must_use]
    pub fn blocks(&self, point: GeoPoint, geodesy: &impl GeodesyProvider) -> bool {
        !self.setback.is_degenerate() && geodesy.contains_location(point, &self.setback)
    }
}
