use crate::error::{GeometryError, Result};
use crate::geodesy::GeodesyProvider;
use crate::math::polygon_2d::{find_self_intersection, signed_area_2d, Winding};
use crate::math::{normalize_degrees, LocalFrame, METERS_TO_FEET, SQ_METERS_TO_SQ_FEET};

use super::{PanelSpec, Polygon};

/// A finalized building footprint.
///
/// Validated on construction (at least 3 vertices, no crossing edges). The
/// longest edge fixes the building heading used to align panel grids.
#[derive(Debug, Clone)]
pub struct BuildingOutline {
    polygon: Polygon,
    heading: f64,
    longest_edge: usize,
}

/// Oriented bounding box of an outline aligned with its longest edge, in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlineDimensions {
    /// Shorter side of the oriented box.
    pub width: f64,
    /// Longer side of the oriented box.
    pub length: f64,
    /// Area of the polygon itself (not the box), square meters.
    pub area: f64,
    /// Heading of the box's long side, degrees.
    pub rotation: f64,
}

impl OutlineDimensions {
    #[must_use]
    pub fn width_feet(&self) -> f64 {
        self.width * METERS_TO_FEET
    }

    #[must_use]
    pub fn length_feet(&self) -> f64 {
        self.length * METERS_TO_FEET
    }

    #[must_use]
    pub fn area_square_feet(&self) -> f64 {
        self.area * SQ_METERS_TO_SQ_FEET
    }
}

impl BuildingOutline {
    /// Finalizes an outline.
    ///
    /// # Errors
    ///
    /// - `GeometryError::TooFewVertices` for fewer than 3 vertices
    /// - `GeometryError::SelfIntersecting` if two non-adjacent edges cross
    /// - `GeometryError::Degenerate` if every edge has zero length
    pub fn new(polygon: Polygon, geodesy: &impl GeodesyProvider) -> Result<Self> {
        if polygon.is_degenerate() {
            return Err(GeometryError::TooFewVertices(polygon.len()).into());
        }
        let Some(center) = polygon.vertex_centroid() else {
            return Err(GeometryError::TooFewVertices(0).into());
        };
        let local = polygon.to_local(&LocalFrame::east_north(center));
        if let Some((first, second)) = find_self_intersection(&local) {
            return Err(GeometryError::SelfIntersecting { first, second }.into());
        }

        let mut longest = None;
        let mut longest_len = 0.0;
        for (i, (a, b)) in polygon.edges().enumerate() {
            let len = geodesy.distance_between(a, b);
            if len > longest_len {
                longest_len = len;
                longest = Some((i, geodesy.heading_between(a, b)));
            }
        }
        let Some((longest_edge, heading)) = longest else {
            return Err(GeometryError::Degenerate("outline has no edge of positive length".to_owned()).into());
        };

        tracing::debug!(longest_edge, heading, length = longest_len, "outline finalized");

        Ok(Self {
            polygon,
            heading: normalize_degrees(heading),
            longest_edge,
        })
    }

    #[must_use]
    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    /// Heading of the longest edge in `[0, 360)`.
    #[must_use]
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// Index of the longest edge (edge `i` runs from vertex `i` to `i + 1`).
    #[must_use]
    pub fn longest_edge(&self) -> usize {
        self.longest_edge
    }

    #[must_use]
    pub fn winding(&self) -> Winding {
        self.polygon.winding()
    }

    #[must_use]
    pub fn is_clockwise(&self) -> bool {
        self.polygon.winding().is_clockwise()
    }

    /// Grid alignment angle: the heading turned by a user orientation (multiples of 90°).
    #[must_use]
    pub fn alignment_angle(&self, orientation: f64) -> f64 {
        normalize_degrees(self.heading + orientation)
    }

    /// Oriented bounding box aligned with the longest edge, plus the polygon area.
    #[must_use]
    pub fn dimensions(&self, geodesy: &impl GeodesyProvider) -> OutlineDimensions {
        let Some(center) = self.polygon.bounds().map(|b| b.center()) else {
            return OutlineDimensions {
                width: 0.0,
                length: 0.0,
                area: 0.0,
                rotation: self.heading,
            };
        };

        let mut min = (f64::INFINITY, f64::INFINITY);
        let mut max = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for &p in self.polygon.points() {
            let distance = geodesy.distance_between(center, p);
            let relative = (geodesy.heading_between(center, p) - self.heading).to_radians();
            let x = distance * relative.cos();
            let y = distance * relative.sin();
            min = (min.0.min(x), min.1.min(y));
            max = (max.0.max(x), max.1.max(y));
        }
        let along = max.0 - min.0;
        let across = max.1 - min.1;

        let area = signed_area_2d(&self.polygon.to_local(&LocalFrame::east_north(center))).abs();

        if along >= across {
            OutlineDimensions {
                width: across,
                length: along,
                area,
                rotation: self.heading,
            }
        } else {
            OutlineDimensions {
                width: along,
                length: across,
                area,
                rotation: normalize_degrees(self.heading + 90.0),
            }
        }
    }

    /// Whether the oriented box leaves room for at least one panel inside the setback.
    ///
    /// Both sides must be at least `max(panel width, panel length) + 2 * setback`.
    #[must_use]
    pub fn fits_panel(&self, spec: &PanelSpec, setback: f64, geodesy: &impl GeodesyProvider) -> bool {
        let dims = self.dimensions(geodesy);
        let min_size = spec.width().max(spec.length()) + setback * 2.0;
        dims.width >= min_size && dims.length >= min_size
    }
}
