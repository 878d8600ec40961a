use crate::geodesy::GeodesyProvider;
use crate::geometry::{Facing, Footprint, GeoPoint, Obstruction, PanelSpec, Polygon, SystemMode};
use crate::math::{normalize_degrees, TOLERANCE};

use super::{Array, ArrayPanel, PanelState};

/// Generates the panel footprints of one array.
///
/// Each grid position `(row_offset, col_offset)` starts at the array origin,
/// steps `row_offset * unit_width` along the array heading and then
/// `col_offset * pitch` perpendicular to it. A panel is placed only if every
/// corner is inside the setback, at least one is inside the building and none
/// is inside an obstruction's clearance zone. East-west pairs are placed both
/// or neither.
#[derive(Debug)]
pub struct PanelPlacement<'a, G> {
    building: &'a Polygon,
    setback: &'a Polygon,
    obstructions: &'a [Obstruction],
    spec: PanelSpec,
    mode: SystemMode,
    heading: f64,
    geodesy: &'a G,
}

impl<'a, G: GeodesyProvider> PanelPlacement<'a, G> {
    #[must_use]
    pub fn new(
        building: &'a Polygon,
        setback: &'a Polygon,
        obstructions: &'a [Obstruction],
        spec: PanelSpec,
        mode: SystemMode,
        heading: f64,
        geodesy: &'a G,
    ) -> Self {
        Self {
            building,
            setback,
            obstructions,
            spec,
            mode,
            heading,
            geodesy,
        }
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn execute(&self, array: &Array) -> Vec<ArrayPanel> {
        let heading = normalize_degrees(self.heading + array.rotation);
        let across_heading = normalize_degrees(heading + 90.0);
        let (unit_across, unit_down) = self.spec.pitch(&self.mode);
        let extents = array.extents;

        let mut panels = Vec::new();
        for row in 0..array.rows() {
            let row_offset = row as f64 - extents.left as f64;
            let row_start = self.step(array.origin, row_offset * unit_across, heading);
            for col in 0..array.cols() {
                let col_offset = col as f64 - extents.up as f64;
                let start = self.step(row_start, col_offset * unit_down, across_heading);
                match self.mode {
                    SystemMode::NorthSouth => {
                        let footprint = self.footprint(start, heading, self.spec.unit_length());
                        if self.placeable(&footprint) {
                            panels.push(ArrayPanel {
                                footprint,
                                row,
                                col,
                                pair_index: None,
                                facing: None,
                                state: PanelState::Normal,
                            });
                        }
                    }
                    SystemMode::EastWest(ew) => {
                        let east = self.footprint(start, heading, self.spec.length());
                        let west_start = self.geodesy.offset(
                            start,
                            self.spec.length() + ew.ridge_gap,
                            across_heading,
                        );
                        let west = self.footprint(west_start, heading, self.spec.length());
                        if !(self.placeable(&east) && self.placeable(&west)) {
                            continue;
                        }
                        let pair_index = Some(row * array.cols() + col);
                        for (footprint, facing, half) in [(east, Facing::East, 0), (west, Facing::West, 1)] {
                            panels.push(ArrayPanel {
                                footprint,
                                row,
                                col: col * 2 + half,
                                pair_index,
                                facing: Some(facing),
                                state: PanelState::Normal,
                            });
                        }
                    }
                }
            }
        }
        panels
    }

    /// Geodesic step that accepts a signed distance.
    fn step(&self, from: GeoPoint, distance: f64, heading: f64) -> GeoPoint {
        if distance.abs() < TOLERANCE {
            from
        } else if distance < 0.0 {
            self.geodesy
                .offset(from, -distance, normalize_degrees(heading + 180.0))
        } else {
            self.geodesy.offset(from, distance, heading)
        }
    }

    /// Walks `unit_width` along `heading`, then `depth` to its right.
    fn footprint(&self, start: GeoPoint, heading: f64, depth: f64) -> Footprint {
        let across = normalize_degrees(heading + 90.0);
        let second = self.geodesy.offset(start, self.spec.unit_width(), heading);
        Footprint::new([
            start,
            second,
            self.geodesy.offset(second, depth, across),
            self.geodesy.offset(start, depth, across),
        ])
    }

    fn placeable(&self, footprint: &Footprint) -> bool {
        let corners = &footprint.corners;
        corners
            .iter()
            .all(|c| self.geodesy.contains_location(*c, self.setback))
            && corners
                .iter()
                .any(|c| self.geodesy.contains_location(*c, self.building))
            && !self
                .obstructions
                .iter()
                .any(|o| corners.iter().any(|c| o.blocks(*c, self.geodesy)))
    }
}
