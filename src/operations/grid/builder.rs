use std::f64::consts::SQRT_2;

use crate::geodesy::GeodesyProvider;
use crate::geometry::{BuildingOutline, Facing, Footprint, PanelSpec, Polygon, SystemMode};
use crate::grid::{CanonicalGrid, CellState};
use crate::math::{normalize_degrees, LocalFrame, Point2, Vector2};

use super::{GridPanel, PanelGrid};

/// Extra coverage around the building bounding box, in meters.
pub const SAFETY_MARGIN: f64 = 50.0;

/// Lays a classified panel grid over a whole building.
///
/// # Algorithm
///
/// 1. Local frame centred on the outline's bounding-box center, `x` along the
///    alignment angle (turned 180° for clockwise outlines)
/// 2. Square extent `max(width, height) + SAFETY_MARGIN`, times `√2` so any
///    rotation still covers the roof
/// 3. Every grid unit's footprint is projected back to geodetic coordinates
///    and classified against the setback and the outline
///
/// Rows advance along the frame's `y` axis. In east-west mode unit `u` becomes
/// an east row `2u` and a west row `2u + 1` sharing one pair index.
#[derive(Debug)]
pub struct PanelGridBuilder<'a, G> {
    outline: &'a BuildingOutline,
    setback: &'a Polygon,
    spec: PanelSpec,
    geodesy: G,
    mode: SystemMode,
    orientation: f64,
    shift: Vector2,
}

impl<'a, G: GeodesyProvider> PanelGridBuilder<'a, G> {
    /// Creates a north-south builder with no orientation or shift.
    #[must_use]
    pub fn new(outline: &'a BuildingOutline, setback: &'a Polygon, spec: PanelSpec, geodesy: G) -> Self {
        Self {
            outline,
            setback,
            spec,
            geodesy,
            mode: SystemMode::NorthSouth,
            orientation: 0.0,
            shift: Vector2::zeros(),
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: SystemMode) -> Self {
        self.mode = mode;
        self
    }

    /// Turns the grid away from the building heading, in degrees (normally a multiple of 90).
    #[must_use]
    pub fn with_orientation(mut self, orientation: f64) -> Self {
        self.orientation = orientation;
        self
    }

    /// Shifts the grid in meters along and across the alignment axis.
    #[must_use]
    pub fn with_shift(mut self, along: f64, across: f64) -> Self {
        self.shift = Vector2::new(along, across);
        self
    }

    /// Builds the grid. Never fails; a degenerate setback simply leaves no
    /// cell available.
    #[must_use]
    pub fn execute(&self) -> PanelGrid {
        let Some(bounds) = self.outline.polygon().bounds() else {
            return PanelGrid::empty(self.mode);
        };
        if self.setback.is_degenerate() {
            tracing::warn!(
                vertices = self.setback.len(),
                "setback polygon is degenerate, no cell can be available"
            );
        }

        let center = bounds.center();
        let mut angle = self.outline.alignment_angle(self.orientation);
        if self.outline.is_clockwise() {
            angle = normalize_degrees(angle + 180.0);
        }
        let frame = LocalFrame::new(center, angle);

        let east_north = LocalFrame::east_north(center);
        let sw = east_north.to_local(bounds.south_west());
        let ne = east_north.to_local(bounds.north_east());
        let extent = (ne.x - sw.x + SAFETY_MARGIN).max(ne.y - sw.y + SAFETY_MARGIN) * SQRT_2;

        let (across, down) = self.spec.pitch(&self.mode);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (cols, units) = ((extent / across).floor() as usize, (extent / down).floor() as usize);
        let start = Point2::new(-extent * 0.5, -extent * 0.5) + self.shift;

        let rows = if self.mode.is_east_west() { units * 2 } else { units };
        let mut grid = CanonicalGrid::new(rows, cols, CellState::NonApplicable);
        let mut panels = Vec::new();

        for unit in 0..units {
            for col in 0..cols {
                #[allow(clippy::cast_precision_loss)]
                let origin = start + Vector2::new(col as f64 * across, unit as f64 * down);
                match self.mode {
                    SystemMode::NorthSouth => {
                        let footprint = self.footprint(&frame, origin);
                        let Some(state) = self.classify(&footprint) else {
                            continue;
                        };
                        if let Some(cell) = grid.get_mut(unit, col) {
                            *cell = state;
                        }
                        panels.push(GridPanel {
                            row: unit,
                            col,
                            footprint,
                            pair_index: None,
                            facing: None,
                        });
                    }
                    SystemMode::EastWest(ew) => {
                        let east = self.footprint(&frame, origin);
                        let west = self.footprint(
                            &frame,
                            origin + Vector2::new(0.0, self.spec.length() + ew.ridge_gap),
                        );
                        let state = match (self.classify(&east), self.classify(&west)) {
                            (None, None) => continue,
                            (Some(CellState::Available), Some(CellState::Available)) => CellState::Available,
                            _ => CellState::Intersects,
                        };
                        let pair_index = Some(unit * cols + col);
                        for (row, footprint, facing) in
                            [(unit * 2, east, Facing::East), (unit * 2 + 1, west, Facing::West)]
                        {
                            if let Some(cell) = grid.get_mut(row, col) {
                                *cell = state;
                            }
                            panels.push(GridPanel {
                                row,
                                col,
                                footprint,
                                pair_index,
                                facing: Some(facing),
                            });
                        }
                    }
                }
            }
        }

        let counts = grid.counts();
        tracing::debug!(
            rows,
            cols,
            available = counts.available,
            intersects = counts.intersects,
            angle,
            "panel grid built"
        );

        PanelGrid::new(grid, panels, self.mode, center, angle)
    }

    /// Panel rectangle with its first corner at `origin`: width along `x`, length along `y`.
    fn footprint(&self, frame: &LocalFrame, origin: Point2) -> Footprint {
        let w = self.spec.width();
        let l = self.spec.length();
        Footprint::new([
            frame.to_geo(origin),
            frame.to_geo(origin + Vector2::new(w, 0.0)),
            frame.to_geo(origin + Vector2::new(w, l)),
            frame.to_geo(origin + Vector2::new(0.0, l)),
        ])
    }

    fn classify(&self, footprint: &Footprint) -> Option<CellState> {
        let corners = &footprint.corners;
        if corners
            .iter()
            .all(|c| self.geodesy.contains_location(*c, self.setback))
        {
            return Some(CellState::Available);
        }
        let building = self.outline.polygon();
        corners
            .iter()
            .any(|c| self.geodesy.contains_location(*c, building))
            .then_some(CellState::Intersects)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geodesy::SphericalGeodesy;
    use crate::geometry::{EastWestSpec, GeoPoint};
    use crate::operations::offset::InwardSetback;

    fn rect_outline(w: f64, h: f64) -> BuildingOutline {
        let f = LocalFrame::east_north(GeoPoint::new(38.75, -121.25));
        let polygon = Polygon::new(
            [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)]
                .iter()
                .map(|&(x, y)| f.to_geo(Point2::new(x, y)))
                .collect(),
        );
        BuildingOutline::new(polygon, &SphericalGeodesy::new()).unwrap()
    }

    fn east_west() -> SystemMode {
        SystemMode::EastWest(EastWestSpec {
            ridge_gap: 0.15,
            valley_gap: 0.2,
            roof_clearance: 0.08,
        })
    }

    #[test]
    fn north_south_cells_respect_setback() {
        let g = SphericalGeodesy::new();
        let outline = rect_outline(30.0, 20.0);
        let setback = InwardSetback::new(outline.polygon(), 1.0).execute();
        let spec = PanelSpec::new(1.0, 1.7, 0.05, 0.1).unwrap();
        let grid = PanelGridBuilder::new(&outline, &setback, spec, &g).execute();

        let counts = grid.grid().counts();
        assert!(counts.available > 200);
        assert!(counts.intersects > 0);
        for panel in grid.panels() {
            let state = grid.state(panel.row, panel.col).unwrap();
            let in_setback = panel
                .footprint
                .corners
                .iter()
                .all(|c| g.contains_location(*c, &setback));
            assert_eq!(state == CellState::Available, in_setback);
            assert!(panel.pair_index.is_none());
        }
    }

    #[test]
    fn east_west_pairs_share_state() {
        let g = SphericalGeodesy::new();
        let outline = rect_outline(30.0, 20.0);
        let setback = InwardSetback::new(outline.polygon(), 1.0).execute();
        let spec = PanelSpec::new(1.0, 1.7, 0.05, 0.1).unwrap();
        let grid = PanelGridBuilder::new(&outline, &setback, spec, &g)
            .with_mode(east_west())
            .execute();

        assert_eq!(grid.grid().rows() % 2, 0);
        assert!(grid.grid().counts().available > 0);
        for pair in grid.panels().chunks(2) {
            let (east, west) = (&pair[0], &pair[1]);
            assert_eq!(east.row % 2, 0);
            assert_eq!(west.row, east.row + 1);
            assert_eq!(east.pair_index, west.pair_index);
            assert_eq!(east.facing, Some(Facing::East));
            assert_eq!(west.facing, Some(Facing::West));
            assert_eq!(grid.state(east.row, east.col), grid.state(west.row, west.col));
        }
    }

    #[test]
    fn shift_moves_footprints() {
        let g = SphericalGeodesy::new();
        let outline = rect_outline(30.0, 20.0);
        let setback = InwardSetback::new(outline.polygon(), 1.0).execute();
        let spec = PanelSpec::new(1.0, 1.7, 0.0, 0.0).unwrap();
        let base = PanelGridBuilder::new(&outline, &setback, spec, &g).execute();
        let shifted = PanelGridBuilder::new(&outline, &setback, spec, &g)
            .with_shift(0.5, 0.0)
            .execute();

        let frame = LocalFrame::new(base.origin(), base.rotation());
        let a = base
            .panels()
            .iter()
            .find(|p| base.state(p.row, p.col) == Some(CellState::Available))
            .unwrap();
        let b = shifted
            .panels()
            .iter()
            .find(|p| p.row == a.row && p.col == a.col)
            .unwrap();
        let delta = frame.to_local(b.footprint.corners[0]) - frame.to_local(a.footprint.corners[0]);
        assert!((delta.x - 0.5).abs() < 1e-6);
        assert!(delta.y.abs() < 1e-6);
    }

    #[test]
    fn orientation_turns_grid() {
        let g = SphericalGeodesy::new();
        let outline = rect_outline(30.0, 20.0);
        let setback = InwardSetback::new(outline.polygon(), 1.0).execute();
        let spec = PanelSpec::new(1.0, 1.7, 0.0, 0.0).unwrap();
        let base = PanelGridBuilder::new(&outline, &setback, spec, &g).execute();
        let turned = PanelGridBuilder::new(&outline, &setback, spec, &g)
            .with_orientation(90.0)
            .execute();
        let diff = normalize_degrees(turned.rotation() - base.rotation());
        assert!((diff - 90.0).abs() < 1e-9);
    }

    #[test]
    fn clockwise_outline_flips_frame() {
        let g = SphericalGeodesy::new();
        let ccw = rect_outline(30.0, 20.0);
        let cw = BuildingOutline::new(ccw.polygon().reversed(), &g).unwrap();
        assert!(cw.is_clockwise());
        let setback = InwardSetback::new(cw.polygon(), 1.0).execute();
        let spec = PanelSpec::new(1.0, 1.7, 0.0, 0.0).unwrap();
        let grid = PanelGridBuilder::new(&cw, &setback, spec, &g).execute();
        let expected = normalize_degrees(cw.heading() + 180.0);
        assert!((grid.rotation() - expected).abs() < 1e-9);
        assert!(grid.grid().counts().available > 0);
    }

    #[test]
    fn degenerate_setback_leaves_nothing_available() {
        let g = SphericalGeodesy::new();
        let outline = rect_outline(10.0, 10.0);
        let spec = PanelSpec::new(1.0, 1.7, 0.0, 0.0).unwrap();
        let empty = Polygon::empty();
        let grid = PanelGridBuilder::new(&outline, &empty, spec, &g).execute();
        let counts = grid.grid().counts();
        assert_eq!(counts.available, 0);
        assert!(counts.intersects > 0);
    }
}
