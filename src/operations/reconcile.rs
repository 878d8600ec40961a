use std::collections::HashMap;

use crate::geodesy::GeodesyProvider;
use crate::geometry::{BuildingOutline, Facing, GeoBounds, GeoPoint, PanelSpec, Polygon, SystemMode};
use crate::grid::{CanonicalGrid, CellCounts, CellState};
use crate::math::{LocalFrame, Point2, Vector2};
use crate::operations::array::{Array, ArrayPanel, PanelState};

/// Fraction of a cell ignored when sizing the grid, so an extent of exactly
/// `n` pitches does not round up to `n + 1`.
const SIZE_EPSILON: f64 = 1e-6;

/// Summary of a reconciled grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconciliationMetadata {
    pub rows: usize,
    pub cols: usize,
    /// Selected, obstructed and available cells.
    pub total_panels: usize,
    pub selected: usize,
    pub obstructed: usize,
    /// South-west corner of the footprint bounding box.
    pub origin: GeoPoint,
    /// Position of cell `(0, 0)`. Equals `origin` unless panels project south
    /// or west of it in the rotated frame.
    pub first_cell: GeoPoint,
    /// Heading of the grid's column axis, degrees.
    pub rotation: f64,
}

/// Canonical grid built from every array of one outline.
#[derive(Debug, Clone)]
pub struct ReconciliationResult {
    pub grid: CanonicalGrid,
    pub metadata: ReconciliationMetadata,
}

impl ReconciliationResult {
    fn empty(rotation: f64) -> Self {
        let origin = GeoPoint::new(0.0, 0.0);
        Self {
            grid: CanonicalGrid::default(),
            metadata: ReconciliationMetadata {
                rows: 0,
                cols: 0,
                total_panels: 0,
                selected: 0,
                obstructed: 0,
                origin,
                first_cell: origin,
                rotation,
            },
        }
    }
}

/// Merges independently placed arrays into one building-aligned grid.
///
/// # Algorithm
///
/// 1. Bounding box over every footprint vertex
/// 2. Frame anchored at the box's south-west corner, `x` along the building
///    heading; `cols = ceil(width / unit_width) + 2`,
///    `rows = ceil(height / unit_length) + 2` from the box's geodesic width
///    and height
/// 3. Each footprint centroid is projected into the frame and snapped to
///    `round(coord / pitch)`; later writes win
/// 4. Remaining cells back-project to `(col * unit_width, row * unit_length)`
///    and are available if that point lies inside both the setback and the
///    building, non-applicable otherwise
///
/// With an off-axis heading some centroids project to negative coordinates.
/// The grid then starts that many whole cells before the corner and grows to
/// hold every panel.
///
/// In east-west mode the unit is a ridge pair: the pair centroid snaps once
/// with the east-west pitch and its panels fill rows `2u` (east) and `2u + 1`
/// (west).
#[derive(Debug)]
pub struct GridReconciler<'a, G> {
    outline: &'a BuildingOutline,
    setback: &'a Polygon,
    spec: PanelSpec,
    mode: SystemMode,
    geodesy: G,
}

/// One grid unit: a single panel, or both halves of an east-west pair.
struct Unit {
    center_sum: Vector2,
    members: usize,
    cells: [Option<CellState>; 2],
}

impl Unit {
    fn new() -> Self {
        Self {
            center_sum: Vector2::zeros(),
            members: 0,
            cells: [None, None],
        }
    }

    fn add(&mut self, center: Point2, half: usize, state: CellState) {
        self.center_sum += center.coords;
        self.members += 1;
        self.cells[half] = Some(state);
    }

    #[allow(clippy::cast_precision_loss)]
    fn center(&self) -> Point2 {
        Point2::from(self.center_sum / self.members.max(1) as f64)
    }
}

impl<'a, G: GeodesyProvider> GridReconciler<'a, G> {
    #[must_use]
    pub fn new(outline: &'a BuildingOutline, setback: &'a Polygon, spec: PanelSpec, geodesy: G) -> Self {
        Self {
            outline,
            setback,
            spec,
            mode: SystemMode::NorthSouth,
            geodesy,
        }
    }

    /// Racking system the arrays were generated with.
    #[must_use]
    pub fn with_mode(mut self, mode: SystemMode) -> Self {
        self.mode = mode;
        self
    }

    /// Reconciles `arrays` in iteration order (creation order when they come
    /// from an array manager).
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub fn execute<'b>(&self, arrays: impl IntoIterator<Item = &'b Array>) -> ReconciliationResult {
        let rotation = self.outline.heading();
        let arrays: Vec<&Array> = arrays.into_iter().collect();

        let Some(bounds) = GeoBounds::enclosing(
            arrays
                .iter()
                .flat_map(|a| a.panels())
                .flat_map(|p| p.footprint.corners.iter()),
        ) else {
            tracing::debug!("no panels to reconcile");
            return ReconciliationResult::empty(rotation);
        };

        let origin = bounds.south_west();
        let frame = LocalFrame::new(origin, rotation);
        let (across, down) = self.spec.pitch(&self.mode);
        let halves = if self.mode.is_east_west() { 2 } else { 1 };

        let center = bounds.center();
        let width = self.geodesy.distance_between(
            GeoPoint::new(center.lat, bounds.west),
            GeoPoint::new(center.lat, bounds.east),
        );
        let height = self.geodesy.distance_between(
            GeoPoint::new(bounds.south, center.lng),
            GeoPoint::new(bounds.north, center.lng),
        );

        let units = self.units(&frame, &arrays);
        let snapped: Vec<(i64, i64)> = units
            .iter()
            .map(|u| {
                let c = u.center();
                (snap(c.y, down), snap(c.x, across))
            })
            .collect();
        let row_shift = snapped.iter().map(|s| s.0).min().unwrap_or(0).min(0);
        let col_shift = snapped.iter().map(|s| s.1).min().unwrap_or(0).min(0);
        let max_row = snapped.iter().map(|s| s.0).max().unwrap_or(0);
        let max_col = snapped.iter().map(|s| s.1).max().unwrap_or(0);
        if row_shift < 0 || col_shift < 0 {
            tracing::debug!(row_shift, col_shift, "panels project behind the grid corner");
        }

        let unit_rows = cells_for(height, down).max((max_row - row_shift + 1) as usize);
        let cols = cells_for(width, across).max((max_col - col_shift + 1) as usize);
        let rows = unit_rows * halves;

        let mut written = CanonicalGrid::new(rows, cols, CellState::NonApplicable);
        let mut overwrites = 0usize;
        for (unit, &(r, c)) in units.iter().zip(&snapped) {
            let unit_row = (r - row_shift) as usize;
            let col = (c - col_shift) as usize;
            for (half, state) in unit.cells.iter().enumerate() {
                let Some(state) = *state else {
                    continue;
                };
                let row = unit_row * halves + half;
                match written.set(row, col, state) {
                    Ok(previous) if previous.has_panel() => {
                        overwrites += 1;
                        tracing::debug!(row, col, "panel overwrites an earlier panel in the same cell");
                    }
                    Ok(_) => {}
                    Err(err) => tracing::warn!(%err, "snapped panel falls outside the canonical grid"),
                }
            }
        }

        let building = self.outline.polygon();
        for unit_row in 0..unit_rows {
            let cell_rows = unit_row * halves..(unit_row + 1) * halves;
            for col in 0..cols {
                if cell_rows
                    .clone()
                    .any(|row| written.get(row, col).is_some_and(|c| c.has_panel()))
                {
                    continue;
                }
                let local = Point2::new(
                    (col as f64 + col_shift as f64) * across,
                    (unit_row as f64 + row_shift as f64) * down,
                );
                let geo = frame.to_geo(local);
                if self.geodesy.contains_location(geo, self.setback)
                    && self.geodesy.contains_location(geo, building)
                {
                    for row in cell_rows.clone() {
                        if let Some(cell) = written.get_mut(row, col) {
                            *cell = CellState::Available;
                        }
                    }
                }
            }
        }

        let counts: CellCounts = written.counts();
        tracing::debug!(
            rows,
            cols,
            selected = counts.selected,
            obstructed = counts.obstructed,
            available = counts.available,
            overwrites,
            "arrays reconciled"
        );

        ReconciliationResult {
            grid: written,
            metadata: ReconciliationMetadata {
                rows,
                cols,
                total_panels: counts.total_panels(),
                selected: counts.selected,
                obstructed: counts.obstructed,
                origin,
                first_cell: frame.to_geo(Point2::new(col_shift as f64 * across, row_shift as f64 * down)),
                rotation,
            },
        }
    }

    /// Groups panels into grid units, in write order.
    fn units(&self, frame: &LocalFrame, arrays: &[&Array]) -> Vec<Unit> {
        let mut units: Vec<Unit> = Vec::new();
        for array in arrays {
            let mut pairs: HashMap<usize, usize> = HashMap::new();
            for panel in array.panels() {
                let center = frame.to_local(panel.footprint.center());
                let state = cell_state(panel);
                let pair = panel.pair_index.filter(|_| self.mode.is_east_west());
                let Some(pair) = pair else {
                    let mut unit = Unit::new();
                    unit.add(center, 0, state);
                    units.push(unit);
                    continue;
                };
                let slot = *pairs.entry(pair).or_insert_with(|| {
                    units.push(Unit::new());
                    units.len() - 1
                });
                let half = usize::from(panel.facing == Some(Facing::West));
                units[slot].add(center, half, state);
            }
        }
        units
    }
}

fn cell_state(panel: &ArrayPanel) -> CellState {
    match panel.state {
        PanelState::Normal => CellState::Selected,
        PanelState::Obstructed { height } => CellState::Obstructed { height },
    }
}

/// Grid cells needed to cover `extent` meters, plus one spare on each side.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn cells_for(extent: f64, pitch: f64) -> usize {
    (extent / pitch - SIZE_EPSILON).ceil().max(0.0) as usize + 2
}

/// Nearest grid index of a frame coordinate.
#[allow(clippy::cast_possible_truncation)]
fn snap(coord: f64, pitch: f64) -> i64 {
    (coord / pitch).round() as i64
}
