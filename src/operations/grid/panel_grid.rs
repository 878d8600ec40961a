use std::collections::BTreeSet;

use crate::error::{ArrayError, Result};
use crate::geometry::panel::non_negative;
use crate::geometry::{Facing, Footprint, GeoBounds, GeoPoint, SystemMode};
use crate::grid::{CanonicalGrid, CellState};

/// One emitted cell of a [`PanelGrid`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPanel {
    pub row: usize,
    pub col: usize,
    pub footprint: Footprint,
    /// Shared by the east and west panel of one ridge unit.
    pub pair_index: Option<usize>,
    pub facing: Option<Facing>,
}

/// What a box selection does to the units it covers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionMode {
    /// Select every available unit.
    Panels,
    /// Mark every selectable unit obstructed at the given height.
    Obstructions { height: f64 },
}

/// A classified grid over a whole building plus the footprints of its
/// emitted cells.
///
/// Cell state lives only in the grid. Every mutation writes a whole unit, so
/// both panels of an east-west pair always change together.
#[derive(Debug, Clone)]
pub struct PanelGrid {
    grid: CanonicalGrid,
    panels: Vec<GridPanel>,
    mode: SystemMode,
    origin: GeoPoint,
    rotation: f64,
}

impl PanelGrid {
    pub(crate) fn new(
        grid: CanonicalGrid,
        panels: Vec<GridPanel>,
        mode: SystemMode,
        origin: GeoPoint,
        rotation: f64,
    ) -> Self {
        Self {
            grid,
            panels,
            mode,
            origin,
            rotation,
        }
    }

    pub(crate) fn empty(mode: SystemMode) -> Self {
        Self::new(CanonicalGrid::default(), Vec::new(), mode, GeoPoint::new(0.0, 0.0), 0.0)
    }

    #[must_use]
    pub fn grid(&self) -> &CanonicalGrid {
        &self.grid
    }

    /// Emitted cells in generation order (east before west within a pair).
    #[must_use]
    pub fn panels(&self) -> &[GridPanel] {
        &self.panels
    }

    #[must_use]
    pub fn mode(&self) -> SystemMode {
        self.mode
    }

    /// Center of the grid frame.
    #[must_use]
    pub fn origin(&self) -> GeoPoint {
        self.origin
    }

    /// Heading of the grid's `x` axis, degrees.
    #[must_use]
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    #[must_use]
    pub fn state(&self, row: usize, col: usize) -> Option<CellState> {
        self.grid.get(row, col)
    }

    /// Flips a unit between available and selected. An obstructed unit
    /// becomes available. Returns the new state.
    ///
    /// # Errors
    ///
    /// - `ArrayError::CellOutOfBounds` for a cell outside the grid
    /// - `ArrayError::NotSelectable` for an intersecting or non-applicable cell
    pub fn toggle(&mut self, row: usize, col: usize) -> Result<CellState> {
        let next = match self.selectable(row, col)? {
            CellState::Available => CellState::Selected,
            _ => CellState::Available,
        };
        self.write_unit(row, col, next);
        Ok(next)
    }

    /// Marks a unit obstructed at `height` meters.
    ///
    /// # Errors
    ///
    /// Same as [`PanelGrid::toggle`], plus `ConfigError::Negative` for a
    /// negative or non-finite height.
    pub fn mark_obstructed(&mut self, row: usize, col: usize, height: f64) -> Result<()> {
        non_negative("obstruction height", height)?;
        self.selectable(row, col)?;
        self.write_unit(row, col, CellState::Obstructed { height });
        Ok(())
    }

    /// Turns an obstructed unit back into a selected one. Other states are left alone.
    ///
    /// # Errors
    ///
    /// Same as [`PanelGrid::toggle`].
    pub fn clear_obstruction(&mut self, row: usize, col: usize) -> Result<()> {
        if let CellState::Obstructed { .. } = self.selectable(row, col)? {
            self.write_unit(row, col, CellState::Selected);
        }
        Ok(())
    }

    /// Applies `mode` to every unit with a panel center inside `bounds`.
    /// Each east-west pair is processed once. Returns the number of units changed.
    pub fn apply_selection_box(&mut self, bounds: GeoBounds, mode: SelectionMode) -> usize {
        let units: BTreeSet<(usize, usize)> = self
            .panels
            .iter()
            .filter(|p| bounds.contains(p.footprint.center()))
            .map(|p| (self.unit_row(p.row), p.col))
            .collect();

        let mut changed = 0;
        for (row, col) in units {
            let Some(state) = self.grid.get(row, col) else {
                continue;
            };
            let next = match (mode, state) {
                (SelectionMode::Panels, CellState::Available) => CellState::Selected,
                (SelectionMode::Obstructions { height }, s) if s.is_selectable() && height >= 0.0 => {
                    CellState::Obstructed { height }
                }
                _ => continue,
            };
            if next != state {
                self.write_unit(row, col, next);
                changed += 1;
            }
        }
        tracing::debug!(changed, ?mode, "box selection applied");
        changed
    }

    /// Layout for export: the grid without rows that never touch the roof.
    #[must_use]
    pub fn layout(&self) -> CanonicalGrid {
        self.grid.trim_empty_rows()
    }

    /// The cells that make up the unit containing `(row, col)`.
    fn unit_cells(&self, row: usize, col: usize) -> [Option<(usize, usize)>; 2] {
        if self.mode.is_east_west() {
            let east = self.unit_row(row);
            [Some((east, col)), Some((east + 1, col))]
        } else {
            [Some((row, col)), None]
        }
    }

    fn unit_row(&self, row: usize) -> usize {
        if self.mode.is_east_west() {
            row & !1
        } else {
            row
        }
    }

    fn write_unit(&mut self, row: usize, col: usize, state: CellState) {
        for (r, c) in self.unit_cells(row, col).into_iter().flatten() {
            if let Some(cell) = self.grid.get_mut(r, c) {
                *cell = state;
            }
        }
    }

    fn selectable(&self, row: usize, col: usize) -> Result<CellState> {
        let state = self.grid.get(row, col).ok_or(ArrayError::CellOutOfBounds {
            row,
            col,
            rows: self.grid.rows(),
            cols: self.grid.cols(),
        })?;
        if state.is_selectable() {
            Ok(state)
        } else {
            Err(ArrayError::NotSelectable { row, col }.into())
        }
    }
}
