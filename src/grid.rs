use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::error::{ArrayError, Result};

/// State of one cell of a canonical layout grid.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CellState {
    /// Buildable but unused.
    Available,
    /// Holds a panel.
    Selected,
    /// Holds a panel blocked by an obstruction of the given height (meters).
    Obstructed { height: f64 },
    /// Touches the building but crosses the setback; shown, never selectable.
    Intersects,
    /// Outside the usable roof.
    #[default]
    NonApplicable,
}

impl CellState {
    /// Whether the cell carries a panel (selected or obstructed).
    #[must_use]
    pub fn has_panel(&self) -> bool {
        matches!(self, Self::Selected | Self::Obstructed { .. })
    }

    /// Whether a user may place a panel here.
    #[must_use]
    pub fn is_selectable(&self) -> bool {
        matches!(self, Self::Available | Self::Selected | Self::Obstructed { .. })
    }
}

/// Export format: `true`, `false`, `"intersects"`, `"non-value"`, or the
/// obstruction height as a string.
impl Serialize for CellState {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Available => serializer.serialize_bool(false),
            Self::Selected => serializer.serialize_bool(true),
            Self::Obstructed { height } => serializer.collect_str(height),
            Self::Intersects => serializer.serialize_str("intersects"),
            Self::NonApplicable => serializer.serialize_str("non-value"),
        }
    }
}

/// Per-state cell totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellCounts {
    pub available: usize,
    pub selected: usize,
    pub obstructed: usize,
    pub intersects: usize,
    pub non_applicable: usize,
}

impl CellCounts {
    /// Cells that hold or can hold a panel.
    #[must_use]
    pub fn total_panels(&self) -> usize {
        self.available + self.selected + self.obstructed
    }
}

/// Rectangular `(row, col)` cell matrix, stored row-major.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CanonicalGrid {
    rows: usize,
    cols: usize,
    cells: Vec<CellState>,
}

impl CanonicalGrid {
    /// A `rows x cols` grid with every cell set to `fill`.
    #[must_use]
    pub fn new(rows: usize, cols: usize, fill: CellState) -> Self {
        if rows == 0 || cols == 0 {
            return Self::default();
        }
        Self {
            rows,
            cols,
            cells: vec![fill; rows * cols],
        }
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<CellState> {
        if row < self.rows && col < self.cols {
            Some(self.cells[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut CellState> {
        if row < self.rows && col < self.cols {
            Some(&mut self.cells[row * self.cols + col])
        } else {
            None
        }
    }

    /// Overwrites a cell and returns its previous state.
    ///
    /// # Errors
    ///
    /// Returns `ArrayError::CellOutOfBounds` if `(row, col)` lies outside the grid.
    pub fn set(&mut self, row: usize, col: usize, state: CellState) -> Result<CellState> {
        if row >= self.rows || col >= self.cols {
            return Err(ArrayError::CellOutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            }
            .into());
        }
        let cell = &mut self.cells[row * self.cols + col];
        Ok(std::mem::replace(cell, state))
    }

    /// Iterates the grid one row slice at a time.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[CellState]> + '_ {
        // `cols` is never 0 for a non-empty grid.
        self.cells.chunks(self.cols.max(1))
    }

    #[must_use]
    pub fn counts(&self) -> CellCounts {
        self.cells.iter().fold(CellCounts::default(), |mut c, cell| {
            match cell {
                CellState::Available => c.available += 1,
                CellState::Selected => c.selected += 1,
                CellState::Obstructed { .. } => c.obstructed += 1,
                CellState::Intersects => c.intersects += 1,
                CellState::NonApplicable => c.non_applicable += 1,
            }
            c
        })
    }

    /// The grid turned a quarter turn clockwise: row `r` becomes column `rows - 1 - r`.
    #[must_use]
    pub fn rotated_clockwise(&self) -> Self {
        let mut cells = Vec::with_capacity(self.cells.len());
        for col in 0..self.cols {
            for row in (0..self.rows).rev() {
                cells.push(self.cells[row * self.cols + col]);
            }
        }
        Self {
            rows: self.cols,
            cols: self.rows,
            cells,
        }
    }

    /// Drops rows in which every cell is non-applicable.
    #[must_use]
    pub fn trim_empty_rows(&self) -> Self {
        let cells: Vec<CellState> = self
            .iter_rows()
            .filter(|row| row.iter().any(|c| *c != CellState::NonApplicable))
            .flatten()
            .copied()
            .collect();
        if cells.is_empty() {
            return Self::default();
        }
        Self {
            rows: cells.len() / self.cols,
            cols: self.cols,
            cells,
        }
    }
}

/// Serializes as an array of row arrays.
impl Serialize for CanonicalGrid {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows))?;
        for row in self.iter_rows() {
            seq.serialize_element(row)?;
        }
        seq.end()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn cells_serialize_to_export_format() {
        let mut grid = CanonicalGrid::new(1, 5, CellState::Available);
        grid.set(0, 1, CellState::Selected).unwrap();
        grid.set(0, 2, CellState::Obstructed { height: 1.5 }).unwrap();
        grid.set(0, 3, CellState::Intersects).unwrap();
        grid.set(0, 4, CellState::NonApplicable).unwrap();
        let json = serde_json::to_string(&grid).unwrap();
        assert_eq!(json, r#"[[false,true,"1.5","intersects","non-value"]]"#);
    }

    #[test]
    fn set_out_of_bounds_fails() {
        let mut grid = CanonicalGrid::new(2, 2, CellState::Available);
        assert!(grid.set(2, 0, CellState::Selected).is_err());
        assert_eq!(grid.set(1, 1, CellState::Selected).unwrap(), CellState::Available);
        assert_eq!(grid.get(1, 1), Some(CellState::Selected));
        assert_eq!(grid.get(0, 5), None);
    }

    #[test]
    fn counts_by_state() {
        let mut grid = CanonicalGrid::new(2, 3, CellState::NonApplicable);
        grid.set(0, 0, CellState::Selected).unwrap();
        grid.set(0, 1, CellState::Available).unwrap();
        grid.set(1, 2, CellState::Obstructed { height: 2.0 }).unwrap();
        let counts = grid.counts();
        assert_eq!(counts.selected, 1);
        assert_eq!(counts.obstructed, 1);
        assert_eq!(counts.non_applicable, 3);
        assert_eq!(counts.total_panels(), 3);
    }

    #[test]
    fn quarter_turn() {
        let mut grid = CanonicalGrid::new(2, 3, CellState::Available);
        grid.set(0, 0, CellState::Selected).unwrap();
        grid.set(1, 2, CellState::Intersects).unwrap();
        let turned = grid.rotated_clockwise();
        assert_eq!((turned.rows(), turned.cols()), (3, 2));
        assert_eq!(turned.get(0, 1), Some(CellState::Selected));
        assert_eq!(turned.get(2, 0), Some(CellState::Intersects));
        assert_eq!(turned.rotated_clockwise().rotated_clockwise().rotated_clockwise(), grid);
    }

    #[test]
    fn trims_rows_without_roof() {
        let mut grid = CanonicalGrid::new(3, 2, CellState::NonApplicable);
        grid.set(1, 0, CellState::Available).unwrap();
        let trimmed = grid.trim_empty_rows();
        assert_eq!((trimmed.rows(), trimmed.cols()), (1, 2));
        assert!(CanonicalGrid::new(2, 2, CellState::NonApplicable).trim_empty_rows().is_empty());
    }

    #[test]
    fn empty_grid() {
        let grid = CanonicalGrid::new(0, 4, CellState::Available);
        assert!(grid.is_empty());
        assert_eq!(grid.rows(), 0);
        assert_eq!(serde_json::to_string(&grid).unwrap(), "[]");
    }
}
