use serde::{Deserialize, Serialize};

use crate::geometry::{Facing, Footprint, GeoPoint};

slotmap::new_key_type! {
    /// Unique identifier for an array in the array manager.
    pub struct ArrayId;
}

/// Lifecycle of an array: `Creating -> Active`, `Active <-> Selected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArrayState {
    Creating,
    Active,
    Selected,
}

/// One of the four directions an array grows in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::Left, Self::Right, Self::Up, Self::Down];
}

/// Largest panel count an array may reach beyond its origin in one direction.
pub const MAX_EXTENT: usize = 250;

/// Panel counts beyond the origin panel in each direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Extents {
    pub left: usize,
    pub right: usize,
    pub up: usize,
    pub down: usize,
}

impl Extents {
    #[must_use]
    pub fn get(&self, direction: Direction) -> usize {
        match direction {
            Direction::Left => self.left,
            Direction::Right => self.right,
            Direction::Up => self.up,
            Direction::Down => self.down,
        }
    }

    pub fn set(&mut self, direction: Direction, count: usize) {
        match direction {
            Direction::Left => self.left = count,
            Direction::Right => self.right = count,
            Direction::Up => self.up = count,
            Direction::Down => self.down = count,
        }
    }
}

/// Per-panel obstruction flag set by the user.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PanelState {
    #[default]
    Normal,
    Obstructed { height: f64 },
}

/// A generated panel of an array.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrayPanel {
    pub footprint: Footprint,
    pub row: usize,
    pub col: usize,
    /// Shared by the two panels of an east-west unit.
    pub pair_index: Option<usize>,
    pub facing: Option<Facing>,
    pub state: PanelState,
}

/// An independently positioned, resizable rectangular block of panels.
///
/// Pure value: owned by the array manager, referred to elsewhere only by
/// [`ArrayId`].
#[derive(Debug, Clone)]
pub struct Array {
    pub(super) id: ArrayId,
    pub(super) origin: GeoPoint,
    pub(super) rotation: f64,
    pub(super) extents: Extents,
    pub(super) state: ArrayState,
    pub(super) panels: Vec<ArrayPanel>,
}

impl Array {
    pub(super) fn new(id: ArrayId, origin: GeoPoint) -> Self {
        Self {
            id,
            origin,
            rotation: 0.0,
            extents: Extents::default(),
            state: ArrayState::Creating,
            panels: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> ArrayId {
        self.id
    }

    #[must_use]
    pub fn origin(&self) -> GeoPoint {
        self.origin
    }

    /// Degrees relative to the building heading, one of 0, 90, 180, 270.
    #[must_use]
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    #[must_use]
    pub fn extents(&self) -> Extents {
        self.extents
    }

    #[must_use]
    pub fn state(&self) -> ArrayState {
        self.state
    }

    /// `left + 1 + right`.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.extents.left.saturating_add(1).saturating_add(self.extents.right)
    }

    /// `up + 1 + down`.
    #[must_use]
    pub fn cols(&self) -> usize {
        self.extents.up.saturating_add(1).saturating_add(self.extents.down)
    }

    /// Panels that passed placement, in generation order.
    #[must_use]
    pub fn panels(&self) -> &[ArrayPanel] {
        &self.panels
    }

    #[must_use]
    pub fn panel(&self, row: usize, col: usize) -> Option<&ArrayPanel> {
        self.panels.iter().find(|p| p.row == row && p.col == col)
    }
}
