use std::collections::HashMap;

use slotmap::SlotMap;

use crate::error::{ArrayError, Result};
use crate::geodesy::GeodesyProvider;
use crate::geometry::panel::non_negative;
use crate::geometry::{BuildingOutline, Facing, GeoPoint, Obstruction, PanelSpec, Polygon, SystemMode};

use super::{Array, ArrayId, ArrayPanel, ArrayState, Direction, Extents, PanelPlacement, PanelState, MAX_EXTENT};

/// Owns every array placed on one building outline.
///
/// Arrays live in a generational arena and are addressed by [`ArrayId`].
/// Creation order is tracked separately so reconciliation can replay arrays
/// oldest first. Every edit regenerates only the affected array.
#[derive(Debug)]
pub struct ArrayManager<G> {
    arrays: SlotMap<ArrayId, Array>,
    order: Vec<ArrayId>,
    outline: BuildingOutline,
    setback: Polygon,
    obstructions: Vec<Obstruction>,
    spec: PanelSpec,
    mode: SystemMode,
    geodesy: G,
}

impl<G: GeodesyProvider> ArrayManager<G> {
    /// Creates an empty manager for a finalized outline and its inward setback.
    #[must_use]
    pub fn new(outline: BuildingOutline, setback: Polygon, spec: PanelSpec, geodesy: G) -> Self {
        Self {
            arrays: SlotMap::with_key(),
            order: Vec::new(),
            outline,
            setback,
            obstructions: Vec::new(),
            spec,
            mode: SystemMode::NorthSouth,
            geodesy,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: SystemMode) -> Self {
        self.mode = mode;
        self
    }

    // --- Accessors ---

    #[must_use]
    pub fn outline(&self) -> &BuildingOutline {
        &self.outline
    }

    #[must_use]
    pub fn setback(&self) -> &Polygon {
        &self.setback
    }

    #[must_use]
    pub fn obstructions(&self) -> &[Obstruction] {
        &self.obstructions
    }

    #[must_use]
    pub fn spec(&self) -> PanelSpec {
        self.spec
    }

    #[must_use]
    pub fn mode(&self) -> SystemMode {
        self.mode
    }

    #[must_use]
    pub fn geodesy(&self) -> &G {
        &self.geodesy
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Arrays in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Array> + '_ {
        self.order.iter().filter_map(|id| self.arrays.get(*id))
    }

    /// Returns the array, or an error if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `ArrayError::ArrayNotFound` for an unknown or deleted id.
    pub fn get(&self, id: ArrayId) -> Result<&Array> {
        self.arrays.get(id).ok_or_else(|| ArrayError::ArrayNotFound.into())
    }

    fn get_mut(&mut self, id: ArrayId) -> Result<&mut Array> {
        self.arrays
            .get_mut(id)
            .ok_or_else(|| ArrayError::ArrayNotFound.into())
    }

    // --- Lifecycle ---

    /// Starts a new single-panel array at `origin` in the `Creating` state.
    pub fn create(&mut self, origin: GeoPoint) -> ArrayId {
        let id = self.arrays.insert_with_key(|id| Array::new(id, origin));
        self.order.push(id);
        self.regenerate(id, None);
        tracing::debug!(?id, lat = origin.lat, lng = origin.lng, "array created");
        id
    }

    /// Finishes creation, or leaves the selected state.
    ///
    /// # Errors
    ///
    /// Returns `ArrayError::ArrayNotFound` for an unknown id.
    pub fn activate(&mut self, id: ArrayId) -> Result<()> {
        self.get_mut(id)?.state = ArrayState::Active;
        Ok(())
    }

    /// Selects one array; any other selected array becomes active.
    ///
    /// # Errors
    ///
    /// Returns `ArrayError::ArrayNotFound` for an unknown id.
    pub fn select(&mut self, id: ArrayId) -> Result<()> {
        self.get(id)?;
        for (key, array) in &mut self.arrays {
            if key == id {
                array.state = ArrayState::Selected;
            } else if array.state == ArrayState::Selected {
                array.state = ArrayState::Active;
            }
        }
        Ok(())
    }

    /// Re-enters editing: the array becomes active again.
    ///
    /// # Errors
    ///
    /// Returns `ArrayError::ArrayNotFound` for an unknown id.
    pub fn edit(&mut self, id: ArrayId) -> Result<()> {
        self.activate(id)
    }

    /// Removes an array and returns it.
    ///
    /// # Errors
    ///
    /// Returns `ArrayError::ArrayNotFound` for an unknown id.
    pub fn delete(&mut self, id: ArrayId) -> Result<Array> {
        let array = self.arrays.remove(id).ok_or(ArrayError::ArrayNotFound)?;
        self.order.retain(|k| *k != id);
        tracing::debug!(?id, "array deleted");
        Ok(array)
    }

    /// Removes every array.
    pub fn clear(&mut self) {
        self.arrays.clear();
        self.order.clear();
    }

    /// Replaces the outline; all arrays belong to the old one and are dropped.
    pub fn set_outline(&mut self, outline: BuildingOutline, setback: Polygon) {
        self.outline = outline;
        self.setback = setback;
        self.clear();
    }

    /// Replaces the obstruction set and regenerates every array.
    pub fn set_obstructions(&mut self, obstructions: Vec<Obstruction>) {
        self.obstructions = obstructions;
        for id in self.order.clone() {
            let extents = self.arrays.get(id).map(|a| a.extents);
            self.regenerate(id, extents);
        }
    }

    // --- Shape edits ---

    /// Grows the array by `count` panels in `direction`.
    ///
    /// # Errors
    ///
    /// - `ArrayError::ArrayNotFound` for an unknown id
    /// - `ArrayError::ExtentTooLarge` if the result would exceed [`MAX_EXTENT`]
    pub fn extend(&mut self, id: ArrayId, direction: Direction, count: usize) -> Result<()> {
        let current = self.get(id)?.extents.get(direction);
        let requested = current.checked_add(count).ok_or(ArrayError::ExtentTooLarge {
            requested: usize::MAX,
            max: MAX_EXTENT,
        })?;
        self.set_extent(id, direction, requested)
    }

    /// Shrinks the array by `count` panels in `direction`, stopping at zero.
    ///
    /// # Errors
    ///
    /// Returns `ArrayError::ArrayNotFound` for an unknown id.
    pub fn shrink(&mut self, id: ArrayId, direction: Direction, count: usize) -> Result<()> {
        let current = self.get(id)?.extents.get(direction);
        self.set_extent(id, direction, current.saturating_sub(count))
    }

    /// Sets the panel count beyond the origin in `direction`. The array is
    /// left untouched when `count` is rejected.
    ///
    /// # Errors
    ///
    /// - `ArrayError::ArrayNotFound` for an unknown id
    /// - `ArrayError::ExtentTooLarge` if `count` exceeds [`MAX_EXTENT`]
    pub fn set_extent(&mut self, id: ArrayId, direction: Direction, count: usize) -> Result<()> {
        let extents = &mut self.get_mut(id)?.extents;
        if count > MAX_EXTENT {
            tracing::warn!(?id, requested = count, max = MAX_EXTENT, "array extent rejected");
            return Err(ArrayError::ExtentTooLarge {
                requested: count,
                max: MAX_EXTENT,
            }
            .into());
        }
        let previous = *extents;
        extents.set(direction, count);
        self.regenerate(id, Some(previous));
        Ok(())
    }

    /// Turns the array a quarter turn. All four extents reset to zero.
    ///
    /// # Errors
    ///
    /// Returns `ArrayError::ArrayNotFound` for an unknown id.
    pub fn rotate(&mut self, id: ArrayId) -> Result<()> {
        let array = self.get_mut(id)?;
        array.rotation = (array.rotation + 90.0) % 360.0;
        array.extents = Extents::default();
        self.regenerate(id, None);
        Ok(())
    }

    /// Moves the array origin. Panel obstruction marks do not follow the move.
    ///
    /// # Errors
    ///
    /// Returns `ArrayError::ArrayNotFound` for an unknown id.
    pub fn move_to(&mut self, id: ArrayId, origin: GeoPoint) -> Result<()> {
        self.get_mut(id)?.origin = origin;
        self.regenerate(id, None);
        Ok(())
    }

    // --- Panel edits ---

    /// Marks one panel (and its east-west partner) obstructed at `height` meters.
    ///
    /// # Errors
    ///
    /// - `ArrayError::ArrayNotFound` for an unknown id
    /// - `ArrayError::PanelNotFound` if no panel sits at `(row, col)`
    /// - `ConfigError::Negative` for a negative height
    pub fn mark_panel_obstructed(&mut self, id: ArrayId, row: usize, col: usize, height: f64) -> Result<()> {
        non_negative("obstruction height", height)?;
        self.set_panel_state(id, row, col, PanelState::Obstructed { height })
    }

    /// Clears the obstruction mark on one panel (and its east-west partner).
    ///
    /// # Errors
    ///
    /// - `ArrayError::ArrayNotFound` for an unknown id
    /// - `ArrayError::PanelNotFound` if no panel sits at `(row, col)`
    pub fn clear_panel_obstruction(&mut self, id: ArrayId, row: usize, col: usize) -> Result<()> {
        self.set_panel_state(id, row, col, PanelState::Normal)
    }

    fn set_panel_state(&mut self, id: ArrayId, row: usize, col: usize, state: PanelState) -> Result<()> {
        let array = self.get_mut(id)?;
        let pair_index = array
            .panel(row, col)
            .ok_or(ArrayError::PanelNotFound { row, col })?
            .pair_index;
        for panel in &mut array.panels {
            let same_unit = match pair_index {
                Some(pair) => panel.pair_index == Some(pair),
                None => panel.row == row && panel.col == col,
            };
            if same_unit {
                panel.state = state;
            }
        }
        Ok(())
    }

    // --- Placement ---

    /// Placement operation bound to this manager's outline, obstructions and spec.
    #[must_use]
    pub fn placement(&self) -> PanelPlacement<'_, G> {
        PanelPlacement::new(
            self.outline.polygon(),
            &self.setback,
            &self.obstructions,
            self.spec,
            self.mode,
            self.outline.heading(),
            &self.geodesy,
        )
    }

    /// Footprints an array would get with the current outline and obstructions.
    #[must_use]
    pub fn generate_panels(&self, array: &Array) -> Vec<ArrayPanel> {
        self.placement().execute(array)
    }

    /// Recomputes one array's panels. `previous` holds the extents the
    /// current panels were generated with; when given, panels that keep their
    /// offset from the origin keep their obstruction state.
    fn regenerate(&mut self, id: ArrayId, previous: Option<Extents>) {
        let Some(array) = self.arrays.get(id) else {
            return;
        };
        let mut panels = self.generate_panels(array);

        if let Some(previous) = previous {
            let marks: HashMap<(isize, isize, Option<Facing>), PanelState> = array
                .panels
                .iter()
                .filter(|p| p.state != PanelState::Normal)
                .map(|p| (origin_offset(previous, p), p.state))
                .collect();
            for panel in &mut panels {
                if let Some(state) = marks.get(&origin_offset(array.extents, panel)) {
                    panel.state = *state;
                }
            }
        }

        if let Some(array) = self.arrays.get_mut(id) {
            tracing::debug!(?id, rows = array.rows(), cols = array.cols(), placed = panels.len(), "array regenerated");
            array.panels = panels;
        }
    }
}

/// Position of a panel relative to the origin panel given the extents it was
/// generated with. Stable across extent edits.
#[allow(clippy::cast_possible_wrap)]
fn origin_offset(extents: Extents, panel: &ArrayPanel) -> (isize, isize, Option<Facing>) {
    let unit_col = if panel.facing.is_some() { panel.col / 2 } else { panel.col };
    (
        panel.row as isize - extents.left as isize,
        unit_col as isize - extents.up as isize,
        panel.facing,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::error::LayoutError;
    use crate::geodesy::SphericalGeodesy;
    use crate::geometry::EastWestSpec;
    use crate::math::{LocalFrame, Point2};
    use crate::operations::offset::InwardSetback;

    fn frame() -> LocalFrame {
        LocalFrame::east_north(GeoPoint::new(38.75, -121.25))
    }

    fn local_polygon(pts: &[(f64, f64)]) -> Polygon {
        let f = frame();
        Polygon::new(pts.iter().map(|&(x, y)| f.to_geo(Point2::new(x, y))).collect())
    }

    fn manager() -> ArrayManager<SphericalGeodesy> {
        let g = SphericalGeodesy::new();
        let outline = BuildingOutline::new(
            local_polygon(&[(0.0, 0.0), (40.0, 0.0), (40.0, 30.0), (0.0, 30.0)]),
            &g,
        )
        .unwrap();
        let setback = InwardSetback::new(outline.polygon(), 1.0).execute();
        let spec = PanelSpec::new(1.0, 1.7, 0.0, 0.0).unwrap();
        ArrayManager::new(outline, setback, spec, g)
    }

    fn center() -> GeoPoint {
        frame().to_geo(Point2::new(20.0, 15.0))
    }

    #[test]
    fn create_starts_with_one_panel() {
        let mut m = manager();
        let id = m.create(center());
        let array = m.get(id).unwrap();
        assert_eq!(array.state(), ArrayState::Creating);
        assert_eq!((array.rows(), array.cols()), (1, 1));
        assert_eq!(array.panels().len(), 1);
        assert!(array.rotation().abs() < 1e-12);
    }

    #[test]
    fn three_by_two_array() {
        let mut m = manager();
        let id = m.create(center());
        m.extend(id, Direction::Left, 1).unwrap();
        m.extend(id, Direction::Right, 1).unwrap();
        m.extend(id, Direction::Down, 1).unwrap();
        let array = m.get(id).unwrap();
        assert_eq!((array.rows(), array.cols()), (3, 2));
        assert_eq!(array.panels().len(), 6);
        assert!(array.panel(2, 1).is_some());
    }

    #[test]
    fn shrink_stops_at_zero() {
        let mut m = manager();
        let id = m.create(center());
        m.shrink(id, Direction::Up, 3).unwrap();
        assert_eq!(m.get(id).unwrap().extents().up, 0);
    }

    #[test]
    fn panels_outside_setback_are_dropped() {
        let mut m = manager();
        let id = m.create(frame().to_geo(Point2::new(34.5, 15.0)));
        m.set_extent(id, Direction::Right, 10).unwrap();
        let array = m.get(id).unwrap();
        // x 34.5..38.5 fits inside the 1 m setback; further east does not.
        assert_eq!(array.panels().len(), 4);
        assert_eq!(array.rows(), 11);
    }

    #[test]
    fn obstruction_clearance_blocks_panels() {
        let mut m = manager();
        let id = m.create(center());
        m.set_extent(id, Direction::Right, 5).unwrap();
        assert_eq!(m.get(id).unwrap().panels().len(), 6);

        let hvac = Obstruction::new(
            local_polygon(&[(24.0, 14.0), (26.0, 14.0), (26.0, 16.0), (24.0, 16.0)]),
            1.5,
            0.5,
        );
        m.set_obstructions(vec![hvac]);
        let array = m.get(id).unwrap();
        assert_eq!(array.panels().len(), 3);
        assert!(array.panels().iter().all(|p| p.row < 3));
    }

    #[test]
    fn oversized_extents_are_rejected() {
        let mut m = manager();
        let id = m.create(center());
        m.extend(id, Direction::Right, 3).unwrap();
        assert!(matches!(
            m.extend(id, Direction::Left, usize::MAX),
            Err(LayoutError::Array(ArrayError::ExtentTooLarge { max: MAX_EXTENT, .. }))
        ));
        assert!(matches!(
            m.set_extent(id, Direction::Down, MAX_EXTENT + 1),
            Err(LayoutError::Array(ArrayError::ExtentTooLarge { requested, .. })) if requested == MAX_EXTENT + 1
        ));
        let array = m.get(id).unwrap();
        assert_eq!(array.extents(), Extents { right: 3, ..Extents::default() });
        assert_eq!(array.panels().len(), 4);
    }

    #[test]
    fn select_demotes_other_arrays() {
        let mut m = manager();
        let a = m.create(center());
        let b = m.create(frame().to_geo(Point2::new(10.0, 10.0)));
        m.activate(a).unwrap();
        m.activate(b).unwrap();
        m.select(a).unwrap();
        m.select(b).unwrap();
        assert_eq!(m.get(a).unwrap().state(), ArrayState::Active);
        assert_eq!(m.get(b).unwrap().state(), ArrayState::Selected);
        m.edit(b).unwrap();
        assert_eq!(m.get(b).unwrap().state(), ArrayState::Active);
    }

    #[test]
    fn delete_and_iteration_order() {
        let mut m = manager();
        let a = m.create(center());
        let b = m.create(frame().to_geo(Point2::new(10.0, 10.0)));
        let c = m.create(frame().to_geo(Point2::new(30.0, 20.0)));
        let ids: Vec<_> = m.iter().map(Array::id).collect();
        assert_eq!(ids, vec![a, b, c]);

        m.delete(b).unwrap();
        assert_eq!(m.len(), 2);
        assert!(matches!(m.get(b), Err(LayoutError::Array(ArrayError::ArrayNotFound))));
        assert!(m.delete(b).is_err());
        assert!(m.extend(b, Direction::Up, 1).is_err());

        m.clear();
        assert!(m.is_empty());
    }

    #[test]
    fn move_regenerates_footprints() {
        let mut m = manager();
        let id = m.create(center());
        let before = m.get(id).unwrap().panels()[0].footprint;
        let target = frame().to_geo(Point2::new(10.0, 10.0));
        m.move_to(id, target).unwrap();
        let after = m.get(id).unwrap().panels()[0].footprint;
        assert_ne!(before, after);
        assert_eq!(after.corners[0], target);
    }

    #[test]
    fn obstruction_marks_follow_extent_edits() {
        let mut m = manager();
        let id = m.create(center());
        m.set_extent(id, Direction::Right, 2).unwrap();
        m.mark_panel_obstructed(id, 1, 0, 1.1).unwrap();
        m.extend(id, Direction::Left, 1).unwrap();
        let array = m.get(id).unwrap();
        assert_eq!(array.panel(2, 0).unwrap().state, PanelState::Obstructed { height: 1.1 });
        assert_eq!(array.panel(1, 0).unwrap().state, PanelState::Normal);

        m.clear_panel_obstruction(id, 2, 0).unwrap();
        assert_eq!(m.get(id).unwrap().panel(2, 0).unwrap().state, PanelState::Normal);
        assert!(matches!(
            m.mark_panel_obstructed(id, 9, 9, 1.0),
            Err(LayoutError::Array(ArrayError::PanelNotFound { row: 9, col: 9 }))
        ));
    }

    #[test]
    fn east_west_marks_whole_pair() {
        let mut m = manager().with_mode(SystemMode::EastWest(EastWestSpec {
            ridge_gap: 0.15,
            valley_gap: 0.2,
            roof_clearance: 0.08,
        }));
        let id = m.create(center());
        let array = m.get(id).unwrap();
        assert_eq!(array.panels().len(), 2);
        assert_eq!(array.panels()[0].pair_index, array.panels()[1].pair_index);

        m.mark_panel_obstructed(id, 0, 1, 0.7).unwrap();
        let array = m.get(id).unwrap();
        assert!(array
            .panels()
            .iter()
            .all(|p| p.state == PanelState::Obstructed { height: 0.7 }));
    }

    #[test]
    fn changing_outline_drops_arrays() {
        let mut m = manager();
        m.create(center());
        let outline = m.outline().clone();
        let setback = m.setback().clone();
        m.set_outline(outline, setback);
        assert!(m.is_empty());
    }

    fn direction() -> impl Strategy<Value = Direction> {
        prop::sample::select(Direction::ALL.to_vec())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn extend_then_shrink_restores(dir in direction(), start in 0usize..4, n in 0usize..6) {
            let mut m = manager();
            let id = m.create(center());
            m.set_extent(id, dir, start).unwrap();
            let before = m.get(id).unwrap().extents();
            m.extend(id, dir, n).unwrap();
            m.shrink(id, dir, n).unwrap();
            let array = m.get(id).unwrap();
            prop_assert_eq!(array.extents(), before);
            prop_assert_eq!(array.rows(), before.left + 1 + before.right);
        }

        #[test]
        fn four_rotations_restore_rotation(extents in prop::array::uniform4(0usize..3)) {
            let mut m = manager();
            let id = m.create(center());
            for _ in 0..4 {
                for (dir, count) in Direction::ALL.into_iter().zip(extents) {
                    m.set_extent(id, dir, count).unwrap();
                }
                m.rotate(id).unwrap();
                prop_assert_eq!(m.get(id).unwrap().extents(), Extents::default());
            }
            prop_assert!(m.get(id).unwrap().rotation().abs() < 1e-9);
        }
    }
}
