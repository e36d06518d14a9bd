//! Multi-selection state: the selected set plus an in-progress marquee box.

use bevy::prelude::*;
use std::collections::HashSet;

use crate::core::voxel::VoxelId;

pub type SelectionSet = HashSet<VoxelId>;

/// Marquee corners in viewport-local pixels, stored raw (not min/max).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionBox {
    pub start_x: f32,
    pub start_y: f32,
    pub end_x: f32,
    pub end_y: f32,
}

impl SelectionBox {
    pub fn at(point: Vec2) -> Self {
        Self {
            start_x: point.x,
            start_y: point.y,
            end_x: point.x,
            end_y: point.y,
        }
    }

    /// Normalized rectangle spanned by the two corners.
    pub fn rect(&self) -> Rect {
        Rect::new(self.start_x, self.start_y, self.end_x, self.end_y)
    }

    pub fn is_degenerate(&self) -> bool {
        self.start_x == self.end_x || self.start_y == self.end_y
    }
}

/// Axis-aligned element bounds, shaped like a DOM bounding rect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl From<Rect> for ElementBounds {
    fn from(rect: Rect) -> Self {
        Self {
            x: rect.min.x,
            y: rect.min.y,
            width: rect.width(),
            height: rect.height(),
        }
    }
}

/// True unless `bounds` lies entirely to one side of the normalized box.
/// Touching edges count as intersecting.
pub fn is_in_selection_box(bounds: ElementBounds, selection: &SelectionBox) -> bool {
    let left = selection.start_x.min(selection.end_x);
    let right = selection.start_x.max(selection.end_x);
    let top = selection.start_y.min(selection.end_y);
    let bottom = selection.start_y.max(selection.end_y);

    let el_right = bounds.x + bounds.width;
    let el_bottom = bounds.y + bounds.height;

    !(bounds.x > right || el_right < left || bounds.y > bottom || el_bottom < top)
}

/// Selected IDs and marquee state.
///
/// Every mutation returns a fresh copy of the resulting set; callers forward
/// it as the selection-changed notification.
#[derive(Debug, Clone)]
pub struct MultiSelection {
    selected: SelectionSet,
    selection_box: Option<SelectionBox>,
    enable_marquee: bool,
}

impl Default for MultiSelection {
    fn default() -> Self {
        Self::new(true)
    }
}

impl MultiSelection {
    pub fn new(enable_marquee: bool) -> Self {
        Self {
            selected: SelectionSet::new(),
            selection_box: None,
            enable_marquee,
        }
    }

    pub fn selected(&self) -> &SelectionSet {
        &self.selected
    }

    pub fn is_selected(&self, id: &VoxelId) -> bool {
        self.selected.contains(id)
    }

    pub fn is_selecting(&self) -> bool {
        self.selection_box.is_some()
    }

    pub fn selection_box(&self) -> Option<&SelectionBox> {
        self.selection_box.as_ref()
    }

    pub fn set_marquee_enabled(&mut self, enabled: bool) {
        self.enable_marquee = enabled;
        if !enabled {
            self.selection_box = None;
        }
    }

    /// Replaces the set without producing a notification. Used to adopt an
    /// externally owned selection.
    pub fn replace(&mut self, ids: SelectionSet) {
        self.selected = ids;
    }

    /// Exclusive select, or flip membership when `additive`.
    pub fn toggle_selection(&mut self, id: &VoxelId, additive: bool) -> SelectionSet {
        if !additive {
            self.selected.clear();
            self.selected.insert(id.clone());
        } else if !self.selected.remove(id) {
            self.selected.insert(id.clone());
        }
        self.selected.clone()
    }

    pub fn clear_selection(&mut self) -> SelectionSet {
        self.selected.clear();
        SelectionSet::new()
    }

    pub fn select_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a VoxelId>) -> SelectionSet {
        self.selected = ids.into_iter().cloned().collect();
        self.selected.clone()
    }

    /// Selects the inclusive slice of `ordered` between the two IDs, in either
    /// direction. `None` (and no change) if either ID is missing.
    pub fn select_range(
        &mut self,
        start: &VoxelId,
        end: &VoxelId,
        ordered: &[VoxelId],
    ) -> Option<SelectionSet> {
        let start_index = ordered.iter().position(|id| id == start)?;
        let end_index = ordered.iter().position(|id| id == end)?;
        let (lo, hi) = (start_index.min(end_index), start_index.max(end_index));
        Some(self.select_all(&ordered[lo..=hi]))
    }

    /// Begins a marquee at `pointer` relative to `container`.
    pub fn start_marquee_selection(&mut self, pointer: Vec2, container: Rect) {
        if !self.enable_marquee {
            return;
        }
        self.selection_box = Some(SelectionBox::at(pointer - container.min));
        debug!("[MARQUEE] start at {:?}", pointer - container.min);
    }

    /// Moves only the end corner. Ignored when no marquee is active.
    pub fn update_marquee_selection(&mut self, pointer: Vec2, container: Rect) {
        let Some(selection) = self.selection_box.as_mut() else {
            return;
        };
        let local = pointer - container.min;
        selection.end_x = local.x;
        selection.end_y = local.y;
    }

    /// Leaves selecting state. Returns the final box, which is discarded.
    pub fn end_marquee_selection(&mut self) -> Option<SelectionBox> {
        self.selection_box.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> VoxelId {
        VoxelId::new(s)
    }

    fn set(ids: &[&str]) -> SelectionSet {
        ids.iter().map(|s| id(s)).collect()
    }

    #[test]
    fn exclusive_toggle_leaves_exactly_one() {
        let mut sel = MultiSelection::default();
        sel.select_all(&[id("a"), id("b"), id("c")]);
        let out = sel.toggle_selection(&id("z"), false);
        assert_eq!(out, set(&["z"]));
        assert_eq!(sel.selected(), &set(&["z"]));
        // already selected, still exactly one
        assert_eq!(sel.toggle_selection(&id("z"), false), set(&["z"]));
    }

    #[test]
    fn additive_toggle_twice_is_identity() {
        let mut sel = MultiSelection::default();
        sel.select_all(&[id("a"), id("b")]);
        let before = sel.selected().clone();
        let once = sel.toggle_selection(&id("c"), true);
        assert_eq!(once, set(&["a", "b", "c"]));
        let twice = sel.toggle_selection(&id("c"), true);
        assert_eq!(twice, before);
        sel.toggle_selection(&id("a"), true);
        sel.toggle_selection(&id("a"), true);
        assert_eq!(sel.selected(), &before);
    }

    #[test]
    fn select_all_collapses_duplicates() {
        let mut sel = MultiSelection::default();
        let out = sel.select_all(&[id("a"), id("a"), id("b")]);
        assert_eq!(out.len(), 2);
        assert!(sel.clear_selection().is_empty());
        assert!(sel.selected().is_empty());
    }

    #[test]
    fn range_works_in_both_directions() {
        let ordered: Vec<_> = ["a", "b", "c", "d", "e"].iter().map(|s| id(s)).collect();
        let mut sel = MultiSelection::default();
        assert_eq!(sel.select_range(&id("b"), &id("d"), &ordered), Some(set(&["b", "c", "d"])));
        sel.clear_selection();
        assert_eq!(sel.select_range(&id("d"), &id("b"), &ordered), Some(set(&["b", "c", "d"])));
        assert_eq!(sel.select_range(&id("c"), &id("c"), &ordered), Some(set(&["c"])));
    }

    #[test]
    fn range_with_missing_id_is_a_no_op() {
        let ordered = vec![id("a"), id("b")];
        let mut sel = MultiSelection::default();
        sel.toggle_selection(&id("a"), false);
        assert_eq!(sel.select_range(&id("a"), &id("nope"), &ordered), None);
        assert_eq!(sel.selected(), &set(&["a"]));
    }

    #[test]
    fn marquee_tracks_end_corner_relative_to_container() {
        let mut sel = MultiSelection::default();
        let container = Rect::new(100.0, 50.0, 900.0, 650.0);
        assert!(!sel.is_selecting());
        sel.start_marquee_selection(Vec2::new(150.0, 80.0), container);
        assert_eq!(sel.selection_box(), Some(&SelectionBox::at(Vec2::new(50.0, 30.0))));
        sel.update_marquee_selection(Vec2::new(120.0, 60.0), container);
        let b = *sel.selection_box().unwrap();
        assert_eq!((b.start_x, b.start_y, b.end_x, b.end_y), (50.0, 30.0, 20.0, 10.0));
        assert_eq!(sel.end_marquee_selection(), Some(b));
        assert!(!sel.is_selecting());
        assert!(sel.selection_box().is_none());
    }

    #[test]
    fn marquee_disabled_never_starts() {
        let mut sel = MultiSelection::new(false);
        sel.start_marquee_selection(Vec2::ZERO, Rect::new(0.0, 0.0, 10.0, 10.0));
        sel.update_marquee_selection(Vec2::ONE, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(!sel.is_selecting());
    }

    #[test]
    fn selection_box_test_is_direction_independent() {
        let forward = SelectionBox { start_x: 10.0, start_y: 10.0, end_x: 100.0, end_y: 80.0 };
        let backward = SelectionBox { start_x: 100.0, start_y: 80.0, end_x: 10.0, end_y: 10.0 };
        let inside = ElementBounds { x: 40.0, y: 30.0, width: 10.0, height: 10.0 };
        let straddling = ElementBounds { x: 95.0, y: 75.0, width: 30.0, height: 30.0 };
        let touching = ElementBounds { x: 100.0, y: 20.0, width: 5.0, height: 5.0 };
        let outside = ElementBounds { x: 200.0, y: 30.0, width: 10.0, height: 10.0 };
        for b in [forward, backward] {
            assert!(is_in_selection_box(inside, &b));
            assert!(is_in_selection_box(straddling, &b));
            assert!(is_in_selection_box(touching, &b));
            assert!(!is_in_selection_box(outside, &b));
        }
    }
}
