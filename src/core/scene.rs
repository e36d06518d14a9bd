//! Scene controller: owns the camera, turns raw pointer/keyboard input into
//! camera moves or selection changes, and composes culling, selection and
//! block rendering for the current voxel collection.
//!
//! Outward notifications are queued as [`SceneEvent`]s and drained by the
//! caller after each batch of input.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::core::block::{render_block, BlockProps, BlockVisual};
use crate::core::camera::{project_block, unproject_to_grid, BlockProjection, CameraState, SceneLayout};
use crate::core::culling::{CullingOptions, ViewportCulling};
use crate::core::drag::{DragAndDrop, DragOptions};
use crate::core::selection::{is_in_selection_box, MultiSelection, SelectionBox, SelectionSet};
use crate::core::voxel::{GridPos, Voxel, VoxelId};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneConfig {
    pub enable_viewport_culling: bool,
    pub enable_multi_select: bool,
    pub draggable_blocks: bool,
    pub culling: CullingOptions,
    pub drag: DragOptions,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            enable_viewport_culling: true,
            enable_multi_select: true,
            draggable_blocks: false,
            culling: CullingOptions::default(),
            drag: DragOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        meta: false,
        alt: false,
    };

    /// The platform multi-select modifier: Ctrl or Cmd.
    pub fn multi(&self) -> bool {
        self.ctrl || self.meta
    }

    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.meta || self.alt
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    /// Carries the caller's record unmodified, metadata included.
    VoxelClicked(Voxel),
    /// The complete new selection, never a delta.
    SelectionChanged(SelectionSet),
    DragOver { id: VoxelId, position: Vec2 },
    Dropped { id: VoxelId, from: GridPos, to: GridPos },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraDragMode {
    Rotate,
    Pan,
}

/// Branch taken by a pointer gesture. Decided once, at pointer-down.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    Camera { mode: CameraDragMode, last: Vec2 },
    Marquee,
    Block { id: VoxelId, modifiers: Modifiers },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DraggedBlock {
    pub id: VoxelId,
    pub origin: GridPos,
    /// Block center relative to the dragged bounds' top-left.
    pub anchor: Vec2,
}

#[derive(Resource)]
pub struct SceneController {
    config: SceneConfig,
    layout: SceneLayout,
    camera: CameraState,
    voxels: Vec<Voxel>,
    index: HashMap<VoxelId, usize>,
    selection: MultiSelection,
    external_selection: Option<SelectionSet>,
    culling: ViewportCulling<Entity>,
    drag: DragAndDrop<DraggedBlock>,
    gesture: Option<Gesture>,
    pan_modifier_held: bool,
    /// Cleared by `unmount`; an unmounted scene ignores input.
    mounted: bool,
    events: Vec<SceneEvent>,
}

impl Default for SceneController {
    fn default() -> Self {
        Self::new(SceneConfig::default(), SceneLayout::default())
    }
}

impl SceneController {
    pub fn new(config: SceneConfig, layout: SceneLayout) -> Self {
        let culling = ViewportCulling::new(CullingOptions {
            enabled: config.enable_viewport_culling,
            ..config.culling
        });
        Self {
            config,
            layout,
            camera: CameraState::default(),
            voxels: Vec::new(),
            index: HashMap::new(),
            selection: MultiSelection::new(config.enable_multi_select),
            external_selection: None,
            culling,
            drag: DragAndDrop::new(config.drag),
            gesture: None,
            pan_modifier_held: false,
            mounted: true,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn layout(&self) -> &SceneLayout {
        &self.layout
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn gesture(&self) -> Option<&Gesture> {
        self.gesture.as_ref()
    }

    pub fn selection_box(&self) -> Option<&SelectionBox> {
        self.selection.selection_box()
    }

    pub fn drag(&self) -> &DragAndDrop<DraggedBlock> {
        &self.drag
    }

    pub fn culling(&self) -> &ViewportCulling<Entity> {
        &self.culling
    }

    pub fn culling_mut(&mut self) -> &mut ViewportCulling<Entity> {
        &mut self.culling
    }

    pub fn set_viewport(&mut self, viewport: Vec2) {
        self.layout.viewport = viewport;
    }

    /// Viewport-local rect of the scene container.
    pub fn container_rect(&self) -> Rect {
        Rect::from_corners(Vec2::ZERO, self.layout.viewport)
    }

    // ---- collection -------------------------------------------------------

    /// Replaces the rendered collection. The caller keeps ownership of the
    /// data; the scene only reads it.
    pub fn set_voxels(&mut self, voxels: Vec<Voxel>) {
        self.index = voxels
            .iter()
            .enumerate()
            .map(|(i, v)| (v.id.clone(), i))
            .collect();
        self.voxels = voxels;
        let dragged_gone = self
            .drag
            .state()
            .is_some_and(|s| !self.index.contains_key(&s.item.id));
        if dragged_gone {
            self.drag.cancel();
        }
    }

    pub fn voxels(&self) -> &[Voxel] {
        &self.voxels
    }

    pub fn voxel(&self, id: &VoxelId) -> Option<&Voxel> {
        self.index.get(id).and_then(|&i| self.voxels.get(i))
    }

    // ---- configuration ----------------------------------------------------

    pub fn set_multi_select_enabled(&mut self, enabled: bool) {
        self.config.enable_multi_select = enabled;
        self.selection.set_marquee_enabled(enabled);
        if !enabled && self.gesture == Some(Gesture::Marquee) {
            self.gesture = None;
        }
    }

    pub fn set_draggable(&mut self, draggable: bool) {
        self.config.draggable_blocks = draggable;
        if !draggable {
            self.drag.cancel();
        }
    }

    pub fn set_culling_enabled(&mut self, enabled: bool) {
        self.config.enable_viewport_culling = enabled;
        self.culling.set_enabled(enabled);
    }

    // ---- selection --------------------------------------------------------

    /// `Some` makes the given set authoritative for rendering. Changes are
    /// still computed internally (starting from that set) and reported.
    pub fn set_external_selection(&mut self, selection: Option<SelectionSet>) {
        if let Some(ids) = &selection {
            self.selection.replace(ids.clone());
        }
        self.external_selection = selection;
    }

    pub fn active_selection(&self) -> &SelectionSet {
        self.external_selection
            .as_ref()
            .unwrap_or_else(|| self.selection.selected())
    }

    pub fn is_selected(&self, id: &VoxelId) -> bool {
        self.active_selection().contains(id)
    }

    fn notify_selection(&mut self, set: SelectionSet) {
        info!("[SELECT] {} selected", set.len());
        self.events.push(SceneEvent::SelectionChanged(set));
    }

    pub fn toggle_selection(&mut self, id: &VoxelId, additive: bool) {
        let set = self.selection.toggle_selection(id, additive);
        self.notify_selection(set);
    }

    pub fn clear_selection(&mut self) {
        let set = self.selection.clear_selection();
        self.notify_selection(set);
    }

    pub fn select_all(&mut self) {
        let ids: Vec<VoxelId> = self.voxels.iter().map(|v| v.id.clone()).collect();
        let set = self.selection.select_all(&ids);
        self.notify_selection(set);
    }

    /// Range over the collection's order. Silent when either ID is absent.
    pub fn select_range(&mut self, start: &VoxelId, end: &VoxelId) {
        let ordered: Vec<VoxelId> = self.voxels.iter().map(|v| v.id.clone()).collect();
        if let Some(set) = self.selection.select_range(start, end, &ordered) {
            self.notify_selection(set);
        }
    }

    // ---- geometry ---------------------------------------------------------

    pub fn is_visible(&self, id: &VoxelId) -> bool {
        self.culling.is_visible(id)
    }

    pub fn projection(&self, voxel: &Voxel) -> BlockProjection {
        project_block(voxel.position, &self.camera, &self.layout)
    }

    /// Nearest visible voxel whose projected faces contain `point`.
    pub fn hit_test(&self, point: Vec2) -> Option<&Voxel> {
        self.voxels
            .iter()
            .filter(|v| self.is_visible(&v.id))
            .map(|v| (v, self.projection(v)))
            .filter(|(_, p)| p.contains(point))
            .max_by(|(_, a), (_, b)| a.depth.total_cmp(&b.depth))
            .map(|(v, _)| v)
    }

    /// Visible voxels whose screen bounds intersect the marquee.
    pub fn voxels_in_box(&self, selection: &SelectionBox) -> Vec<VoxelId> {
        self.voxels
            .iter()
            .filter(|v| self.is_visible(&v.id))
            .filter(|v| is_in_selection_box(self.projection(v).bounds.into(), selection))
            .map(|v| v.id.clone())
            .collect()
    }

    pub fn block_props(&self, voxel: &Voxel) -> BlockProps {
        BlockProps {
            id: voxel.id.clone(),
            position: voxel.position,
            variant: voxel.variant.clone(),
            material: voxel.material,
            selected: self.is_selected(&voxel.id),
            completed: voxel.completed,
            visible: self.is_visible(&voxel.id),
            draggable: self.config.draggable_blocks,
            dragging: self.drag.state().is_some_and(|s| s.item.id == voxel.id),
        }
    }

    /// Every block with its projection, back to front.
    pub fn render(&self) -> Vec<(BlockVisual, BlockProjection)> {
        let mut blocks: Vec<_> = self
            .voxels
            .iter()
            .map(|v| (render_block(&self.block_props(v)), self.projection(v)))
            .collect();
        blocks.sort_by(|(_, a), (_, b)| a.depth.total_cmp(&b.depth));
        blocks
    }

    /// Runs one culling observation pass over the registered blocks.
    pub fn observe_visibility(&mut self) -> usize {
        if !self.culling.is_enabled() {
            return 0;
        }
        let bounds: HashMap<Entity, Rect> = self
            .culling
            .registered()
            .filter_map(|(id, entity)| {
                let voxel = self.voxel(id)?;
                Some((entity, self.projection(voxel).bounds))
            })
            .collect();
        let viewport = self.container_rect();
        self.culling
            .observe_pass(viewport, |entity| bounds.get(&entity).copied())
    }

    // ---- camera -----------------------------------------------------------

    pub fn wheel(&mut self, delta_y: f32) {
        if !self.mounted {
            return;
        }
        self.camera.wheel(delta_y);
    }

    pub fn zoom_in(&mut self) {
        self.camera.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.camera.zoom_out();
    }

    pub fn reset_view(&mut self) {
        self.camera.reset();
        debug!("[CAMERA] reset");
    }

    // ---- pointer ----------------------------------------------------------

    /// Primary-button press at a viewport-local position.
    pub fn pointer_down(&mut self, position: Vec2, modifiers: Modifiers) {
        if !self.mounted || self.gesture.is_some() {
            return;
        }
        let hit = self.hit_test(position).map(|v| (v.id.clone(), v.position, self.projection(v)));
        match hit {
            Some((id, grid, projection)) => {
                // a block press never reaches the background branch
                if self.config.enable_multi_select {
                    self.toggle_selection(&id, modifiers.multi());
                }
                if self.config.draggable_blocks {
                    let bounds = projection.bounds;
                    self.drag.start(
                        position,
                        bounds,
                        DraggedBlock {
                            id: id.clone(),
                            origin: grid,
                            anchor: projection.center - bounds.min,
                        },
                    );
                }
                self.gesture = Some(Gesture::Block { id, modifiers });
            }
            None if self.config.enable_multi_select && !modifiers.any() => {
                let container = self.container_rect();
                self.selection.start_marquee_selection(position, container);
                self.gesture = Some(Gesture::Marquee);
            }
            None => self.begin_camera_drag(position, modifiers),
        }
    }

    /// Starts a camera drag regardless of what is under the pointer.
    pub fn begin_camera_drag(&mut self, position: Vec2, modifiers: Modifiers) {
        if !self.mounted || self.gesture.is_some() {
            return;
        }
        let mode = if self.pan_modifier_held || modifiers.shift {
            CameraDragMode::Pan
        } else {
            CameraDragMode::Rotate
        };
        debug!("[CAMERA] {:?} drag from {:?}", mode, position);
        self.gesture = Some(Gesture::Camera {
            mode,
            last: position,
        });
    }

    pub fn pointer_move(&mut self, position: Vec2) {
        let container = self.container_rect();
        match self.gesture.as_mut() {
            Some(Gesture::Camera { mode, last }) => {
                let delta = position - *last;
                *last = position;
                match mode {
                    CameraDragMode::Rotate => self.camera.rotate_by(delta),
                    CameraDragMode::Pan => self.camera.pan_by(delta),
                }
            }
            Some(Gesture::Marquee) => {
                self.selection.update_marquee_selection(position, container);
            }
            Some(Gesture::Block { id, .. }) => {
                let id = id.clone();
                if let Some(snapped) = self.drag.drag_move(position) {
                    self.events.push(SceneEvent::DragOver { id, position: snapped });
                }
            }
            None => {}
        }
    }

    /// Release anywhere ends the gesture.
    pub fn pointer_up(&mut self, position: Vec2) {
        let Some(gesture) = self.gesture.take() else {
            return;
        };
        match gesture {
            Gesture::Camera { mode, .. } => {
                debug!("[CAMERA] {:?} drag end, {:?}", mode, self.camera);
            }
            Gesture::Marquee => {
                let Some(selection) = self.selection.end_marquee_selection() else {
                    return;
                };
                if selection.is_degenerate() {
                    return;
                }
                let ids = self.voxels_in_box(&selection);
                let set = self.selection.select_all(&ids);
                self.notify_selection(set);
            }
            Gesture::Block { id, modifiers } => {
                let released_on = self.hit_test(position).map(|v| v.id.clone());
                if released_on.as_ref() == Some(&id) && !modifiers.any() {
                    if let Some(voxel) = self.voxel(&id).cloned() {
                        info!("[CLICK] voxel {}", voxel.id);
                        self.events.push(SceneEvent::VoxelClicked(voxel));
                    }
                }
                self.finish_block_drag(position);
            }
        }
    }

    fn finish_block_drag(&mut self, position: Vec2) {
        let Some(end) = self.drag.end(position) else {
            return;
        };
        // cell from the unsnapped point; snapping only shapes drag-over
        let block = end.item;
        let center = end.raw_position + block.anchor;
        match unproject_to_grid(center, block.origin.z, &self.camera, &self.layout) {
            Some(to) if to != block.origin => {
                info!("[DROP] voxel {} {:?} -> {:?}", block.id, block.origin, to);
                self.events.push(SceneEvent::Dropped {
                    id: block.id,
                    from: block.origin,
                    to,
                });
            }
            Some(_) => {}
            None => warn!("[DROP] voxel {} dropped on an edge-on plane, ignored", block.id),
        }
    }

    /// Abandons the current gesture without completing it.
    pub fn cancel_gesture(&mut self) {
        self.gesture = None;
        self.selection.end_marquee_selection();
        self.drag.cancel();
    }

    // ---- keyboard ---------------------------------------------------------

    pub fn key_down(&mut self, key: KeyCode, modifiers: Modifiers) {
        if !self.mounted {
            return;
        }
        match key {
            KeyCode::ShiftLeft | KeyCode::ShiftRight => self.pan_modifier_held = true,
            KeyCode::Escape if self.config.enable_multi_select => self.clear_selection(),
            KeyCode::KeyA if modifiers.multi() && self.config.enable_multi_select => {
                self.select_all();
            }
            KeyCode::Equal | KeyCode::NumpadAdd => self.zoom_in(),
            KeyCode::Minus | KeyCode::NumpadSubtract => self.zoom_out(),
            KeyCode::Digit0 | KeyCode::Numpad0 => self.reset_view(),
            _ => {}
        }
    }

    pub fn key_up(&mut self, key: KeyCode) {
        if matches!(key, KeyCode::ShiftLeft | KeyCode::ShiftRight) {
            self.pan_modifier_held = false;
        }
    }

    pub fn pan_modifier_held(&self) -> bool {
        self.pan_modifier_held
    }

    // ---- lifecycle --------------------------------------------------------

    /// Teardown when the scene goes away: no gesture, no observation.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.cancel_gesture();
        self.pan_modifier_held = false;
        self.culling.disconnect();
        info!("[SCENE] unmounted");
    }

    /// Accepts input again after `unmount`.
    pub fn mount(&mut self) {
        if !self.mounted {
            self.mounted = true;
            info!("[SCENE] mounted");
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::voxel::Priority;

    fn scene(config: SceneConfig) -> SceneController {
        let layout = SceneLayout {
            grid_size: UVec3::new(4, 4, 1),
            viewport: Vec2::new(800.0, 600.0),
            ..Default::default()
        };
        let mut scene = SceneController::new(config, layout);
        scene.set_voxels(vec![
            Voxel::new("1", GridPos::new(0, 0, 0)).with_priority(Priority::High),
            Voxel::new("2", GridPos::new(3, 0, 0)).with_priority(Priority::Low),
            Voxel::new("3", GridPos::new(0, 3, 0)),
        ]);
        scene
    }

    fn no_culling() -> SceneConfig {
        SceneConfig {
            enable_viewport_culling: false,
            ..Default::default()
        }
    }

    fn center_of(scene: &SceneController, id: &str) -> Vec2 {
        let voxel = scene.voxel(&VoxelId::new(id)).unwrap();
        scene.projection(voxel).center
    }

    fn empty_spot(scene: &SceneController) -> Vec2 {
        let p = Vec2::new(5.0, 5.0);
        assert!(scene.hit_test(p).is_none());
        p
    }

    #[test]
    fn rotate_drag_accumulates_incremental_deltas() {
        let mut s = scene(SceneConfig {
            enable_multi_select: false,
            ..no_culling()
        });
        let start = empty_spot(&s);
        s.pointer_down(start, Modifiers::NONE);
        s.pointer_move(start + Vec2::new(10.0, 0.0));
        s.pointer_move(start + Vec2::new(10.0, 20.0));
        s.pointer_up(start + Vec2::new(10.0, 20.0));
        assert_eq!(s.camera().rotation, Vec2::new(35.0 + 10.0, 45.0 + 5.0));
        assert!(s.gesture().is_none());
    }

    #[test]
    fn shift_switches_to_pan_for_the_next_drag() {
        let mut s = scene(SceneConfig {
            enable_multi_select: false,
            ..no_culling()
        });
        let start = empty_spot(&s);
        s.pointer_down(start, Modifiers::NONE);
        s.key_down(KeyCode::ShiftLeft, Modifiers::NONE);
        s.pointer_move(start + Vec2::new(4.0, 0.0));
        s.pointer_up(start + Vec2::new(4.0, 0.0));
        // the running drag kept rotating
        assert_eq!(s.camera().pan, Vec2::ZERO);
        assert_eq!(s.camera().rotation.y, 47.0);

        s.pointer_down(start, Modifiers::NONE);
        s.pointer_move(start + Vec2::new(4.0, 6.0));
        s.pointer_up(start + Vec2::new(4.0, 6.0));
        assert_eq!(s.camera().pan, Vec2::new(4.0, 6.0));

        s.key_up(KeyCode::ShiftLeft);
        assert!(!s.pan_modifier_held());
    }

    #[test]
    fn background_press_starts_marquee_only_without_modifiers() {
        let mut s = scene(no_culling());
        let start = empty_spot(&s);
        s.pointer_down(start, Modifiers::NONE);
        assert_eq!(s.gesture(), Some(&Gesture::Marquee));
        s.pointer_up(start);

        let ctrl = Modifiers { ctrl: true, ..Modifiers::NONE };
        s.pointer_down(start, ctrl);
        assert!(matches!(s.gesture(), Some(Gesture::Camera { mode: CameraDragMode::Rotate, .. })));
        s.pointer_up(start);
        let shift = Modifiers { shift: true, ..Modifiers::NONE };
        s.pointer_down(start, shift);
        assert!(matches!(s.gesture(), Some(Gesture::Camera { mode: CameraDragMode::Pan, .. })));
    }

    #[test]
    fn marquee_selects_intersecting_blocks_on_release() {
        let mut s = scene(no_culling());
        let a = center_of(&s, "1");
        let b = center_of(&s, "2");
        let start = empty_spot(&s);
        s.pointer_down(start, Modifiers::NONE);
        s.pointer_move(a.max(b) + Vec2::splat(1.0));
        assert!(s.selection_box().is_some());
        s.pointer_up(a.max(b) + Vec2::splat(1.0));
        assert!(s.selection_box().is_none());
        let events = s.drain_events();
        let Some(SceneEvent::SelectionChanged(set)) = events.last() else {
            panic!("expected a selection change, got {events:?}");
        };
        assert!(set.contains(&VoxelId::new("1")));
        assert_eq!(set, s.active_selection());
    }

    #[test]
    fn zero_area_marquee_changes_nothing() {
        let mut s = scene(no_culling());
        let start = empty_spot(&s);
        s.pointer_down(start, Modifiers::NONE);
        s.pointer_up(start);
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn escape_and_select_all() {
        let mut s = scene(no_culling());
        let cmd = Modifiers { meta: true, ..Modifiers::NONE };
        s.key_down(KeyCode::KeyA, cmd);
        assert_eq!(s.active_selection().len(), 3);
        s.key_down(KeyCode::Escape, Modifiers::NONE);
        assert!(s.active_selection().is_empty());
        assert_eq!(s.drain_events().len(), 2);
    }

    #[test]
    fn keys_ignored_without_multi_select() {
        let mut s = scene(SceneConfig {
            enable_multi_select: false,
            ..no_culling()
        });
        s.key_down(KeyCode::KeyA, Modifiers { ctrl: true, ..Modifiers::NONE });
        s.key_down(KeyCode::Escape, Modifiers::NONE);
        assert!(s.active_selection().is_empty());
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn zoom_keys_and_reset() {
        let mut s = scene(no_culling());
        s.key_down(KeyCode::Equal, Modifiers::NONE);
        s.key_down(KeyCode::Equal, Modifiers::NONE);
        assert!((s.camera().zoom - 1.4).abs() < 1e-5);
        s.wheel(-100_000.0);
        assert_eq!(s.camera().zoom, 3.0);
        s.key_down(KeyCode::Digit0, Modifiers::NONE);
        assert_eq!(*s.camera(), CameraState::default());
    }

    #[test]
    fn external_selection_is_authoritative_but_changes_are_reported() {
        let mut s = scene(no_culling());
        let ext: SelectionSet = [VoxelId::new("3")].into_iter().collect();
        s.set_external_selection(Some(ext.clone()));
        assert!(s.is_selected(&VoxelId::new("3")));
        s.toggle_selection(&VoxelId::new("1"), true);
        // rendering still follows the external set until the owner updates it
        assert_eq!(s.active_selection(), &ext);
        let events = s.drain_events();
        let expected: SelectionSet = ["1", "3"].into_iter().map(VoxelId::from).collect();
        assert_eq!(events, vec![SceneEvent::SelectionChanged(expected)]);
    }

    #[test]
    fn culled_blocks_are_not_hit_testable() {
        let mut s = scene(SceneConfig::default());
        let p = center_of(&s, "1");
        assert!(s.hit_test(p).is_none());
        s.culling_mut().register_element(&VoxelId::new("1"), Some(Entity::from_bits(1)));
        s.observe_visibility();
        assert_eq!(s.hit_test(p).map(|v| v.id.as_str()), Some("1"));
    }

    #[test]
    fn render_is_back_to_front_and_flags_selection() {
        let mut s = scene(no_culling());
        s.toggle_selection(&VoxelId::new("2"), false);
        let blocks = s.render();
        assert_eq!(blocks.len(), 3);
        assert!(blocks.windows(2).all(|w| w[0].1.depth <= w[1].1.depth));
        for (visual, _) in &blocks {
            assert_eq!(visual.flags.selected, visual.id.as_str() == "2");
            assert!(visual.painted);
        }
    }

    #[test]
    fn dragging_a_block_reports_a_drop() {
        let mut s = scene(SceneConfig {
            draggable_blocks: true,
            drag: DragOptions {
                snap_to_grid: false,
                grid_size: 40.0,
            },
            ..no_culling()
        });
        let from = center_of(&s, "3");
        let target = s.projection(&Voxel::new("x", GridPos::new(1, 3, 0))).center;
        s.pointer_down(from, Modifiers::NONE);
        assert!(s.drag().is_dragging());
        s.pointer_move(target);
        s.pointer_up(target);
        let events = s.drain_events();
        assert!(events.contains(&SceneEvent::Dropped {
            id: VoxelId::new("3"),
            from: GridPos::new(0, 3, 0),
            to: GridPos::new(1, 3, 0),
        }));
        assert!(!events.iter().any(|e| matches!(e, SceneEvent::VoxelClicked(_))));
        assert!(!s.drag().is_dragging());
    }

    #[test]
    fn one_cell_drags_land_on_the_neighbour_with_default_snapping() {
        let mut s = scene(SceneConfig {
            draggable_blocks: true,
            ..no_culling()
        });
        assert_eq!(s.drag().options(), &DragOptions::default());
        let steps = [IVec2::X, IVec2::NEG_X, IVec2::Y, IVec2::NEG_Y];
        let mut wrong = Vec::new();
        for x in 0..4 {
            for y in 0..4 {
                for step in steps {
                    let from = GridPos::new(x, y, 0);
                    let to = GridPos::new(x + step.x, y + step.y, 0);
                    if !(0..4).contains(&to.x) || !(0..4).contains(&to.y) {
                        continue;
                    }
                    s.set_voxels(vec![Voxel::new("m", from)]);
                    s.drain_events();
                    let start = s.projection(&Voxel::new("m", from)).center;
                    let end = s.projection(&Voxel::new("m", to)).center;
                    s.pointer_down(start, Modifiers::NONE);
                    s.pointer_move(end);
                    s.pointer_up(end);
                    let dropped = s.drain_events().into_iter().find_map(|e| match e {
                        SceneEvent::Dropped { to, .. } => Some(to),
                        _ => None,
                    });
                    if dropped != Some(to) {
                        wrong.push((from, to, dropped));
                    }
                }
            }
        }
        assert!(wrong.is_empty(), "misplaced drops: {:?}", wrong);
    }

    #[test]
    fn small_drag_across_a_snap_line_stays_put() {
        let mut s = scene(SceneConfig {
            draggable_blocks: true,
            ..no_culling()
        });
        let from = center_of(&s, "1");
        for offset in [Vec2::new(6.0, 0.0), Vec2::new(-6.0, 4.0), Vec2::new(0.0, -6.0)] {
            s.pointer_down(from, Modifiers::NONE);
            s.pointer_move(from + offset);
            s.pointer_up(from + offset);
            let events = s.drain_events();
            assert!(!events.iter().any(|e| matches!(e, SceneEvent::Dropped { .. })));
        }
    }

    #[test]
    fn unmounted_scene_ignores_input() {
        let mut s = scene(no_culling());
        s.unmount();
        s.key_down(KeyCode::KeyA, Modifiers { ctrl: true, ..Modifiers::NONE });
        s.key_down(KeyCode::Equal, Modifiers::NONE);
        s.wheel(-100.0);
        s.pointer_down(empty_spot(&s), Modifiers::NONE);
        s.begin_camera_drag(Vec2::new(5.0, 5.0), Modifiers::NONE);
        s.pointer_down(center_of(&s, "1"), Modifiers::NONE);
        assert!(s.drain_events().is_empty());
        assert!(s.active_selection().is_empty());
        assert_eq!(s.camera().zoom, 1.0);
        assert!(s.gesture().is_none());
        assert!(!s.is_mounted());

        s.mount();
        s.key_down(KeyCode::Equal, Modifiers::NONE);
        assert!(s.camera().zoom > 1.0);
    }

    #[test]
    fn unmount_tears_everything_down() {
        let mut s = scene(SceneConfig::default());
        s.culling_mut().register_element(&VoxelId::new("1"), Some(Entity::from_bits(1)));
        let start = empty_spot(&s);
        s.pointer_down(start, Modifiers::NONE);
        s.key_down(KeyCode::ShiftLeft, Modifiers::NONE);
        s.unmount();
        assert!(s.gesture().is_none());
        assert!(s.selection_box().is_none());
        assert!(!s.pan_modifier_held());
        assert_eq!(s.culling().observed_count(), 0);
        assert_eq!(s.culling().registered_count(), 0);
    }
}
