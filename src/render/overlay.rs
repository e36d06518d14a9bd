use bevy::prelude::*;

use crate::core::scene::SceneController;
use crate::render::screen_to_world;

const MARQUEE_COLOR: Color = Color::srgba(0.38, 0.65, 0.98, 0.9);
const SELECTION_COLOR: Color = Color::srgb(1.0, 0.84, 0.25);
const DRAG_PREVIEW_COLOR: Color = Color::srgba(1.0, 1.0, 1.0, 0.6);

pub fn setup_gizmo_line_width(mut config_store: ResMut<GizmoConfigStore>) {
    let (config, _) = config_store.config_mut::<DefaultGizmoConfigGroup>();
    config.line.width = 2.0;
}

/// Marquee rectangle, outlines of selected blocks, and the snapped drop
/// target of a dragged block.
pub fn draw_scene_overlay_system(scene: Res<SceneController>, mut gizmos: Gizmos) {
    let viewport = scene.layout().viewport;

    for voxel in scene.voxels() {
        if !scene.is_selected(&voxel.id) || !scene.is_visible(&voxel.id) {
            continue;
        }
        let projection = scene.projection(voxel);
        for face in projection.faces.iter().filter(|f| f.front_facing) {
            let mut outline: Vec<Vec2> = face
                .corners
                .iter()
                .map(|c| screen_to_world(*c, viewport))
                .collect();
            outline.push(outline[0]);
            gizmos.linestrip_2d(outline, SELECTION_COLOR);
        }
    }

    if let Some(selection) = scene.selection_box() {
        let rect = selection.rect();
        gizmos.rect_2d(
            Isometry2d::from_translation(screen_to_world(rect.center(), viewport)),
            rect.size(),
            MARQUEE_COLOR,
        );
    }

    if let Some(state) = scene.drag().state() {
        if let Some(voxel) = scene.voxel(&state.item.id) {
            let size = scene.projection(voxel).bounds.size();
            let center = state.current_position + size * 0.5;
            gizmos.rect_2d(
                Isometry2d::from_translation(screen_to_world(center, viewport)),
                size,
                DRAG_PREVIEW_COLOR,
            );
        }
    }
}
