//! Block entities: one parent per voxel with six face sprites, kept in step
//! with the scene's collection, culling and camera.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use std::collections::HashSet;

use crate::core::block::render_block;
use crate::core::camera::FaceKind;
use crate::core::components::{BlockFace, SceneRoot, VoxelBlock};
use crate::core::scene::SceneController;
use crate::core::voxel::VoxelId;
use crate::render::screen_to_world;

/// Screen (y down, z toward viewer) → world (y up, z toward viewer) while
/// staying a proper rotation.
const SCREEN_TO_WORLD: Mat3 = Mat3::from_diagonal(Vec3::new(1.0, -1.0, -1.0));

pub fn spawn_scene_root(mut commands: Commands) {
    commands.spawn((SceneRoot, Transform::default(), Visibility::default()));
}

pub fn sync_viewport_system(
    window_q: Query<&Window, With<PrimaryWindow>>,
    mut scene: ResMut<SceneController>,
) {
    let Ok(window) = window_q.single() else {
        return;
    };
    let size = window.size();
    if size != scene.layout().viewport && size.x > 0.0 && size.y > 0.0 {
        scene.set_viewport(size);
    }
}

/// Spawns blocks for new voxels and despawns blocks whose voxel is gone,
/// registering each with culling.
pub fn sync_block_entities_system(
    mut commands: Commands,
    mut scene: ResMut<SceneController>,
    root_q: Query<Entity, With<SceneRoot>>,
    blocks_q: Query<(Entity, &VoxelBlock)>,
) {
    let Ok(root) = root_q.single() else {
        return;
    };

    let mut existing: HashSet<VoxelId> = HashSet::new();
    for (entity, block) in &blocks_q {
        if scene.voxel(&block.id).is_some() {
            existing.insert(block.id.clone());
            continue;
        }
        scene.culling_mut().register_element(&block.id, None);
        commands.entity(entity).despawn();
    }

    let missing: Vec<VoxelId> = scene
        .voxels()
        .iter()
        .filter(|v| !existing.contains(&v.id))
        .map(|v| v.id.clone())
        .collect();
    if missing.is_empty() {
        return;
    }

    let face_size = Vec2::splat(scene.layout().block_size);
    for id in missing {
        let entity = commands
            .spawn((
                VoxelBlock { id: id.clone() },
                Transform::default(),
                Visibility::Hidden,
                ChildOf(root),
            ))
            .with_children(|parent| {
                for kind in FaceKind::ALL {
                    parent.spawn((
                        BlockFace(kind),
                        Sprite::from_color(Color::WHITE, face_size),
                        Transform::default(),
                        Visibility::Hidden,
                    ));
                }
            })
            .id();
        scene.culling_mut().register_element(&id, Some(entity));
    }
    debug!("[RENDER] {} blocks", scene.voxels().len());
}

pub fn observe_visibility_system(mut scene: ResMut<SceneController>) {
    if !scene.culling().is_enabled() {
        return;
    }
    let changes = scene.observe_visibility();
    if changes > 0 {
        debug!("[CULL] {} visibility changes", changes);
    }
}

/// Places every block and face from the current projection and styles
/// faces from the block renderer.
pub fn update_block_visuals_system(
    scene: Res<SceneController>,
    mut blocks_q: Query<(&VoxelBlock, &mut Transform, &mut Visibility, &Children), Without<BlockFace>>,
    mut faces_q: Query<(&BlockFace, &mut Transform, &mut Sprite, &mut Visibility), Without<VoxelBlock>>,
) {
    let layout = scene.layout();
    let camera = scene.camera();
    let depth_unit = layout.pitch() * camera.zoom;
    let rotation = SCREEN_TO_WORLD * camera.rotation_matrix();

    for (block, mut transform, mut visibility, children) in &mut blocks_q {
        let Some(voxel) = scene.voxel(&block.id) else {
            continue;
        };
        let visual = render_block(&scene.block_props(voxel));
        let projection = scene.projection(voxel);

        transform.translation = screen_to_world(projection.center, layout.viewport)
            .extend(projection.depth / depth_unit);
        *visibility = if visual.painted {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };

        for child in children {
            let Ok((face, mut face_transform, mut sprite, mut face_visibility)) =
                faces_q.get_mut(*child)
            else {
                continue;
            };
            let face_projection = projection.face(face.0);
            let offset = face_projection.center - projection.center;
            face_transform.translation = Vec3::new(
                offset.x,
                -offset.y,
                (face_projection.depth - projection.depth) / depth_unit,
            );
            face_transform.rotation = Quat::from_mat3(&(rotation * face.0.basis()));
            face_transform.scale = Vec3::new(camera.zoom, camera.zoom, 1.0);
            sprite.color = visual.face(face.0).color;
            *face_visibility = if face_projection.front_facing {
                Visibility::Inherited
            } else {
                Visibility::Hidden
            };
        }
    }
}

/// Unmount: the root went away, so stop observing and drop the gesture.
pub fn unmount_scene_system(
    mut removed: RemovedComponents<SceneRoot>,
    mut scene: ResMut<SceneController>,
) {
    if removed.read().next().is_some() {
        scene.unmount();
    }
}

/// A new root remounts the scene after an earlier teardown.
pub fn mount_scene_system(
    added: Query<(), Added<SceneRoot>>,
    mut scene: ResMut<SceneController>,
) {
    if !added.is_empty() {
        scene.mount();
    }
}
