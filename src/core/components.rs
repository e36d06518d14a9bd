//! ECS components for the voxel scene.

use bevy::prelude::*;

use crate::core::camera::FaceKind;
use crate::core::voxel::VoxelId;

/// Marker for the primary 2D camera.
#[derive(Component)]
pub struct MainCamera;

/// Parent of every block entity. Despawning it unmounts the scene.
#[derive(Component)]
pub struct SceneRoot;

/// One rendered voxel. Its six faces are children.
#[derive(Component, Debug, Clone)]
pub struct VoxelBlock {
    pub id: VoxelId,
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockFace(pub FaceKind);
