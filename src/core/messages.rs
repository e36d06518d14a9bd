//! Scene notifications as Bevy messages, and the app-side stores they feed.

use bevy::prelude::*;

use crate::core::resources::{LastClicked, SelectedVoxels, StatusMessage, VoxelCollection};
use crate::core::scene::{SceneController, SceneEvent};
use crate::core::selection::SelectionSet;
use crate::core::voxel::{GridPos, Voxel, VoxelId};

#[derive(Message, Debug, Clone)]
pub struct VoxelClicked(pub Voxel);

/// Always the complete new selection.
#[derive(Message, Debug, Clone)]
pub struct SelectionChanged(pub SelectionSet);

/// Snapped top-left of the dragged block, viewport-local.
#[derive(Message, Debug, Clone)]
pub struct VoxelDragOver {
    pub id: VoxelId,
    pub position: Vec2,
}

#[derive(Message, Debug, Clone)]
pub struct VoxelDropped {
    pub id: VoxelId,
    pub from: GridPos,
    pub to: GridPos,
}

/// Drains the scene's outbox into messages.
pub fn emit_scene_messages_system(
    mut scene: ResMut<SceneController>,
    mut clicked: MessageWriter<VoxelClicked>,
    mut changed: MessageWriter<SelectionChanged>,
    mut drag_over: MessageWriter<VoxelDragOver>,
    mut dropped: MessageWriter<VoxelDropped>,
) {
    for event in scene.drain_events() {
        match event {
            SceneEvent::VoxelClicked(voxel) => {
                clicked.write(VoxelClicked(voxel));
            }
            SceneEvent::SelectionChanged(set) => {
                changed.write(SelectionChanged(set));
            }
            SceneEvent::DragOver { id, position } => {
                drag_over.write(VoxelDragOver { id, position });
            }
            SceneEvent::Dropped { id, from, to } => {
                dropped.write(VoxelDropped { id, from, to });
            }
        }
    }
}

pub fn record_clicks_system(
    mut clicked: MessageReader<VoxelClicked>,
    mut last: ResMut<LastClicked>,
) {
    if let Some(VoxelClicked(voxel)) = clicked.read().last() {
        last.0 = Some(voxel.clone());
    }
}

pub fn store_selection_system(
    mut changed: MessageReader<SelectionChanged>,
    mut selected: ResMut<SelectedVoxels>,
) {
    if let Some(SelectionChanged(set)) = changed.read().last() {
        selected.0 = set.clone();
    }
}

/// Moves dropped voxels in the collection. Occupied target cells refuse
/// the drop.
pub fn apply_drops_system(
    mut dropped: MessageReader<VoxelDropped>,
    mut collection: ResMut<VoxelCollection>,
    mut status: ResMut<StatusMessage>,
) {
    for drop in dropped.read() {
        let occupied = collection
            .0
            .iter()
            .any(|v| v.position == drop.to && v.id != drop.id);
        if occupied {
            status.set(format!("Cell {:?} is occupied", drop.to));
            continue;
        }
        if let Some(voxel) = collection.0.iter_mut().find(|v| v.id == drop.id) {
            voxel.position = drop.to;
            info!("[DROP] moved {} to {:?}", drop.id, drop.to);
        }
    }
}

pub fn sync_collection_system(collection: Res<VoxelCollection>, mut scene: ResMut<SceneController>) {
    if collection.is_changed() {
        scene.set_voxels(collection.0.clone());
    }
}

/// Feeds the selection store back as the scene's authoritative selection.
pub fn adopt_selection_system(selected: Res<SelectedVoxels>, mut scene: ResMut<SceneController>) {
    if selected.is_changed() {
        scene.set_external_selection(Some(selected.0.clone()));
    }
}
