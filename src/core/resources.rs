//! Resources owned by the application around the scene.

use bevy::prelude::*;

use crate::core::selection::SelectionSet;
use crate::core::voxel::Voxel;

/// The voxel collection as the application owns it. The scene reads it on
/// change and never mutates it.
#[derive(Resource, Default, Debug, Clone)]
pub struct VoxelCollection(pub Vec<Voxel>);

/// Selection store fed back into the scene as the authoritative selection.
#[derive(Resource, Default, Debug, Clone)]
pub struct SelectedVoxels(pub SelectionSet);

/// Most recently clicked voxel, shown in the info panel.
#[derive(Resource, Default, Debug, Clone)]
pub struct LastClicked(pub Option<Voxel>);

/// Whether the UI layer consumed input last frame. Scene input systems stay
/// idle while it does.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct InputGate {
    pub pointer_captured: bool,
    pub keyboard_captured: bool,
}

/// Transient status / error message displayed in the bottom bar.
/// `timer` counts down in seconds; the message is visible while `timer > 0`.
#[derive(Resource, Default)]
pub struct StatusMessage {
    pub text: String,
    pub timer: f32,
}

impl StatusMessage {
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.timer = 4.0;
    }

    pub fn is_visible(&self) -> bool {
        self.timer > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_message_expires() {
        let mut status = StatusMessage::default();
        assert!(!status.is_visible());
        status.set("Loaded 3 voxels");
        assert!(status.is_visible());
        status.timer -= 5.0;
        assert!(!status.is_visible());
    }
}
