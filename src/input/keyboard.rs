use bevy::prelude::*;

use crate::core::scene::SceneController;
use crate::input::modifiers_from_keys;

/// Escape, Ctrl/Cmd+A, zoom keys and the pan modifier.
pub fn scene_keys_system(keys: Res<ButtonInput<KeyCode>>, mut scene: ResMut<SceneController>) {
    let modifiers = modifiers_from_keys(&keys);
    for key in keys.get_just_pressed() {
        scene.key_down(*key, modifiers);
    }
}

/// Runs even while the UI holds the keyboard so Shift never sticks.
pub fn scene_key_release_system(keys: Res<ButtonInput<KeyCode>>, mut scene: ResMut<SceneController>) {
    for key in keys.get_just_released() {
        scene.key_up(*key);
    }
}
