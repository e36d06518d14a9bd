//! Pointer gestures: press over the scene starts one, release anywhere
//! ends it.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::core::scene::SceneController;
use crate::input::modifiers_from_keys;

const BUTTONS: [MouseButton; 3] = [MouseButton::Left, MouseButton::Middle, MouseButton::Right];

/// Last cursor position seen inside the window, viewport-local.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct PointerPosition(pub Option<Vec2>);

pub fn track_pointer_system(
    window_q: Query<&Window, With<PrimaryWindow>>,
    mut pointer: ResMut<PointerPosition>,
    mut scene: ResMut<SceneController>,
) {
    let Ok(window) = window_q.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    if pointer.0 == Some(cursor) {
        return;
    }
    pointer.0 = Some(cursor);
    if scene.gesture().is_some() {
        scene.pointer_move(cursor);
    }
}

/// Left press: block, marquee or camera, decided by the scene. Middle and
/// right presses always drive the camera.
pub fn pointer_press_system(
    buttons: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    window_q: Query<&Window, With<PrimaryWindow>>,
    mut scene: ResMut<SceneController>,
) {
    if !buttons.any_just_pressed(BUTTONS) {
        return;
    }
    let Ok(window) = window_q.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let modifiers = modifiers_from_keys(&keys);
    if buttons.just_pressed(MouseButton::Left) {
        scene.pointer_down(cursor, modifiers);
    } else {
        scene.begin_camera_drag(cursor, modifiers);
    }
}

/// Ends the gesture once no button is held, wherever the pointer is.
pub fn pointer_release_system(
    buttons: Res<ButtonInput<MouseButton>>,
    pointer: Res<PointerPosition>,
    mut scene: ResMut<SceneController>,
) {
    if scene.gesture().is_none() || buttons.any_pressed(BUTTONS) {
        return;
    }
    let position = pointer.0.unwrap_or(Vec2::ZERO);
    scene.pointer_up(position);
}
