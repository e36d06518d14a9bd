//! Scroll-wheel zoom.

use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;

use crate::core::scene::SceneController;

/// Pixels per wheel line, matching what browsers report for one notch.
pub const LINE_HEIGHT_PX: f32 = 100.0;

/// Converts a Bevy wheel event to a DOM-style `deltaY` (positive = scroll
/// down = zoom out).
pub fn wheel_delta_y(unit: MouseScrollUnit, y: f32) -> f32 {
    match unit {
        MouseScrollUnit::Line => -y * LINE_HEIGHT_PX,
        MouseScrollUnit::Pixel => -y,
    }
}

/// Wheel zoom: `zoom - deltaY * 0.001`, clamped by the camera.
pub fn scene_wheel_system(
    mut mouse_wheel: MessageReader<MouseWheel>,
    mut scene: ResMut<SceneController>,
) {
    for event in mouse_wheel.read() {
        scene.wheel(wheel_delta_y(event.unit, event.y));
    }
}
