//! Input handling: pointer gestures, wheel zoom and scene keys, all routed
//! into the [`SceneController`](crate::core::scene::SceneController).

pub mod camera;
pub mod keyboard;
pub mod pointer;

use bevy::prelude::*;

use crate::core::resources::InputGate;
use crate::core::scene::Modifiers;

/// Snapshot of the held modifier keys.
pub fn modifiers_from_keys(keys: &ButtonInput<KeyCode>) -> Modifiers {
    Modifiers {
        shift: keys.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]),
        ctrl: keys.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]),
        meta: keys.any_pressed([KeyCode::SuperLeft, KeyCode::SuperRight]),
        alt: keys.any_pressed([KeyCode::AltLeft, KeyCode::AltRight]),
    }
}

pub fn pointer_available(gate: Res<InputGate>) -> bool {
    !gate.pointer_captured
}

pub fn keyboard_available(gate: Res<InputGate>) -> bool {
    !gate.keyboard_captured
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_held_modifiers() {
        let mut keys = ButtonInput::<KeyCode>::default();
        assert_eq!(modifiers_from_keys(&keys), Modifiers::NONE);
        keys.press(KeyCode::SuperRight);
        keys.press(KeyCode::ShiftLeft);
        let mods = modifiers_from_keys(&keys);
        assert!(mods.multi());
        assert!(mods.shift);
        assert!(!mods.alt);
    }
}
