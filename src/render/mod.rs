//! Rendering: block sprites driven by the scene projection, plus gizmo
//! overlays for the marquee, selection and drag preview.

pub mod blocks;
pub mod overlay;

use bevy::prelude::*;

/// Viewport-local pixel (y down) → world point for a `Camera2d` at the
/// origin with unit scale.
pub fn screen_to_world(screen: Vec2, viewport: Vec2) -> Vec2 {
    Vec2::new(screen.x - viewport.x * 0.5, viewport.y * 0.5 - screen.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_map_to_world_extents() {
        let viewport = Vec2::new(800.0, 600.0);
        assert_eq!(screen_to_world(Vec2::ZERO, viewport), Vec2::new(-400.0, 300.0));
        assert_eq!(screen_to_world(viewport, viewport), Vec2::new(400.0, -300.0));
        assert_eq!(screen_to_world(viewport * 0.5, viewport), Vec2::ZERO);
    }
}
