//! egui panels around the scene.

pub mod overlay;
