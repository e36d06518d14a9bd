//! Scene core: voxel data, camera projection, selection, culling, drag and
//! block styling, plus the ECS types shared by the systems around them.

pub mod block;
pub mod camera;
pub mod components;
pub mod config;
pub mod culling;
pub mod drag;
pub mod messages;
pub mod resources;
pub mod scene;
pub mod selection;
pub mod task;
pub mod voxel;
