//! Voxgrid: an interactive voxel scene with camera controls, multi-selection,
//! viewport culling and drag-and-drop. Library for testing and reuse.

pub mod core;
pub mod input;
pub mod io;
pub mod render;
pub mod ui;

use bevy::prelude::*;
use std::path::PathBuf;

use crate::core::components::MainCamera;
use crate::core::config::VoxgridConfig;
use crate::core::messages::{
    adopt_selection_system, apply_drops_system, emit_scene_messages_system, record_clicks_system,
    store_selection_system, sync_collection_system, SelectionChanged, VoxelClicked,
    VoxelDragOver, VoxelDropped,
};
use crate::core::resources::{InputGate, LastClicked, SelectedVoxels, StatusMessage, VoxelCollection};
use crate::core::scene::SceneController;
use crate::core::voxel::Voxel;
use crate::input::camera::scene_wheel_system;
use crate::input::keyboard::{scene_key_release_system, scene_keys_system};
use crate::input::pointer::{
    pointer_press_system, pointer_release_system, track_pointer_system, PointerPosition,
};
use crate::input::{keyboard_available, pointer_available};
use crate::io::scene_file::{
    demo_scene, load_scene, process_pending_file_dialog_system, process_pending_load_system,
    save_scene_system, CurrentFile, PendingFileDialog, PendingLoad,
};
use crate::render::blocks::{
    mount_scene_system, observe_visibility_system, spawn_scene_root, sync_block_entities_system,
    sync_viewport_system, unmount_scene_system, update_block_visuals_system,
};

/// Per-frame ordering of the scene systems.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SceneSet {
    /// Window size and the caller-owned collection flow into the scene.
    Sync,
    /// Pointer, wheel and keys mutate the scene.
    Input,
    /// The scene's outbox becomes messages; app stores react.
    Dispatch,
    /// Entities, culling and sprites catch up with the scene.
    Render,
}

/// Scene state, input routing, messages and block entities. Independent of
/// windowing and UI so it runs under `MinimalPlugins`.
pub struct VoxgridScenePlugin {
    pub config: VoxgridConfig,
    pub viewport: Vec2,
}

impl Default for VoxgridScenePlugin {
    fn default() -> Self {
        Self {
            config: VoxgridConfig::default(),
            viewport: crate::core::camera::SceneLayout::default().viewport,
        }
    }
}

impl Plugin for VoxgridScenePlugin {
    fn build(&self, app: &mut App) {
        let scene = SceneController::new(
            self.config.scene_config(),
            self.config.layout(self.viewport),
        );
        app.insert_resource(scene)
            .init_resource::<VoxelCollection>()
            .init_resource::<SelectedVoxels>()
            .init_resource::<LastClicked>()
            .init_resource::<StatusMessage>()
            .init_resource::<InputGate>()
            .init_resource::<PointerPosition>()
            .init_resource::<CurrentFile>()
            .init_resource::<PendingLoad>()
            .init_resource::<PendingFileDialog>()
            .add_message::<VoxelClicked>()
            .add_message::<SelectionChanged>()
            .add_message::<VoxelDragOver>()
            .add_message::<VoxelDropped>()
            .configure_sets(
                Update,
                (
                    SceneSet::Sync,
                    SceneSet::Input,
                    SceneSet::Dispatch,
                    SceneSet::Render,
                )
                    .chain(),
            )
            .add_systems(Startup, spawn_scene_root)
            .add_systems(
                Update,
                (
                    process_pending_file_dialog_system,
                    process_pending_load_system,
                    sync_viewport_system,
                    sync_collection_system,
                    adopt_selection_system,
                )
                    .chain()
                    .in_set(SceneSet::Sync),
            )
            .add_systems(
                Update,
                (
                    track_pointer_system,
                    pointer_press_system.run_if(pointer_available),
                    pointer_release_system,
                    scene_wheel_system.run_if(pointer_available),
                    scene_keys_system.run_if(keyboard_available),
                    scene_key_release_system,
                    save_scene_system.run_if(keyboard_available),
                )
                    .chain()
                    .in_set(SceneSet::Input),
            )
            .add_systems(
                Update,
                (
                    emit_scene_messages_system,
                    (record_clicks_system, store_selection_system, apply_drops_system),
                )
                    .chain()
                    .in_set(SceneSet::Dispatch),
            )
            .add_systems(
                Update,
                (
                    unmount_scene_system,
                    mount_scene_system,
                    sync_block_entities_system,
                    observe_visibility_system,
                    update_block_visuals_system,
                )
                    .chain()
                    .in_set(SceneSet::Render),
            );
    }
}

struct CliArgs {
    scene_path: Option<PathBuf>,
    no_culling: bool,
    no_multi_select: bool,
}

fn parse_args(args: impl Iterator<Item = String>) -> CliArgs {
    let mut cli = CliArgs {
        scene_path: None,
        no_culling: false,
        no_multi_select: false,
    };
    for arg in args {
        match arg.as_str() {
            "--no-culling" => cli.no_culling = true,
            "--no-multi-select" => cli.no_multi_select = true,
            _ if arg.starts_with("--") => eprintln!("Ignoring unknown flag {}", arg),
            _ => cli.scene_path = Some(PathBuf::from(arg)),
        }
    }
    cli
}

/// Scene from the path argument, else piped stdin, else the demo.
fn initial_scene(cli: &CliArgs) -> (Vec<Voxel>, Option<PathBuf>) {
    if let Some(path) = &cli.scene_path {
        match load_scene(path) {
            Ok(voxels) => return (voxels, Some(path.clone())),
            Err(e) => eprintln!("Failed to load {}: {}", path.display(), e),
        }
    }
    match crate::io::stdin::read_stdin_scene() {
        Ok(Some(voxels)) => return (voxels, None),
        Ok(None) => {}
        Err(e) => eprintln!("Failed to parse stdin as a scene: {}", e),
    }
    (demo_scene(), None)
}

/// Build and run the Voxgrid app.
pub fn run() {
    let mut app_config = crate::core::config::load_config();
    let cli = parse_args(std::env::args().skip(1));
    if cli.no_culling {
        app_config.enable_viewport_culling = false;
    }
    if cli.no_multi_select {
        app_config.enable_multi_select = false;
    }
    let (voxels, current_file) = initial_scene(&cli);

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Voxgrid".to_string(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(bevy_egui::EguiPlugin::default())
        .insert_resource(ClearColor(app_config.bg_color()))
        .add_plugins(VoxgridScenePlugin {
            config: app_config.clone(),
            viewport: crate::core::camera::SceneLayout::default().viewport,
        })
        .insert_resource(app_config)
        .insert_resource(VoxelCollection(voxels))
        .insert_resource(CurrentFile(current_file))
        .add_systems(
            Startup,
            (setup_camera, render::overlay::setup_gizmo_line_width),
        )
        .add_systems(
            Update,
            (
                render::overlay::draw_scene_overlay_system.after(SceneSet::Render),
                ui::overlay::status_message_tick_system,
            ),
        )
        .add_systems(
            bevy_egui::EguiPrimaryContextPass,
            (
                ui::overlay::ui_top_bar_system,
                ui::overlay::ui_info_panel_system,
                ui::overlay::ui_bottom_bar_system,
                ui::overlay::update_input_gate_system,
            )
                .chain(),
        )
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn((Camera2d, MainCamera));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> CliArgs {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn parses_flags_and_path() {
        let cli = args(&["--no-culling", "tasks.json", "--no-multi-select"]);
        assert!(cli.no_culling);
        assert!(cli.no_multi_select);
        assert_eq!(cli.scene_path, Some(PathBuf::from("tasks.json")));
    }

    #[test]
    fn defaults_without_args() {
        let cli = args(&[]);
        assert!(!cli.no_culling);
        assert!(!cli.no_multi_select);
        assert!(cli.scene_path.is_none());
    }
}
