//! Scene files: `{ "voxels": [...] }` or `{ "tasks": [...] }` JSON documents,
//! plus the built-in demo scene.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::core::resources::{SelectedVoxels, StatusMessage, VoxelCollection};
use crate::core::task::{tasks_to_voxels, TaskRecord};
use crate::core::voxel::{GridPos, Material, Priority, Theme, Voxel};

/// Default path for the keyboard save shortcut when no file is open.
pub const DEFAULT_SCENE_PATH: &str = "scene.json";

#[derive(Debug, thiserror::Error)]
pub enum SceneFileError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scene JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("scene document has neither `voxels` nor `tasks`")]
    Empty,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SceneDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voxels: Option<Vec<Voxel>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<TaskRecord>>,
}

impl SceneDocument {
    /// Voxels win when both lists are present.
    pub fn into_voxels(self) -> Result<Vec<Voxel>, SceneFileError> {
        match (self.voxels, self.tasks) {
            (Some(voxels), _) => Ok(dedup_ids(voxels)),
            (None, Some(tasks)) => Ok(dedup_ids(tasks_to_voxels(&tasks))),
            (None, None) => Err(SceneFileError::Empty),
        }
    }
}

/// Voxel IDs are unique within a scene; later duplicates are dropped.
fn dedup_ids(voxels: Vec<Voxel>) -> Vec<Voxel> {
    let mut seen = HashSet::new();
    let before = voxels.len();
    let unique: Vec<Voxel> = voxels
        .into_iter()
        .filter(|v| seen.insert(v.id.clone()))
        .collect();
    if unique.len() != before {
        warn!("[LOAD] dropped {} voxels with duplicate ids", before - unique.len());
    }
    unique
}

pub fn parse_scene(json: &str) -> Result<Vec<Voxel>, SceneFileError> {
    serde_json::from_str::<SceneDocument>(json)?.into_voxels()
}

pub fn load_scene(path: &Path) -> Result<Vec<Voxel>, SceneFileError> {
    let json = std::fs::read_to_string(path).map_err(|source| SceneFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_scene(&json)
}

pub fn save_scene(path: &Path, voxels: &[Voxel]) -> Result<(), SceneFileError> {
    let document = SceneDocument {
        voxels: Some(voxels.to_vec()),
        tasks: None,
    };
    let json = serde_json::to_string_pretty(&document)?;
    std::fs::write(path, json).map_err(|source| SceneFileError::Io {
        path: path.to_path_buf(),
        source,
    })
}

const SCATTERED: [(i32, i32); 15] = [
    (2, 3), (7, 1), (4, 8), (9, 2), (1, 6),
    (8, 4), (3, 9), (6, 5), (0, 7), (5, 0),
    (9, 9), (2, 2), (7, 7), (4, 4), (6, 6),
];

/// A 20-block spiral cycling themes and materials, then 15 scattered
/// priority blocks on the ground layer.
pub fn demo_scene() -> Vec<Voxel> {
    let mut voxels = Vec::with_capacity(20 + SCATTERED.len());
    let mut next_id = 0;

    for i in 0..20 {
        let angle = i as f32 * 0.5;
        let radius = i as f32 * 0.3;
        let position = GridPos::new(
            (radius * angle.cos() + 5.0).floor() as i32,
            (radius * angle.sin() + 5.0).floor() as i32,
            i / 4,
        );
        voxels.push(
            Voxel::new(format!("voxel-{next_id}"), position)
                .with_theme(Theme::ALL[i as usize % Theme::ALL.len()])
                .with_material(Material::ALL[(i as usize / 5) % Material::ALL.len()])
                .with_metadata(serde_json::json!({ "index": i })),
        );
        next_id += 1;
    }

    let priorities = [Priority::Low, Priority::Medium, Priority::High];
    for (i, &(x, y)) in SCATTERED.iter().enumerate() {
        voxels.push(
            Voxel::new(format!("priority-{next_id}"), GridPos::new(x, y, 0))
                .with_priority(priorities[i % priorities.len()])
                .with_metadata(serde_json::json!({ "type": "priority" })),
        );
        next_id += 1;
    }
    voxels
}

/// Current file path for save. None = untitled.
#[derive(Resource, Default)]
pub struct CurrentFile(pub Option<PathBuf>);

/// Pending file dialog result from background thread. Check each frame.
/// Wrapped in Mutex because Receiver is Send but not Sync.
#[derive(Resource, Default)]
pub struct PendingFileDialog(
    pub std::sync::Mutex<Option<std::sync::mpsc::Receiver<FileDialogResult>>>,
);

/// Deferred load path. Set by the UI or a file dialog; processed in Update.
#[derive(Resource, Default)]
pub struct PendingLoad(pub Option<PathBuf>);

pub enum FileDialogResult {
    Open(PathBuf),
    SaveAs(PathBuf),
}

/// Loads `PendingLoad` into the collection. The old selection goes with the
/// old scene.
pub fn process_pending_load_system(
    mut pending: ResMut<PendingLoad>,
    mut collection: ResMut<VoxelCollection>,
    mut selected: ResMut<SelectedVoxels>,
    mut current_file: ResMut<CurrentFile>,
    mut status: ResMut<StatusMessage>,
) {
    let Some(path) = pending.0.take() else {
        return;
    };
    match load_scene(&path) {
        Ok(voxels) => {
            info!("[LOAD] {} voxels from {}", voxels.len(), path.display());
            status.set(format!("Loaded {} voxels", voxels.len()));
            collection.0 = voxels;
            selected.0.clear();
            current_file.0 = Some(path);
        }
        Err(err) => {
            error!("[LOAD] {}", err);
            status.set(format!("Load failed: {err}"));
        }
    }
}

pub fn save_to_path(path: &Path, collection: &VoxelCollection, status: &mut StatusMessage) -> bool {
    match save_scene(path, &collection.0) {
        Ok(()) => {
            info!("[SAVE] Saved to {}", path.display());
            status.set(format!("Saved {}", path.display()));
            true
        }
        Err(err) => {
            error!("[SAVE] {}", err);
            status.set(format!("Save failed: {err}"));
            false
        }
    }
}

fn ctrl_or_cmd_pressed(keys: &ButtonInput<KeyCode>) -> bool {
    keys.any_pressed([
        KeyCode::ControlLeft,
        KeyCode::ControlRight,
        KeyCode::SuperLeft,
        KeyCode::SuperRight,
    ])
}

/// Ctrl/Cmd+S: save to the current file, or to [`DEFAULT_SCENE_PATH`].
pub fn save_scene_system(
    keys: Res<ButtonInput<KeyCode>>,
    collection: Res<VoxelCollection>,
    mut current_file: ResMut<CurrentFile>,
    mut status: ResMut<StatusMessage>,
) {
    if !(keys.just_pressed(KeyCode::KeyS) && ctrl_or_cmd_pressed(&keys)) {
        return;
    }
    let path = current_file
        .0
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SCENE_PATH));
    if save_to_path(&path, &collection, &mut status) {
        current_file.0 = Some(path);
    }
}

/// Spawns a native open/save dialog off the main thread.
pub fn spawn_file_dialog(pending: &PendingFileDialog, save: bool) {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let dialog = rfd::FileDialog::new().add_filter("scene", &["json"]);
        let result = if save {
            dialog
                .set_file_name(DEFAULT_SCENE_PATH)
                .save_file()
                .map(FileDialogResult::SaveAs)
        } else {
            dialog.pick_file().map(FileDialogResult::Open)
        };
        if let Some(result) = result {
            let _ = tx.send(result);
        }
    });
    if let Ok(mut slot) = pending.0.lock() {
        *slot = Some(rx);
    }
}

/// Polls the dialog thread. Open defers to `PendingLoad`.
pub fn process_pending_file_dialog_system(
    pending_dialog: Res<PendingFileDialog>,
    mut pending_load: ResMut<PendingLoad>,
    mut current_file: ResMut<CurrentFile>,
    collection: Res<VoxelCollection>,
    mut status: ResMut<StatusMessage>,
) {
    let Ok(mut slot) = pending_dialog.0.lock() else {
        return;
    };
    let Some(rx) = slot.as_ref() else {
        return;
    };
    let result = match rx.try_recv() {
        Ok(result) => result,
        Err(std::sync::mpsc::TryRecvError::Empty) => return,
        Err(std::sync::mpsc::TryRecvError::Disconnected) => {
            // dialog cancelled
            *slot = None;
            return;
        }
    };
    *slot = None;
    match result {
        FileDialogResult::Open(path) => pending_load.0 = Some(path),
        FileDialogResult::SaveAs(path) => {
            if save_to_path(&path, &collection, &mut status) {
                current_file.0 = Some(path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::voxel::{VisualVariant, VoxelId};

    #[test]
    fn demo_scene_shape() {
        let voxels = demo_scene();
        assert_eq!(voxels.len(), 35);
        assert_eq!(voxels[0].id, VoxelId::new("voxel-0"));
        assert_eq!(voxels[0].position, GridPos::new(5, 5, 0));
        assert_eq!(voxels[19].position.z, 4);
        assert_eq!(voxels[7].variant, VisualVariant::Theme(Theme::Forest));
        assert_eq!(voxels[7].material, Some(Material::Glass));
        assert_eq!(voxels[20].id, VoxelId::new("priority-20"));
        assert_eq!(voxels[22].variant, VisualVariant::Priority(Priority::High));
        let ids: HashSet<_> = voxels.iter().map(|v| v.id.clone()).collect();
        assert_eq!(ids.len(), voxels.len());
    }

    #[test]
    fn parses_both_document_kinds() {
        let voxels = parse_scene(r#"{"voxels": [{"id": "a", "x": 1, "y": 2, "z": 0}]}"#).unwrap();
        assert_eq!(voxels[0].position, GridPos::new(1, 2, 0));

        let voxels = parse_scene(
            r#"{"tasks": [
                {"id": 1, "title": "a", "status": "archived"},
                {"id": 2, "title": "b", "position_x": 3}
            ]}"#,
        )
        .unwrap();
        assert_eq!(voxels.len(), 1);
        assert_eq!(voxels[0].id, VoxelId::new("2"));
    }

    #[test]
    fn rejects_empty_and_malformed_documents() {
        assert!(matches!(parse_scene("{}"), Err(SceneFileError::Empty)));
        assert!(matches!(parse_scene("[1, 2"), Err(SceneFileError::Json(_))));
        assert!(matches!(
            load_scene(Path::new("/definitely/not/here.json")),
            Err(SceneFileError::Io { .. })
        ));
    }

    #[test]
    fn duplicate_ids_keep_the_first() {
        let voxels = parse_scene(
            r#"{"voxels": [
                {"id": "a", "x": 0, "y": 0, "z": 0},
                {"id": "a", "x": 5, "y": 5, "z": 0}
            ]}"#,
        )
        .unwrap();
        assert_eq!(voxels.len(), 1);
        assert_eq!(voxels[0].position, GridPos::new(0, 0, 0));
    }
}
