//! Immediate-mode UI overlays via bevy_egui.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::core::resources::{InputGate, LastClicked, SelectedVoxels, StatusMessage, VoxelCollection};
use crate::core::scene::SceneController;
use crate::io::scene_file::{save_to_path, spawn_file_dialog, CurrentFile, PendingFileDialog};

/// Top bar: File menu, view controls, scene toggles.
pub fn ui_top_bar_system(
    mut contexts: EguiContexts,
    mut scene: ResMut<SceneController>,
    pending_dialog: Res<PendingFileDialog>,
    current_file: Res<CurrentFile>,
    collection: Res<VoxelCollection>,
    mut status: ResMut<StatusMessage>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    egui::TopBottomPanel::top("top_bar")
        .default_height(36.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open...").clicked() {
                        spawn_file_dialog(&pending_dialog, false);
                        ui.close();
                    }
                    if ui.button("Save").clicked() {
                        match current_file.0.as_ref() {
                            Some(path) => {
                                save_to_path(path, &collection, &mut status);
                            }
                            None => spawn_file_dialog(&pending_dialog, true),
                        }
                        ui.close();
                    }
                    if ui.button("Save As...").clicked() {
                        spawn_file_dialog(&pending_dialog, true);
                        ui.close();
                    }
                });
                ui.menu_button("Scene", |ui| {
                    let mut culling = scene.config().enable_viewport_culling;
                    if ui.checkbox(&mut culling, "Viewport culling").changed() {
                        scene.set_culling_enabled(culling);
                    }
                    let mut multi = scene.config().enable_multi_select;
                    if ui.checkbox(&mut multi, "Multi-select").changed() {
                        scene.set_multi_select_enabled(multi);
                    }
                    let mut draggable = scene.config().draggable_blocks;
                    if ui.checkbox(&mut draggable, "Draggable blocks").changed() {
                        scene.set_draggable(draggable);
                    }
                });

                ui.separator();
                if ui.button("−").on_hover_text("Zoom out (-)").clicked() {
                    scene.zoom_out();
                }
                ui.label(format!("{:.0}%", scene.camera().zoom * 100.0));
                if ui.button("+").on_hover_text("Zoom in (=)").clicked() {
                    scene.zoom_in();
                }
                if ui.button("Reset view").on_hover_text("0").clicked() {
                    scene.reset_view();
                }

                ui.separator();
                ui.label(
                    egui::RichText::new(
                        "Drag: rotate  Shift+drag: pan  Wheel: zoom  Ctrl/Cmd+click: multi-select  Esc: clear",
                    )
                    .color(egui::Color32::GRAY),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let name = current_file
                        .0
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .and_then(|n| n.to_str())
                        .unwrap_or("untitled");
                    ui.label(egui::RichText::new(name).color(egui::Color32::DARK_GRAY));
                });
            });
        });
}

/// Right panel: selection summary and the last clicked voxel.
pub fn ui_info_panel_system(
    mut contexts: EguiContexts,
    mut scene: ResMut<SceneController>,
    selected: Res<SelectedVoxels>,
    last_clicked: Res<LastClicked>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    egui::SidePanel::right("info_panel")
        .default_width(240.0)
        .show(ctx, |ui| {
            ui.heading("Selection");
            ui.label(format!("{} of {} selected", selected.0.len(), scene.voxels().len()));
            if let Some(visible) = scene.culling().visible_elements() {
                ui.label(format!("{} visible", visible.len()));
            }
            ui.horizontal(|ui| {
                let multi = scene.config().enable_multi_select;
                if ui.add_enabled(multi, egui::Button::new("Select all")).clicked() {
                    scene.select_all();
                }
                if ui.add_enabled(multi, egui::Button::new("Clear")).clicked() {
                    scene.clear_selection();
                }
            });
            if !selected.0.is_empty() {
                let mut ids: Vec<&str> = selected.0.iter().map(|id| id.as_str()).collect();
                ids.sort_unstable();
                egui::ScrollArea::vertical().max_height(160.0).show(ui, |ui| {
                    for id in ids {
                        ui.monospace(id);
                    }
                });
            }

            ui.separator();
            ui.heading("Last clicked");
            match &last_clicked.0 {
                Some(voxel) => {
                    ui.monospace(format!("id: {}", voxel.id));
                    let p = voxel.position;
                    ui.monospace(format!("position: ({}, {}, {})", p.x, p.y, p.z));
                    if !voxel.metadata.is_null() {
                        let pretty = serde_json::to_string_pretty(&voxel.metadata)
                            .unwrap_or_else(|_| voxel.metadata.to_string());
                        ui.monospace(pretty);
                    }
                }
                None => {
                    ui.label(egui::RichText::new("Click a block").color(egui::Color32::GRAY));
                }
            }
        });
}

/// Bottom bar: transient status messages.
pub fn ui_bottom_bar_system(mut contexts: EguiContexts, status: Res<StatusMessage>) {
    if !status.is_visible() {
        return;
    }
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };
    egui::TopBottomPanel::bottom("bottom_bar").show(ctx, |ui| {
        ui.label(&status.text);
    });
}

pub fn status_message_tick_system(time: Res<Time>, mut status: ResMut<StatusMessage>) {
    if status.is_visible() {
        status.timer -= time.delta_secs();
    }
}

/// Records whether egui claimed the pointer or keyboard this frame.
pub fn update_input_gate_system(mut contexts: EguiContexts, mut gate: ResMut<InputGate>) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };
    let next = InputGate {
        pointer_captured: ctx.wants_pointer_input() || ctx.is_pointer_over_area(),
        keyboard_captured: ctx.wants_keyboard_input(),
    };
    if gate.pointer_captured != next.pointer_captured
        || gate.keyboard_captured != next.keyboard_captured
    {
        *gate = next;
    }
}
