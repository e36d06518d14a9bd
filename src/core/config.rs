use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::core::camera::SceneLayout;
use crate::core::culling::{CullingOptions, RootMargin};
use crate::core::drag::DragOptions;
use crate::core::scene::SceneConfig;

/// Application configuration loaded from `~/.voxgridrc`.
#[derive(Debug, Clone, Serialize, Deserialize, Resource, PartialEq)]
pub struct VoxgridConfig {
    /// Background color of the viewport in hex format (e.g., "#0f172a").
    #[serde(default = "default_background_color")]
    pub background_color: String,
    #[serde(default = "default_block_size")]
    pub block_size: f32,
    #[serde(default = "default_gap")]
    pub gap: f32,
    #[serde(default = "default_grid_size")]
    pub grid_size: [u32; 3],
    #[serde(default = "default_true")]
    pub enable_viewport_culling: bool,
    #[serde(default = "default_true")]
    pub enable_multi_select: bool,
    #[serde(default = "default_true")]
    pub draggable_blocks: bool,
    /// CSS-style margin, e.g. "50px" or "10px 5%".
    #[serde(default = "default_root_margin")]
    pub root_margin: String,
    #[serde(default)]
    pub threshold: f32,
    #[serde(default = "default_true")]
    pub snap_to_grid: bool,
    #[serde(default = "default_snap_pitch")]
    pub snap_pitch: f32,
}

fn default_background_color() -> String { "#0f172a".to_string() }
fn default_block_size() -> f32 { 40.0 }
fn default_gap() -> f32 { 2.0 }
fn default_grid_size() -> [u32; 3] { [10, 10, 5] }
fn default_true() -> bool { true }
fn default_root_margin() -> String { "50px".to_string() }
fn default_snap_pitch() -> f32 { 40.0 }

impl Default for VoxgridConfig {
    fn default() -> Self {
        Self {
            background_color: default_background_color(),
            block_size: default_block_size(),
            gap: default_gap(),
            grid_size: default_grid_size(),
            enable_viewport_culling: true,
            enable_multi_select: true,
            draggable_blocks: true,
            root_margin: default_root_margin(),
            threshold: 0.0,
            snap_to_grid: true,
            snap_pitch: default_snap_pitch(),
        }
    }
}

impl VoxgridConfig {
    /// Parse the background hex string into a Bevy Color.
    pub fn bg_color(&self) -> Color {
        bevy::color::Srgba::hex(&self.background_color)
            .unwrap_or(bevy::color::Srgba::new(0.06, 0.09, 0.16, 1.0))
            .into()
    }

    /// An unparsable margin falls back to the default one.
    pub fn root_margin(&self) -> RootMargin {
        match self.root_margin.parse() {
            Ok(margin) => margin,
            Err(err) => {
                warn!("[CONFIG] {}, using default", err);
                RootMargin::default()
            }
        }
    }

    pub fn scene_config(&self) -> SceneConfig {
        SceneConfig {
            enable_viewport_culling: self.enable_viewport_culling,
            enable_multi_select: self.enable_multi_select,
            draggable_blocks: self.draggable_blocks,
            culling: CullingOptions {
                root_margin: self.root_margin(),
                threshold: self.threshold,
                enabled: self.enable_viewport_culling,
            },
            drag: DragOptions {
                snap_to_grid: self.snap_to_grid,
                grid_size: self.snap_pitch,
            },
        }
    }

    pub fn layout(&self, viewport: Vec2) -> SceneLayout {
        SceneLayout {
            block_size: self.block_size,
            gap: self.gap,
            grid_size: UVec3::from_array(self.grid_size),
            viewport,
        }
    }
}

pub fn parse_config(contents: &str) -> Result<VoxgridConfig, toml::de::Error> {
    toml::from_str(contents)
}

/// Attempts to load the configuration from `~/.voxgridrc`.
/// Falls back to default if the file is missing or invalid.
pub fn load_config() -> VoxgridConfig {
    if let Ok(home) = env::var("HOME") {
        let path = PathBuf::from(home).join(".voxgridrc");
        if let Ok(contents) = fs::read_to_string(path) {
            match parse_config(&contents) {
                Ok(config) => return config,
                Err(err) => {
                    eprintln!("Failed to parse ~/.voxgridrc: {}", err);
                }
            }
        }
    }
    VoxgridConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::culling::MarginValue;

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(parse_config("").unwrap(), VoxgridConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = parse_config(
            r#"
            enable_multi_select = false
            root_margin = "10px 5%"
            grid_size = [4, 4, 2]
            "#,
        )
        .unwrap();
        assert!(!config.enable_multi_select);
        assert!(config.enable_viewport_culling);
        assert_eq!(config.block_size, 40.0);
        let scene = config.scene_config();
        assert_eq!(scene.culling.root_margin.left, MarginValue::Percent(5.0));
        assert_eq!(config.layout(Vec2::ONE).grid_size, UVec3::new(4, 4, 2));
    }

    #[test]
    fn bad_margin_falls_back() {
        let config = VoxgridConfig {
            root_margin: "wide".to_string(),
            ..Default::default()
        };
        assert_eq!(config.root_margin(), RootMargin::default());
    }

    #[test]
    fn wrong_types_are_rejected() {
        assert!(parse_config("block_size = \"big\"").is_err());
    }

    #[test]
    fn bg_color_parses_hex() {
        let config = VoxgridConfig {
            background_color: "#ff0000".to_string(),
            ..Default::default()
        };
        let srgba = config.bg_color().to_srgba();
        assert!((srgba.red - 1.0).abs() < 0.01);
        assert!(srgba.green.abs() < 0.01);
        // invalid hex does not panic
        let _ = VoxgridConfig {
            background_color: "nope".to_string(),
            ..Default::default()
        }
        .bg_color();
    }
}
