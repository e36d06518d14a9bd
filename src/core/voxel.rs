//! The voxel record handed to the scene by the task store.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable voxel identifier. The only key used for selection and culling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoxelId(pub String);

impl VoxelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VoxelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VoxelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Grid cell coordinates. Not pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Ocean,
    Forest,
    Sunset,
    Lavender,
    Rose,
    Slate,
}

impl Theme {
    pub const ALL: [Theme; 6] = [
        Theme::Ocean,
        Theme::Forest,
        Theme::Sunset,
        Theme::Lavender,
        Theme::Rose,
        Theme::Slate,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Material {
    #[default]
    Default,
    Glass,
    Metal,
    Neon,
}

impl Material {
    pub const ALL: [Material; 4] = [
        Material::Default,
        Material::Glass,
        Material::Metal,
        Material::Neon,
    ];
}

/// Mutually exclusive styling input. Priority is the fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisualVariant {
    /// Hex (`#rgb`, `#rrggbb`) or a CSS color keyword.
    Color(String),
    Priority(Priority),
    Theme(Theme),
}

impl Default for VisualVariant {
    fn default() -> Self {
        VisualVariant::Priority(Priority::default())
    }
}

/// One positioned, styled block. The scene never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawVoxel", into = "RawVoxel")]
pub struct Voxel {
    pub id: VoxelId,
    pub position: GridPos,
    pub variant: VisualVariant,
    pub material: Option<Material>,
    pub completed: bool,
    /// Opaque to the scene; passed through to click events untouched.
    pub metadata: serde_json::Value,
}

impl Voxel {
    pub fn new(id: impl Into<String>, position: GridPos) -> Self {
        Self {
            id: VoxelId::new(id),
            position,
            variant: VisualVariant::default(),
            material: None,
            completed: false,
            metadata: serde_json::Value::Null,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.variant = VisualVariant::Priority(priority);
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.variant = VisualVariant::Theme(theme);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.variant = VisualVariant::Color(color.into());
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = Some(material);
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }
}

/// Flat on-disk shape, matching the web client's voxel objects.
#[derive(Serialize, Deserialize)]
struct RawVoxel {
    id: VoxelId,
    x: i32,
    y: i32,
    z: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    theme: Option<Theme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    material: Option<Material>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    completed: bool,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    metadata: serde_json::Value,
}

impl From<RawVoxel> for Voxel {
    fn from(raw: RawVoxel) -> Self {
        // color wins over theme, theme over priority
        let variant = match (raw.color, raw.theme) {
            (Some(color), _) => VisualVariant::Color(color),
            (None, Some(theme)) => VisualVariant::Theme(theme),
            (None, None) => VisualVariant::Priority(raw.priority.unwrap_or_default()),
        };
        Voxel {
            id: raw.id,
            position: GridPos::new(raw.x, raw.y, raw.z),
            variant,
            material: raw.material,
            completed: raw.completed,
            metadata: raw.metadata,
        }
    }
}

impl From<Voxel> for RawVoxel {
    fn from(voxel: Voxel) -> Self {
        let (color, priority, theme) = match voxel.variant {
            VisualVariant::Color(c) => (Some(c), None, None),
            VisualVariant::Priority(p) => (None, Some(p), None),
            VisualVariant::Theme(t) => (None, None, Some(t)),
        };
        RawVoxel {
            id: voxel.id,
            x: voxel.position.x,
            y: voxel.position.y,
            z: voxel.position.z,
            color,
            priority,
            theme,
            material: voxel.material,
            completed: voxel.completed,
            metadata: voxel.metadata,
        }
    }
}
