//! Block rendering: one voxel plus its interaction flags → a six-faced visual.
//!
//! Placement is not decided here. The visual carries grid coordinates and the
//! scene projects them with the current camera.

use bevy::color::{Alpha, Hsla, Srgba};
use bevy::prelude::*;
use phf::phf_map;

use crate::core::camera::FaceKind;
use crate::core::voxel::{GridPos, Material, Priority, Theme, VisualVariant, VoxelId};

/// Fallback when an explicit color string does not parse.
const FALLBACK_COLOR: Srgba = Srgba::rgb(0.23, 0.51, 0.96); // #3B82F6

/// CSS color keywords accepted in a voxel's `color` field.
static NAMED_COLORS: phf::Map<&'static str, (u8, u8, u8)> = phf_map! {
    "black" => (0, 0, 0),
    "white" => (255, 255, 255),
    "red" => (255, 0, 0),
    "green" => (0, 128, 0),
    "blue" => (0, 0, 255),
    "yellow" => (255, 255, 0),
    "orange" => (255, 165, 0),
    "purple" => (128, 0, 128),
    "pink" => (255, 192, 203),
    "cyan" => (0, 255, 255),
    "magenta" => (255, 0, 255),
    "teal" => (0, 128, 128),
    "navy" => (0, 0, 128),
    "gray" => (128, 128, 128),
    "grey" => (128, 128, 128),
    "gold" => (255, 215, 0),
    "coral" => (255, 127, 80),
    "indigo" => (75, 0, 130),
    "lime" => (0, 255, 0),
    "brown" => (165, 42, 42),
};

/// Parses `#rgb`, `#rrggbb` or a keyword from [`NAMED_COLORS`].
pub fn parse_color(input: &str) -> Option<Srgba> {
    let trimmed = input.trim();
    if trimmed.starts_with('#') {
        return Srgba::hex(trimmed).ok();
    }
    NAMED_COLORS
        .get(trimmed.to_ascii_lowercase().as_str())
        .map(|&(r, g, b)| Srgba::rgb_u8(r, g, b))
}

pub fn priority_color(priority: Priority) -> Srgba {
    match priority {
        Priority::Low => Srgba::rgb(0.29, 0.78, 0.45),
        Priority::Medium => Srgba::rgb(0.96, 0.69, 0.20),
        Priority::High => Srgba::rgb(0.93, 0.29, 0.29),
    }
}

pub fn theme_color(theme: Theme) -> Srgba {
    match theme {
        Theme::Ocean => Srgba::rgb(0.16, 0.50, 0.85),
        Theme::Forest => Srgba::rgb(0.18, 0.55, 0.30),
        Theme::Sunset => Srgba::rgb(0.98, 0.45, 0.22),
        Theme::Lavender => Srgba::rgb(0.66, 0.55, 0.93),
        Theme::Rose => Srgba::rgb(0.93, 0.40, 0.58),
        Theme::Slate => Srgba::rgb(0.40, 0.46, 0.55),
    }
}

pub fn base_color(variant: &VisualVariant) -> Srgba {
    match variant {
        VisualVariant::Color(c) => parse_color(c).unwrap_or(FALLBACK_COLOR),
        VisualVariant::Priority(p) => priority_color(*p),
        VisualVariant::Theme(t) => theme_color(*t),
    }
}

/// Lightness multiplier per face, top brightest.
pub fn face_shade(face: FaceKind) -> f32 {
    match face {
        FaceKind::Top => 1.0,
        FaceKind::Front => 0.85,
        FaceKind::Right => 0.7,
        FaceKind::Left => 0.7,
        FaceKind::Back => 0.6,
        FaceKind::Bottom => 0.5,
    }
}

fn apply_material(color: Srgba, material: Material) -> Srgba {
    let hsla = Hsla::from(color);
    let out = match material {
        Material::Default => hsla,
        Material::Glass => hsla.with_lightness((hsla.lightness + 0.15).min(0.95)).with_alpha(0.45),
        Material::Metal => hsla.with_saturation(hsla.saturation * 0.35),
        Material::Neon => hsla
            .with_saturation(1.0)
            .with_lightness(hsla.lightness.max(0.6)),
    };
    Srgba::from(out)
}

/// Inputs of [`render_block`].
#[derive(Debug, Clone, PartialEq)]
pub struct BlockProps {
    pub id: VoxelId,
    pub position: GridPos,
    pub variant: VisualVariant,
    pub material: Option<Material>,
    pub selected: bool,
    pub completed: bool,
    pub visible: bool,
    pub draggable: bool,
    pub dragging: bool,
}

/// Additive state flags. None of them affect the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockFlags {
    pub selected: bool,
    pub completed: bool,
    pub draggable: bool,
    pub dragging: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceStyle {
    pub kind: FaceKind,
    pub color: Color,
}

/// Renderer output for one block.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockVisual {
    pub id: VoxelId,
    pub position: GridPos,
    pub faces: [FaceStyle; 6],
    pub flags: BlockFlags,
    /// False while culled. The element still exists so it stays registered.
    pub painted: bool,
    pub hit_testable: bool,
}

impl BlockVisual {
    pub fn face(&self, kind: FaceKind) -> &FaceStyle {
        let index = FaceKind::ALL.iter().position(|k| *k == kind).unwrap_or(0);
        &self.faces[index]
    }
}

pub fn render_block(props: &BlockProps) -> BlockVisual {
    let material = props.material.unwrap_or_default();
    let base = apply_material(base_color(&props.variant), material);

    let faces = FaceKind::ALL.map(|kind| {
        let mut hsla = Hsla::from(base);
        hsla.lightness = (hsla.lightness * face_shade(kind)).clamp(0.0, 1.0);
        if props.selected {
            hsla.lightness = (hsla.lightness + 0.12).min(1.0);
        }
        if props.completed {
            hsla.saturation *= 0.3;
            hsla.alpha *= 0.55;
        }
        if props.dragging {
            hsla.alpha *= 0.6;
        }
        FaceStyle {
            kind,
            color: Color::from(hsla),
        }
    });

    BlockVisual {
        id: props.id.clone(),
        position: props.position,
        faces,
        flags: BlockFlags {
            selected: props.selected,
            completed: props.completed,
            draggable: props.draggable,
            dragging: props.dragging,
        },
        painted: props.visible,
        hit_testable: props.visible,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props() -> BlockProps {
        BlockProps {
            id: VoxelId::new("1"),
            position: GridPos::new(1, 2, 0),
            variant: VisualVariant::Priority(Priority::High),
            material: None,
            selected: false,
            completed: false,
            visible: true,
            draggable: false,
            dragging: false,
        }
    }

    #[test]
    fn parses_hex_and_keywords() {
        assert_eq!(parse_color("#ff0000"), Some(Srgba::rgb(1.0, 0.0, 0.0)));
        assert_eq!(parse_color(" Teal "), Some(Srgba::rgb_u8(0, 128, 128)));
        assert_eq!(parse_color("not-a-color"), None);
        assert_eq!(base_color(&VisualVariant::Color("#zzz".into())), FALLBACK_COLOR);
    }

    #[test]
    fn six_faces_with_top_brightest() {
        let visual = render_block(&props());
        assert_eq!(visual.faces.map(|f| f.kind), FaceKind::ALL);
        let lightness = |k| Hsla::from(visual.face(k).color).lightness;
        assert!(lightness(FaceKind::Top) > lightness(FaceKind::Front));
        assert!(lightness(FaceKind::Front) > lightness(FaceKind::Bottom));
        assert_eq!(visual.position, GridPos::new(1, 2, 0));
    }

    #[test]
    fn invisible_blocks_exist_but_are_inert() {
        let visual = render_block(&BlockProps { visible: false, ..props() });
        assert!(!visual.painted);
        assert!(!visual.hit_testable);
        assert_eq!(visual.id, VoxelId::new("1"));
    }

    #[test]
    fn flags_are_independent() {
        let visual = render_block(&BlockProps {
            selected: true,
            dragging: true,
            ..props()
        });
        assert_eq!(
            visual.flags,
            BlockFlags {
                selected: true,
                completed: false,
                draggable: false,
                dragging: true
            }
        );
        assert!(visual.painted);
    }

    #[test]
    fn glass_and_completion_reduce_alpha() {
        let glass = render_block(&BlockProps {
            material: Some(Material::Glass),
            ..props()
        });
        assert!(glass.face(FaceKind::Top).color.alpha() < 0.5);
        let done = render_block(&BlockProps { completed: true, ..props() });
        assert!(done.face(FaceKind::Top).color.alpha() < 0.6);
        assert_eq!(render_block(&props()).face(FaceKind::Top).color.alpha(), 1.0);
    }

    #[test]
    fn selection_lightens() {
        let plain = render_block(&props());
        let selected = render_block(&BlockProps { selected: true, ..props() });
        let l = |v: &BlockVisual| Hsla::from(v.face(FaceKind::Front).color).lightness;
        assert!(l(&selected) > l(&plain));
    }
}
