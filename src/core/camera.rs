//! Camera state and the grid → screen projection.
//!
//! Screen space is viewport-local pixels with the origin at the top-left and
//! `y` growing downward. The scene's local frame uses the same axes, with `z`
//! pointing toward the viewer, so `depth` grows as a block gets nearer.

use bevy::prelude::*;

use crate::core::voxel::GridPos;

/// Isometric default: rotation in degrees around the x and y axes.
pub const DEFAULT_ROTATION: Vec2 = Vec2::new(35.0, 45.0);
pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 3.0;
/// Zoom change per zoom-in/zoom-out control press.
pub const ZOOM_STEP: f32 = 0.2;
/// Zoom change per pixel of wheel `deltaY`.
pub const WHEEL_ZOOM_FACTOR: f32 = 0.001;
/// Degrees of rotation per pixel of pointer movement.
pub const ROTATE_SENSITIVITY: f32 = 0.5;

/// Rotation/pan/zoom applied to the whole scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub rotation: Vec2,
    pub pan: Vec2,
    pub zoom: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            rotation: DEFAULT_ROTATION,
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl CameraState {
    /// Pointer delta `(Δx, Δy)` → rotation `{x: +Δy*0.5, y: +Δx*0.5}`.
    pub fn rotate_by(&mut self, delta: Vec2) {
        self.rotation.x += delta.y * ROTATE_SENSITIVITY;
        self.rotation.y += delta.x * ROTATE_SENSITIVITY;
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// `delta_y` follows DOM wheel semantics: positive scrolls down (zooms out).
    pub fn wheel(&mut self, delta_y: f32) {
        self.set_zoom(self.zoom - delta_y * WHEEL_ZOOM_FACTOR);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - ZOOM_STEP);
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Rotation applied to scene-local points: yaw first, then pitch.
    pub fn rotation_matrix(&self) -> Mat3 {
        Mat3::from_rotation_x((-self.rotation.x).to_radians())
            * Mat3::from_rotation_y((-self.rotation.y).to_radians())
    }
}

/// Static geometry of the scene: block size, spacing, grid extent, viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneLayout {
    pub block_size: f32,
    pub gap: f32,
    /// Grid extent in cells. Its center is the rotation pivot.
    pub grid_size: UVec3,
    pub viewport: Vec2,
}

impl Default for SceneLayout {
    fn default() -> Self {
        Self {
            block_size: 40.0,
            gap: 2.0,
            grid_size: UVec3::new(10, 10, 5),
            viewport: Vec2::new(1280.0, 720.0),
        }
    }
}

impl SceneLayout {
    /// Distance between neighbouring cell centers.
    pub fn pitch(&self) -> f32 {
        self.block_size + self.gap
    }

    fn pivot(&self) -> Vec3 {
        (self.grid_size.as_vec3() - Vec3::ONE).max(Vec3::ZERO) * 0.5
    }

    /// Scene-local center of a grid cell, before the camera applies.
    pub fn local_center(&self, position: GridPos) -> Vec3 {
        let cell = Vec3::new(position.x as f32, position.y as f32, position.z as f32);
        (cell - self.pivot()) * self.pitch()
    }

    pub fn viewport_center(&self) -> Vec2 {
        self.viewport * 0.5
    }
}

/// Where a point lands on screen and how near it is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenTransform {
    pub position: Vec2,
    /// Greater is nearer to the viewer.
    pub depth: f32,
    pub scale: f32,
}

/// Projects a scene-local point through the camera.
pub fn project_local(local: Vec3, camera: &CameraState, layout: &SceneLayout) -> ScreenTransform {
    let rotated = camera.rotation_matrix() * local * camera.zoom;
    ScreenTransform {
        position: layout.viewport_center() + camera.pan + rotated.truncate(),
        depth: rotated.z,
        scale: camera.zoom,
    }
}

/// Grid cell → screen transform of the cell's center.
pub fn project(position: GridPos, camera: &CameraState, layout: &SceneLayout) -> ScreenTransform {
    project_local(layout.local_center(position), camera, layout)
}

/// Inverse of [`project`] restricted to the plane of layer `z`.
///
/// Returns `None` when that plane is seen edge-on and a screen point no
/// longer maps to a single cell.
pub fn unproject_to_grid(
    screen: Vec2,
    z: i32,
    camera: &CameraState,
    layout: &SceneLayout,
) -> Option<GridPos> {
    let m = camera.rotation_matrix() * camera.zoom;
    let plane = Mat2::from_cols(m.x_axis.truncate(), m.y_axis.truncate());
    if plane.determinant().abs() < 1e-3 {
        return None;
    }
    let pitch = layout.pitch();
    let pivot = layout.pivot();
    let local_z = (z as f32 - pivot.z) * pitch;
    let offset = screen - layout.viewport_center() - camera.pan - m.z_axis.truncate() * local_z;
    let local_xy = plane.inverse() * offset;
    let cell = local_xy / pitch + pivot.truncate();
    Some(GridPos::new(cell.x.round() as i32, cell.y.round() as i32, z))
}

/// The six labeled faces of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceKind {
    Top,
    Front,
    Right,
    Left,
    Back,
    Bottom,
}

impl FaceKind {
    pub const ALL: [FaceKind; 6] = [
        FaceKind::Top,
        FaceKind::Front,
        FaceKind::Right,
        FaceKind::Left,
        FaceKind::Back,
        FaceKind::Bottom,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FaceKind::Top => "top",
            FaceKind::Front => "front",
            FaceKind::Right => "right",
            FaceKind::Left => "left",
            FaceKind::Back => "back",
            FaceKind::Bottom => "bottom",
        }
    }

    /// Outward unit normal in scene-local space (y down, z toward viewer).
    pub fn normal(self) -> Vec3 {
        match self {
            FaceKind::Top => Vec3::NEG_Y,
            FaceKind::Bottom => Vec3::Y,
            FaceKind::Front => Vec3::Z,
            FaceKind::Back => Vec3::NEG_Z,
            FaceKind::Right => Vec3::X,
            FaceKind::Left => Vec3::NEG_X,
        }
    }

    /// In-plane axes `(u, v)` with `u × v == normal`.
    pub fn tangents(self) -> (Vec3, Vec3) {
        match self {
            FaceKind::Top => (Vec3::X, Vec3::Z),
            FaceKind::Bottom => (Vec3::X, Vec3::NEG_Z),
            FaceKind::Front => (Vec3::X, Vec3::Y),
            FaceKind::Back => (Vec3::NEG_X, Vec3::Y),
            FaceKind::Right => (Vec3::NEG_Z, Vec3::Y),
            FaceKind::Left => (Vec3::Z, Vec3::Y),
        }
    }

    /// Orthonormal basis mapping a unit quad in the xy plane onto this face.
    pub fn basis(self) -> Mat3 {
        let (u, v) = self.tangents();
        Mat3::from_cols(u, v, self.normal())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceProjection {
    pub kind: FaceKind,
    pub corners: [Vec2; 4],
    pub center: Vec2,
    pub depth: f32,
    pub front_facing: bool,
}

impl FaceProjection {
    /// Point-in-convex-quad test that accepts either winding.
    pub fn contains(&self, point: Vec2) -> bool {
        let mut sign = 0.0f32;
        for i in 0..4 {
            let a = self.corners[i];
            let b = self.corners[(i + 1) % 4];
            let cross = (b - a).perp_dot(point - a);
            if cross.abs() <= f32::EPSILON {
                continue;
            }
            if sign == 0.0 {
                sign = cross.signum();
            } else if cross.signum() != sign {
                return false;
            }
        }
        true
    }
}

/// Full screen-space footprint of one block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockProjection {
    pub center: Vec2,
    pub depth: f32,
    /// Axis-aligned bounds of the projected cube, like a DOM bounding rect.
    pub bounds: Rect,
    pub faces: [FaceProjection; 6],
}

impl BlockProjection {
    pub fn contains(&self, point: Vec2) -> bool {
        self.bounds.contains(point)
            && self
                .faces
                .iter()
                .any(|face| face.front_facing && face.contains(point))
    }

    pub fn face(&self, kind: FaceKind) -> &FaceProjection {
        // faces are stored in FaceKind::ALL order
        let index = FaceKind::ALL.iter().position(|k| *k == kind).unwrap_or(0);
        &self.faces[index]
    }
}

/// Projects the cube occupying `position`.
pub fn project_block(position: GridPos, camera: &CameraState, layout: &SceneLayout) -> BlockProjection {
    let center_local = layout.local_center(position);
    let half = layout.block_size * 0.5;
    let rotation = camera.rotation_matrix();
    let center = project_local(center_local, camera, layout);

    let faces = FaceKind::ALL.map(|kind| {
        let (u, v) = kind.tangents();
        let n = kind.normal();
        let corners = [-u - v, u - v, u + v, -u + v]
            .map(|offset| project_local(center_local + (n + offset) * half, camera, layout).position);
        let face_center = project_local(center_local + n * half, camera, layout);
        FaceProjection {
            kind,
            corners,
            center: face_center.position,
            depth: face_center.depth,
            front_facing: (rotation * n).z > 1e-4,
        }
    });

    let mut min = Vec2::splat(f32::INFINITY);
    let mut max = Vec2::splat(f32::NEG_INFINITY);
    for corner in faces.iter().flat_map(|f| f.corners) {
        min = min.min(corner);
        max = max.max(corner);
    }

    BlockProjection {
        center: center.position,
        depth: center.depth,
        bounds: Rect::from_corners(min, max),
        faces,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> SceneLayout {
        SceneLayout {
            block_size: 40.0,
            gap: 2.0,
            grid_size: UVec3::new(1, 1, 1),
            viewport: Vec2::new(800.0, 600.0),
        }
    }

    #[test]
    fn zoom_stays_clamped() {
        let mut cam = CameraState::default();
        for _ in 0..50 {
            cam.zoom_in();
        }
        assert_eq!(cam.zoom, MAX_ZOOM);
        cam.wheel(100_000.0);
        assert_eq!(cam.zoom, MIN_ZOOM);
        cam.wheel(-300.0);
        assert!((cam.zoom - 0.8).abs() < 1e-5);
        for _ in 0..50 {
            cam.zoom_out();
        }
        assert_eq!(cam.zoom, MIN_ZOOM);
    }

    #[test]
    fn reset_restores_isometric_default() {
        let mut cam = CameraState::default();
        cam.rotate_by(Vec2::new(37.0, -12.0));
        cam.pan_by(Vec2::new(5.0, 9.0));
        cam.wheel(-420.0);
        cam.reset();
        assert_eq!(cam.rotation, Vec2::new(35.0, 45.0));
        assert_eq!(cam.pan, Vec2::ZERO);
        assert_eq!(cam.zoom, 1.0);
    }

    #[test]
    fn rotation_uses_swapped_axes() {
        let mut cam = CameraState::default();
        cam.rotate_by(Vec2::new(10.0, 4.0));
        assert_eq!(cam.rotation, Vec2::new(37.0, 50.0));
    }

    #[test]
    fn default_view_shows_top_front_right() {
        let block = project_block(GridPos::new(0, 0, 0), &CameraState::default(), &layout());
        let visible: Vec<_> = block
            .faces
            .iter()
            .filter(|f| f.front_facing)
            .map(|f| f.kind)
            .collect();
        assert_eq!(visible, vec![FaceKind::Top, FaceKind::Front, FaceKind::Right]);
    }

    #[test]
    fn single_cell_grid_projects_to_viewport_center() {
        let t = project(GridPos::new(0, 0, 0), &CameraState::default(), &layout());
        assert!((t.position - Vec2::new(400.0, 300.0)).length() < 1e-3);
        let block = project_block(GridPos::new(0, 0, 0), &CameraState::default(), &layout());
        assert!(block.contains(Vec2::new(400.0, 300.0)));
        assert!(!block.contains(Vec2::new(10.0, 10.0)));
    }

    #[test]
    fn pan_and_zoom_move_the_projection() {
        let mut cam = CameraState::default();
        let mut l = layout();
        l.grid_size = UVec3::new(3, 3, 1);
        let before = project(GridPos::new(2, 0, 0), &cam, &l).position;
        cam.pan_by(Vec2::new(15.0, -5.0));
        let panned = project(GridPos::new(2, 0, 0), &cam, &l).position;
        assert!((panned - before - Vec2::new(15.0, -5.0)).length() < 1e-3);
        cam.set_zoom(2.0);
        let zoomed = project(GridPos::new(2, 0, 0), &cam, &l).position;
        let center = l.viewport_center() + cam.pan;
        assert!(((zoomed - center) - (before - l.viewport_center()) * 2.0).length() < 1e-2);
    }

    #[test]
    fn unproject_inverts_project() {
        let mut l = layout();
        l.grid_size = UVec3::new(10, 10, 5);
        let mut cam = CameraState::default();
        cam.rotate_by(Vec2::new(-20.0, 14.0));
        cam.set_zoom(1.7);
        for pos in [GridPos::new(0, 0, 0), GridPos::new(7, 3, 2), GridPos::new(-2, 11, 4)] {
            let screen = project(pos, &cam, &l).position;
            assert_eq!(unproject_to_grid(screen, pos.z, &cam, &l), Some(pos));
        }
    }

    #[test]
    fn unproject_edge_on_plane_is_none() {
        let cam = CameraState {
            rotation: Vec2::new(90.0, 0.0),
            ..Default::default()
        };
        assert_eq!(unproject_to_grid(Vec2::new(400.0, 300.0), 0, &cam, &layout()), None);
    }

    #[test]
    fn face_bases_are_right_handed() {
        for kind in FaceKind::ALL {
            let (u, v) = kind.tangents();
            assert!((u.cross(v) - kind.normal()).length() < 1e-6, "{}", kind.label());
            assert!((kind.basis().determinant() - 1.0).abs() < 1e-6);
        }
    }
}
