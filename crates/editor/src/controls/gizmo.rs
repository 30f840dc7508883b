use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use shared::{TransformMode, TransformSpace};

use super::plane::effective_space;
use crate::viewport::camera::Camera;
use crate::viewport::mesh::LineMeshData;
use crate::viewport::picking::{
    ray_plane_intersect, ray_segment_distance, ray_sphere_intersect, Ray,
};

// Handle geometry in gizmo units (multiplied by the screen-size factor)
const AXIS_PICK_LENGTH: f32 = 0.6;
const AXIS_PICK_RADIUS: f32 = 0.2;
const PLANE_PICK_SIZE: f32 = 0.4;
const CENTER_PICK_RADIUS: f32 = 0.2;
const ROTATE_RING_RADIUS: f32 = 0.5;
const EYE_RING_RADIUS: f32 = 0.75;
const RING_TUBE: f32 = 0.1;
const TRACKBALL_RADIUS: f32 = 0.25;
const RING_SEGMENTS: usize = 48;

/// Axis handles nearly parallel to the view direction are hidden
const AXIS_HIDE_THRESHOLD: f32 = 0.99;
/// Plane handles nearly edge-on to the view are hidden
const PLANE_HIDE_THRESHOLD: f32 = 0.2;

const RED: [f32; 4] = [0.9, 0.2, 0.2, 1.0];
const GREEN: [f32; 4] = [0.2, 0.8, 0.2, 1.0];
const BLUE: [f32; 4] = [0.2, 0.3, 0.9, 1.0];
const YELLOW: [f32; 4] = [1.0, 1.0, 0.0, 1.0];
const GREY: [f32; 4] = [0.75, 0.75, 0.75, 1.0];

/// Named gizmo handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GizmoAxis {
    X,
    Y,
    Z,
    #[serde(rename = "XY")]
    Xy,
    #[serde(rename = "YZ")]
    Yz,
    #[serde(rename = "XZ")]
    Xz,
    #[serde(rename = "XYZ")]
    Xyz,
    /// Rotation about the eye vector
    E,
    /// Free trackball rotation
    #[serde(rename = "XYZE")]
    Xyze,
}

impl GizmoAxis {
    pub fn name(&self) -> &'static str {
        match self {
            GizmoAxis::X => "X",
            GizmoAxis::Y => "Y",
            GizmoAxis::Z => "Z",
            GizmoAxis::Xy => "XY",
            GizmoAxis::Yz => "YZ",
            GizmoAxis::Xz => "XZ",
            GizmoAxis::Xyz => "XYZ",
            GizmoAxis::E => "E",
            GizmoAxis::Xyze => "XYZE",
        }
    }

    pub fn has_x(&self) -> bool {
        self.name().contains('X')
    }

    pub fn has_y(&self) -> bool {
        self.name().contains('Y')
    }

    pub fn has_z(&self) -> bool {
        self.name().contains('Z')
    }

    /// Unit vector of a single-axis handle (zero otherwise)
    pub fn unit(&self) -> Vec3 {
        match self {
            GizmoAxis::X => Vec3::X,
            GizmoAxis::Y => Vec3::Y,
            GizmoAxis::Z => Vec3::Z,
            _ => Vec3::ZERO,
        }
    }
}

/// Handles available in each transform mode
pub fn handles_for(mode: TransformMode) -> &'static [GizmoAxis] {
    use GizmoAxis::*;
    match mode {
        TransformMode::Translate | TransformMode::Scale => &[X, Y, Z, Xy, Yz, Xz, Xyz],
        TransformMode::Rotate => &[X, Y, Z, E, Xyze],
    }
}

/// World size of one gizmo unit so the gizmo keeps a constant screen size
pub fn gizmo_factor(distance: f32, fov: f32, zoom: f32, size: f32) -> f32 {
    distance * (1.9 * (fov * 0.5).tan() / zoom).min(7.0) * size / 4.0
}

/// Whole-shape manipulator: configuration plus per-frame placement
#[derive(Debug, Clone)]
pub struct Gizmo {
    pub size: f32,
    pub show_x: bool,
    pub show_y: bool,
    pub show_z: bool,
    pivot: Vec3,
    orientation: Quat,
    eye: Vec3,
    camera_distance: f32,
    factor: f32,
    mode: TransformMode,
    hovered: Option<GizmoAxis>,
}

impl Default for Gizmo {
    fn default() -> Self {
        Self {
            size: 1.0,
            show_x: true,
            show_y: true,
            show_z: true,
            pivot: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            eye: Vec3::Y,
            camera_distance: 1.0,
            factor: 1.0,
            mode: TransformMode::Translate,
            hovered: None,
        }
    }
}

impl Gizmo {
    /// Place the gizmo at `pivot` for the current camera.
    pub fn update(
        &mut self,
        pivot: Vec3,
        world_rotation: Quat,
        mode: TransformMode,
        space: TransformSpace,
        camera: &dyn Camera,
    ) {
        self.pivot = pivot;
        self.mode = mode;
        // Scale handles always follow the shape's rotation
        let local = mode == TransformMode::Scale || space == TransformSpace::Local;
        self.orientation = if local { world_rotation } else { Quat::IDENTITY };

        let to_camera = camera.position() - pivot;
        self.camera_distance = to_camera.length().max(1e-6);
        self.eye = to_camera.normalize_or(Vec3::Y);
        self.factor = gizmo_factor(self.camera_distance, camera.fov(), camera.zoom(), self.size);
    }

    pub fn pivot(&self) -> Vec3 {
        self.pivot
    }

    /// Unit vector from the pivot toward the camera
    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    /// Orientation used by a drag on `axis` in `space`
    pub fn drag_orientation(&self, axis: GizmoAxis, space: TransformSpace, world_rotation: Quat) -> Quat {
        match effective_space(self.mode, axis, space) {
            TransformSpace::Local => world_rotation,
            TransformSpace::World => Quat::IDENTITY,
        }
    }

    /// Radians per unit of pointer travel on the drag plane
    pub fn rotation_speed(&self) -> f32 {
        shared::config::ROTATION_SPEED_FACTOR / self.camera_distance
    }

    pub fn hovered(&self) -> Option<GizmoAxis> {
        self.hovered
    }

    pub fn set_hovered(&mut self, axis: Option<GizmoAxis>) {
        self.hovered = axis;
    }

    /// Whether `axis` is shown: enabled by the axis flags and not aligned
    /// edge-on with the view.
    pub fn is_visible(&self, axis: GizmoAxis) -> bool {
        if (axis.has_x() && !self.show_x)
            || (axis.has_y() && !self.show_y)
            || (axis.has_z() && !self.show_z)
        {
            return false;
        }
        if axis == GizmoAxis::E && !(self.show_x && self.show_y && self.show_z) {
            return false;
        }
        if self.mode == TransformMode::Rotate {
            return true;
        }

        let v1 = self.orientation * Vec3::X;
        let v2 = self.orientation * Vec3::Y;
        let v3 = self.orientation * Vec3::Z;
        match axis {
            GizmoAxis::X => v1.dot(self.eye).abs() < AXIS_HIDE_THRESHOLD,
            GizmoAxis::Y => v2.dot(self.eye).abs() < AXIS_HIDE_THRESHOLD,
            GizmoAxis::Z => v3.dot(self.eye).abs() < AXIS_HIDE_THRESHOLD,
            GizmoAxis::Xy => v3.dot(self.eye).abs() > PLANE_HIDE_THRESHOLD,
            GizmoAxis::Yz => v1.dot(self.eye).abs() > PLANE_HIDE_THRESHOLD,
            GizmoAxis::Xz => v2.dot(self.eye).abs() > PLANE_HIDE_THRESHOLD,
            _ => true,
        }
    }

    /// Nearest visible handle under the ray with its ray distance.
    pub fn hit_test(&self, ray: &Ray) -> Option<(GizmoAxis, f32)> {
        handles_for(self.mode)
            .iter()
            .filter(|axis| self.is_visible(**axis))
            .filter_map(|axis| self.hit_handle(ray, *axis).map(|t| (*axis, t)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    fn hit_handle(&self, ray: &Ray, axis: GizmoAxis) -> Option<f32> {
        let f = self.factor;
        let pivot = self.pivot;
        let dir = |v: Vec3| self.orientation * v;

        match (self.mode, axis) {
            (TransformMode::Rotate, GizmoAxis::X | GizmoAxis::Y | GizmoAxis::Z) => {
                hit_ring(ray, pivot, dir(axis.unit()), ROTATE_RING_RADIUS * f, RING_TUBE * f)
            }
            (TransformMode::Rotate, GizmoAxis::E) => {
                hit_ring(ray, pivot, self.eye, EYE_RING_RADIUS * f, RING_TUBE * f)
            }
            (TransformMode::Rotate, GizmoAxis::Xyze) => {
                ray_sphere_intersect(ray, pivot, TRACKBALL_RADIUS * f)
            }
            (_, GizmoAxis::X | GizmoAxis::Y | GizmoAxis::Z) => {
                let d = dir(axis.unit()) * AXIS_PICK_LENGTH * f;
                let (dist, t) = ray_segment_distance(ray, pivot - d, pivot + d);
                (dist < AXIS_PICK_RADIUS * f).then_some(t)
            }
            (_, GizmoAxis::Xy) => hit_square(ray, pivot, dir(Vec3::X), dir(Vec3::Y), PLANE_PICK_SIZE * f),
            (_, GizmoAxis::Yz) => hit_square(ray, pivot, dir(Vec3::Y), dir(Vec3::Z), PLANE_PICK_SIZE * f),
            (_, GizmoAxis::Xz) => hit_square(ray, pivot, dir(Vec3::X), dir(Vec3::Z), PLANE_PICK_SIZE * f),
            (_, GizmoAxis::Xyz) => ray_sphere_intersect(ray, pivot, CENTER_PICK_RADIUS * f),
            _ => None,
        }
    }

    /// Line geometry of the visible handles for the host renderer. The
    /// hovered handle is drawn yellow.
    pub fn lines(&self) -> LineMeshData {
        let mut lines = LineMeshData::default();
        let f = self.factor;

        for &axis in handles_for(self.mode) {
            if !self.is_visible(axis) {
                continue;
            }
            let color = if self.hovered == Some(axis) {
                YELLOW
            } else {
                axis_color(axis)
            };
            let dir = self.orientation * axis.unit();

            match (self.mode, axis) {
                (TransformMode::Rotate, GizmoAxis::X | GizmoAxis::Y | GizmoAxis::Z) => {
                    push_ring(&mut lines, self.pivot, dir, ROTATE_RING_RADIUS * f, color)
                }
                (TransformMode::Rotate, GizmoAxis::E) => {
                    push_ring(&mut lines, self.pivot, self.eye, EYE_RING_RADIUS * f, color)
                }
                (TransformMode::Translate, GizmoAxis::X | GizmoAxis::Y | GizmoAxis::Z) => {
                    push_arrow(&mut lines, self.pivot, dir, self.side_vector(dir), 0.5 * f, color)
                }
                (TransformMode::Scale, GizmoAxis::X | GizmoAxis::Y | GizmoAxis::Z) => {
                    push_box_tip(&mut lines, self.pivot, dir, self.side_vector(dir), 0.5 * f, color)
                }
                (_, GizmoAxis::Xy) => push_square(&mut lines, self.pivot, self.orientation * Vec3::X, self.orientation * Vec3::Y, 0.25 * f, color),
                (_, GizmoAxis::Yz) => push_square(&mut lines, self.pivot, self.orientation * Vec3::Y, self.orientation * Vec3::Z, 0.25 * f, color),
                (_, GizmoAxis::Xz) => push_square(&mut lines, self.pivot, self.orientation * Vec3::X, self.orientation * Vec3::Z, 0.25 * f, color),
                (_, GizmoAxis::Xyz) => {
                    let s = 0.1 * f;
                    for d in [Vec3::X, Vec3::Y, Vec3::Z] {
                        lines.push_segment(self.pivot - d * s, self.pivot + d * s, color);
                    }
                }
                // Trackball has no outline
                _ => {}
            }
        }

        lines
    }

    /// Direction perpendicular to `dir` used to draw arrowheads
    fn side_vector(&self, dir: Vec3) -> Vec3 {
        let side = dir.cross(self.eye);
        if side.length_squared() < 1e-8 {
            dir.any_orthonormal_vector()
        } else {
            side.normalize()
        }
    }
}

fn axis_color(axis: GizmoAxis) -> [f32; 4] {
    match axis {
        GizmoAxis::X | GizmoAxis::Yz => RED,
        GizmoAxis::Y | GizmoAxis::Xz => GREEN,
        GizmoAxis::Z | GizmoAxis::Xy => BLUE,
        _ => GREY,
    }
}

// ── Hit helpers ──────────────────────────────────────────────

fn hit_ring(ray: &Ray, center: Vec3, normal: Vec3, radius: f32, tube: f32) -> Option<f32> {
    let t = ray_plane_intersect(ray, center, normal)?;
    let r = (ray.at(t) - center).length();
    ((r - radius).abs() <= tube).then_some(t)
}

fn hit_square(ray: &Ray, corner: Vec3, u: Vec3, v: Vec3, size: f32) -> Option<f32> {
    let t = ray_plane_intersect(ray, corner, u.cross(v))?;
    let p = ray.at(t) - corner;
    let (a, b) = (p.dot(u), p.dot(v));
    ((0.0..=size).contains(&a) && (0.0..=size).contains(&b)).then_some(t)
}

// ── Line helpers ─────────────────────────────────────────────

fn push_arrow(lines: &mut LineMeshData, origin: Vec3, dir: Vec3, side: Vec3, length: f32, color: [f32; 4]) {
    let tip = origin + dir * length;
    let arrow = length * 0.15;
    lines.push_segment(origin, tip, color);
    lines.push_segment(tip, tip - dir * arrow + side * arrow * 0.5, color);
    lines.push_segment(tip, tip - dir * arrow - side * arrow * 0.5, color);
}

fn push_box_tip(lines: &mut LineMeshData, origin: Vec3, dir: Vec3, side: Vec3, length: f32, color: [f32; 4]) {
    let tip = origin + dir * length;
    let h = length * 0.08;
    lines.push_segment(origin, tip, color);
    let corners = [
        tip + side * h,
        tip + dir * h * 2.0 + side * h,
        tip + dir * h * 2.0 - side * h,
        tip - side * h,
    ];
    for i in 0..4 {
        lines.push_segment(corners[i], corners[(i + 1) % 4], color);
    }
}

fn push_square(lines: &mut LineMeshData, corner: Vec3, u: Vec3, v: Vec3, size: f32, color: [f32; 4]) {
    let a = corner + u * size * 0.5;
    let b = corner + (u + v) * size;
    let c = corner + v * size * 0.5;
    lines.push_segment(a, corner + u * size, color);
    lines.push_segment(corner + u * size, b, color);
    lines.push_segment(b, corner + v * size, color);
    lines.push_segment(corner + v * size, c, color);
}

fn push_ring(lines: &mut LineMeshData, center: Vec3, normal: Vec3, radius: f32, color: [f32; 4]) {
    let n = normal.normalize_or(Vec3::Y);
    let (u, v) = n.any_orthonormal_pair();
    let point = |k: usize| {
        let a = k as f32 / RING_SEGMENTS as f32 * std::f32::consts::TAU;
        center + (u * a.cos() + v * a.sin()) * radius
    };
    for k in 0..RING_SEGMENTS {
        lines.push_segment(point(k), point(k + 1), color);
    }
}
