//! Whole-shape translate / rotate / scale from a drag-start snapshot.
//!
//! `point_start` and `point_end` are drag-plane hits relative to the world
//! position captured at drag start.

use glam::{Quat, Vec3};
use shared::TransformSpace;

use super::gizmo::GizmoAxis;
use crate::scene::SceneNode;

/// Transform state captured when a gizmo drag begins
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragStart {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub world_position: Vec3,
    pub world_rotation: Quat,
    pub parent_position: Vec3,
    pub parent_rotation: Quat,
    pub parent_scale: Vec3,
    pub point_start: Vec3,
}

impl DragStart {
    pub fn capture(node: &SceneNode, plane_hit: Vec3) -> Self {
        let world = node.world();
        let parent = node.parent();
        Self {
            position: node.position,
            rotation: node.rotation,
            scale: node.scale,
            world_position: world.position,
            world_rotation: world.rotation,
            parent_position: parent.position,
            parent_rotation: parent.rotation,
            parent_scale: parent.scale,
            point_start: plane_hit - world.position,
        }
    }

    /// Put the node back to its drag-start transform.
    pub fn restore(&self, node: &mut SceneNode) {
        node.position = self.position;
        node.rotation = self.rotation;
        node.scale = self.scale;
    }
}

fn snap_value(value: f32, step: f32) -> f32 {
    (value / step).round() * step
}

fn mask(v: Vec3, axis: GizmoAxis, fill: f32) -> Vec3 {
    Vec3::new(
        if axis.has_x() { v.x } else { fill },
        if axis.has_y() { v.y } else { fill },
        if axis.has_z() { v.z } else { fill },
    )
}

fn snap_masked(v: Vec3, axis: GizmoAxis, step: f32) -> Vec3 {
    Vec3::new(
        if axis.has_x() { snap_value(v.x, step) } else { v.x },
        if axis.has_y() { snap_value(v.y, step) } else { v.y },
        if axis.has_z() { snap_value(v.z, step) } else { v.z },
    )
}

/// New local position for a translate drag.
pub fn translate(
    start: &DragStart,
    axis: GizmoAxis,
    space: TransformSpace,
    point_end: Vec3,
    snap: Option<f32>,
) -> Vec3 {
    let local = space == TransformSpace::Local && axis != GizmoAxis::Xyz;
    let mut offset = point_end - start.point_start;

    if local {
        offset = start.world_rotation.inverse() * offset;
    }
    offset = mask(offset, axis, 0.0);
    offset = if local {
        start.rotation * offset / start.parent_scale
    } else {
        start.parent_rotation.inverse() * offset / start.parent_scale
    };

    let mut position = start.position + offset;

    if let Some(step) = snap.filter(|s| *s > 0.0) {
        match space {
            TransformSpace::Local => {
                let unrotated = start.rotation.inverse() * position;
                position = start.rotation * snap_masked(unrotated, axis, step);
            }
            TransformSpace::World => {
                position += start.parent_position;
                position = snap_masked(position, axis, step);
                position -= start.parent_position;
            }
        }
    }

    position
}

/// New local rotation for a rotate drag. `speed` scales pointer travel into
/// radians for the axis and trackball handles.
pub fn rotate(
    start: &DragStart,
    axis: GizmoAxis,
    space: TransformSpace,
    point_end: Vec3,
    eye: Vec3,
    speed: f32,
    snap: Option<f32>,
) -> Quat {
    let offset = point_end - start.point_start;

    let (rotation_axis, mut angle) = match axis {
        GizmoAxis::E => {
            let angle = point_end.angle_between(start.point_start);
            let start_n = start.point_start.normalize_or_zero();
            let end_n = point_end.normalize_or_zero();
            let sign = if end_n.cross(start_n).dot(eye) < 0.0 { 1.0 } else { -1.0 };
            (eye, angle * sign)
        }
        GizmoAxis::Xyze => {
            let rotation_axis = offset.cross(eye).normalize_or_zero();
            (rotation_axis, offset.dot(rotation_axis.cross(eye)) * speed)
        }
        GizmoAxis::X | GizmoAxis::Y | GizmoAxis::Z => {
            let unit = axis.unit();
            let mut dir = unit;
            if space == TransformSpace::Local {
                dir = start.world_rotation * dir;
            }
            (unit, offset.dot(dir.cross(eye).normalize_or_zero()) * speed)
        }
        _ => return start.rotation,
    };

    if rotation_axis.length_squared() < 1e-12 || !angle.is_finite() {
        return start.rotation;
    }

    if let Some(step) = snap.filter(|s| *s > 0.0) {
        angle = snap_value(angle, step);
    }

    if space == TransformSpace::Local && !matches!(axis, GizmoAxis::E | GizmoAxis::Xyze) {
        (start.rotation * Quat::from_axis_angle(rotation_axis.normalize(), angle)).normalize()
    } else {
        let parent_axis = (start.parent_rotation.inverse() * rotation_axis).normalize();
        (Quat::from_axis_angle(parent_axis, angle) * start.rotation).normalize()
    }
}

/// New local scale for a scale drag. Snapped axes never collapse below one
/// snap step.
pub fn scale(start: &DragStart, axis: GizmoAxis, point_end: Vec3, snap: Option<f32>) -> Vec3 {
    let factor = if axis == GizmoAxis::Xyz {
        let start_len = start.point_start.length();
        let mut d = if start_len > 1e-9 {
            point_end.length() / start_len
        } else {
            1.0
        };
        if point_end.dot(start.point_start) < 0.0 {
            d = -d;
        }
        Vec3::splat(d)
    } else {
        let inv = start.world_rotation.inverse();
        let a = inv * start.point_start;
        let b = inv * point_end;
        let ratio = |b: f32, a: f32| if a.abs() > 1e-9 { b / a } else { 1.0 };
        mask(Vec3::new(ratio(b.x, a.x), ratio(b.y, a.y), ratio(b.z, a.z)), axis, 1.0)
    };

    let mut scale = start.scale * factor;

    if let Some(step) = snap.filter(|s| *s > 0.0) {
        let snap_axis = |v: f32| {
            let snapped = snap_value(v, step);
            if snapped == 0.0 {
                step
            } else {
                snapped
            }
        };
        if axis.has_x() {
            scale.x = snap_axis(scale.x);
        }
        if axis.has_y() {
            scale.y = snap_axis(scale.y);
        }
        if axis.has_z() {
            scale.z = snap_axis(scale.z);
        }
    }

    scale
}
