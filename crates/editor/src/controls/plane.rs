use glam::{Quat, Vec3};
use shared::{TransformMode, TransformSpace};

use super::gizmo::GizmoAxis;
use crate::viewport::picking::{ray_plane_intersect, Ray};

/// Infinite plane the pointer is projected onto while dragging
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragPlane {
    pub point: Vec3,
    pub normal: Vec3,
}

impl DragPlane {
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self {
            point,
            normal: normal.normalize_or_zero(),
        }
    }

    /// Ground-aligned plane at height `y`
    pub fn horizontal(y: f32) -> Self {
        Self::new(Vec3::new(0.0, y, 0.0), Vec3::Y)
    }

    pub fn intersect(&self, ray: &Ray) -> Option<Vec3> {
        ray_plane_intersect(ray, self.point, self.normal).map(|t| ray.at(t))
    }
}

/// Space a drag actually uses: scale is always local, camera-aligned
/// handles are always world.
pub fn effective_space(mode: TransformMode, axis: GizmoAxis, space: TransformSpace) -> TransformSpace {
    if mode == TransformMode::Scale {
        TransformSpace::Local
    } else if matches!(axis, GizmoAxis::E | GizmoAxis::Xyze | GizmoAxis::Xyz) {
        TransformSpace::World
    } else {
        space
    }
}

/// Drag plane through `pivot` for a gizmo handle.
///
/// Axis handles use the plane containing the axis that faces the eye most,
/// plane handles use their own normal, everything else faces the camera.
pub fn gizmo_plane(
    mode: TransformMode,
    axis: GizmoAxis,
    orientation: Quat,
    eye: Vec3,
    pivot: Vec3,
) -> DragPlane {
    let v1 = orientation * Vec3::X;
    let v2 = orientation * Vec3::Y;
    let v3 = orientation * Vec3::Z;

    // Component of the eye vector perpendicular to `axis`
    let facing = |axis: Vec3| axis.cross(eye.cross(axis));

    let normal = match mode {
        TransformMode::Translate | TransformMode::Scale => match axis {
            GizmoAxis::X => facing(v1),
            GizmoAxis::Y => facing(v2),
            GizmoAxis::Z => facing(v3),
            GizmoAxis::Xy => v3,
            GizmoAxis::Yz => v1,
            GizmoAxis::Xz => v2,
            GizmoAxis::Xyz | GizmoAxis::E | GizmoAxis::Xyze => Vec3::ZERO,
        },
        TransformMode::Rotate => Vec3::ZERO,
    };

    if normal.length_squared() < 1e-12 {
        DragPlane::new(pivot, eye)
    } else {
        DragPlane::new(pivot, normal)
    }
}
