//! Factory functions for creating test data.
//!
//! Shape options, ready-built shapes, cameras and pointer events used by
//! tests and by the command protocol.

use glam::{Vec2, Vec3};
use shared::{ShapeKind, ShapeOptions, Vertex};

use crate::core::Shape3D;
use crate::factory;
use crate::scene::ResourcePool;
use crate::viewport::camera::{ArcBallCamera, Camera};
use crate::viewport::input::{PointerButton, PointerEvent};

// ── Vertex lists ────────────────────────────────────────────────

/// Axis-aligned square of side `size` on the ground plane, corner at the origin.
pub fn square_vertices(size: f32) -> Vec<Vertex> {
    vec![
        [0.0, 0.0, 0.0],
        [size, 0.0, 0.0],
        [size, 0.0, size],
        [0.0, 0.0, size],
    ]
}

/// The open triangle `(0,0,0) (5,0,5) (0,0,5)`.
pub fn triangle_vertices() -> Vec<Vertex> {
    vec![[0.0, 0.0, 0.0], [5.0, 0.0, 5.0], [0.0, 0.0, 5.0]]
}

/// Six-vertex L-shaped outline (concave at vertex 3).
pub fn l_shape_vertices() -> Vec<Vertex> {
    vec![
        [0.0, 0.0, 0.0],
        [4.0, 0.0, 0.0],
        [4.0, 0.0, 2.0],
        [2.0, 0.0, 2.0],
        [2.0, 0.0, 4.0],
        [0.0, 0.0, 4.0],
    ]
}

/// Options with the given vertices and everything else at defaults.
pub fn options_with(vertices: Vec<Vertex>) -> ShapeOptions {
    ShapeOptions {
        vertices,
        ..Default::default()
    }
}

// ── Shapes ──────────────────────────────────────────────────────

/// Square Area of side `size`.
pub fn square_area(pool: &ResourcePool, size: f32) -> Shape3D {
    factory::create(pool, ShapeKind::Area, options_with(square_vertices(size)))
}

/// Open Line through [`triangle_vertices`].
pub fn open_triangle_line(pool: &ResourcePool) -> Shape3D {
    factory::create(pool, ShapeKind::Line, options_with(triangle_vertices()))
}

/// L-shaped shape of the given kind.
pub fn l_shape(pool: &ResourcePool, kind: ShapeKind) -> Shape3D {
    factory::create(pool, kind, options_with(l_shape_vertices()))
}

/// Volume with the given vertices and extrusion height.
pub fn volume_with_height(pool: &ResourcePool, vertices: Vec<Vertex>, height: f32) -> Shape3D {
    let mut options = options_with(vertices);
    options.style.volume_height = height;
    factory::create(pool, ShapeKind::Volume, options)
}

// ── Camera and pointer ──────────────────────────────────────────

/// Camera looking almost straight down at `target` from 20 units.
pub fn top_down_camera(target: Vec3) -> ArcBallCamera {
    ArcBallCamera::top_down(target, 20.0)
}

/// NDC of a world point, or the screen center when it is behind the camera.
pub fn ndc_of(camera: &dyn Camera, world: Vec3) -> Vec2 {
    camera.project_to_ndc(world).unwrap_or(Vec2::ZERO)
}

/// Primary-button event over a world point.
pub fn pointer_at(camera: &dyn Camera, world: Vec3) -> PointerEvent {
    PointerEvent::primary(ndc_of(camera, world))
}

/// Secondary-button event over a world point.
pub fn secondary_pointer_at(camera: &dyn Camera, world: Vec3) -> PointerEvent {
    PointerEvent::new(ndc_of(camera, world), PointerButton::Secondary)
}
