use glam::Vec3;
use shared::{config, hex_to_rgb, ColorLayer};

use super::triangulate::{signed_area2, triangulate_polygon};
use super::{BuildContext, ShapeBuilder};
use crate::core::error::ShapeResult;
use crate::scene::{Material, Primitive, Renderable, Side};
use crate::viewport::mesh::MeshData;

/// Ground polygon extruded vertically by the signed volume height.
///
/// The extrusion depth is `|height|`. Positive heights span `0..height`,
/// negative heights span `height..0`.
#[derive(Debug)]
pub struct VolumeBuilder {
    renderable: Option<Renderable>,
    opacity: f32,
}

impl VolumeBuilder {
    pub fn new() -> Self {
        Self {
            renderable: None,
            opacity: config::VOLUME_OPACITY,
        }
    }
}

impl Default for VolumeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Vertical span `(bottom, top)` of a volume with the given signed height
pub fn extrusion_span(height: f32) -> (f32, f32) {
    let depth = height.abs();
    let top = height.max(0.0);
    (top - depth, top)
}

/// Extrude a ground polygon between `bottom` and `top` with outward normals.
pub fn extrude_polygon(
    polygon: &[[f32; 2]],
    bottom: f32,
    top: f32,
    color: [f32; 3],
) -> ShapeResult<MeshData> {
    let triangles = triangulate_polygon(polygon)?;
    let n = polygon.len();
    let mut mesh = MeshData::default();

    // Top cap (CCW in x,z faces down, so reverse it)
    let base = mesh.vertex_count() as u32;
    for p in polygon {
        mesh.push_vertex(Vec3::new(p[0], top, p[1]), Vec3::Y, color);
    }
    for t in &triangles {
        mesh.indices.extend_from_slice(&[
            base + t[0] as u32,
            base + t[2] as u32,
            base + t[1] as u32,
        ]);
    }

    // Bottom cap
    let base = mesh.vertex_count() as u32;
    for p in polygon {
        mesh.push_vertex(Vec3::new(p[0], bottom, p[1]), Vec3::NEG_Y, color);
    }
    for t in &triangles {
        mesh.indices.extend_from_slice(&[
            base + t[0] as u32,
            base + t[1] as u32,
            base + t[2] as u32,
        ]);
    }

    if (top - bottom).abs() < f32::EPSILON {
        return Ok(mesh);
    }

    // Side walls, wound outward for either polygon orientation
    let ccw = signed_area2(polygon) > 0.0;
    for i in 0..n {
        let next = (i + 1) % n;
        let (a, b) = if ccw { (next, i) } else { (i, next) };
        let b0 = Vec3::new(polygon[a][0], bottom, polygon[a][1]);
        let b1 = Vec3::new(polygon[b][0], bottom, polygon[b][1]);
        let t0 = Vec3::new(polygon[a][0], top, polygon[a][1]);
        let t1 = Vec3::new(polygon[b][0], top, polygon[b][1]);

        let face_normal = (b1 - b0).cross(t0 - b0).normalize_or_zero();
        if face_normal == Vec3::ZERO {
            continue;
        }

        let base = mesh.vertex_count() as u32;
        mesh.push_vertex(b0, face_normal, color);
        mesh.push_vertex(b1, face_normal, color);
        mesh.push_vertex(t1, face_normal, color);
        mesh.push_vertex(t0, face_normal, color);
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Ok(mesh)
}

impl ShapeBuilder for VolumeBuilder {
    fn layer(&self) -> ColorLayer {
        ColorLayer::Volume
    }

    fn min_vertices(&self) -> usize {
        3
    }

    fn build(&mut self, ctx: &BuildContext<'_>) -> ShapeResult<()> {
        self.dispose();
        if ctx.vertices.len() < self.min_vertices() {
            return Ok(());
        }

        let color = ctx.color(ColorLayer::Volume);
        let (bottom, top) = extrusion_span(ctx.style.volume_height);
        let mesh = extrude_polygon(
            &ctx.vertices.ground_polygon(),
            bottom,
            top,
            hex_to_rgb(color),
        )?;

        self.renderable = Some(
            Renderable::new(
                ctx.pool,
                Some(ctx.owner),
                Primitive::Mesh(mesh),
                Material::surface(color, self.opacity, Side::Double),
            )
            .with_offset(Vec3::new(0.0, config::Z_FIGHTING_OFFSET, 0.0)),
        );
        Ok(())
    }

    fn renderable(&self) -> Option<&Renderable> {
        self.renderable.as_ref()
    }

    fn set_visible(&mut self, visible: bool) {
        if let Some(r) = self.renderable.as_mut() {
            r.visible = visible;
        }
    }

    fn dispose(&mut self) {
        self.renderable = None;
    }
}
