use glam::Vec3;
use shared::{config, hex_to_rgb, ColorLayer};

use super::triangulate::triangulate_polygon;
use super::{BuildContext, ShapeBuilder};
use crate::core::error::ShapeResult;
use crate::scene::{Material, Primitive, Renderable, Side};
use crate::viewport::mesh::MeshData;

/// Flat triangulated surface on the local ground plane.
///
/// Front faces point down, so the material renders back faces to be seen
/// from above. The mesh sits `Z_FIGHTING_OFFSET` above the boundary line.
#[derive(Debug)]
pub struct AreaBuilder {
    renderable: Option<Renderable>,
    opacity: f32,
}

impl AreaBuilder {
    pub fn new() -> Self {
        Self {
            renderable: None,
            opacity: config::AREA_OPACITY,
        }
    }
}

impl Default for AreaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Triangulate the ground projection of `polygon` into a mesh at y = 0.
pub(crate) fn ground_mesh(polygon: &[[f32; 2]], color: [f32; 3]) -> ShapeResult<MeshData> {
    let triangles = triangulate_polygon(polygon)?;
    let mut mesh = MeshData::default();
    for p in polygon {
        mesh.push_vertex(Vec3::new(p[0], 0.0, p[1]), Vec3::NEG_Y, color);
    }
    for t in triangles {
        mesh.indices
            .extend_from_slice(&[t[0] as u32, t[1] as u32, t[2] as u32]);
    }
    Ok(mesh)
}

impl ShapeBuilder for AreaBuilder {
    fn layer(&self) -> ColorLayer {
        ColorLayer::Area
    }

    fn min_vertices(&self) -> usize {
        3
    }

    fn build(&mut self, ctx: &BuildContext<'_>) -> ShapeResult<()> {
        self.dispose();
        if ctx.vertices.len() < self.min_vertices() {
            return Ok(());
        }

        let color = ctx.color(ColorLayer::Area);
        let mesh = ground_mesh(&ctx.vertices.ground_polygon(), hex_to_rgb(color))?;

        self.renderable = Some(
            Renderable::new(
                ctx.pool,
                Some(ctx.owner),
                Primitive::Mesh(mesh),
                Material::surface(color, self.opacity, Side::Back),
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
