use shared::{config, hex_to_rgb, ColorLayer};

use super::{BuildContext, ShapeBuilder};
use crate::core::error::ShapeResult;
use crate::scene::{Material, Primitive, Renderable};
use crate::viewport::mesh::LineMeshData;

/// Boundary polyline, closed back to vertex 0 when the shape is closed
#[derive(Debug)]
pub struct LineBuilder {
    renderable: Option<Renderable>,
    opacity: f32,
    line_width: f32,
}

impl LineBuilder {
    pub fn new() -> Self {
        Self {
            renderable: None,
            opacity: config::LINE_OPACITY,
            line_width: config::LINE_WIDTH,
        }
    }
}

impl Default for LineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeBuilder for LineBuilder {
    fn layer(&self) -> ColorLayer {
        ColorLayer::Line
    }

    fn min_vertices(&self) -> usize {
        2
    }

    fn build(&mut self, ctx: &BuildContext<'_>) -> ShapeResult<()> {
        self.dispose();
        if ctx.vertices.len() < self.min_vertices() {
            return Ok(());
        }

        let color = ctx.color(ColorLayer::Line);
        let [r, g, b] = hex_to_rgb(color);
        let points = ctx.vertices.polyline(ctx.closed);
        let lines = LineMeshData::from_polyline(&points, [r, g, b, self.opacity]);

        self.renderable = Some(Renderable::new(
            ctx.pool,
            Some(ctx.owner),
            Primitive::Lines(lines),
            Material::line(color, self.opacity, self.line_width),
        ));
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
