//! Geometry generators, one per shape layer.
//!
//! Builders never keep vertex state of their own: every [`ShapeBuilder::build`]
//! call reads the owning shape's vertex store through a [`BuildContext`],
//! drops the previous renderable and creates a fresh one.

pub mod area;
pub mod line;
pub mod triangulate;
pub mod volume;

use shared::{config, ColorHex, ColorLayer, ShapeKind, ShapeStyle};

pub use area::AreaBuilder;
pub use line::LineBuilder;
pub use volume::VolumeBuilder;

use crate::core::error::ShapeResult;
use crate::core::vertex_store::VertexStore;
use crate::core::ShapeId;
use crate::scene::{Renderable, ResourcePool};

/// Everything a builder reads from its owning shape during one rebuild
pub struct BuildContext<'a> {
    pub owner: ShapeId,
    pub vertices: &'a VertexStore,
    /// Effective closure (flag or implicit for Area/Volume)
    pub closed: bool,
    pub style: &'a ShapeStyle,
    pub ghost: bool,
    pub pool: &'a ResourcePool,
}

impl BuildContext<'_> {
    /// Layer color, replaced by the ghost color for preview shapes
    pub fn color(&self, layer: ColorLayer) -> ColorHex {
        if self.ghost {
            config::GHOST_COLOR
        } else {
            self.style.color(layer)
        }
    }
}

/// Generator of one renderable for one shape layer
pub trait ShapeBuilder: std::fmt::Debug {
    fn layer(&self) -> ColorLayer;

    /// Fewest vertices that produce a renderable
    fn min_vertices(&self) -> usize;

    /// Dispose the previous renderable and generate a new one.
    fn build(&mut self, ctx: &BuildContext<'_>) -> ShapeResult<()>;

    fn renderable(&self) -> Option<&Renderable>;

    fn set_visible(&mut self, visible: bool);

    /// Release the renderable and its resources.
    fn dispose(&mut self);
}

/// Builder set activated for a shape kind, in render order.
pub fn builders_for(kind: ShapeKind) -> Vec<Box<dyn ShapeBuilder>> {
    match kind {
        ShapeKind::Line => vec![Box::new(LineBuilder::new())],
        ShapeKind::Area => vec![Box::new(LineBuilder::new()), Box::new(AreaBuilder::new())],
        ShapeKind::Volume => vec![
            Box::new(LineBuilder::new()),
            Box::new(AreaBuilder::new()),
            Box::new(VolumeBuilder::new()),
        ],
    }
}
