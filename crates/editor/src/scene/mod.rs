//! Scene-graph plumbing: transform records, renderables, resource accounting
//! and the shape registry that owns every entity.

pub mod graph;
pub mod node;
pub mod renderable;
pub mod resources;

pub use graph::ShapeScene;
pub use node::{SceneNode, WorldTransform};
pub use renderable::{Material, Primitive, Renderable, RenderableId, Side};
pub use resources::{ResourceHandle, ResourceKind, ResourcePool};
