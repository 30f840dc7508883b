use glam::Mat4;

use super::node::SceneNode;
use super::renderable::Renderable;
use super::resources::ResourcePool;
use crate::core::{Shape3D, ShapeId};

/// Scene root: owns every shape entity plus untagged background geometry.
///
/// Shapes are children of the root node; changing the root transform
/// propagates to each shape's parent matrix.
#[derive(Debug, Default)]
pub struct ShapeScene {
    pool: ResourcePool,
    root: SceneNode,
    shapes: Vec<Shape3D>,
    background: Vec<Renderable>,
}

impl ShapeScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resource pool shared by everything created for this scene
    pub fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    pub fn root(&self) -> &SceneNode {
        &self.root
    }

    pub fn set_root(&mut self, root: SceneNode) {
        self.root = root;
        let world = self.root.world_matrix();
        for shape in self.shapes.iter_mut() {
            shape.node.parent_world = world;
        }
    }

    /// Add a shape as a child of the root.
    pub fn add(&mut self, mut shape: Shape3D) -> ShapeId {
        let id = shape.id();
        shape.node.parent_world = self.root.world_matrix();
        self.shapes.push(shape);
        tracing::debug!("Added shape {} to scene", id.short());
        id
    }

    /// Detach a shape from the scene without disposing it.
    pub fn remove(&mut self, id: ShapeId) -> Option<Shape3D> {
        let pos = self.shapes.iter().position(|s| s.id() == id)?;
        let mut shape = self.shapes.remove(pos);
        shape.node.parent_world = Mat4::IDENTITY;
        Some(shape)
    }

    /// Dispose and drop every shape and every background renderable.
    pub fn clear(&mut self) {
        for shape in self.shapes.iter_mut() {
            shape.dispose();
        }
        self.shapes.clear();
        self.background.clear();
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape3D> {
        self.shapes.iter().find(|s| s.id() == id)
    }

    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape3D> {
        self.shapes.iter_mut().find(|s| s.id() == id)
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shape3D> {
        self.shapes.iter()
    }

    pub fn ids(&self) -> Vec<ShapeId> {
        self.shapes.iter().map(|s| s.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Add untagged geometry (grid, ground) placed directly under the root.
    pub fn add_background(&mut self, renderable: Renderable) {
        self.background.push(renderable);
    }

    pub fn background(&self) -> &[Renderable] {
        &self.background
    }

    /// Every visible renderable with its world matrix
    pub fn visible_renderables(&self) -> Vec<(&Renderable, Mat4)> {
        let root = self.root.world_matrix();
        let shapes = self.shapes.iter().flat_map(|shape| {
            let world = shape.world_matrix();
            shape.renderables().map(move |r| (r, r.world_matrix(&world)))
        });
        let background = self.background.iter().map(|r| (r, r.world_matrix(&root)));
        shapes.chain(background).filter(|(r, _)| r.visible).collect()
    }
}
