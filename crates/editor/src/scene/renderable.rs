use glam::{Mat4, Vec3};
use shared::ColorHex;

use super::resources::{ResourceHandle, ResourceKind, ResourcePool};
use crate::core::ShapeId;
use crate::viewport::mesh::{LineMeshData, MeshData};

/// Identifier of one renderable, unique within its pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderableId(pub u64);

/// Which faces of a mesh the renderer draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Front,
    Back,
    Double,
}

/// Flat material shared by lines and meshes
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub color: ColorHex,
    pub opacity: f32,
    pub transparent: bool,
    pub side: Side,
    /// Line width in pixels, ignored for meshes
    pub line_width: f32,
}

impl Material {
    pub fn line(color: ColorHex, opacity: f32, line_width: f32) -> Self {
        Self {
            color,
            opacity,
            transparent: opacity < 1.0,
            side: Side::Front,
            line_width,
        }
    }

    pub fn surface(color: ColorHex, opacity: f32, side: Side) -> Self {
        Self {
            color,
            opacity,
            transparent: opacity < 1.0,
            side,
            line_width: 1.0,
        }
    }
}

/// Geometry payload of a renderable
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Lines(LineMeshData),
    Mesh(MeshData),
}

impl Primitive {
    pub fn as_lines(&self) -> Option<&LineMeshData> {
        match self {
            Primitive::Lines(l) => Some(l),
            Primitive::Mesh(_) => None,
        }
    }

    pub fn as_mesh(&self) -> Option<&MeshData> {
        match self {
            Primitive::Mesh(m) => Some(m),
            Primitive::Lines(_) => None,
        }
    }
}

/// One drawable node: geometry, material and the owner tag used by picking.
///
/// Geometry is in the owning shape's local space, shifted by `offset`.
#[derive(Debug)]
pub struct Renderable {
    id: RenderableId,
    owner: Option<ShapeId>,
    pub primitive: Primitive,
    pub material: Material,
    pub offset: Vec3,
    pub visible: bool,
    _geometry: ResourceHandle,
    _material: ResourceHandle,
}

impl Renderable {
    /// Create a renderable tagged with its owner. Untagged renderables
    /// (grid, background) pass `None`.
    pub fn new(
        pool: &ResourcePool,
        owner: Option<ShapeId>,
        primitive: Primitive,
        material: Material,
    ) -> Self {
        Self {
            id: RenderableId(pool.next_id()),
            owner,
            primitive,
            material,
            offset: Vec3::ZERO,
            visible: true,
            _geometry: pool.allocate(ResourceKind::Geometry),
            _material: pool.allocate(ResourceKind::Material),
        }
    }

    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    pub fn id(&self) -> RenderableId {
        self.id
    }

    /// Back-reference to the owning shape
    pub fn owner(&self) -> Option<ShapeId> {
        self.owner
    }

    /// Matrix from geometry space to world space given the owner's world matrix
    pub fn world_matrix(&self, owner_world: &Mat4) -> Mat4 {
        *owner_world * Mat4::from_translation(self.offset)
    }
}
