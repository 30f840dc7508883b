//! Interactive placement of a new shape, one clicked vertex at a time.

use glam::Vec3;
use shared::{ShapeKind, ShapeOptions, ShapeStyle};

use crate::core::{ShapeError, ShapeId, ShapeResult};
use crate::factory;
use crate::scene::ShapeScene;

/// Creation in progress: committed vertices plus a ghost preview of the
/// next edge
#[derive(Debug)]
pub struct CreationSession {
    kind: ShapeKind,
    style: ShapeStyle,
    committed: Vec<Vec3>,
    ghost: ShapeId,
}

impl CreationSession {
    /// Start placing a shape of `kind`. The ghost is added to `scene`.
    pub fn begin(scene: &mut ShapeScene, kind: ShapeKind, style: ShapeStyle) -> Self {
        let ghost = factory::create(
            scene.pool(),
            kind,
            ShapeOptions {
                ghost: true,
                style: style.clone(),
                ..Default::default()
            },
        );
        let ghost = scene.add(ghost);
        tracing::debug!("Creation of {} started", kind);
        Self {
            kind,
            style,
            committed: Vec::new(),
            ghost,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn committed(&self) -> &[Vec3] {
        &self.committed
    }

    pub fn ghost(&self) -> ShapeId {
        self.ghost
    }

    /// Whether enough vertices are committed to finish
    pub fn can_complete(&self) -> bool {
        self.committed.len() >= self.kind.min_vertices()
    }

    /// Preview the edge to `cursor`.
    pub fn hover(&self, scene: &mut ShapeScene, cursor: Vec3) {
        if let Some(ghost) = scene.get_mut(self.ghost) {
            factory::update_ghost_preview(ghost, cursor, &self.committed);
        }
    }

    /// Commit a clicked vertex. Returns the number of committed vertices.
    pub fn commit(&mut self, scene: &mut ShapeScene, point: Vec3) -> usize {
        self.committed.push(point);
        self.hover(scene, point);
        self.committed.len()
    }

    /// Remove the ghost and add the real shape.
    pub fn complete(self, scene: &mut ShapeScene) -> ShapeResult<ShapeId> {
        if !self.can_complete() {
            let err = ShapeError::NotEnoughVertices {
                kind: self.kind,
                required: self.kind.min_vertices(),
                actual: self.committed.len(),
            };
            tracing::warn!("complete rejected: {}", err);
            self.cancel(scene);
            return Err(err);
        }

        if let Some(mut ghost) = scene.remove(self.ghost) {
            ghost.dispose();
        }
        let shape = factory::create(
            scene.pool(),
            self.kind,
            ShapeOptions {
                vertices: self.committed.iter().map(|v| v.to_array()).collect(),
                style: self.style,
                ..Default::default()
            },
        );
        let id = scene.add(shape);
        tracing::debug!("Creation finished as shape {}", id.short());
        Ok(id)
    }

    /// Drop the ghost without creating anything.
    pub fn cancel(self, scene: &mut ShapeScene) {
        if let Some(mut ghost) = scene.remove(self.ghost) {
            ghost.dispose();
        }
        tracing::debug!("Creation of {} cancelled", self.kind);
    }
}
