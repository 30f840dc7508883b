//! Shape construction and kind switches.

use glam::Vec3;
use shared::{ShapeKind, ShapeOptions};

use crate::core::{Shape3D, ShapeEvent};
use crate::scene::ResourcePool;

/// Build a shape of `kind` from `options`.
///
/// A kind whose vertex minimum is not met leaves the shape a Line (with a
/// warning). Ghost shapes keep `kind` as their target and preview as a Line
/// until enough vertices arrive.
pub fn create(pool: &ResourcePool, kind: ShapeKind, options: ShapeOptions) -> Shape3D {
    let ghost = options.ghost;
    let mut shape = Shape3D::new(pool, options);
    if ghost {
        shape.mark_ghost(kind);
        if shape.len() >= kind.min_vertices() {
            shape.set_shape_kind(kind);
        }
    } else {
        shape.set_shape_kind(kind);
    }
    shape.notify(ShapeEvent::ShapeAdded);
    tracing::debug!(
        "Created {} shape {} with {} vertices{}",
        shape.kind(),
        shape.id().short(),
        shape.len(),
        if ghost { " (ghost)" } else { "" }
    );
    shape
}

/// Reconfigure an existing shape from `options` and switch it to `kind`
/// in a single rebuild. An empty vertex list keeps the current vertices.
/// Returns the kind in effect afterwards.
pub fn update(shape: &mut Shape3D, kind: ShapeKind, options: ShapeOptions) -> ShapeKind {
    let before = shape.kind();
    let actual = shape.apply_options(kind, options);
    tracing::debug!("Updated shape {} ({} -> {})", shape.id().short(), before, actual);
    actual
}

/// Point a ghost shape at the next edge the user would create.
///
/// Lines preview `[last, cursor]`. Areas and volumes preview the closing
/// triangle `[last, cursor, first]` once two vertices are committed.
pub fn update_ghost_preview(ghost: &mut Shape3D, cursor: Vec3, committed: &[Vec3]) {
    let kind = ghost.ghost_kind().unwrap_or(ghost.kind());
    let (Some(first), Some(last)) = (committed.first(), committed.last()) else {
        ghost.reconfigure(ShapeKind::Line, Vec::new());
        return;
    };

    let preview = match kind {
        ShapeKind::Line => vec![*last, cursor],
        ShapeKind::Area | ShapeKind::Volume if committed.len() >= 2 => vec![*last, cursor, *first],
        ShapeKind::Area | ShapeKind::Volume => vec![*last, cursor],
    };
    ghost.reconfigure(kind, preview);
}
