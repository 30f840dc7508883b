//! Numeric edits of edge lengths and vertex angles.
//!
//! Both edits only compute the new position of one vertex; the caller
//! applies it with `update_vertex_at`. Closed outlines measure interior
//! angles in (0, 360); open lines measure the unsigned angle between the two
//! edges, in (0, 180].

use std::f32::consts::TAU;

use glam::{Quat, Vec3};

use crate::builders::triangulate::signed_area2;
use crate::core::error::{ShapeError, ShapeResult};
use crate::core::vertex_store::VertexStore;

/// Largest accepted angle at a vertex of an open line (degrees)
pub const MAX_OPEN_ANGLE_DEG: f32 = 180.0;
/// Interior angles stay below a full turn
pub const MAX_INTERIOR_ANGLE_DEG: f32 = 360.0;

/// Drop the vertical component
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Unsigned angle (degrees) at `cur` between the edges to `prev` and `next`,
/// measured in the ground plane. `None` when either edge has no horizontal extent.
pub fn vertex_angle(prev: Vec3, cur: Vec3, next: Vec3) -> Option<f32> {
    let a = flatten(prev - cur);
    let b = flatten(next - cur);
    if a.length_squared() < 1e-12 || b.length_squared() < 1e-12 {
        return None;
    }
    let cos = (a.dot(b) / (a.length() * b.length())).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}

/// Orientation of the outline in the ground plane: `1.0` when
/// counter-clockwise in (x, z), `-1.0` when clockwise, `None` when it
/// encloses no area.
pub fn winding(store: &VertexStore) -> Option<f32> {
    let area2 = signed_area2(&store.ground_polygon());
    (area2.abs() > 1e-9).then_some(area2.signum())
}

/// Interior angle (degrees) at `cur` of an outline with the given winding,
/// in (0, 360).
pub fn interior_angle(prev: Vec3, cur: Vec3, next: Vec3, winding: f32) -> Option<f32> {
    let a = flatten(prev - cur);
    let b = flatten(next - cur);
    if a.length_squared() < 1e-12 || b.length_squared() < 1e-12 {
        return None;
    }
    // Counter-clockwise turn from `b` to `a` in (x, z)
    let turn = (b.x * a.z - b.z * a.x).atan2(b.dot(a));
    Some((turn * winding).rem_euclid(TAU).to_degrees())
}

/// Winding used for the angles of a shape: only closed outlines that
/// enclose an area have an interior.
pub fn interior_winding(store: &VertexStore, closed: bool) -> Option<f32> {
    if closed {
        winding(store)
    } else {
        None
    }
}

/// Angle shown and edited at vertex `index`.
pub fn corner_angle(store: &VertexStore, index: usize, closed: bool) -> Option<f32> {
    let (p, c, n) = angle_neighbors(store.len(), index, closed).ok()?;
    let v = store.as_slice();
    match interior_winding(store, closed) {
        Some(w) => interior_angle(v[p], v[c], v[n], w),
        None => vertex_angle(v[p], v[c], v[n]),
    }
}

/// Vertex indices `(prev, cur, next)` around angle vertex `index`.
///
/// Open boundaries have angles at `1..len-1`; closed ones at every vertex.
pub fn angle_neighbors(len: usize, index: usize, closed: bool) -> ShapeResult<(usize, usize, usize)> {
    let valid = if closed {
        len >= 3 && index < len
    } else {
        len >= 3 && index >= 1 && index + 1 < len
    };
    if !valid {
        return Err(ShapeError::IndexOutOfRange { index, len });
    }
    Ok(((index + len - 1) % len, index, (index + 1) % len))
}

/// Indices of every vertex that carries an angle
pub fn angle_vertices(len: usize, closed: bool) -> Vec<usize> {
    (0..len)
        .filter(|&i| angle_neighbors(len, i, closed).is_ok())
        .collect()
}

/// New position of the end vertex of edge `edge` so the edge has `length`.
///
/// The start vertex and the edge direction are kept. Returns the index of
/// the vertex to move and its new position.
pub fn edge_length_target(
    store: &VertexStore,
    edge: usize,
    closed: bool,
    length: f32,
) -> ShapeResult<(usize, Vec3)> {
    if !length.is_finite() || length <= 0.0 {
        return Err(ShapeError::InvalidValue {
            what: "edge length",
            value: length as f64,
        });
    }
    let (start, end) = store.edge(edge, closed)?;
    let dir = (end - start).normalize_or_zero();
    if dir == Vec3::ZERO {
        return Err(ShapeError::DegenerateEdge { index: edge });
    }
    Ok((edge % store.len(), start + dir * length))
}

/// New position of the vertex after `index` so the angle at `index` becomes
/// `degrees`.
///
/// The next edge is rotated about the vertical axis, keeping its horizontal
/// length and its height difference. On closed outlines it turns so the
/// interior angle matches; on open lines it keeps its side of the previous
/// edge.
pub fn vertex_angle_target(
    store: &VertexStore,
    index: usize,
    closed: bool,
    degrees: f32,
) -> ShapeResult<(usize, Vec3)> {
    let winding = interior_winding(store, closed);
    let in_range = match winding {
        Some(_) => degrees > 0.0 && degrees < MAX_INTERIOR_ANGLE_DEG,
        None => degrees > 0.0 && degrees <= MAX_OPEN_ANGLE_DEG,
    };
    if !degrees.is_finite() || !in_range {
        return Err(ShapeError::InvalidValue {
            what: "vertex angle",
            value: degrees as f64,
        });
    }
    let (p, c, n) = angle_neighbors(store.len(), index, closed)?;
    let verts = store.as_slice();
    let (prev, cur, next) = (verts[p], verts[c], verts[n]);

    let to_prev = flatten(prev - cur);
    let to_next = flatten(next - cur);
    let edge_into = |v: usize| if v == 0 { verts.len() } else { v };
    if to_prev.length_squared() < 1e-12 {
        return Err(ShapeError::DegenerateEdge { index: edge_into(c) });
    }
    if to_next.length_squared() < 1e-12 {
        return Err(ShapeError::DegenerateEdge { index: edge_into(n) });
    }

    let turn = match winding {
        Some(w) => w,
        // Keep the next edge on its current side of the previous one
        None if to_prev.cross(to_next).y < 0.0 => -1.0,
        None => 1.0,
    };
    let rotation = Quat::from_rotation_y(turn * degrees.to_radians());
    let dir = rotation * to_prev.normalize();

    let target = cur + dir * to_next.length() + Vec3::Y * (next.y - cur.y);
    Ok((n, target))
}
