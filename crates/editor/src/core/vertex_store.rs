use glam::Vec3;

use super::error::{ShapeError, ShapeResult};

/// Ordered boundary points of a shape, in shape-local coordinates.
///
/// Edge `i` (for `1 <= i < len`) joins vertices `i - 1` and `i`. When the
/// shape is closed, edge `len` joins the last vertex back to vertex 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexStore {
    vertices: Vec<Vec3>,
}

impl VertexStore {
    pub fn new(vertices: Vec<Vec3>) -> Self {
        Self { vertices }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn as_slice(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn get(&self, index: usize) -> Option<Vec3> {
        self.vertices.get(index).copied()
    }

    pub fn replace(&mut self, vertices: Vec<Vec3>) {
        self.vertices = vertices;
    }

    pub fn set(&mut self, index: usize, vertex: Vec3) -> ShapeResult<()> {
        let len = self.vertices.len();
        let slot = self
            .vertices
            .get_mut(index)
            .ok_or(ShapeError::IndexOutOfRange { index, len })?;
        *slot = vertex;
        Ok(())
    }

    pub fn insert(&mut self, index: usize, vertex: Vec3) {
        self.vertices.insert(index, vertex);
    }

    pub fn remove(&mut self, index: usize) -> ShapeResult<Vec3> {
        if index >= self.vertices.len() {
            return Err(ShapeError::IndexOutOfRange {
                index,
                len: self.vertices.len(),
            });
        }
        Ok(self.vertices.remove(index))
    }

    pub fn push(&mut self, vertex: Vec3) {
        self.vertices.push(vertex);
    }

    /// Number of edges for an open or closed boundary
    pub fn edge_count(&self, closed: bool) -> usize {
        match self.vertices.len() {
            0 | 1 => 0,
            2 => 1,
            n if closed => n,
            n => n - 1,
        }
    }

    /// Whether `edge_index` names an edge of this boundary
    pub fn is_valid_edge(&self, edge_index: usize, closed: bool) -> bool {
        let n = self.vertices.len();
        if n < 2 || edge_index == 0 {
            return false;
        }
        edge_index < n || (closed && edge_index == n && n >= 3)
    }

    /// Endpoints `(start, end)` of edge `edge_index`
    pub fn edge(&self, edge_index: usize, closed: bool) -> ShapeResult<(Vec3, Vec3)> {
        let n = self.vertices.len();
        if !self.is_valid_edge(edge_index, closed) {
            return Err(ShapeError::IndexOutOfRange {
                index: edge_index,
                len: n,
            });
        }
        Ok((
            self.vertices[edge_index - 1],
            self.vertices[edge_index % n],
        ))
    }

    /// Arithmetic mean of the endpoints of edge `edge_index`
    pub fn midpoint(&self, edge_index: usize, closed: bool) -> ShapeResult<Vec3> {
        let (a, b) = self.edge(edge_index, closed)?;
        Ok((a + b) * 0.5)
    }

    /// Arithmetic mean of all vertices (origin when empty)
    pub fn centroid(&self) -> Vec3 {
        if self.vertices.is_empty() {
            return Vec3::ZERO;
        }
        self.vertices.iter().copied().sum::<Vec3>() / self.vertices.len() as f32
    }

    /// Boundary as a polyline, repeating vertex 0 at the end when closed
    pub fn polyline(&self, closed: bool) -> Vec<Vec3> {
        let mut points = self.vertices.clone();
        if closed && points.len() >= 3 {
            points.push(points[0]);
        }
        points
    }

    /// Vertices projected to the ground plane as (x, z) pairs
    pub fn ground_polygon(&self) -> Vec<[f32; 2]> {
        self.vertices.iter().map(|v| [v.x, v.z]).collect()
    }
}
