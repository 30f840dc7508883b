//! Geometry validation utilities.
//!
//! `MeshValidator` checks triangle buffers (stride, index range, unit
//! normals, degenerate faces), `LineValidator` checks line lists, and
//! `ShapeValidator` checks that a shape's active layers match its kind and
//! vertex list.

use glam::Vec3;
use shared::{ColorLayer, ShapeKind};

use crate::core::Shape3D;
use crate::scene::Primitive;
use crate::viewport::mesh::{LineMeshData, MeshData, LINE_STRIDE, MESH_STRIDE};
use crate::viewport::picking::Aabb;

// ── Meshes ───────────────────────────────────────────────────

/// Validator for `MeshData` integrity checks.
pub struct MeshValidator<'a> {
    mesh: &'a MeshData,
}

impl<'a> MeshValidator<'a> {
    pub fn new(mesh: &'a MeshData) -> Self {
        Self { mesh }
    }

    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    pub fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }

    fn is_stride_valid(&self) -> bool {
        self.mesh.vertices.len() % MESH_STRIDE == 0
    }

    fn is_index_stride_valid(&self) -> bool {
        self.mesh.indices.len() % 3 == 0
    }

    fn out_of_range_indices(&self) -> Vec<u32> {
        let max = self.vertex_count() as u32;
        self.mesh.indices.iter().copied().filter(|&i| i >= max).collect()
    }

    /// Whether every vertex normal has unit length (within `epsilon`)
    pub fn are_normals_normalized(&self, epsilon: f32) -> bool {
        (0..self.vertex_count()).all(|i| (self.mesh.normal(i).length() - 1.0).abs() <= epsilon)
    }

    /// Triangles whose area is below `epsilon`
    pub fn degenerate_triangles(&self, epsilon: f32) -> Vec<usize> {
        (0..self.triangle_count())
            .filter(|&t| {
                let [a, b, c] = self.mesh.triangle(t);
                (b - a).cross(c - a).length() * 0.5 < epsilon
            })
            .collect()
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_mesh(self.mesh)
    }

    /// Bounding box extents along x, y, z
    pub fn dimensions(&self) -> [f32; 3] {
        self.aabb().size().to_array()
    }

    /// Check that the AABB dimensions are approximately equal to `expected`.
    pub fn assert_dimensions_approx(&self, expected: [f32; 3], tolerance: f32) -> bool {
        self.dimensions()
            .iter()
            .zip(expected)
            .all(|(d, e)| (d - e).abs() < tolerance)
    }

    /// Run all checks. An empty list means the mesh is valid.
    pub fn validate_all(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !self.is_stride_valid() {
            errors.push(format!(
                "Vertex buffer length {} is not a multiple of {}",
                self.mesh.vertices.len(),
                MESH_STRIDE
            ));
            // Positions cannot be read reliably past this point
            return errors;
        }
        if !self.is_index_stride_valid() {
            errors.push(format!(
                "Index buffer length {} is not a multiple of 3",
                self.mesh.indices.len()
            ));
        }
        let bad = self.out_of_range_indices();
        if !bad.is_empty() {
            errors.push(format!(
                "Indices out of range (vertex_count={}): {:?}",
                self.vertex_count(),
                &bad[..bad.len().min(5)]
            ));
            return errors;
        }
        if !self.are_normals_normalized(0.1) {
            errors.push("Some normals are not unit-length (epsilon=0.1)".to_string());
        }
        if self.is_index_stride_valid() {
            let degenerate = self.degenerate_triangles(1e-9);
            if !degenerate.is_empty() {
                errors.push(format!("Degenerate triangles: {:?}", degenerate));
            }
        }
        errors
    }
}

// ── Lines ────────────────────────────────────────────────────

/// Validator for line lists
pub struct LineValidator<'a> {
    lines: &'a LineMeshData,
}

impl<'a> LineValidator<'a> {
    pub fn new(lines: &'a LineMeshData) -> Self {
        Self { lines }
    }

    pub fn segment_count(&self) -> usize {
        self.lines.segment_count()
    }

    /// Whether consecutive segments share endpoints (a connected polyline)
    pub fn is_connected(&self, epsilon: f32) -> bool {
        (1..self.segment_count()).all(|s| {
            let (_, prev_end) = self.lines.segment(s - 1);
            let (start, _) = self.lines.segment(s);
            prev_end.distance(start) <= epsilon
        })
    }

    /// Whether the last segment ends where the first starts
    pub fn is_closed_loop(&self, epsilon: f32) -> bool {
        let n = self.segment_count();
        if n < 2 {
            return false;
        }
        let (first, _) = self.lines.segment(0);
        let (_, last) = self.lines.segment(n - 1);
        first.distance(last) <= epsilon
    }

    pub fn validate_all(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let len = self.lines.vertices.len();
        if len % LINE_STRIDE != 0 {
            errors.push(format!("Line buffer length {} is not a multiple of {}", len, LINE_STRIDE));
        } else if self.lines.vertex_count() % 2 != 0 {
            errors.push(format!(
                "Line list has an odd vertex count {}",
                self.lines.vertex_count()
            ));
        }
        errors
    }
}

// ── Shapes ───────────────────────────────────────────────────

/// Layers a shape of `kind` must have active, in render order
pub fn expected_layers(kind: ShapeKind) -> &'static [ColorLayer] {
    match kind {
        ShapeKind::Line => &[ColorLayer::Line],
        ShapeKind::Area => &[ColorLayer::Line, ColorLayer::Area],
        ShapeKind::Volume => &[ColorLayer::Line, ColorLayer::Area, ColorLayer::Volume],
    }
}

/// Consistency checks between a shape's state and its built geometry
pub struct ShapeValidator<'a> {
    shape: &'a Shape3D,
}

impl<'a> ShapeValidator<'a> {
    pub fn new(shape: &'a Shape3D) -> Self {
        Self { shape }
    }

    /// Boundary segments currently rendered
    pub fn line_segment_count(&self) -> usize {
        self.shape
            .builder(ColorLayer::Line)
            .and_then(|b| b.renderable())
            .and_then(|r| r.primitive.as_lines())
            .map_or(0, LineMeshData::segment_count)
    }

    /// Bounding box of every built layer, in local space
    pub fn local_aabb(&self) -> Option<Aabb> {
        let points: Vec<Vec3> = self
            .shape
            .renderables()
            .flat_map(|r| {
                let positions: Vec<Vec3> = match &r.primitive {
                    Primitive::Mesh(m) => (0..m.vertex_count()).map(|i| m.position(i)).collect(),
                    Primitive::Lines(l) => (0..l.vertex_count()).map(|i| l.position(i)).collect(),
                };
                positions.into_iter().map(move |p| p + r.offset)
            })
            .collect();
        if points.is_empty() {
            None
        } else {
            Some(Aabb::from_points(points))
        }
    }

    pub fn validate_all(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let shape = self.shape;
        let kind = shape.kind();

        let layers: Vec<ColorLayer> = shape.builders().map(|b| b.layer()).collect();
        if layers != expected_layers(kind) {
            errors.push(format!("{} shape has layers {:?}", kind, layers));
        }
        if kind != ShapeKind::Line && shape.len() < kind.min_vertices() {
            errors.push(format!("{} shape has only {} vertices", kind, shape.len()));
        }

        if shape.len() >= ShapeKind::Line.min_vertices() {
            let expected = shape.vertex_store().edge_count(shape.is_closed());
            let actual = self.line_segment_count();
            if actual != expected {
                errors.push(format!("Expected {} boundary segments, found {}", expected, actual));
            }
        }

        for builder in shape.builders() {
            let Some(r) = builder.renderable() else {
                continue;
            };
            if r.owner() != Some(shape.id()) {
                errors.push(format!("{:?} renderable is not tagged with its shape", builder.layer()));
            }
            let layer_errors = match &r.primitive {
                Primitive::Mesh(mesh) => MeshValidator::new(mesh).validate_all(),
                Primitive::Lines(lines) => LineValidator::new(lines).validate_all(),
            };
            errors.extend(
                layer_errors
                    .into_iter()
                    .map(|e| format!("{:?} layer: {}", builder.layer(), e)),
            );
        }
        errors
    }
}
