use glam::Vec3;

/// Floats per mesh vertex: position(3) + normal(3) + color(3)
pub const MESH_STRIDE: usize = 9;

/// Floats per line vertex: position(3) + color(4)
pub const LINE_STRIDE: usize = 7;

/// CPU-side mesh data: interleaved [pos.x, pos.y, pos.z, norm.x, norm.y, norm.z, r, g, b]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshData {
    /// 9 floats per vertex: position(3) + normal(3) + color(3)
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / MESH_STRIDE
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn position(&self, index: usize) -> Vec3 {
        let base = index * MESH_STRIDE;
        Vec3::new(
            self.vertices[base],
            self.vertices[base + 1],
            self.vertices[base + 2],
        )
    }

    pub fn normal(&self, index: usize) -> Vec3 {
        let base = index * MESH_STRIDE;
        Vec3::new(
            self.vertices[base + 3],
            self.vertices[base + 4],
            self.vertices[base + 5],
        )
    }

    /// Corner positions of triangle `tri`
    pub fn triangle(&self, tri: usize) -> [Vec3; 3] {
        let i0 = self.indices[tri * 3] as usize;
        let i1 = self.indices[tri * 3 + 1] as usize;
        let i2 = self.indices[tri * 3 + 2] as usize;
        [self.position(i0), self.position(i1), self.position(i2)]
    }

    /// Append a vertex and return its index.
    pub fn push_vertex(&mut self, pos: Vec3, normal: Vec3, color: [f32; 3]) -> u32 {
        let index = self.vertex_count() as u32;
        self.vertices.extend_from_slice(&[
            pos.x, pos.y, pos.z, normal.x, normal.y, normal.z, color[0], color[1], color[2],
        ]);
        index
    }
}

/// Lines mesh (line list): interleaved [pos.x, pos.y, pos.z, r, g, b, a]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineMeshData {
    /// 7 floats per vertex: position(3) + color(4)
    pub vertices: Vec<f32>,
}

impl LineMeshData {
    /// Build a line list from an ordered polyline.
    pub fn from_polyline(points: &[Vec3], color: [f32; 4]) -> Self {
        let mut mesh = Self::default();
        for pair in points.windows(2) {
            mesh.push_segment(pair[0], pair[1], color);
        }
        mesh
    }

    pub fn push_segment(&mut self, a: Vec3, b: Vec3, color: [f32; 4]) {
        push_line_vert(&mut self.vertices, a, color);
        push_line_vert(&mut self.vertices, b, color);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / LINE_STRIDE
    }

    pub fn segment_count(&self) -> usize {
        self.vertex_count() / 2
    }

    pub fn position(&self, index: usize) -> Vec3 {
        let base = index * LINE_STRIDE;
        Vec3::new(
            self.vertices[base],
            self.vertices[base + 1],
            self.vertices[base + 2],
        )
    }

    /// Endpoints of segment `seg`
    pub fn segment(&self, seg: usize) -> (Vec3, Vec3) {
        (self.position(seg * 2), self.position(seg * 2 + 1))
    }
}

// ── Helpers ──────────────────────────────────────────────────

fn push_line_vert(v: &mut Vec<f32>, p: Vec3, c: [f32; 4]) {
    v.extend_from_slice(&[p.x, p.y, p.z, c[0], c[1], c[2], c[3]]);
}
