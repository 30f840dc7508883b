use crate::core::error::{ShapeError, ShapeResult};

/// Triangulate a simple polygon given as (x, z) ground-plane points.
///
/// Returned triangles index into `points` and are wound counter-clockwise in
/// the (x, z) plane.
pub fn triangulate_polygon(points: &[[f32; 2]]) -> ShapeResult<Vec<[usize; 3]>> {
    if points.len() < 3 {
        return Ok(Vec::new());
    }

    let flat: Vec<f64> = points
        .iter()
        .flat_map(|p| [p[0] as f64, p[1] as f64])
        .collect();

    let indices = earcutr::earcut(&flat, &[], 2)
        .map_err(|e| ShapeError::Triangulation(format!("{:?}", e)))?;

    Ok(indices
        .chunks_exact(3)
        .map(|t| {
            if cross2(points[t[0]], points[t[1]], points[t[2]]) < 0.0 {
                [t[0], t[2], t[1]]
            } else {
                [t[0], t[1], t[2]]
            }
        })
        .collect())
}

/// Twice the signed area of a ground-plane polygon (positive when CCW in x, z)
pub fn signed_area2(points: &[[f32; 2]]) -> f32 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a[0] * b[1] - b[0] * a[1]
        })
        .sum()
}

fn cross2(a: [f32; 2], b: [f32; 2], c: [f32; 2]) -> f32 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}
