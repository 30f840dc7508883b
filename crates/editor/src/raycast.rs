//! Scene raycasting and mapping hits back to their owning shape.

use glam::Vec3;

use crate::core::ShapeId;
use crate::scene::{Primitive, RenderableId, ShapeScene};
use crate::viewport::picking::{pick_triangle, ray_segment_distance, Ray};

/// Max distance between the ray and a line segment that still counts as a hit
pub const LINE_PICK_THRESHOLD: f32 = 0.2;

/// One ray hit against a renderable
#[derive(Debug, Clone, PartialEq)]
pub struct Intersection {
    pub distance: f32,
    pub point: Vec3,
    pub renderable: RenderableId,
    /// Tag of the hit primitive, `None` for background geometry
    pub owner: Option<ShapeId>,
}

/// Intersect `ray` with every visible renderable, nearest first.
pub fn raycast(scene: &ShapeScene, ray: &Ray) -> Vec<Intersection> {
    let mut hits = Vec::new();

    for (renderable, world) in scene.visible_renderables() {
        let distance = match &renderable.primitive {
            Primitive::Mesh(mesh) => {
                let local_ray = ray.transformed(&world.inverse());
                pick_triangle(&local_ray, mesh).map(|hit| hit.distance)
            }
            Primitive::Lines(lines) => (0..lines.segment_count())
                .filter_map(|seg| {
                    let (a, b) = lines.segment(seg);
                    let (dist, t) = ray_segment_distance(
                        ray,
                        world.transform_point3(a),
                        world.transform_point3(b),
                    );
                    (dist < LINE_PICK_THRESHOLD).then_some(t)
                })
                .min_by(|a, b| a.total_cmp(b)),
        };

        if let Some(distance) = distance {
            hits.push(Intersection {
                distance,
                point: ray.at(distance),
                renderable: renderable.id(),
                owner: renderable.owner(),
            });
        }
    }

    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

/// Owning shape of a hit, if the hit primitive is tagged and the shape is
/// still in the scene.
pub fn resolve_owner(scene: &ShapeScene, hit: &Intersection) -> Option<ShapeId> {
    hit.owner.filter(|id| scene.contains(*id))
}

/// Nearest shape under the ray, skipping untagged geometry.
pub fn pick_shape(scene: &ShapeScene, ray: &Ray) -> Option<ShapeId> {
    raycast(scene, ray)
        .iter()
        .find_map(|hit| resolve_owner(scene, hit))
}
