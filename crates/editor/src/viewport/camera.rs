use glam::{Mat4, Vec2, Vec3, Vec4};

use super::picking::Ray;

/// What the editor needs from the host camera: a world position, a field of
/// view for gizmo sizing, and a ray through a normalized pointer coordinate.
pub trait Camera {
    /// Camera position in world space
    fn position(&self) -> Vec3;

    /// Vertical field of view (radians)
    fn fov(&self) -> f32;

    /// Zoom factor applied on top of the field of view
    fn zoom(&self) -> f32 {
        1.0
    }

    /// Ray from the camera through a point in normalized device coordinates
    /// (x, y in -1..1, y up).
    fn ray_from_ndc(&self, ndc: Vec2) -> Ray;

    /// Project a world point to normalized device coordinates.
    fn project_to_ndc(&self, point: Vec3) -> Option<Vec2>;
}

/// Arc-ball camera for 3D viewport
#[derive(Debug, Clone)]
pub struct ArcBallCamera {
    /// Horizontal rotation angle (radians)
    pub yaw: f32,
    /// Vertical rotation angle (radians)
    pub pitch: f32,
    /// Distance from target
    pub distance: f32,
    /// Camera target point
    pub target: Vec3,
    /// Vertical field of view (radians)
    pub fov: f32,
    /// Viewport width / height
    pub aspect: f32,
}

impl ArcBallCamera {
    pub fn new() -> Self {
        Self {
            yaw: 0.6,
            pitch: 0.4,
            distance: 30.0,
            target: Vec3::ZERO,
            fov: 45.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
        }
    }

    /// Camera looking almost straight down at `target`.
    pub fn top_down(target: Vec3, distance: f32) -> Self {
        Self {
            yaw: 0.0,
            pitch: 1.5,
            distance,
            target,
            ..Self::new()
        }
    }

    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += dx.to_radians();
        self.pitch = (self.pitch + dy.to_radians()).clamp(-1.5, 1.5);
    }

    pub fn zoom_by(&mut self, delta: f32) {
        self.distance = (self.distance * (1.0 - delta)).clamp(0.5, 150.0);
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        let right = self.right_vector();
        let up = self.up_vector();
        self.target += right * dx + up * dy;
    }

    /// Camera position in world space
    pub fn eye_position(&self) -> Vec3 {
        let cy = self.yaw.cos();
        let sy = self.yaw.sin();
        let cp = self.pitch.cos();
        let sp = self.pitch.sin();

        self.target
            + Vec3::new(
                self.distance * cp * sy,
                self.distance * sp,
                self.distance * cp * cy,
            )
    }

    /// View matrix (world -> camera)
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye_position(), self.target, Vec3::Y)
    }

    /// Projection matrix (camera -> clip)
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov, self.aspect, 0.1, 500.0)
    }

    /// Combined view-projection matrix
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    fn right_vector(&self) -> Vec3 {
        let fwd = (self.target - self.eye_position()).normalize_or_zero();
        fwd.cross(Vec3::Y).normalize_or_zero()
    }

    fn up_vector(&self) -> Vec3 {
        let fwd = (self.target - self.eye_position()).normalize_or_zero();
        let right = self.right_vector();
        right.cross(fwd).normalize_or_zero()
    }
}

impl Default for ArcBallCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera for ArcBallCamera {
    fn position(&self) -> Vec3 {
        self.eye_position()
    }

    fn fov(&self) -> f32 {
        self.fov
    }

    fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let vp_inv = self.view_projection().inverse();

        // Unproject near and far points
        let near_world = vp_inv * Vec4::new(ndc.x, ndc.y, -1.0, 1.0);
        let far_world = vp_inv * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);

        let near = near_world.truncate() / near_world.w;
        let far = far_world.truncate() / far_world.w;

        Ray::new(self.eye_position(), far - near)
    }

    fn project_to_ndc(&self, point: Vec3) -> Option<Vec2> {
        let p = self.view_projection() * point.extend(1.0);
        if p.w <= 0.0 {
            return None;
        }
        Some(Vec2::new(p.x / p.w, p.y / p.w))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::picking::ray_plane_intersect;

    #[test]
    fn test_center_ray_hits_target() {
        let cam = ArcBallCamera::new();
        let ray = cam.ray_from_ndc(Vec2::ZERO);
        let to_target = (cam.target - ray.origin).normalize();
        assert!(ray.direction.dot(to_target) > 0.9999);
    }

    #[test]
    fn test_project_unproject_roundtrip() {
        let cam = ArcBallCamera::top_down(Vec3::ZERO, 25.0);
        let world = Vec3::new(3.0, 0.0, -2.0);
        let ndc = cam.project_to_ndc(world).unwrap();
        let ray = cam.ray_from_ndc(ndc);
        let t = ray_plane_intersect(&ray, Vec3::ZERO, Vec3::Y).unwrap();
        assert!((ray.at(t) - world).length() < 1e-2);
    }

    #[test]
    fn test_point_behind_camera_not_projected() {
        let cam = ArcBallCamera::top_down(Vec3::ZERO, 10.0);
        assert!(cam.project_to_ndc(Vec3::new(0.0, 50.0, 0.0)).is_none());
    }

    #[test]
    fn test_pitch_clamped() {
        let mut cam = ArcBallCamera::new();
        cam.rotate(0.0, 500.0);
        assert!(cam.pitch <= 1.5);
    }

    #[test]
    fn test_zoom_and_pan() {
        let mut cam = ArcBallCamera::top_down(Vec3::ZERO, 20.0);
        cam.zoom_by(0.5);
        assert!((cam.distance - 10.0).abs() < 1e-5);
        cam.zoom_by(-100.0);
        assert_eq!(cam.distance, 150.0);

        cam.pan(2.0, 0.0);
        assert!((cam.target.length() - 2.0).abs() < 1e-4);
        assert!(cam.target.y.abs() < 1e-4);
    }
}
