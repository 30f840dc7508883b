use glam::{Mat4, Quat, Vec3};

/// Local transform of a node plus the world matrix of its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneNode {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    /// World matrix of the parent node (identity for scene roots)
    pub parent_world: Mat4,
}

impl Default for SceneNode {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            parent_world: Mat4::IDENTITY,
        }
    }
}

/// World-space decomposition of a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldTransform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl SceneNode {
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    pub fn world_matrix(&self) -> Mat4 {
        self.parent_world * self.local_matrix()
    }

    pub fn world(&self) -> WorldTransform {
        let (scale, rotation, position) = self.world_matrix().to_scale_rotation_translation();
        WorldTransform {
            position,
            rotation,
            scale,
        }
    }

    /// Decomposition of the parent's world matrix
    pub fn parent(&self) -> WorldTransform {
        let (scale, rotation, position) = self.parent_world.to_scale_rotation_translation();
        WorldTransform {
            position,
            rotation,
            scale,
        }
    }

    /// Local point → world
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.world_matrix().transform_point3(local)
    }

    /// World point → local
    pub fn to_local(&self, world: Vec3) -> Vec3 {
        self.world_matrix().inverse().transform_point3(world)
    }
}
