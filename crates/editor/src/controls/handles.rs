//! Vertex and midpoint markers of the attached shape.

use glam::Vec3;
use serde::Serialize;
use shared::config::VERTEX_SCALE;
use shared::ControlsParams;

use crate::core::Shape3D;
use crate::viewport::picking::{ray_sphere_intersect, Ray};

/// What a handle stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleRole {
    /// Vertex `index`
    Vertex,
    /// Midpoint of edge `index`
    Midpoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleState {
    #[default]
    Idle,
    Hover,
    Moving,
}

/// Pointer cursor hint for the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
    Copy,
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VertexHandle {
    pub role: HandleRole,
    pub index: usize,
    /// Position in the shape's local frame
    pub local: Vec3,
    /// Position in world space, used for picking
    pub world: Vec3,
    pub state: HandleState,
}

/// Ordered handle list: vertex `i`, then the midpoint of edge `i`
#[derive(Debug, Default)]
pub struct HandleSet {
    handles: Vec<VertexHandle>,
    /// Vertex currently dragged
    moving: Option<usize>,
    regenerations: u64,
}

impl HandleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild every handle from the shape's vertex store.
    pub fn regenerate(&mut self, shape: &Shape3D, params: &ControlsParams) {
        self.handles.clear();
        self.regenerations += 1;
        if !params.drag_vertices {
            return;
        }

        let store = shape.vertex_store();
        let closed = shape.is_closed();
        let world = shape.world_matrix();
        let mut push = |role, index, local: Vec3| {
            let state = if role == HandleRole::Vertex && self.moving == Some(index) {
                HandleState::Moving
            } else {
                HandleState::Idle
            };
            self.handles.push(VertexHandle {
                role,
                index,
                local,
                world: world.transform_point3(local),
                state,
            });
        };

        let n = store.len();
        for (i, vertex) in store.as_slice().iter().enumerate() {
            push(HandleRole::Vertex, i, *vertex);
            if i >= 1 && params.allow_creating_new_vertices {
                if let Ok(mid) = store.midpoint(i, closed) {
                    push(HandleRole::Midpoint, i, mid);
                }
            }
        }
        if params.allow_creating_new_vertices && store.is_valid_edge(n, closed) {
            if let Ok(mid) = store.midpoint(n, closed) {
                push(HandleRole::Midpoint, n, mid);
            }
        }

        if self.moving.is_some_and(|i| i >= n) {
            self.moving = None;
        }
    }

    /// Move existing handles to the shape's current vertex positions without
    /// changing their number or states.
    pub fn refresh_positions(&mut self, shape: &Shape3D) {
        let store = shape.vertex_store();
        let closed = shape.is_closed();
        let world = shape.world_matrix();
        for handle in self.handles.iter_mut() {
            let local = match handle.role {
                HandleRole::Vertex => store.get(handle.index),
                HandleRole::Midpoint => store.midpoint(handle.index, closed).ok(),
            };
            if let Some(local) = local {
                handle.local = local;
                handle.world = world.transform_point3(local);
            }
        }
    }

    pub fn clear(&mut self) {
        self.handles.clear();
        self.moving = None;
    }

    /// Nearest handle under the ray: `(position in the list, ray distance)`.
    pub fn hit_test(&self, ray: &Ray) -> Option<(usize, f32)> {
        let radius = VERTEX_SCALE * 0.5;
        self.handles
            .iter()
            .enumerate()
            .filter_map(|(i, h)| ray_sphere_intersect(ray, h.world, radius).map(|t| (i, t)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Hover the handle at list position `slot`, clearing any previous hover
    /// first. Moving handles keep their state.
    pub fn set_hover(&mut self, slot: Option<usize>) {
        for handle in self.handles.iter_mut() {
            if handle.state == HandleState::Hover {
                handle.state = HandleState::Idle;
            }
        }
        if let Some(handle) = slot.and_then(|s| self.handles.get_mut(s)) {
            if handle.state == HandleState::Idle {
                handle.state = HandleState::Hover;
            }
        }
    }

    pub fn hovered(&self) -> Option<&VertexHandle> {
        self.handles.iter().find(|h| h.state == HandleState::Hover)
    }

    pub fn begin_move(&mut self, vertex: usize) {
        self.set_hover(None);
        self.moving = Some(vertex);
        for handle in self.handles.iter_mut() {
            if handle.role == HandleRole::Vertex && handle.index == vertex {
                handle.state = HandleState::Moving;
            }
        }
    }

    pub fn end_move(&mut self) {
        self.moving = None;
        for handle in self.handles.iter_mut() {
            if handle.state == HandleState::Moving {
                handle.state = HandleState::Idle;
            }
        }
    }

    pub fn moving(&self) -> Option<usize> {
        self.moving
    }

    pub fn get(&self, slot: usize) -> Option<&VertexHandle> {
        self.handles.get(slot)
    }

    pub fn find(&self, role: HandleRole, index: usize) -> Option<&VertexHandle> {
        self.handles.iter().find(|h| h.role == role && h.index == index)
    }

    pub fn count(&self, role: HandleRole) -> usize {
        self.handles.iter().filter(|h| h.role == role).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VertexHandle> {
        self.handles.iter()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// How many times the handle list was rebuilt
    pub fn regenerations(&self) -> u64 {
        self.regenerations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::ResourcePool;
    use shared::ShapeOptions;

    fn line(points: &[[f32; 3]], close: bool) -> Shape3D {
        Shape3D::new(
            &ResourcePool::new(),
            ShapeOptions {
                vertices: points.to_vec(),
                close_line: close,
                ..Default::default()
            },
        )
    }

    const TRI: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [5.0, 0.0, 5.0], [0.0, 0.0, 5.0]];

    #[test]
    fn test_open_line_handles() {
        let shape = line(&TRI, false);
        let mut set = HandleSet::new();
        set.regenerate(&shape, &ControlsParams::default());
        assert_eq!(set.count(HandleRole::Vertex), 3);
        assert_eq!(set.count(HandleRole::Midpoint), 2);
        let order: Vec<_> = set.iter().map(|h| (h.role, h.index)).collect();
        assert_eq!(
            order,
            vec![
                (HandleRole::Vertex, 0),
                (HandleRole::Vertex, 1),
                (HandleRole::Midpoint, 1),
                (HandleRole::Vertex, 2),
                (HandleRole::Midpoint, 2),
            ]
        );
    }

    #[test]
    fn test_closed_line_has_closing_midpoint() {
        let shape = line(&TRI, true);
        let mut set = HandleSet::new();
        set.regenerate(&shape, &ControlsParams::default());
        let closing = set.find(HandleRole::Midpoint, 3).unwrap();
        assert_eq!(closing.local, Vec3::new(0.0, 0.0, 2.5));
    }

    #[test]
    fn test_params_disable_handles() {
        let shape = line(&TRI, false);
        let mut set = HandleSet::new();
        let params = ControlsParams {
            allow_creating_new_vertices: false,
            ..Default::default()
        };
        set.regenerate(&shape, &params);
        assert_eq!(set.count(HandleRole::Midpoint), 0);
        assert_eq!(set.len(), 3);

        let params = ControlsParams {
            drag_vertices: false,
            ..Default::default()
        };
        set.regenerate(&shape, &params);
        assert!(set.is_empty());
        assert_eq!(set.regenerations(), 2);
    }

    #[test]
    fn test_handles_follow_shape_transform() {
        let mut shape = line(&TRI, false);
        shape.node.position = Vec3::new(0.0, 3.0, 0.0);
        let mut set = HandleSet::new();
        set.regenerate(&shape, &ControlsParams::default());
        let h = set.find(HandleRole::Vertex, 1).unwrap();
        assert_eq!(h.local, Vec3::new(5.0, 0.0, 5.0));
        assert_eq!(h.world, Vec3::new(5.0, 3.0, 5.0));
    }

    #[test]
    fn test_hover_is_exclusive() {
        let shape = line(&TRI, false);
        let mut set = HandleSet::new();
        set.regenerate(&shape, &ControlsParams::default());
        set.set_hover(Some(0));
        set.set_hover(Some(3));
        let hovered: Vec<_> = set.iter().filter(|h| h.state == HandleState::Hover).collect();
        assert_eq!(hovered.len(), 1);
        assert_eq!(hovered[0].index, 2);
        set.set_hover(None);
        assert!(set.hovered().is_none());
    }

    #[test]
    fn test_hit_nearest_handle() {
        let shape = line(&TRI, false);
        let mut set = HandleSet::new();
        set.regenerate(&shape, &ControlsParams::default());
        let ray = Ray::new(Vec3::new(5.0, 10.0, 5.0), Vec3::NEG_Y);
        let (slot, t) = set.hit_test(&ray).unwrap();
        assert_eq!(set.get(slot).map(|h| (h.role, h.index)), Some((HandleRole::Vertex, 1)));
        assert!((t - 9.5).abs() < 1e-4);
        let miss = Ray::new(Vec3::new(20.0, 10.0, 20.0), Vec3::NEG_Y);
        assert!(set.hit_test(&miss).is_none());
    }

    #[test]
    fn test_moving_survives_regenerate_and_refresh() {
        let mut shape = line(&TRI, false);
        let mut set = HandleSet::new();
        set.regenerate(&shape, &ControlsParams::default());
        set.begin_move(1);
        shape.update_vertex_at(1, Vec3::new(6.0, 0.0, 6.0)).unwrap();
        set.refresh_positions(&shape);
        let h = set.find(HandleRole::Vertex, 1).unwrap();
        assert_eq!(h.state, HandleState::Moving);
        assert_eq!(h.local, Vec3::new(6.0, 0.0, 6.0));
        assert_eq!(set.find(HandleRole::Midpoint, 1).unwrap().local, Vec3::new(3.0, 0.0, 3.0));

        set.regenerate(&shape, &ControlsParams::default());
        assert_eq!(set.find(HandleRole::Vertex, 1).unwrap().state, HandleState::Moving);
        set.end_move();
        assert!(set.iter().all(|h| h.state == HandleState::Idle));
    }
}
