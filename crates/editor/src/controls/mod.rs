//! Interactive editing of one attached shape: whole-shape gizmo, vertex and
//! midpoint handles, length and angle labels.
//!
//! The controls never own the shape. Every entry point takes the scene and
//! looks the attached id up, so a shape removed behind the controls' back
//! only produces a warning.

pub mod edit;
pub mod gizmo;
pub mod handles;
pub mod labels;
pub mod plane;
pub mod transform;

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use shared::{parse_positive_input, ControlsParams, Snaps, TransformMode, TransformSpace};

use crate::core::{ListenerId, Shape3D, ShapeError, ShapeEvent, ShapeId, ShapeResult};
use crate::scene::ShapeScene;
use crate::settings::EditorSettings;
use crate::viewport::camera::Camera;
use crate::viewport::input::{Key, PointerEvent};
use crate::viewport::mesh::LineMeshData;
use crate::viewport::picking::Ray;

pub use gizmo::{Gizmo, GizmoAxis};
pub use handles::{Cursor, HandleRole, HandleSet, HandleState, VertexHandle};
pub use labels::{AngleLabel, LabelTarget, LabelsManager, LengthLabel};
pub use plane::DragPlane;
pub use transform::DragStart;

/// What the pointer is over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Hover {
    #[default]
    None,
    Gizmo(GizmoAxis),
    Handle { role: HandleRole, index: usize },
}

#[derive(Debug, Clone, Copy)]
enum Drag {
    Gizmo {
        axis: GizmoAxis,
        plane: DragPlane,
        start: DragStart,
    },
    Vertex {
        index: usize,
        plane: DragPlane,
        original: Vec3,
    },
}

#[derive(Debug, Clone, Copy)]
struct Attachment {
    id: ShapeId,
    listener: ListenerId,
}

/// Gizmo + handles + labels for at most one shape at a time
#[derive(Debug)]
pub struct TransformShapeControls {
    attached: Option<Attachment>,
    /// Events fired by the attached shape since the last resync
    inbox: Rc<RefCell<Vec<ShapeEvent>>>,
    mode: TransformMode,
    space: TransformSpace,
    snaps: Snaps,
    params: ControlsParams,
    gizmo: Gizmo,
    handles: HandleSet,
    labels: LabelsManager,
    drag: Option<Drag>,
    hover: Hover,
    cursor: Cursor,
}

impl Default for TransformShapeControls {
    fn default() -> Self {
        Self {
            attached: None,
            inbox: Rc::new(RefCell::new(Vec::new())),
            mode: TransformMode::default(),
            space: TransformSpace::default(),
            snaps: Snaps::default(),
            params: ControlsParams::default(),
            gizmo: Gizmo::default(),
            handles: HandleSet::new(),
            labels: LabelsManager::new(),
            drag: None,
            hover: Hover::None,
            cursor: Cursor::Default,
        }
    }
}

impl TransformShapeControls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &EditorSettings) -> Self {
        let mut controls = Self {
            mode: settings.mode,
            space: settings.space,
            snaps: settings.snaps,
            params: settings.params,
            ..Self::default()
        };
        controls.gizmo.size = settings.gizmo_size;
        controls.gizmo.show_x = settings.show_x;
        controls.gizmo.show_y = settings.show_y;
        controls.gizmo.show_z = settings.show_z;
        controls.labels.precision = settings.label_precision;
        controls.labels.show_length = settings.params.show_length_labels;
        controls.labels.show_angle = settings.params.show_angle_labels;
        controls
    }

    // ── Attachment ───────────────────────────────────────────

    /// Attach to shape `id`, replacing any previous attachment.
    pub fn attach(&mut self, scene: &mut ShapeScene, id: ShapeId) -> ShapeResult<()> {
        if !scene.contains(id) {
            let err = ShapeError::UnknownShape(id);
            tracing::warn!("attach rejected: {}", err);
            return Err(err);
        }
        self.detach(scene);

        let Some(shape) = scene.get_mut(id) else {
            return Err(ShapeError::UnknownShape(id));
        };
        let sink = Rc::clone(&self.inbox);
        let listener = shape.subscribe(move |_, event| sink.borrow_mut().push(event.clone()));
        self.attached = Some(Attachment { id, listener });
        self.resync(shape);
        tracing::debug!("Controls attached to shape {}", id.short());
        Ok(())
    }

    /// Release the attached shape. No-op when nothing is attached.
    pub fn detach(&mut self, scene: &mut ShapeScene) {
        let Some(attachment) = self.attached.take() else {
            return;
        };
        if let Some(shape) = scene.get_mut(attachment.id) {
            shape.unsubscribe(attachment.listener);
        }
        self.reset_interaction();
        tracing::debug!("Controls detached from shape {}", attachment.id.short());
    }

    pub fn attached(&self) -> Option<ShapeId> {
        self.attached.map(|a| a.id)
    }

    fn reset_interaction(&mut self) {
        self.handles.clear();
        self.labels.clear();
        self.inbox.borrow_mut().clear();
        self.drag = None;
        self.hover = Hover::None;
        self.gizmo.set_hovered(None);
        self.cursor = Cursor::Default;
    }

    fn shape<'s>(&self, scene: &'s ShapeScene) -> Option<&'s Shape3D> {
        scene.get(self.attached()?)
    }

    fn shape_mut<'s>(&self, scene: &'s mut ShapeScene) -> Option<&'s mut Shape3D> {
        scene.get_mut(self.attached()?)
    }

    /// Attached shape, or a warning when there is none
    fn target<'s>(&self, scene: &'s mut ShapeScene, op: &str) -> ShapeResult<&'s mut Shape3D> {
        let Some(id) = self.attached() else {
            tracing::warn!("{} ignored: {}", op, ShapeError::NoAttachedShape);
            return Err(ShapeError::NoAttachedShape);
        };
        scene.get_mut(id).ok_or_else(|| {
            tracing::warn!("{} ignored: attached shape {} is gone", op, id.short());
            ShapeError::UnknownShape(id)
        })
    }

    /// Regenerate handles and labels and drop events already accounted for.
    fn resync(&mut self, shape: &Shape3D) {
        self.handles.regenerate(shape, &self.params);
        self.labels.regenerate(shape);
        self.inbox.borrow_mut().clear();
    }

    /// Move handles and labels without rebuilding them.
    fn refresh(&mut self, shape: &Shape3D) {
        self.handles.refresh_positions(shape);
        self.labels.refresh(shape);
        self.inbox.borrow_mut().clear();
    }

    // ── Per-frame update ─────────────────────────────────────

    /// Apply external shape changes and place the gizmo and labels for the
    /// current camera.
    pub fn update(&mut self, scene: &mut ShapeScene, camera: &dyn Camera) {
        let Some(id) = self.attached() else {
            return;
        };
        let Some(shape) = scene.get(id) else {
            tracing::warn!("Attached shape {} left the scene, detaching", id.short());
            self.attached = None;
            self.reset_interaction();
            return;
        };

        let events: Vec<ShapeEvent> = self.inbox.borrow_mut().drain(..).collect();
        if events.iter().any(|e| e.is_topology_change()) {
            self.resync(shape);
        } else if !events.is_empty() {
            self.refresh(shape);
        }

        self.place_gizmo(shape, camera);
        self.labels.update(shape, camera.position());
    }

    /// Gizmo pivot: the world vertex centroid when centering in translate
    /// mode, otherwise the shape's world position.
    pub fn pivot(&self, shape: &Shape3D) -> Vec3 {
        if self.params.center_gizmo && self.mode == TransformMode::Translate {
            shape.world_matrix().transform_point3(shape.vertex_center())
        } else {
            shape.node.world().position
        }
    }

    fn place_gizmo(&mut self, shape: &Shape3D, camera: &dyn Camera) {
        let pivot = self.pivot(shape);
        let rotation = shape.node.world().rotation;
        self.gizmo.update(pivot, rotation, self.mode, self.space, camera);
    }

    // ── Pointer ──────────────────────────────────────────────

    /// Update hover state. The nearer of a gizmo handle and a vertex or
    /// midpoint handle wins.
    pub fn pointer_hover(&mut self, scene: &ShapeScene, camera: &dyn Camera, event: PointerEvent) {
        if self.drag.is_some() {
            return;
        }
        let Some(shape) = self.shape(scene) else {
            return;
        };
        self.place_gizmo(shape, camera);

        let ray = camera.ray_from_ndc(event.ndc);
        let (gizmo_hit, handle_hit) = self.hits(&ray);

        let hover = match (gizmo_hit, handle_hit) {
            (Some((axis, tg)), Some((slot, th))) => {
                if th <= tg {
                    self.handle_hover(slot)
                } else {
                    Hover::Gizmo(axis)
                }
            }
            (Some((axis, _)), None) => Hover::Gizmo(axis),
            (None, Some((slot, _))) => self.handle_hover(slot),
            (None, None) => Hover::None,
        };
        self.set_hover(hover);
    }

    fn hits(&self, ray: &Ray) -> (Option<(GizmoAxis, f32)>, Option<(usize, f32)>) {
        (self.gizmo.hit_test(ray), self.handles.hit_test(ray))
    }

    fn handle_hover(&self, slot: usize) -> Hover {
        self.handles
            .get(slot)
            .map(|h| Hover::Handle {
                role: h.role,
                index: h.index,
            })
            .unwrap_or_default()
    }

    fn set_hover(&mut self, hover: Hover) {
        // Old hover is cleared before the new one is set
        self.gizmo.set_hovered(None);
        self.handles.set_hover(None);

        match hover {
            Hover::Gizmo(axis) => self.gizmo.set_hovered(Some(axis)),
            Hover::Handle { role, index } => {
                let slot = self.handles.iter().position(|h| h.role == role && h.index == index);
                self.handles.set_hover(slot);
            }
            Hover::None => {}
        }
        self.hover = hover;
        self.update_cursor();
    }

    fn update_cursor(&mut self) {
        self.cursor = match (&self.drag, self.hover) {
            (Some(Drag::Vertex { .. }), _) => Cursor::None,
            (_, Hover::Handle { role: HandleRole::Vertex, .. }) => Cursor::Pointer,
            (_, Hover::Handle { role: HandleRole::Midpoint, .. }) => Cursor::Copy,
            _ => Cursor::Default,
        };
    }

    /// Start a drag, split an edge or delete a vertex. Vertex and midpoint
    /// handles take precedence over the gizmo. Returns whether the event was
    /// consumed.
    pub fn pointer_down(&mut self, scene: &mut ShapeScene, camera: &dyn Camera, event: PointerEvent) -> bool {
        if self.drag.is_some() {
            return true;
        }
        self.pointer_hover(scene, camera, event);
        let Some(id) = self.attached() else {
            return false;
        };
        let Some(shape) = scene.get_mut(id) else {
            return false;
        };

        let ray = camera.ray_from_ndc(event.ndc);
        let (gizmo_hit, handle_hit) = self.hits(&ray);

        if let Some((slot, _)) = handle_hit {
            let Some(handle) = self.handles.get(slot).cloned() else {
                return false;
            };
            match handle.role {
                HandleRole::Vertex if event.button.is_primary() => {
                    let y = shape.node.world().position.y;
                    self.drag = Some(Drag::Vertex {
                        index: handle.index,
                        plane: DragPlane::horizontal(y),
                        original: handle.local,
                    });
                    self.handles.begin_move(handle.index);
                    self.update_cursor();
                }
                HandleRole::Vertex => {
                    if shape.remove_vertex_at(handle.index).is_ok() {
                        tracing::debug!("Removed vertex {} of shape {}", handle.index, id.short());
                    }
                    self.resync(shape);
                    self.set_hover(Hover::None);
                }
                HandleRole::Midpoint => {
                    if shape.insert_midpoint_at(handle.index).is_ok() {
                        tracing::debug!("Split edge {} of shape {}", handle.index, id.short());
                    }
                    self.resync(shape);
                    self.set_hover(Hover::None);
                }
            }
            return true;
        }

        let Some((axis, _)) = gizmo_hit else {
            return false;
        };
        if !event.button.is_primary() {
            return false;
        }
        let orientation = self.gizmo.drag_orientation(axis, self.space, shape.node.world().rotation);
        let plane = plane::gizmo_plane(self.mode, axis, orientation, self.gizmo.eye(), self.gizmo.pivot());
        let Some(hit) = plane.intersect(&ray) else {
            return false;
        };
        self.drag = Some(Drag::Gizmo {
            axis,
            plane,
            start: DragStart::capture(&shape.node, hit),
        });
        tracing::debug!("Gizmo drag started on {} ({:?})", axis.name(), self.mode);
        true
    }

    /// Continue the active drag, or hover when idle.
    pub fn pointer_move(&mut self, scene: &mut ShapeScene, camera: &dyn Camera, event: PointerEvent) {
        let Some(drag) = self.drag else {
            self.pointer_hover(scene, camera, event);
            return;
        };
        let Some(shape) = self.shape_mut(scene) else {
            return;
        };
        let ray = camera.ray_from_ndc(event.ndc);

        match drag {
            Drag::Vertex { index, plane, .. } => {
                let Some(hit) = plane.intersect(&ray) else {
                    return;
                };
                let world = shape.node.world();
                let mut offset = hit - world.position;
                if let Some(step) = self.snaps.translation.filter(|s| *s > 0.0) {
                    offset = (offset / step).round() * step;
                }
                let local = world.rotation.inverse() * offset;
                if let Err(err) = shape.update_vertex_at(index, local) {
                    tracing::warn!("Vertex drag: {}", err);
                    return;
                }
                self.refresh(shape);
            }
            Drag::Gizmo { axis, plane, start } => {
                let Some(hit) = plane.intersect(&ray) else {
                    return;
                };
                let point_end = hit - start.world_position;
                match self.mode {
                    TransformMode::Translate => {
                        shape.node.position =
                            transform::translate(&start, axis, self.space, point_end, self.snaps.translation);
                    }
                    TransformMode::Rotate => {
                        let space = plane::effective_space(self.mode, axis, self.space);
                        shape.node.rotation = transform::rotate(
                            &start,
                            axis,
                            space,
                            point_end,
                            self.gizmo.eye(),
                            self.gizmo.rotation_speed(),
                            self.snaps.rotation,
                        );
                    }
                    TransformMode::Scale => {
                        shape.node.scale = transform::scale(&start, axis, point_end, self.snaps.scale);
                    }
                }
                self.handles.refresh_positions(shape);
                self.place_gizmo(shape, camera);
            }
        }
    }

    /// End the active drag regardless of button. Handles and labels are
    /// regenerated after a vertex drag.
    pub fn pointer_up(&mut self, scene: &mut ShapeScene, _event: PointerEvent) {
        let Some(drag) = self.drag.take() else {
            return;
        };
        if let Drag::Vertex { .. } = drag {
            self.handles.end_move();
            if let Some(shape) = self.shape(scene) {
                self.resync(shape);
            }
        }
        self.hover = Hover::None;
        self.update_cursor();
    }

    // ── Keyboard ─────────────────────────────────────────────

    pub fn handle_key(&mut self, scene: &mut ShapeScene, key: Key) {
        match key {
            Key::Escape => {
                if self.drag.is_some() {
                    self.cancel_drag(scene);
                } else {
                    self.detach(scene);
                }
            }
            Key::W => self.set_mode(TransformMode::Translate),
            Key::E => self.set_mode(TransformMode::Rotate),
            Key::R => self.set_mode(TransformMode::Scale),
            Key::Q => self.toggle_space(),
        }
    }

    /// Abort the active drag and restore what it changed.
    pub fn cancel_drag(&mut self, scene: &mut ShapeScene) {
        let Some(drag) = self.drag.take() else {
            return;
        };
        let Some(shape) = self.shape_mut(scene) else {
            return;
        };
        match drag {
            Drag::Vertex { index, original, .. } => {
                self.handles.end_move();
                if let Err(err) = shape.update_vertex_at(index, original) {
                    tracing::warn!("Drag cancel: {}", err);
                }
                self.resync(shape);
            }
            Drag::Gizmo { start, .. } => {
                start.restore(&mut shape.node);
                self.handles.refresh_positions(shape);
            }
        }
        self.hover = Hover::None;
        self.update_cursor();
        tracing::debug!("Drag cancelled");
    }

    // ── Configuration ────────────────────────────────────────

    pub fn mode(&self) -> TransformMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: TransformMode) {
        self.mode = mode;
    }

    pub fn space(&self) -> TransformSpace {
        self.space
    }

    pub fn toggle_space(&mut self) {
        self.space = match self.space {
            TransformSpace::World => TransformSpace::Local,
            TransformSpace::Local => TransformSpace::World,
        };
    }

    pub fn snaps(&self) -> Snaps {
        self.snaps
    }

    pub fn set_translation_snap(&mut self, step: Option<f32>) {
        self.snaps.translation = step;
    }

    pub fn params(&self) -> ControlsParams {
        self.params
    }

    /// Replace the parameters and regenerate handles and labels.
    pub fn set_params(&mut self, scene: &ShapeScene, params: ControlsParams) {
        self.params = params;
        self.labels.show_length = params.show_length_labels;
        self.labels.show_angle = params.show_angle_labels;
        if let Some(shape) = self.shape(scene) {
            self.resync(shape);
        }
    }

    pub fn set_show_length_labels(&mut self, scene: &ShapeScene, show: bool) {
        let params = ControlsParams {
            show_length_labels: show,
            ..self.params
        };
        self.set_params(scene, params);
    }

    pub fn set_show_angle_labels(&mut self, scene: &ShapeScene, show: bool) {
        let params = ControlsParams {
            show_angle_labels: show,
            ..self.params
        };
        self.set_params(scene, params);
    }

    pub fn set_center_gizmo(&mut self, center: bool) {
        self.params.center_gizmo = center;
    }

    // ── Numeric edits ────────────────────────────────────────

    /// Give edge `edge` the 3D length `length` by moving its end vertex.
    pub fn set_edge_length(&mut self, scene: &mut ShapeScene, edge: usize, length: f32) -> ShapeResult<()> {
        let shape = self.target(scene, "set_edge_length")?;
        let (index, target) =
            edit::edge_length_target(shape.vertex_store(), edge, shape.is_closed(), length).inspect_err(|err| {
                tracing::warn!("set_edge_length rejected: {}", err);
            })?;
        shape.update_vertex_at(index, target)?;
        self.resync(shape);
        Ok(())
    }

    /// Set the angle at vertex `vertex` by rotating the following edge.
    pub fn set_vertex_angle(&mut self, scene: &mut ShapeScene, vertex: usize, degrees: f32) -> ShapeResult<()> {
        let shape = self.target(scene, "set_vertex_angle")?;
        let (index, target) = edit::vertex_angle_target(shape.vertex_store(), vertex, shape.is_closed(), degrees)
            .inspect_err(|err| {
                tracing::warn!("set_vertex_angle rejected: {}", err);
            })?;
        shape.update_vertex_at(index, target)?;
        self.resync(shape);
        Ok(())
    }

    /// Unlock a label for typing.
    pub fn unlock_label(&mut self, target: LabelTarget) -> bool {
        self.labels.unlock(target)
    }

    /// Type into an unlocked label.
    pub fn type_label(&mut self, target: LabelTarget, text: &str) -> bool {
        self.labels.set_value(target, text)
    }

    /// Commit the typed text of a label. Unparsable or non-positive input
    /// reverts the label and leaves the shape untouched. Returns whether the
    /// edit was applied.
    pub fn commit_label(&mut self, scene: &mut ShapeScene, target: LabelTarget) -> bool {
        let Some(text) = self.labels.take_value(target) else {
            return false;
        };
        let value = match parse_positive_input(&text) {
            Ok(v) => v as f32,
            Err(err) => {
                tracing::warn!("Label input '{}' rejected: {}", text, err);
                self.labels.reset(target);
                return false;
            }
        };
        let result = match target {
            LabelTarget::Edge(edge) => self.set_edge_length(scene, edge, value),
            LabelTarget::Vertex(vertex) => self.set_vertex_angle(scene, vertex, value),
        };
        if result.is_err() {
            self.labels.reset(target);
        }
        result.is_ok()
    }

    // ── Accessors ────────────────────────────────────────────

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn hover(&self) -> Hover {
        self.hover
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Vertex being dragged, if any
    pub fn dragged_vertex(&self) -> Option<usize> {
        match self.drag {
            Some(Drag::Vertex { index, .. }) => Some(index),
            _ => None,
        }
    }

    /// Gizmo handle being dragged, if any
    pub fn dragged_axis(&self) -> Option<GizmoAxis> {
        match self.drag {
            Some(Drag::Gizmo { axis, .. }) => Some(axis),
            _ => None,
        }
    }

    pub fn handles(&self) -> &HandleSet {
        &self.handles
    }

    pub fn labels(&self) -> &LabelsManager {
        &self.labels
    }

    pub fn gizmo(&self) -> &Gizmo {
        &self.gizmo
    }

    /// Line geometry of the gizmo for the host renderer
    pub fn gizmo_lines(&self) -> LineMeshData {
        if self.attached.is_some() {
            self.gizmo.lines()
        } else {
            LineMeshData::default()
        }
    }
}
