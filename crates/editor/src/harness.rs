//! Headless harness for programmatic scene manipulation.
//!
//! Bundles a scene, a camera, the selector, the transform controls and an
//! optional creation session, and routes pointer input the way a viewport
//! would: creation first, then the controls, then click-to-select.

use glam::{Vec2, Vec3};
use shared::{ShapeKind, ShapeOptions, ShapeStyle};

use crate::controls::TransformShapeControls;
use crate::core::{Shape3D, ShapeError, ShapeId, ShapeResult};
use crate::creation::CreationSession;
use crate::factory;
use crate::scene::ShapeScene;
use crate::selector::Selector;
use crate::settings::EditorSettings;
use crate::validation::ShapeValidator;
use crate::viewport::camera::{ArcBallCamera, Camera};
use crate::viewport::input::{Key, PointerButton, PointerEvent};
use crate::viewport::picking::ray_plane_intersect;

/// Headless editor: scene, camera, selection, controls and creation
pub struct EditorHarness {
    pub scene: ShapeScene,
    pub camera: ArcBallCamera,
    pub selector: Selector,
    pub controls: TransformShapeControls,
    creation: Option<CreationSession>,
}

impl EditorHarness {
    /// Empty harness with a top-down camera over the origin.
    pub fn new() -> Self {
        Self::with_camera(ArcBallCamera::top_down(Vec3::ZERO, 20.0))
    }

    pub fn with_camera(camera: ArcBallCamera) -> Self {
        Self {
            scene: ShapeScene::new(),
            camera,
            selector: Selector::new(),
            controls: TransformShapeControls::new(),
            creation: None,
        }
    }

    pub fn with_settings(settings: &EditorSettings) -> Self {
        let mut harness = Self::new();
        harness.controls = TransformShapeControls::from_settings(settings);
        harness
    }

    // ── Shapes ────────────────────────────────────────────────

    /// Create a shape through the factory and add it to the scene.
    pub fn create_shape(&mut self, kind: ShapeKind, options: ShapeOptions) -> ShapeId {
        let shape = factory::create(self.scene.pool(), kind, options);
        self.scene.add(shape)
    }

    /// Create a shape from plain vertices with default style.
    pub fn create(&mut self, kind: ShapeKind, vertices: &[[f32; 3]]) -> ShapeId {
        self.create_shape(
            kind,
            ShapeOptions {
                vertices: vertices.to_vec(),
                ..Default::default()
            },
        )
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape3D> {
        self.scene.get(id)
    }

    /// Mutable access to a shape, or `UnknownShape`
    pub fn shape_mut(&mut self, id: ShapeId) -> ShapeResult<&mut Shape3D> {
        self.scene.get_mut(id).ok_or(ShapeError::UnknownShape(id))
    }

    /// Remove and dispose a shape, deselecting it first.
    pub fn remove_shape(&mut self, id: ShapeId) -> bool {
        if self.selector.is_selected(id) {
            self.selector.deselect(&mut self.scene, &mut self.controls);
        }
        self.selector.forget(id);
        match self.scene.remove(id) {
            Some(mut shape) => {
                shape.dispose();
                true
            }
            None => false,
        }
    }

    /// Remove everything, including a creation in progress.
    pub fn clear(&mut self) {
        self.selector.deselect(&mut self.scene, &mut self.controls);
        if let Some(session) = self.creation.take() {
            session.cancel(&mut self.scene);
        }
        for id in self.scene.ids() {
            self.remove_shape(id);
        }
    }

    pub fn shape_count(&self) -> usize {
        self.scene.len()
    }

    /// Live graphics resources across all shapes
    pub fn live_resources(&self) -> usize {
        self.scene.pool().live()
    }

    pub fn validate_shape(&self, id: ShapeId) -> Option<ShapeValidator<'_>> {
        self.scene.get(id).map(ShapeValidator::new)
    }

    // ── Selection ─────────────────────────────────────────────

    pub fn select(&mut self, id: ShapeId) -> ShapeResult<()> {
        self.selector.select(&mut self.scene, &mut self.controls, id)
    }

    pub fn deselect(&mut self) {
        self.selector.deselect(&mut self.scene, &mut self.controls);
    }

    pub fn selected(&self) -> Option<ShapeId> {
        self.selector.selected()
    }

    // ── Creation ──────────────────────────────────────────────

    /// Start placing a new shape, cancelling any creation in progress.
    pub fn begin_creation(&mut self, kind: ShapeKind, style: ShapeStyle) -> ShapeId {
        if let Some(session) = self.creation.take() {
            session.cancel(&mut self.scene);
        }
        self.deselect();
        let session = CreationSession::begin(&mut self.scene, kind, style);
        let ghost = session.ghost();
        self.creation = Some(session);
        ghost
    }

    pub fn creation(&self) -> Option<&CreationSession> {
        self.creation.as_ref()
    }

    /// Finish the creation in progress. `None` when nothing is being created.
    pub fn complete_creation(&mut self) -> Option<ShapeResult<ShapeId>> {
        let session = self.creation.take()?;
        Some(session.complete(&mut self.scene))
    }

    pub fn cancel_creation(&mut self) {
        if let Some(session) = self.creation.take() {
            session.cancel(&mut self.scene);
        }
    }

    // ── Input ─────────────────────────────────────────────────

    /// NDC of a world point as seen by the harness camera.
    pub fn ndc_of(&self, world: Vec3) -> Vec2 {
        self.camera.project_to_ndc(world).unwrap_or(Vec2::ZERO)
    }

    /// Ground-plane point under `ndc`
    fn ground_point(&self, ndc: Vec2) -> Option<Vec3> {
        let ray = self.camera.ray_from_ndc(ndc);
        ray_plane_intersect(&ray, Vec3::ZERO, Vec3::Y).map(|t| ray.at(t))
    }

    /// Pointer down at `ndc`. Returns whether anything consumed it.
    pub fn pointer_down(&mut self, ndc: Vec2, button: PointerButton) -> bool {
        let event = PointerEvent::new(ndc, button);
        if self.creation.is_some() {
            let Some(point) = self.ground_point(ndc) else {
                return false;
            };
            if let Some(session) = self.creation.as_mut() {
                session.commit(&mut self.scene, point);
            }
            return true;
        }
        if self.controls.pointer_down(&mut self.scene, &self.camera, event) {
            return true;
        }
        if !button.is_primary() {
            return false;
        }
        self.selector
            .select_at(&mut self.scene, &mut self.controls, &self.camera, ndc)
            .is_some()
    }

    pub fn pointer_move(&mut self, ndc: Vec2) {
        if let Some(session) = self.creation.as_ref() {
            if let Some(point) = self.ground_point(ndc) {
                session.hover(&mut self.scene, point);
            }
            return;
        }
        let event = PointerEvent::primary(ndc);
        self.controls.pointer_move(&mut self.scene, &self.camera, event);
    }

    pub fn pointer_up(&mut self, ndc: Vec2, button: PointerButton) {
        let event = PointerEvent::new(ndc, button);
        self.controls.pointer_up(&mut self.scene, event);
    }

    /// Primary click over a world point.
    pub fn click_at(&mut self, world: Vec3) -> bool {
        let ndc = self.ndc_of(world);
        let consumed = self.pointer_down(ndc, PointerButton::Primary);
        self.pointer_up(ndc, PointerButton::Primary);
        consumed
    }

    /// Press over `from`, move through `path` and release over the last point.
    pub fn drag(&mut self, from: Vec3, path: &[Vec3]) -> bool {
        let start = self.ndc_of(from);
        if !self.pointer_down(start, PointerButton::Primary) {
            return false;
        }
        let mut last = start;
        for point in path {
            last = self.ndc_of(*point);
            self.pointer_move(last);
            self.frame();
        }
        self.pointer_up(last, PointerButton::Primary);
        true
    }

    pub fn key(&mut self, key: Key) {
        if key == Key::Escape && self.creation.is_some() {
            self.cancel_creation();
            return;
        }
        let was_attached = self.controls.attached();
        self.controls.handle_key(&mut self.scene, key);
        // Escape while idle detaches, which also ends the selection
        if let Some(id) = was_attached {
            if self.controls.attached().is_none() {
                self.selector.forget(id);
            }
        }
    }

    /// One animation frame: resync controls with the scene and camera.
    pub fn frame(&mut self) {
        self.controls.update(&mut self.scene, &self.camera);
    }
}

impl Default for EditorHarness {
    fn default() -> Self {
        Self::new()
    }
}
