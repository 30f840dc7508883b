use glam::Vec2;

use crate::controls::TransformShapeControls;
use crate::core::{ShapeError, ShapeId, ShapeResult};
use crate::raycast::pick_shape;
use crate::scene::ShapeScene;
use crate::viewport::camera::Camera;

/// Single-shape selection. Selecting attaches the transform controls,
/// deselecting detaches them.
#[derive(Debug, Default)]
pub struct Selector {
    selected: Option<ShapeId>,
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<ShapeId> {
        self.selected
    }

    pub fn is_selected(&self, id: ShapeId) -> bool {
        self.selected == Some(id)
    }

    /// Select `id` and attach `controls` to it.
    pub fn select(
        &mut self,
        scene: &mut ShapeScene,
        controls: &mut TransformShapeControls,
        id: ShapeId,
    ) -> ShapeResult<()> {
        if !scene.contains(id) {
            let err = ShapeError::UnknownShape(id);
            tracing::warn!("select rejected: {}", err);
            return Err(err);
        }
        if self.selected == Some(id) && controls.attached() == Some(id) {
            return Ok(());
        }
        controls.attach(scene, id)?;
        self.selected = Some(id);
        tracing::debug!("Selected shape {}", id.short());
        Ok(())
    }

    /// Clear the selection. No-op when nothing is selected.
    pub fn deselect(&mut self, scene: &mut ShapeScene, controls: &mut TransformShapeControls) {
        let Some(id) = self.selected.take() else {
            return;
        };
        controls.detach(scene);
        tracing::debug!("Deselected shape {}", id.short());
    }

    /// Select the nearest shape under `ndc`, or deselect when the pointer
    /// hits only background. Returns the new selection.
    pub fn select_at(
        &mut self,
        scene: &mut ShapeScene,
        controls: &mut TransformShapeControls,
        camera: &dyn Camera,
        ndc: Vec2,
    ) -> Option<ShapeId> {
        let ray = camera.ray_from_ndc(ndc);
        match pick_shape(scene, &ray) {
            Some(id) => {
                // The id comes from the scene, so select cannot fail here
                let _ = self.select(scene, controls, id);
            }
            None => self.deselect(scene, controls),
        }
        self.selected
    }

    /// Forget a shape that left the scene.
    pub fn forget(&mut self, id: ShapeId) {
        if self.selected == Some(id) {
            self.selected = None;
        }
    }
}
