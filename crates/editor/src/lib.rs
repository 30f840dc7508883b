// Library crate: parametric shapes, transform controls and the headless
// harness. The binary only adds script execution on top.

pub mod builders;
pub mod command;
pub mod controls;
pub mod core;
pub mod creation;
pub mod factory;
pub mod fixtures;
pub mod harness;
pub mod raycast;
pub mod scene;
pub mod selector;
pub mod settings;
pub mod validation;
pub mod viewport;

pub use crate::controls::TransformShapeControls;
pub use crate::core::{Shape3D, ShapeError, ShapeEvent, ShapeId, ShapeResult};
pub use crate::harness::EditorHarness;
pub use crate::scene::ShapeScene;
