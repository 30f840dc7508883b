//! Host-facing viewport primitives: CPU mesh buffers, ray picking, the camera
//! contract and pointer/keyboard input.

pub mod camera;
pub mod input;
pub mod mesh;
pub mod picking;

pub use camera::{ArcBallCamera, Camera};
pub use input::{Key, PointerButton, PointerEvent, ViewportRect};
pub use mesh::{LineMeshData, MeshData};
pub use picking::Ray;
