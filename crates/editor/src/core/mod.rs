//! Shape entity and its vertex store, events and errors.

pub mod error;
pub mod events;
pub mod shape;
pub mod vertex_store;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use error::{ShapeError, ShapeResult};
pub use events::{EventHub, ListenerId, ShapeEvent};
pub use shape::Shape3D;
pub use vertex_store::VertexStore;

/// Unique identifier of a shape entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(Uuid);

impl ShapeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight hex digits, for logs
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for ShapeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ShapeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ShapeId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}
