use shared::ShapeKind;

use super::ShapeId;

/// Errors from shape and controls operations
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeError {
    /// Index outside `0..len` (or the valid edge range)
    IndexOutOfRange { index: usize, len: usize },
    /// Operation would leave fewer vertices than the kind requires
    NotEnoughVertices {
        kind: ShapeKind,
        required: usize,
        actual: usize,
    },
    /// Numeric argument rejected (non-finite, non-positive, out of range)
    InvalidValue { what: &'static str, value: f64 },
    /// Edge has zero length, so its direction is undefined
    DegenerateEdge { index: usize },
    /// Controls have no attached shape
    NoAttachedShape,
    /// Shape id not present in the scene
    UnknownShape(ShapeId),
    /// Polygon triangulation failed
    Triangulation(String),
}

impl std::fmt::Display for ShapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShapeError::IndexOutOfRange { index, len } => {
                write!(f, "Index {} out of range (len {})", index, len)
            }
            ShapeError::NotEnoughVertices {
                kind,
                required,
                actual,
            } => write!(
                f,
                "Shape kind '{}' requires at least {} vertices, got {}",
                kind, required, actual
            ),
            ShapeError::InvalidValue { what, value } => {
                write!(f, "Invalid {}: {}", what, value)
            }
            ShapeError::DegenerateEdge { index } => {
                write!(f, "Edge {} has zero length", index)
            }
            ShapeError::NoAttachedShape => write!(f, "No shape attached"),
            ShapeError::UnknownShape(id) => write!(f, "Shape '{}' not found", id),
            ShapeError::Triangulation(msg) => write!(f, "Triangulation failed: {}", msg),
        }
    }
}

impl std::error::Error for ShapeError {}

pub type ShapeResult<T> = Result<T, ShapeError>;
