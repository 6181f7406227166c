//! Tensor Error Types

use thiserror::Error;

/// Errors while constructing a tensor descriptor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TensorError {
    /// Shape has no dimensions at all
    #[error("Shape has no dimensions")]
    EmptyShape,

    /// One of the dimensions is zero
    #[error("Shape {0} contains a zero-sized dimension")]
    ZeroDimension(String),

    /// Buffer length does not match the shape
    #[error("Buffer holds {actual} elements but shape {shape} requires {expected}")]
    ShapeMismatch {
        shape: String,
        expected: usize,
        actual: usize,
    },

    /// Backing storage could not be allocated
    #[error("Failed to allocate {bytes} bytes for tensor data")]
    Allocation { bytes: usize },
}
