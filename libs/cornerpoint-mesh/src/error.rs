//! # Mesh Errors
//!
//! Error types for the mesh sink.

use thiserror::Error;

/// Errors that can occur while filling or processing a mesh sink.
#[derive(Debug, Error, PartialEq)]
pub enum MeshError {
    /// A polygon or triangle referenced a vertex that was never added
    #[error("Invalid vertex index {index} (vertex count: {count})")]
    InvalidVertex { index: u32, count: usize },

    /// A cell index outside the declared cell count, or a cell set twice
    #[error("Invalid cell {index}: {message}")]
    InvalidCell { index: u32, message: String },

    /// A polygon with fewer than three corners
    #[error("Degenerate polygon with {count} corners")]
    DegeneratePolygon { count: usize },

    /// The declared cell count does not fit a packed triangle cell
    #[error("Too many cells: {count} (max: {max})")]
    CellOverflow { count: u32, max: u32 },

    /// Consistency validation in `process()` failed
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },
}

impl MeshError {
    /// Creates an invalid cell error.
    pub fn invalid_cell(index: u32, message: impl Into<String>) -> Self {
        Self::InvalidCell {
            index,
            message: message.into(),
        }
    }

    /// Creates a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }
}

/// Result type alias for mesh sink operations.
pub type MeshResult<T> = Result<T, MeshError>;
