//! # Tessellation Errors
//!
//! Error types for grid validation and the cell sweep.

use config::constants::ConfigError;
use cornerpoint_mesh::MeshError;
use thiserror::Error;

/// Errors that can occur while building a grid or tessellating it.
#[derive(Debug, Error)]
pub enum TessellationError {
    /// Array lengths do not match the grid dimensions
    #[error("Invalid grid: {message}")]
    InvalidGrid { message: String },

    /// Ascending and descending columns meet on one pillar
    #[error("Mixed ascending and descending z order on pillar ({i}, {j})")]
    MixedZOrder { i: usize, j: usize },

    /// Pillar with lateral extent but no vertical extent
    #[error("Pillar ({i}, {j}) is horizontal and cannot be interpolated")]
    DegeneratePillar { i: usize, j: usize },

    /// Internal consistency check failed. The wall walk and the sweep
    /// always check their own state; the `check-invariants` feature adds
    /// full per-wall chain and edge-count checks.
    #[error("Invariant violated: {message}")]
    InvariantViolation { message: String },

    /// A vertex or crossing id does not fit the sink's `u32` indices
    #[error("Too many {what}: {count} exceeds u32 indices")]
    IndexOverflow { what: &'static str, count: usize },

    /// Invalid tolerances
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The mesh sink rejected the output
    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),

    /// Failure inside sweep step `(i, j)`
    #[error("At pillar ({i}, {j}): {source}")]
    AtColumn {
        i: usize,
        j: usize,
        #[source]
        source: Box<TessellationError>,
    },
}

impl TessellationError {
    /// Creates an invalid grid error.
    pub fn invalid_grid(message: impl Into<String>) -> Self {
        Self::InvalidGrid {
            message: message.into(),
        }
    }

    /// Creates an invariant violation.
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation {
            message: message.into(),
        }
    }

    /// Converts a count into a `u32` id, failing with
    /// [`TessellationError::IndexOverflow`] when it does not fit.
    pub fn index(what: &'static str, count: usize) -> TessellationResult<u32> {
        u32::try_from(count).map_err(|_| Self::IndexOverflow { what, count })
    }

    /// Wraps `self` with the sweep position it occurred at.
    pub fn at_column(self, i: usize, j: usize) -> Self {
        Self::AtColumn {
            i,
            j,
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping position annotations.
    pub fn root(&self) -> &TessellationError {
        match self {
            Self::AtColumn { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type alias for tessellation operations.
pub type TessellationResult<T> = Result<T, TessellationError>;
