//! Centralized configuration values shared across the tessellation pipeline.
//!
//! Each public item in this module documents its purpose and provides a minimal
//! usage example so that downstream crates can remain declarative and avoid
//! scattering literals.

use std::fmt;

// =============================================================================
// PRECISION CONSTANTS
// =============================================================================

/// Absolute depth tolerance under which two corner depths on one pillar are
/// merged into a single vertex.
///
/// ZCORN values are stored as `f32`; depths of a few thousand metres carry
/// roughly `1e-4` of representable noise.
///
/// # Examples
/// ```
/// use config::constants::VERTEX_MERGE_EPSILON;
/// assert!(VERTEX_MERGE_EPSILON < 1.0e-2);
/// ```
pub const VERTEX_MERGE_EPSILON: f64 = 1.0e-4;

/// Tolerance under which the top of cell `k` and the bottom of cell `k + 1`
/// of the same column are snapped onto one depth.
///
/// Only applies to logically adjacent cells, so genuine throws between
/// different columns are never snapped away.
///
/// # Examples
/// ```
/// use config::constants::{LAYER_SNAP_EPSILON, VERTEX_MERGE_EPSILON};
/// assert!(LAYER_SNAP_EPSILON >= VERTEX_MERGE_EPSILON);
/// ```
pub const LAYER_SNAP_EPSILON: f64 = 1.0e-3;

/// Smallest depth-difference denominator accepted when solving a wall-line
/// intersection. Below this the crossing is placed mid-wall.
///
/// # Examples
/// ```
/// use config::constants::INTERSECTION_EPSILON;
/// assert!(INTERSECTION_EPSILON > 0.0);
/// ```
pub const INTERSECTION_EPSILON: f64 = 1.0e-12;

/// Relative slack used when testing whether a vertex lies strictly inside an
/// ear's circumcircle.
///
/// # Examples
/// ```
/// use config::constants::EAR_CIRCLE_TOLERANCE;
/// let radius = 10.0;
/// let distance = radius * (1.0 - EAR_CIRCLE_TOLERANCE / 2.0);
/// // Within the slack: treated as on the circle, not inside it
/// assert!(radius - distance < EAR_CIRCLE_TOLERANCE * radius);
/// ```
pub const EAR_CIRCLE_TOLERANCE: f64 = 1.0e-9;

// =============================================================================
// SENTINELS AND LIMITS
// =============================================================================

/// Sentinel for "no cell" and "no vertex".
///
/// # Examples
/// ```
/// use config::constants::ILLEGAL_INDEX;
/// let neighbour: u32 = ILLEGAL_INDEX;
/// assert_eq!(neighbour, u32::MAX);
/// ```
pub const ILLEGAL_INDEX: u32 = u32::MAX;

/// Largest compacted cell index a packed triangle cell can carry.
///
/// Packed cells spend their three low bits on edge flags; the all-ones
/// pattern of the remaining 29 bits is reserved for [`ILLEGAL_INDEX`].
///
/// # Examples
/// ```
/// use config::constants::MAX_CELL_INDEX;
/// assert!(MAX_CELL_INDEX > 100_000_000);
/// ```
pub const MAX_CELL_INDEX: u32 = (u32::MAX >> 3) - 1;

// =============================================================================
// CAPACITY HINTS
// =============================================================================

/// Vertices reserved per active cell before the sweep starts.
pub const VERTICES_PER_CELL: usize = 8;

/// Edges reserved per active cell before the sweep starts.
pub const EDGES_PER_CELL: usize = 12;

/// Triangles reserved per active cell before the sweep starts.
pub const TRIANGLES_PER_CELL: usize = 12;

// =============================================================================
// GLOBAL CONFIGURATION
// =============================================================================

/// Immutable snapshot of the tessellation settings that can be shared
/// between crates.
///
/// # Examples
/// ```
/// use config::constants::GlobalConfig;
/// let config = GlobalConfig::default();
/// assert!(config.merge_epsilon > 0.0);
/// assert!(config.triangulate);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalConfig {
    /// Depth tolerance for merging corner depths on a pillar.
    pub merge_epsilon: f64,
    /// Depth tolerance for snapping stacked cells of one column together.
    pub snap_epsilon: f64,
    /// Whether the mesh sink triangulates polygons when processed.
    pub triangulate: bool,
}

impl GlobalConfig {
    /// Builds a configuration enforcing strict validation of the supplied
    /// tolerances.
    ///
    /// # Examples
    /// ```
    /// use config::constants::GlobalConfig;
    /// let cfg = GlobalConfig::new(1.0e-5, 1.0e-4, false).expect("valid config");
    /// assert!(!cfg.triangulate);
    /// ```
    pub fn new(merge_epsilon: f64, snap_epsilon: f64, triangulate: bool) -> Result<Self, ConfigError> {
        if !(merge_epsilon > 0.0) {
            return Err(ConfigError::InvalidTolerance(merge_epsilon));
        }
        if !(snap_epsilon > 0.0) {
            return Err(ConfigError::InvalidTolerance(snap_epsilon));
        }
        if snap_epsilon < merge_epsilon {
            return Err(ConfigError::SnapBelowMerge {
                snap: snap_epsilon,
                merge: merge_epsilon,
            });
        }
        Ok(Self {
            merge_epsilon,
            snap_epsilon,
            triangulate,
        })
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            merge_epsilon: VERTEX_MERGE_EPSILON,
            snap_epsilon: LAYER_SNAP_EPSILON,
            triangulate: true,
        }
    }
}

/// Error returned when invalid configuration values are provided.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Raised when a tolerance is zero, negative or NaN.
    InvalidTolerance(f64),
    /// Raised when the snap tolerance is tighter than the merge tolerance.
    SnapBelowMerge {
        /// Requested snap tolerance.
        snap: f64,
        /// Requested merge tolerance.
        merge: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidTolerance(value) => {
                write!(f, "tolerance must be positive: {value}")
            }
            ConfigError::SnapBelowMerge { snap, merge } => {
                write!(f, "snap tolerance {snap} must be >= merge tolerance {merge}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
