//! # Corner-Point Tessellator
//!
//! Converts a corner-point grid into the polygons separating its cells,
//! written to any [`MeshSink`](cornerpoint_mesh::MeshSink).
//!
//! ## Architecture
//!
//! ```text
//! CornerPointGrid
//!       ↓ sweep (row-major over pillars)
//! pillar vertices → wall lines → crossings → wall faces + caps
//!       ↓
//! MeshSink (vertices, edges, polygons, cells) → process()
//! ```
//!
//! Every emitted polygon carries an [`Interface`](cornerpoint_mesh::Interface)
//! naming the cell on each side. Non-matching cell outlines across a wall
//! (faults) are resolved exactly: each crossing of two cell edges becomes a
//! vertex shared by every face that meets there, so every cell is bounded
//! by a closed surface.
//!
//! ## Usage
//!
//! ```rust
//! use cornerpoint_mesh::PolygonMesh;
//! use cornerpoint_tessellator::{tessellate, CornerPointGrid};
//! use glam::DVec3;
//!
//! let grid = CornerPointGrid::regular([1, 1, 1], DVec3::ONE);
//! let mut mesh = PolygonMesh::new();
//! tessellate(&grid, &mut mesh).unwrap();
//!
//! assert_eq!(mesh.vertices().len(), 8);
//! assert_eq!(mesh.polygon_count(), 6);
//! assert_eq!(mesh.triangle_count(), 12);
//! assert!(mesh.check_closure().is_empty());
//! ```

pub mod error;
pub mod grid;
pub mod pillar;
pub mod stitch;
pub mod sweep;
pub mod wall;

pub use error::{TessellationError, TessellationResult};
pub use grid::{CornerPointGrid, Pillar};
pub use stitch::FaceCounts;
pub use sweep::{tessellate, tessellate_with_config, TessellationStats};
pub use wall::{Intersection, LineSide, WallLine, WallResolution};
