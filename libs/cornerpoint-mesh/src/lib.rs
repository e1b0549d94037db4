//! # Corner-Point Mesh
//!
//! Output side of the corner-point grid tessellator: the sink contract the
//! sweep writes into, the interface tags attached to every face, and the
//! polygon triangulator.
//!
//! ## Architecture
//!
//! ```text
//! tessellator sweep → MeshSink::add_polygon → PolygonMesh
//!                                              ↓ process()
//!                                 Triangulator → add_triangle
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use cornerpoint_mesh::{CellCorners, Interface, MeshSink, Orientation, PolygonMesh, Segment};
//! use glam::DVec3;
//!
//! let mut mesh = PolygonMesh::new();
//! mesh.set_cell_count(1).unwrap();
//! let square = [
//!     DVec3::new(0.0, 0.0, 0.0),
//!     DVec3::new(1.0, 0.0, 0.0),
//!     DVec3::new(1.0, 1.0, 0.0),
//!     DVec3::new(0.0, 1.0, 0.0),
//! ];
//! let ids: Vec<u32> = square.iter().map(|p| mesh.add_vertex(*p)).collect();
//! let normal = mesh.add_normal(DVec3::Z);
//! let segments: Vec<Segment> = ids.iter().map(|&v| Segment::edge(normal, v)).collect();
//! mesh.add_polygon(Interface::boundary(0, Orientation::K), &segments).unwrap();
//! // A flat cell: top and bottom corners coincide
//! let vertices = [ids[0], ids[1], ids[3], ids[2], ids[0], ids[1], ids[3], ids[2]];
//! mesh.set_cell(0, CellCorners { global_index: 0, vertices }).unwrap();
//! mesh.process().unwrap();
//! assert_eq!(mesh.triangle_count(), 2);
//! ```

pub mod error;
pub mod interface;
pub mod mesh;
pub mod sink;
pub mod triangulate;
pub mod validate;

pub use config::constants::ILLEGAL_INDEX;
pub use error::{MeshError, MeshResult};
pub use interface::{
    CellCorners, Interface, InterfaceFlags, Orientation, PackedCell, Segment, SegmentFlags,
    Triangle,
};
pub use mesh::{PillarEdge, Polygon, PolygonMesh};
pub use sink::MeshSink;
pub use triangulate::{newell_normal, Triangulator};
pub use validate::{check_closure, edge_use_counts, open_edges, ClosureViolation};
