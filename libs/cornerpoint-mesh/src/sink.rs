//! # Mesh Sink
//!
//! The write-only contract between the tessellator and whatever owns the
//! final geometry (an in-memory mesh, a GPU upload bridge, ...).

use crate::error::MeshResult;
use crate::interface::{CellCorners, Interface, Segment};
use glam::DVec3;

/// Consumer of tessellated geometry.
///
/// The tessellator only calls these methods and owns no output state itself.
/// Vertex and normal indices are assignment order and stay stable for the
/// lifetime of the sink.
pub trait MeshSink {
    /// Appends a vertex and returns its index.
    fn add_vertex(&mut self, position: DVec3) -> u32;

    /// Reads back a vertex added earlier.
    fn vertex(&self, index: u32) -> DVec3;

    /// Number of vertices added so far.
    fn vertex_count(&self) -> usize;

    /// Appends a normal and returns its index.
    fn add_normal(&mut self, normal: DVec3) -> u32;

    /// Capacity hint issued once before the sweep. Not a hard limit.
    fn reserve(&mut self, _vertices: usize, _edges: usize, _triangles: usize) {}

    /// Declares the number of active cells.
    fn set_cell_count(&mut self, count: u32) -> MeshResult<()>;

    /// Stores the corners of active cell `index`. Called once per cell.
    fn set_cell(&mut self, index: u32, corners: CellCorners) -> MeshResult<()>;

    /// Records a pillar edge and the up to four cells around it.
    fn add_edge(&mut self, _v0: u32, _v1: u32, _cells: [u32; 4]) {}

    /// Appends a polygon loop tagged with its interface.
    fn add_polygon(&mut self, interface: Interface, segments: &[Segment]) -> MeshResult<()>;

    /// Appends a triangle tagged with its interface.
    fn add_triangle(&mut self, interface: Interface, corners: [Segment; 3]);

    /// Axis-aligned bounds of all vertices as `(min, max)`.
    fn bounding_box(&self) -> (DVec3, DVec3);

    /// Signals end of stream.
    fn process(&mut self) -> MeshResult<()>;
}
