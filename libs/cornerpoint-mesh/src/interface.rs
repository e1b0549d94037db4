//! # Interface Tags
//!
//! Small tagged-bitfield types attached to every face the tessellator emits.
//!
//! ## Contents
//!
//! - `Orientation` - logical axis a face is normal to
//! - `InterfaceFlags` / `Interface` - the two cells a face separates
//! - `SegmentFlags` / `Segment` - one corner of a polygon loop
//! - `PackedCell` / `Triangle` - triangulated output with edge-draw bits
//! - `CellCorners` - the eight corner vertices of an active cell

use config::constants::{ILLEGAL_INDEX, MAX_CELL_INDEX};
use serde::{Deserialize, Serialize};

// =============================================================================
// ORIENTATION
// =============================================================================

/// Logical axis a cell interface is perpendicular to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    /// Face between columns `(i, j)` and `(i + 1, j)`
    I = 0,
    /// Face between columns `(i, j)` and `(i, j + 1)`
    J = 1,
    /// Face between layers `k` and `k + 1` of one column
    K = 2,
}

// =============================================================================
// INTERFACE
// =============================================================================

/// Packed orientation, fault and convexity bits of an interface.
///
/// ## Layout
///
/// - bits 0-1: orientation
/// - bit 2: fault
/// - bit 3: convex hint (written by the sink)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct InterfaceFlags(u8);

impl InterfaceFlags {
    const ORIENTATION_MASK: u8 = 0b0011;
    const FAULT: u8 = 0b0100;
    const CONVEX: u8 = 0b1000;

    /// Creates flags for a face of the given orientation.
    pub fn new(orientation: Orientation, fault: bool) -> Self {
        let mut bits = orientation as u8;
        if fault {
            bits |= Self::FAULT;
        }
        Self(bits)
    }

    /// Returns the face orientation.
    pub fn orientation(self) -> Orientation {
        match self.0 & Self::ORIENTATION_MASK {
            0 => Orientation::I,
            1 => Orientation::J,
            _ => Orientation::K,
        }
    }

    /// Returns true if the face lies on a fault.
    pub fn is_fault(self) -> bool {
        self.0 & Self::FAULT != 0
    }

    /// Returns true if the sink found the polygon convex.
    pub fn is_convex(self) -> bool {
        self.0 & Self::CONVEX != 0
    }

    /// Returns a copy with the convex hint set or cleared.
    #[must_use]
    pub fn with_convex(self, convex: bool) -> Self {
        if convex {
            Self(self.0 | Self::CONVEX)
        } else {
            Self(self.0 & !Self::CONVEX)
        }
    }

    /// Raw bit pattern.
    pub fn bits(self) -> u8 {
        self.0
    }
}

/// Adjacency record of a cell-interface face.
///
/// `cells[0]` is the cell on the lower logical side (smaller `i`, `j` or
/// `k`), `cells[1]` the one on the upper side. Either may be
/// [`ILLEGAL_INDEX`] for a boundary face; never both.
///
/// ## Example
///
/// ```rust
/// use cornerpoint_mesh::{Interface, Orientation, ILLEGAL_INDEX};
///
/// let face = Interface::new(3, ILLEGAL_INDEX, Orientation::I, false);
/// assert!(face.is_boundary());
/// assert!(face.references(3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interface {
    /// Compacted cell indices on the lower and upper side.
    pub cells: [u32; 2],
    /// Orientation, fault and convexity bits.
    pub flags: InterfaceFlags,
}

impl Interface {
    /// Creates an interface between two cells.
    pub fn new(lower: u32, upper: u32, orientation: Orientation, fault: bool) -> Self {
        Self {
            cells: [lower, upper],
            flags: InterfaceFlags::new(orientation, fault),
        }
    }

    /// Creates a boundary face owned by `cell` on its lower side.
    pub fn boundary(cell: u32, orientation: Orientation) -> Self {
        Self::new(cell, ILLEGAL_INDEX, orientation, false)
    }

    /// Returns the face orientation.
    pub fn orientation(&self) -> Orientation {
        self.flags.orientation()
    }

    /// Returns true if the face lies on a fault.
    pub fn is_fault(&self) -> bool {
        self.flags.is_fault()
    }

    /// Returns true if exactly one side is a real cell.
    pub fn is_boundary(&self) -> bool {
        (self.cells[0] == ILLEGAL_INDEX) != (self.cells[1] == ILLEGAL_INDEX)
    }

    /// Returns true if neither side is a real cell.
    pub fn is_empty(&self) -> bool {
        self.cells[0] == ILLEGAL_INDEX && self.cells[1] == ILLEGAL_INDEX
    }

    /// Returns true if `cell` is on either side.
    pub fn references(&self, cell: u32) -> bool {
        cell != ILLEGAL_INDEX && self.cells.contains(&cell)
    }
}

// =============================================================================
// SEGMENTS
// =============================================================================

/// Per-corner flags of a polygon loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SegmentFlags(u8);

impl SegmentFlags {
    const DRAW_EDGE: u8 = 0b1;

    /// Flags for an edge drawn in wireframe mode.
    pub fn drawn() -> Self {
        Self(Self::DRAW_EDGE)
    }

    /// Flags for an internal edge (e.g. a triangulation diagonal).
    pub fn hidden() -> Self {
        Self(0)
    }

    /// Returns true if the edge leaving this corner is drawn.
    pub fn draws_edge(self) -> bool {
        self.0 & Self::DRAW_EDGE != 0
    }
}

/// One corner of a polygon loop: the vertex, its normal and the flags of the
/// edge to the next corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    /// Index returned by `MeshSink::add_normal`.
    pub normal: u32,
    /// Index returned by `MeshSink::add_vertex`.
    pub vertex: u32,
    /// Flags of the edge from this corner to the next one.
    pub flags: SegmentFlags,
}

impl Segment {
    /// Creates a corner whose outgoing edge is drawn.
    pub fn edge(normal: u32, vertex: u32) -> Self {
        Self {
            normal,
            vertex,
            flags: SegmentFlags::drawn(),
        }
    }

    /// Creates a corner whose outgoing edge is hidden.
    pub fn hidden(normal: u32, vertex: u32) -> Self {
        Self {
            normal,
            vertex,
            flags: SegmentFlags::hidden(),
        }
    }
}

// =============================================================================
// TRIANGLES
// =============================================================================

/// A cell index in the high 29 bits plus three edge-draw bits.
///
/// Bit `e` is set when triangle edge `e` (corner `e` to corner `e + 1`) is
/// drawn from this side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackedCell(u32);

impl PackedCell {
    const EDGE_MASK: u32 = 0b111;
    const PACKED_ILLEGAL: u32 = MAX_CELL_INDEX + 1;

    /// Packs a cell index with its edge bits.
    ///
    /// Indices above [`MAX_CELL_INDEX`] (including [`ILLEGAL_INDEX`]) are
    /// stored as "no cell".
    pub fn new(cell: u32, edges: u8) -> Self {
        let id = if cell > MAX_CELL_INDEX {
            Self::PACKED_ILLEGAL
        } else {
            cell
        };
        Self((id << 3) | (u32::from(edges) & Self::EDGE_MASK))
    }

    /// Returns the cell index, or [`ILLEGAL_INDEX`].
    pub fn cell(self) -> u32 {
        match self.0 >> 3 {
            Self::PACKED_ILLEGAL => ILLEGAL_INDEX,
            id => id,
        }
    }

    /// Returns the three edge-draw bits.
    pub fn edge_bits(self) -> u8 {
        (self.0 & Self::EDGE_MASK) as u8
    }

    /// Returns true if triangle edge `edge` is drawn.
    pub fn draws_edge(self, edge: usize) -> bool {
        edge < 3 && self.0 & (1 << edge) != 0
    }
}

/// A triangle derived from exactly one polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triangle {
    /// Vertex indices, same winding as the source polygon.
    pub vertices: [u32; 3],
    /// Normal indices.
    pub normals: [u32; 3],
    /// Lower and upper cell with edge-draw bits.
    pub cells: [PackedCell; 2],
    /// Flags inherited from the source polygon.
    pub flags: InterfaceFlags,
}

impl Triangle {
    /// Builds a triangle from an interface and three corners.
    pub fn new(interface: Interface, corners: [Segment; 3]) -> Self {
        let edges = corners
            .iter()
            .enumerate()
            .filter(|(_, s)| s.flags.draws_edge())
            .fold(0u8, |bits, (e, _)| bits | (1 << e));
        Self {
            vertices: corners.map(|s| s.vertex),
            normals: corners.map(|s| s.normal),
            cells: [
                PackedCell::new(interface.cells[0], edges),
                PackedCell::new(interface.cells[1], edges),
            ],
            flags: interface.flags,
        }
    }

    /// Reconstructs the interface tag of the source polygon.
    pub fn interface(&self) -> Interface {
        Interface {
            cells: [self.cells[0].cell(), self.cells[1].cell()],
            flags: self.flags,
        }
    }
}

// =============================================================================
// CELLS
// =============================================================================

/// Corner vertices of one active cell.
///
/// Corner `(ii, jj, kk)` (each 0 or 1) is stored at `ii + 2 * jj + 4 * kk`,
/// matching the ZCORN corner order; `kk = 0` is the layer's first depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellCorners {
    /// Linear `(i, j, k)` index in the full grid.
    pub global_index: u32,
    /// Vertex indices of the eight corners.
    pub vertices: [u32; 8],
}

impl CellCorners {
    /// Returns the vertex at corner `(ii, jj, kk)`.
    pub fn corner(&self, ii: usize, jj: usize, kk: usize) -> u32 {
        self.vertices[ii + 2 * jj + 4 * kk]
    }
}
