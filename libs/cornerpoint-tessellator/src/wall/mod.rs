//! # Wall Resolution
//!
//! Overlays the cell outlines of the two columns sharing a wall.
//!
//! ## Terminology
//!
//! A wall runs from pillar `P0` to pillar `P1`. Side 0 is the column on the
//! lower logical side (smaller `i` or `j`), side 1 the one on the upper side.
//! Every cell contributes its bottom and top edge on the wall as a
//! [`WallLine`]: a vertex on `P0` and a vertex on `P1`.
//!
//! ## Algorithm
//!
//! 1. [`extract_side_lines`]: collapse each side's cells into a run of lines,
//!    stacked cells sharing one line
//! 2. [`merge_wall_lines`]: merge both runs lexicographically by `(p0, p1)`;
//!    a line present on both sides becomes [`LineSide::BOTH`]
//! 3. [`intersect_wall_lines`]: every pair with `lower.p1 > upper.p1` crosses
//!    (a fault); create the crossing vertex and link it into both lines'
//!    chains
//! 4. [`WallResolution::faces`]: walk the chains to close one loop per face
//!    of the overlay
//!
//! Positions along a pillar are compared by vertex index only, which is
//! valid because pillar vertices are created sorted (see
//! [`crate::pillar`]). The topology is therefore purely combinatorial;
//! floating point only enters when placing crossing vertices.

mod faces;
mod intersect;

#[cfg(test)]
mod tests;

pub use faces::WallFace;
pub use intersect::{intersect_wall_lines, Intersection, NO_INTERSECTION};

use crate::error::TessellationResult;
use crate::grid::Pillar;
use config::constants::ILLEGAL_INDEX;
use cornerpoint_mesh::MeshSink;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

// =============================================================================
// LINES
// =============================================================================

/// Which sides of a wall a line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineSide(u8);

impl LineSide {
    /// Only the lower-side column has a cell edge here.
    pub const LEFT: Self = Self(1);
    /// Only the upper-side column has a cell edge here.
    pub const RIGHT: Self = Self(2);
    /// Both columns have a cell edge here; the cells match along it.
    pub const BOTH: Self = Self(3);

    /// Side bit of side `0` or `1`.
    pub fn of(side: usize) -> Self {
        if side == 0 {
            Self::LEFT
        } else {
            Self::RIGHT
        }
    }

    /// Returns true if the line belongs to `side`.
    pub fn has(self, side: usize) -> bool {
        self.0 & (1 << side) != 0
    }

    /// Returns true for a line shared by both sides.
    pub fn is_matched(self) -> bool {
        self == Self::BOTH
    }

    /// Raw bits.
    pub fn bits(self) -> u8 {
        self.0
    }
}

/// A cell edge across a wall, from vertex `p0` on `P0` to vertex `p1` on
/// `P1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallLine {
    /// Vertex on `P0`.
    pub p0: u32,
    /// Vertex on `P1`.
    pub p1: u32,
    /// Owning side(s).
    pub side: LineSide,
    /// Per side: cell just below the line, [`ILLEGAL_INDEX`] for a gap.
    pub below: [u32; 2],
    /// Per side: cell just above the line, [`ILLEGAL_INDEX`] for a gap.
    pub above: [u32; 2],
    /// Smallest `p1` of this and every later merged line.
    pub cutoff: u32,
}

impl WallLine {
    /// Creates a line of `side` with no cells attached.
    pub fn new([p0, p1]: [u32; 2], side: usize) -> Self {
        Self {
            p0,
            p1,
            side: LineSide::of(side),
            below: [ILLEGAL_INDEX; 2],
            above: [ILLEGAL_INDEX; 2],
            cutoff: ILLEGAL_INDEX,
        }
    }

    /// Endpoints as a lexicographic sort key.
    #[inline]
    pub fn key(&self) -> (u32, u32) {
        (self.p0, self.p1)
    }

    /// Returns true if the two lines cross strictly between the pillars.
    pub fn crosses(&self, other: &WallLine) -> bool {
        (self.p0 < other.p0 && self.p1 > other.p1) || (self.p0 > other.p0 && self.p1 < other.p1)
    }
}

/// One active cell on one side of a wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideCell {
    /// Compacted cell index.
    pub cell: u32,
    /// Bottom corner vertices on `[P0, P1]`.
    pub bottom: [u32; 2],
    /// Top corner vertices on `[P0, P1]`.
    pub top: [u32; 2],
}

/// Collapses the cells of one side into a run of lines.
///
/// Returns the lines (strictly increasing in both endpoints' partial order)
/// and, per cell, the indices of its bottom and top line. A cell with no
/// extent on this wall gets the same line for both.
pub fn extract_side_lines(side: usize, cells: &[SideCell]) -> (Vec<WallLine>, Vec<[usize; 2]>) {
    let mut lines: Vec<WallLine> = Vec::with_capacity(cells.len() + 1);
    let mut refs = Vec::with_capacity(cells.len());

    for cell in cells {
        let collapsed = cell.bottom == cell.top;
        let bottom = match lines.last_mut() {
            Some(last) if [last.p0, last.p1] == cell.bottom => {
                if !collapsed {
                    last.above[side] = cell.cell;
                }
                lines.len() - 1
            }
            _ => {
                let mut line = WallLine::new(cell.bottom, side);
                if !collapsed {
                    line.above[side] = cell.cell;
                }
                lines.push(line);
                lines.len() - 1
            }
        };
        if collapsed {
            refs.push([bottom, bottom]);
            continue;
        }
        let mut top = WallLine::new(cell.top, side);
        top.below[side] = cell.cell;
        lines.push(top);
        refs.push([bottom, lines.len() - 1]);
    }
    (lines, refs)
}

/// Merges the line runs of both sides in lexicographic `(p0, p1)` order.
///
/// Returns the merged lines and, per side, the merged index of every input
/// line.
pub fn merge_wall_lines(left: &[WallLine], right: &[WallLine]) -> (Vec<WallLine>, [Vec<usize>; 2]) {
    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut map = [Vec::with_capacity(left.len()), Vec::with_capacity(right.len())];
    let (mut a, mut b) = (0, 0);

    while a < left.len() || b < right.len() {
        let order = match (left.get(a), right.get(b)) {
            (Some(l), Some(r)) => l.key().cmp(&r.key()),
            (Some(_), None) => Ordering::Less,
            _ => Ordering::Greater,
        };
        match order {
            Ordering::Less => {
                map[0].push(merged.len());
                merged.push(left[a]);
                a += 1;
            }
            Ordering::Greater => {
                map[1].push(merged.len());
                merged.push(right[b]);
                b += 1;
            }
            Ordering::Equal => {
                let (l, r) = (&left[a], &right[b]);
                map[0].push(merged.len());
                map[1].push(merged.len());
                merged.push(WallLine {
                    side: LineSide::BOTH,
                    below: [l.below[0], r.below[1]],
                    above: [l.above[0], r.above[1]],
                    ..*l
                });
                a += 1;
                b += 1;
            }
        }
    }
    (merged, map)
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// Fully resolved wall: merged lines, crossings, and the vertex path of
/// every line.
#[derive(Debug, Clone, Default)]
pub struct WallResolution {
    lines: Vec<WallLine>,
    intersections: Vec<Intersection>,
    /// First crossing along each line, walking from `P0`.
    first: Vec<u32>,
    /// `path_vertices[path_offsets[l]..path_offsets[l + 1]]` is line `l`.
    path_offsets: Vec<usize>,
    path_vertices: Vec<u32>,
    /// Per side and cell: merged `[bottom, top]` line.
    cell_lines: [Vec<[usize; 2]>; 2],
}

impl WallResolution {
    /// Resolves the wall between `pillars[0]` and `pillars[1]`.
    ///
    /// `sides[s]` lists the active cells of side `s` in `k` order. Crossing
    /// vertices are added to `sink` immediately.
    pub fn resolve<S: MeshSink + ?Sized>(
        pillars: [&Pillar; 2],
        sides: [&[SideCell]; 2],
        sink: &mut S,
    ) -> TessellationResult<Self> {
        let (left, left_refs) = extract_side_lines(0, sides[0]);
        let (right, right_refs) = extract_side_lines(1, sides[1]);
        let (mut lines, map) = merge_wall_lines(&left, &right);

        let remap = |refs: Vec<[usize; 2]>, map: &[usize]| -> Vec<[usize; 2]> {
            refs.into_iter().map(|[b, t]| [map[b], map[t]]).collect()
        };
        let [left_map, right_map] = map;
        let cell_lines = [remap(left_refs, &left_map), remap(right_refs, &right_map)];

        let axes = [pillars[0].axis(), pillars[1].axis()];
        let mut intersections = intersect_wall_lines(&mut lines, axes, sink);
        let first = intersect::link_chains(lines.len(), &mut intersections)?;

        let mut wall = Self {
            lines,
            intersections,
            first,
            path_offsets: Vec::new(),
            path_vertices: Vec::new(),
            cell_lines,
        };
        wall.build_paths();
        Ok(wall)
    }

    fn build_paths(&mut self) {
        self.path_offsets.clear();
        self.path_vertices.clear();
        self.path_vertices
            .reserve(2 * self.lines.len() + 2 * self.intersections.len());
        for (l, line) in self.lines.iter().enumerate() {
            self.path_offsets.push(self.path_vertices.len());
            self.path_vertices.push(line.p0);
            let mut next = self.first[l];
            while next != NO_INTERSECTION {
                let crossing = &self.intersections[next as usize];
                self.path_vertices.push(crossing.vertex);
                next = crossing.next_on(l);
            }
            self.path_vertices.push(line.p1);
        }
        self.path_offsets.push(self.path_vertices.len());
    }

    /// Merged lines in lexicographic order.
    #[inline]
    pub fn lines(&self) -> &[WallLine] {
        &self.lines
    }

    /// All crossings found on the wall.
    #[inline]
    pub fn intersections(&self) -> &[Intersection] {
        &self.intersections
    }

    /// First crossing along `line` from `P0`, or [`NO_INTERSECTION`].
    #[inline]
    pub fn first_intersection(&self, line: usize) -> u32 {
        self.first[line]
    }

    /// Vertices along `line` from `P0` to `P1`, crossings included.
    pub fn path(&self, line: usize) -> &[u32] {
        &self.path_vertices[self.path_offsets[line]..self.path_offsets[line + 1]]
    }

    /// Path of the bottom (`kk = 0`) or top (`kk = 1`) edge of cell `n` of
    /// `side`.
    pub fn cell_path(&self, side: usize, n: usize, kk: usize) -> &[u32] {
        self.path(self.cell_lines[side][n][kk])
    }

    /// Merged `[bottom, top]` line of every cell of `side`.
    pub fn cell_lines(&self, side: usize) -> &[[usize; 2]] {
        &self.cell_lines[side]
    }

    /// Checks line order and chain consistency.
    #[cfg(feature = "check-invariants")]
    pub fn check_invariants(&self) -> TessellationResult<()> {
        use crate::error::TessellationError;

        for pair in self.lines.windows(2) {
            if pair[0].key() >= pair[1].key() {
                return Err(TessellationError::invariant(format!(
                    "wall lines out of order: {:?} before {:?}",
                    pair[0].key(),
                    pair[1].key()
                )));
            }
        }
        let mut visits = vec![0u32; self.intersections.len()];
        for l in 0..self.lines.len() {
            let mut next = self.first[l];
            while next != NO_INTERSECTION {
                let crossing = &self.intersections[next as usize];
                if crossing.upward != l && crossing.downward != l {
                    return Err(TessellationError::invariant(format!(
                        "crossing {next} linked into foreign line {l}"
                    )));
                }
                visits[next as usize] += 1;
                next = crossing.next_on(l);
            }
        }
        if let Some(q) = visits.iter().position(|&v| v != 2) {
            return Err(TessellationError::invariant(format!(
                "crossing {q} reached {} times by line chains",
                visits[q]
            )));
        }
        Ok(())
    }
}
