//! # Face Stitching
//!
//! Turns resolved walls into polygons and closes each column with its top
//! and bottom caps.
//!
//! ## Orientation
//!
//! Every polygon is wound so its normal points from `cells[0]` to
//! `cells[1]`, assuming a right-handed `(i, j, k)` frame:
//!
//! - I faces (walls of constant `i`) are emitted as walked
//! - J faces are emitted reversed
//! - K faces (caps) run south, east, north, west

use crate::error::TessellationResult;
use crate::pillar::CornerDepths;
use crate::wall::WallResolution;
use config::constants::ILLEGAL_INDEX;
use cornerpoint_mesh::{newell_normal, Interface, MeshSink, Orientation, Segment};
use glam::DVec3;
use serde::Serialize;
use tracing::debug;

/// Polygons emitted by one stitching call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FaceCounts {
    /// Polygons added to the sink.
    pub polygons: usize,
    /// Of those, polygons flagged as faults.
    pub faults: usize,
}

impl FaceCounts {
    fn record(&mut self, interface: &Interface) {
        self.polygons += 1;
        if interface.is_fault() {
            self.faults += 1;
        }
    }
}

/// Adds one polygon with a single shared normal.
pub(crate) fn emit_polygon<S: MeshSink + ?Sized>(
    sink: &mut S,
    interface: Interface,
    vertices: &[u32],
) -> TessellationResult<()> {
    let points: Vec<DVec3> = vertices.iter().map(|&v| sink.vertex(v)).collect();
    let normal = sink.add_normal(newell_normal(&points).normalize_or_zero());
    let segments: Vec<Segment> = vertices.iter().map(|&v| Segment::edge(normal, v)).collect();
    sink.add_polygon(interface, &segments)?;
    Ok(())
}

/// Emits every face of a resolved wall.
pub fn stitch_wall<S: MeshSink + ?Sized>(
    wall: &WallResolution,
    orientation: Orientation,
    sink: &mut S,
) -> TessellationResult<FaceCounts> {
    let mut counts = FaceCounts::default();
    for mut face in wall.faces()? {
        if orientation == Orientation::J {
            face.vertices.reverse();
        }
        let interface = Interface::new(face.cells[0], face.cells[1], orientation, face.fault);
        emit_polygon(sink, interface, &face.vertices)?;
        counts.record(&interface);
    }
    Ok(counts)
}

/// The four walls around one column.
#[derive(Debug, Clone, Copy)]
pub struct CapWalls<'a> {
    /// J wall at the column's low `j`; the column is its side 1.
    pub south: &'a WallResolution,
    /// I wall at the column's high `i`; the column is its side 0.
    pub east: &'a WallResolution,
    /// J wall at the column's high `j`; the column is its side 0.
    pub north: &'a WallResolution,
    /// I wall at the column's low `i`; the column is its side 1.
    pub west: &'a WallResolution,
}

impl CapWalls<'_> {
    /// Closed loop of the bottom (`kk = 0`) or top (`kk = 1`) face of cell
    /// `n`, with every crossing on the four walls included.
    fn cap_loop(&self, n: usize, kk: usize, out: &mut Vec<u32>) {
        out.clear();
        push_run(out, self.south.cell_path(1, n, kk).iter().copied());
        push_run(out, self.east.cell_path(0, n, kk).iter().copied());
        push_run(out, self.north.cell_path(0, n, kk).iter().rev().copied());
        push_run(out, self.west.cell_path(1, n, kk).iter().rev().copied());
    }
}

/// Appends a wall path without its last vertex, which starts the next run.
fn push_run(out: &mut Vec<u32>, run: impl ExactSizeIterator<Item = u32>) {
    let keep = run.len().saturating_sub(1);
    out.extend(run.take(keep));
}

/// Emits the K faces of one column.
///
/// `cells` lists the column's active cells in `k` order and `corners[slot]`
/// their `[bottom, top]` vertices on each pillar. Cells collapsed on all
/// four pillars have no caps. A cell whose top matches the bottom of the
/// next remaining cell on all four pillars shares one face with it, flagged
/// as a fault when inactive layers were skipped in between.
pub fn stitch_top_bottom<S: MeshSink + ?Sized>(
    walls: &CapWalls<'_>,
    cells: &[CornerDepths],
    corners: &[Vec<[u32; 2]>; 4],
    sink: &mut S,
) -> TessellationResult<FaceCounts> {
    let collapsed = |n: usize| corners.iter().all(|slot| slot[n][0] == slot[n][1]);
    let stacked = |lower: usize, upper: usize| corners.iter().all(|slot| slot[lower][1] == slot[upper][0]);

    let live: Vec<usize> = (0..cells.len()).filter(|&n| !collapsed(n)).collect();
    let mut counts = FaceCounts::default();
    let mut buffer = Vec::new();
    let mut shared_below = false;

    for (idx, &n) in live.iter().enumerate() {
        let cell = &cells[n];
        if !shared_below {
            walls.cap_loop(n, 0, &mut buffer);
            let interface = Interface::new(ILLEGAL_INDEX, cell.cell, Orientation::K, false);
            if emit_cap(sink, interface, &buffer)? {
                counts.record(&interface);
            }
        }

        let (interface, shared) = match live.get(idx + 1) {
            Some(&m) if stacked(n, m) => {
                let upper = &cells[m];
                let fault = upper.k != cell.k + 1;
                (Interface::new(cell.cell, upper.cell, Orientation::K, fault), true)
            }
            _ => (Interface::boundary(cell.cell, Orientation::K), false),
        };
        walls.cap_loop(n, 1, &mut buffer);
        if emit_cap(sink, interface, &buffer)? {
            counts.record(&interface);
        }
        shared_below = shared;
    }
    Ok(counts)
}

fn emit_cap<S: MeshSink + ?Sized>(sink: &mut S, interface: Interface, vertices: &[u32]) -> TessellationResult<bool> {
    if vertices.len() < 3 {
        debug!(cells = ?interface.cells, count = vertices.len(), "Skipping degenerate cap");
        return Ok(false);
    }
    emit_polygon(sink, interface, vertices)?;
    Ok(true)
}
