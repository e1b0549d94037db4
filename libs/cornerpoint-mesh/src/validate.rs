//! # Closure Validation
//!
//! Per-cell edge bookkeeping over the emitted polygons. Walking every polygon
//! that references a cell, each undirected edge of the cell's surface must be
//! used by exactly two of those polygons (or once on a true boundary).

use crate::mesh::PolygonMesh;
use config::constants::ILLEGAL_INDEX;
use std::collections::HashMap;

/// An edge used the wrong number of times by the polygons of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosureViolation {
    /// Compacted cell index.
    pub cell: u32,
    /// Edge vertices, smaller index first.
    pub edge: [u32; 2],
    /// Number of polygons of `cell` using the edge.
    pub count: u32,
}

/// Counts how often each undirected edge is used per cell.
pub fn edge_use_counts(mesh: &PolygonMesh) -> HashMap<(u32, [u32; 2]), u32> {
    let mut counts = HashMap::new();
    for polygon in mesh.polygons() {
        let corners = mesh.polygon_segments(polygon);
        let n = corners.len();
        for e in 0..n {
            let a = corners[e].vertex;
            let b = corners[(e + 1) % n].vertex;
            let edge = [a.min(b), a.max(b)];
            for cell in polygon.interface.cells {
                if cell != ILLEGAL_INDEX {
                    *counts.entry((cell, edge)).or_insert(0) += 1;
                }
            }
        }
    }
    counts
}

/// Returns every cell edge used three or more times.
///
/// An empty result means no cell surface folds over itself. Edges used once
/// are reported separately by [`open_edges`].
pub fn check_closure(mesh: &PolygonMesh) -> Vec<ClosureViolation> {
    collect(mesh, |count| count > 2)
}

/// Returns every cell edge used by a single polygon of that cell.
pub fn open_edges(mesh: &PolygonMesh) -> Vec<ClosureViolation> {
    collect(mesh, |count| count == 1)
}

fn collect(mesh: &PolygonMesh, keep: impl Fn(u32) -> bool) -> Vec<ClosureViolation> {
    let mut found: Vec<ClosureViolation> = edge_use_counts(mesh)
        .into_iter()
        .filter(|(_, count)| keep(*count))
        .map(|((cell, edge), count)| ClosureViolation { cell, edge, count })
        .collect();
    found.sort_by_key(|v| (v.cell, v.edge));
    found
}

impl PolygonMesh {
    /// See [`check_closure`].
    pub fn check_closure(&self) -> Vec<ClosureViolation> {
        check_closure(self)
    }
}
