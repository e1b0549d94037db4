//! # Pillar Vertices
//!
//! Merges the corner depths the (up to) four columns around a pillar attach
//! to it into one sorted run of vertices.
//!
//! ## Column slots
//!
//! The columns around pillar `(i, j)` are passed in corner-slot order: slot
//! `ii + 2 * jj` holds the column that touches the pillar with its corner
//! `(ii, jj)`, i.e. column `(i - ii, j - jj)`.
//!
//! ## Vertex order
//!
//! All vertices of one pillar are created back to back, sorted along the
//! layer direction of the grid. Vertex indices on a pillar are therefore
//! contiguous and increase with `k`, which lets the wall resolver compare
//! positions along a pillar by index alone.

use crate::error::{TessellationError, TessellationResult};
use crate::grid::Pillar;
use config::constants::{GlobalConfig, ILLEGAL_INDEX};
use cornerpoint_mesh::MeshSink;
use tracing::warn;

/// Depths one active cell attaches to a pillar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerDepths {
    /// Layer index of the cell.
    pub k: usize,
    /// Compacted cell index.
    pub cell: u32,
    /// Depth of the `kk = 0` corner.
    pub bottom: f64,
    /// Depth of the `kk = 1` corner.
    pub top: f64,
}

/// Vertices created for one pillar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PillarVertices {
    /// First vertex index on the pillar.
    pub first: u32,
    /// Number of vertices on the pillar.
    pub count: u32,
    /// Per column slot and cell: `[bottom, top]` vertex.
    pub corners: [Vec<[u32; 2]>; 4],
}

impl PillarVertices {
    /// Vertex index range of the pillar.
    pub fn range(&self) -> std::ops::Range<u32> {
        self.first..self.first + self.count
    }
}

struct Entry {
    key: f64,
    slot: usize,
    cell: usize,
    kk: usize,
}

/// Creates the vertices of pillar `(i, j)` and assigns each cell corner to
/// one of them.
///
/// Depths closer than `config.merge_epsilon` share a vertex. The bottom of
/// cell `k + 1` is snapped onto the top of cell `k` of the same column when
/// they differ by at most `config.snap_epsilon`. Depths running against the
/// layer direction inside a column are clamped, with a warning.
///
/// # Errors
///
/// - [`TessellationError::MixedZOrder`] if one column ascends while another
///   descends
/// - [`TessellationError::DegeneratePillar`] if the pillar is horizontal and
///   has active cells attached
pub fn unique_pillar_vertices<S: MeshSink + ?Sized>(
    pillar: &Pillar,
    (i, j): (usize, usize),
    columns: [&[CornerDepths]; 4],
    config: &GlobalConfig,
    sink: &mut S,
) -> TessellationResult<PillarVertices> {
    let first = TessellationError::index("vertices", sink.vertex_count())?;
    let mut corners = columns.map(|c| vec![[ILLEGAL_INDEX; 2]; c.len()]);
    if columns.iter().all(|c| c.is_empty()) {
        return Ok(PillarVertices {
            first,
            count: 0,
            corners,
        });
    }
    if pillar.is_degenerate() {
        return Err(TessellationError::DegeneratePillar { i, j });
    }
    let direction =
        layer_direction(&columns, config.merge_epsilon).ok_or(TessellationError::MixedZOrder { i, j })?;

    let mut entries = Vec::with_capacity(columns.iter().map(|c| 2 * c.len()).sum());
    for (slot, column) in columns.iter().enumerate() {
        let mut previous: Option<(usize, f64)> = None;
        for (n, cell) in column.iter().enumerate() {
            let mut bottom = direction * cell.bottom;
            let mut top = direction * cell.top;

            if let Some((k, previous_top)) = previous {
                if k + 1 == cell.k && (bottom - previous_top).abs() <= config.snap_epsilon {
                    bottom = previous_top;
                }
                if bottom < previous_top {
                    if previous_top - bottom > config.merge_epsilon {
                        warn!(i, j, k = cell.k, overlap = previous_top - bottom, "Clamping overlapping layer");
                    }
                    bottom = previous_top;
                }
            }
            if top < bottom {
                if bottom - top > config.merge_epsilon {
                    warn!(i, j, k = cell.k, thickness = top - bottom, "Clamping inverted cell");
                }
                top = bottom;
            }

            entries.push(Entry { key: bottom, slot, cell: n, kk: 0 });
            entries.push(Entry { key: top, slot, cell: n, kk: 1 });
            previous = Some((cell.k, top));
        }
    }
    entries.sort_by(|a, b| a.key.total_cmp(&b.key));

    let mut group_key = 0.0;
    let mut current = ILLEGAL_INDEX;
    for entry in &entries {
        if current == ILLEGAL_INDEX || entry.key - group_key > config.merge_epsilon {
            group_key = entry.key;
            current = sink.add_vertex(pillar.point_at_z(direction * entry.key));
        }
        corners[entry.slot][entry.cell][entry.kk] = current;
    }

    Ok(PillarVertices {
        first,
        count: TessellationError::index("vertices", sink.vertex_count())? - first,
        corners,
    })
}

/// Returns `1.0` if depths grow with `k`, `-1.0` if they shrink, `None` if
/// the columns disagree. Columns without extent do not vote.
fn layer_direction(columns: &[&[CornerDepths]; 4], epsilon: f64) -> Option<f64> {
    let mut direction = None;
    for column in columns {
        let (Some(first), Some(last)) = (column.first(), column.last()) else {
            continue;
        };
        let span = last.top - first.bottom;
        if span.abs() <= epsilon {
            continue;
        }
        let sign = span.signum();
        match direction {
            Some(d) if d != sign => return None,
            _ => direction = Some(sign),
        }
    }
    Some(direction.unwrap_or(1.0))
}

/// Emits the vertical edges between consecutive vertices of a pillar,
/// each with the cell of every column slot that spans it.
///
/// Returns the number of edges emitted.
pub fn emit_pillar_edges<S: MeshSink + ?Sized>(
    columns: [&[CornerDepths]; 4],
    vertices: &PillarVertices,
    sink: &mut S,
) -> usize {
    if vertices.count < 2 {
        return 0;
    }
    let mut cursor = [0usize; 4];
    for v in vertices.first..vertices.first + vertices.count - 1 {
        let mut cells = [ILLEGAL_INDEX; 4];
        for slot in 0..4 {
            let ranges = &vertices.corners[slot];
            while cursor[slot] < ranges.len() && ranges[cursor[slot]][1] <= v {
                cursor[slot] += 1;
            }
            if let Some(&[bottom, _]) = ranges.get(cursor[slot]) {
                if bottom <= v {
                    cells[slot] = columns[slot][cursor[slot]].cell;
                }
            }
        }
        sink.add_edge(v, v + 1, cells);
    }
    vertices.count as usize - 1
}
