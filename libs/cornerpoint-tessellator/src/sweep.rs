//! # Cell Sweep
//!
//! Drives the tessellation pillar by pillar, row by row.
//!
//! ## Step `(i, j)`
//!
//! For every pillar `(i, j)` with `0 <= i <= nx`, `0 <= j <= ny`:
//!
//! 1. load the active cells of column `(i, j)` (if it exists)
//! 2. create the pillar's vertices from the up to four columns around it
//!    and emit its vertical edges
//! 3. resolve and emit the I wall south of the pillar (`j > 0`)
//! 4. resolve and emit the J wall west of the pillar (`i > 0`)
//! 5. with all four walls of column `(i - 1, j - 1)` known, emit its caps
//!    and publish its cells
//!
//! Only two rows of columns and walls are alive at once: the previous row
//! and the current one, swapped at the end of every row.
//!
//! ## Example
//!
//! ```rust
//! use cornerpoint_mesh::PolygonMesh;
//! use cornerpoint_tessellator::{tessellate, CornerPointGrid};
//! use glam::DVec3;
//!
//! let grid = CornerPointGrid::regular([2, 1, 1], DVec3::ONE);
//! let mut mesh = PolygonMesh::new();
//! let stats = tessellate(&grid, &mut mesh).unwrap();
//!
//! assert_eq!(stats.active_cells, 2);
//! assert_eq!(stats.vertices, 12);
//! assert_eq!(stats.polygons, 11);
//! assert_eq!(stats.fault_polygons, 0);
//! ```

use crate::error::{TessellationError, TessellationResult};
use crate::grid::CornerPointGrid;
use crate::pillar::{emit_pillar_edges, unique_pillar_vertices, CornerDepths};
use crate::stitch::{stitch_top_bottom, stitch_wall, CapWalls, FaceCounts};
use crate::wall::{SideCell, WallResolution};
use config::constants::{GlobalConfig, EDGES_PER_CELL, ILLEGAL_INDEX, TRIANGLES_PER_CELL, VERTICES_PER_CELL};
use cornerpoint_mesh::{CellCorners, MeshSink, Orientation};
use serde::Serialize;
use tracing::{debug, info};

/// Summary of one tessellation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TessellationStats {
    /// Active cells published to the sink.
    pub active_cells: usize,
    /// Vertices created, crossings included.
    pub vertices: usize,
    /// Vertical edges along pillars.
    pub pillar_edges: usize,
    /// Wall line crossings.
    pub intersections: usize,
    /// Polygons emitted.
    pub polygons: usize,
    /// Polygons flagged as faults.
    pub fault_polygons: usize,
}

impl TessellationStats {
    fn add_faces(&mut self, counts: FaceCounts) {
        self.polygons += counts.polygons;
        self.fault_polygons += counts.faults;
    }
}

/// Tessellates `grid` into `sink` with default tolerances.
///
/// Calls [`MeshSink::process`] once every polygon has been added.
///
/// # Errors
///
/// Pillar and wall failures are wrapped in
/// [`TessellationError::AtColumn`] with the sweep position.
pub fn tessellate<S: MeshSink + ?Sized>(
    grid: &CornerPointGrid,
    sink: &mut S,
) -> TessellationResult<TessellationStats> {
    tessellate_with_config(grid, &GlobalConfig::default(), sink)
}

/// Tessellates `grid` into `sink` with the tolerances of `config`.
///
/// # Errors
///
/// Besides the errors of [`tessellate`], returns
/// [`TessellationError::Config`] if the tolerances are invalid.
pub fn tessellate_with_config<S: MeshSink + ?Sized>(
    grid: &CornerPointGrid,
    config: &GlobalConfig,
    sink: &mut S,
) -> TessellationResult<TessellationStats> {
    let config = GlobalConfig::new(config.merge_epsilon, config.snap_epsilon, config.triangulate)?;
    let [nx, ny, nz] = grid.dims();

    let (compacted, active) = compact_cells(grid.actnum());
    info!(nx, ny, nz, active, "Tessellating corner-point grid");

    sink.set_cell_count(u32::try_from(active).unwrap_or(u32::MAX))?;
    sink.reserve(
        VERTICES_PER_CELL * active,
        EDGES_PER_CELL * active,
        TRIANGLES_PER_CELL * active,
    );

    let first_vertex = sink.vertex_count();
    let mut sweep = Sweep {
        grid,
        config: &config,
        compacted: &compacted,
        sink: &mut *sink,
        prev: RowBuffers::new(nx),
        curr: RowBuffers::new(nx),
        last_south: None,
        stats: TessellationStats::default(),
    };

    for j in 0..=ny {
        for i in 0..=nx {
            sweep.step(i, j).map_err(|e| e.at_column(i, j))?;
        }
        std::mem::swap(&mut sweep.prev, &mut sweep.curr);
        sweep.curr.clear();
        sweep.last_south = None;
        debug!(j, vertices = sweep.sink.vertex_count() - first_vertex, "Row done");
    }

    let mut stats = sweep.stats;
    stats.vertices = sink.vertex_count() - first_vertex;
    sink.process()?;

    info!(
        cells = stats.active_cells,
        vertices = stats.vertices,
        intersections = stats.intersections,
        polygons = stats.polygons,
        faults = stats.fault_polygons,
        "Tessellation complete"
    );
    Ok(stats)
}

/// Maps every global cell index to its rank among the active cells.
fn compact_cells(actnum: &[bool]) -> (Vec<u32>, usize) {
    let mut compacted = vec![ILLEGAL_INDEX; actnum.len()];
    let mut count = 0usize;
    for (global, &active) in actnum.iter().enumerate() {
        if active {
            compacted[global] = u32::try_from(count).unwrap_or(ILLEGAL_INDEX);
            count += 1;
        }
    }
    (compacted, count)
}

// =============================================================================
// ROW STATE
// =============================================================================

/// Active cells of one column and their pillar vertices.
#[derive(Debug, Clone, Default)]
struct Column {
    /// Per corner slot `ii + 2 * jj`: depths of every active cell.
    depths: [Vec<CornerDepths>; 4],
    /// Per corner slot: `[bottom, top]` vertex of every active cell.
    corners: [Vec<[u32; 2]>; 4],
}

impl Column {
    fn load(grid: &CornerPointGrid, compacted: &[u32], i: usize, j: usize) -> Self {
        let mut column = Self::default();
        for k in 0..grid.dims()[2] {
            let cell = compacted[grid.global_index(i, j, k)];
            if cell == ILLEGAL_INDEX {
                continue;
            }
            for (slot, depths) in column.depths.iter_mut().enumerate() {
                let (ii, jj) = (slot & 1, slot >> 1);
                depths.push(CornerDepths {
                    k,
                    cell,
                    bottom: grid.corner_z(i, j, k, ii, jj, 0),
                    top: grid.corner_z(i, j, k, ii, jj, 1),
                });
            }
        }
        column
    }

    fn len(&self) -> usize {
        self.depths[0].len()
    }

    fn is_empty(&self) -> bool {
        self.depths[0].is_empty()
    }

    /// Cells as seen from a wall touching corner slots `p0` and `p1`.
    fn side_cells(&self, p0: usize, p1: usize) -> Vec<SideCell> {
        (0..self.len())
            .map(|n| SideCell {
                cell: self.depths[0][n].cell,
                bottom: [self.corners[p0][n][0], self.corners[p1][n][0]],
                top: [self.corners[p0][n][1], self.corners[p1][n][1]],
            })
            .collect()
    }
}

/// Columns of one row plus the J walls along its south edge.
#[derive(Debug, Default)]
struct RowBuffers {
    columns: Vec<Column>,
    /// `j_walls[i]` lies between pillars `(i, j)` and `(i + 1, j)`.
    j_walls: Vec<Option<WallResolution>>,
}

impl RowBuffers {
    fn new(nx: usize) -> Self {
        Self {
            columns: vec![Column::default(); nx],
            j_walls: vec![None; nx],
        }
    }

    /// Depths of corner `slot` of `column`, empty outside the grid.
    fn depths(&self, column: Option<usize>, slot: usize) -> &[CornerDepths] {
        match column.and_then(|c| self.columns.get(c)) {
            Some(column) => &column.depths[slot],
            None => &[],
        }
    }

    fn side_cells(&self, column: Option<usize>, p0: usize, p1: usize) -> Vec<SideCell> {
        column
            .and_then(|c| self.columns.get(c))
            .map(|column| column.side_cells(p0, p1))
            .unwrap_or_default()
    }

    fn clear(&mut self) {
        self.columns.iter_mut().for_each(|c| *c = Column::default());
        self.j_walls.iter_mut().for_each(|w| *w = None);
    }
}

// =============================================================================
// SWEEP
// =============================================================================

struct Sweep<'a, S: MeshSink + ?Sized> {
    grid: &'a CornerPointGrid,
    config: &'a GlobalConfig,
    compacted: &'a [u32],
    sink: &'a mut S,
    prev: RowBuffers,
    curr: RowBuffers,
    /// I wall of the previous step in this row.
    last_south: Option<WallResolution>,
    stats: TessellationStats,
}

impl<S: MeshSink + ?Sized> Sweep<'_, S> {
    fn step(&mut self, i: usize, j: usize) -> TessellationResult<()> {
        let [nx, ny, _] = self.grid.dims();

        if i < nx && j < ny {
            self.curr.columns[i] = Column::load(self.grid, self.compacted, i, j);
        }
        self.pillar(i, j)?;

        let south = if j > 0 {
            let wall = self.resolve_wall(Orientation::I, i, j)?;
            self.stats.add_faces(stitch_wall(&wall, Orientation::I, &mut *self.sink)?);
            Some(wall)
        } else {
            None
        };

        if i > 0 {
            let west = self.resolve_wall(Orientation::J, i, j)?;
            self.stats.add_faces(stitch_wall(&west, Orientation::J, &mut *self.sink)?);

            if let Some(south) = &south {
                self.close_column(i - 1, j - 1, south, &west)?;
            }
            self.curr.j_walls[i - 1] = Some(west);
        }

        self.last_south = south;
        Ok(())
    }

    /// Vertices and edges of pillar `(i, j)`.
    fn pillar(&mut self, i: usize, j: usize) -> TessellationResult<()> {
        let west = i.checked_sub(1);
        let columns = [
            self.curr.depths(Some(i), 0),
            self.curr.depths(west, 1),
            self.prev.depths(Some(i), 2),
            self.prev.depths(west, 3),
        ];

        let mut vertices =
            unique_pillar_vertices(self.grid.pillar(i, j), (i, j), columns, self.config, &mut *self.sink)?;
        self.stats.pillar_edges += emit_pillar_edges(columns, &vertices, &mut *self.sink);

        let [c0, c1, c2, c3] = std::mem::take(&mut vertices.corners);
        if i < self.grid.dims()[0] {
            self.curr.columns[i].corners[0] = c0;
            self.prev.columns[i].corners[2] = c2;
        }
        if let Some(w) = west {
            self.curr.columns[w].corners[1] = c1;
            self.prev.columns[w].corners[3] = c3;
        }
        Ok(())
    }

    /// I wall from `(i, j - 1)` to `(i, j)`, or J wall from `(i - 1, j)` to
    /// `(i, j)`.
    fn resolve_wall(&mut self, orientation: Orientation, i: usize, j: usize) -> TessellationResult<WallResolution> {
        let (start, sides) = match orientation {
            Orientation::I => (
                (i, j - 1),
                [
                    self.prev.side_cells(i.checked_sub(1), 1, 3),
                    self.prev.side_cells(Some(i), 0, 2),
                ],
            ),
            _ => (
                (i - 1, j),
                [
                    self.prev.side_cells(Some(i - 1), 2, 3),
                    self.curr.side_cells(Some(i - 1), 0, 1),
                ],
            ),
        };

        let pillars = [self.grid.pillar(start.0, start.1), self.grid.pillar(i, j)];
        let wall = WallResolution::resolve(pillars, [&sides[0], &sides[1]], &mut *self.sink)?;
        #[cfg(feature = "check-invariants")]
        wall.check_invariants()?;

        self.stats.intersections += wall.intersections().len();
        Ok(wall)
    }

    /// Emits the caps of column `(ci, cj)` and publishes its cells.
    fn close_column(
        &mut self,
        ci: usize,
        cj: usize,
        east: &WallResolution,
        north: &WallResolution,
    ) -> TessellationResult<()> {
        if self.prev.columns[ci].is_empty() {
            return Ok(());
        }
        let south = self.prev.j_walls[ci]
            .as_ref()
            .ok_or_else(|| TessellationError::invariant(format!("missing south wall of column ({ci}, {cj})")))?;
        let west = self
            .last_south
            .as_ref()
            .ok_or_else(|| TessellationError::invariant(format!("missing west wall of column ({ci}, {cj})")))?;

        let walls = CapWalls {
            south,
            east,
            north,
            west,
        };
        let column = &self.prev.columns[ci];
        let counts = stitch_top_bottom(&walls, &column.depths[0], &column.corners, &mut *self.sink)?;
        self.stats.add_faces(counts);

        for (n, cell) in column.depths[0].iter().enumerate() {
            let mut vertices = [ILLEGAL_INDEX; 8];
            for (corner, vertex) in vertices.iter_mut().enumerate() {
                *vertex = column.corners[corner & 3][n][corner >> 2];
            }
            let global_index = u32::try_from(self.grid.global_index(ci, cj, cell.k))
                .map_err(|_| TessellationError::invalid_grid("global cell index exceeds u32"))?;
            self.sink.set_cell(
                cell.cell,
                CellCorners {
                    global_index,
                    vertices,
                },
            )?;
        }
        self.stats.active_cells += column.len();
        Ok(())
    }
}
