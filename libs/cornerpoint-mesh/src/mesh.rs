//! # Polygon Mesh
//!
//! In-memory [`MeshSink`] keeping vertices, cells, interface polygons and
//! their triangulation.
//!
//! ## Memory Layout
//!
//! - `vertices` / `normals`: one `DVec3` per index
//! - `segments`: all polygon corners back to back; each `Polygon` owns a
//!   contiguous range
//! - `triangles`: filled by `process()` from the polygons

use crate::error::{MeshError, MeshResult};
use crate::interface::{CellCorners, Interface, Segment, Triangle};
use crate::sink::MeshSink;
use crate::triangulate::{newell_normal, Triangulator};
use config::constants::{GlobalConfig, ILLEGAL_INDEX, MAX_CELL_INDEX};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::{debug, info};

/// A polygon loop stored in the mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    /// Interface tag, including the convexity hint computed on insertion.
    pub interface: Interface,
    /// Range into the mesh segment buffer.
    pub segments: Range<usize>,
}

/// Vertical edge between two consecutive vertices of one pillar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PillarEdge {
    /// Lower and upper vertex.
    pub vertices: [u32; 2],
    /// Up to four adjacent cells, [`ILLEGAL_INDEX`] where absent.
    pub cells: [u32; 4],
}

/// Mesh sink collecting the complete tessellation in memory.
///
/// ## Example
///
/// ```rust
/// use cornerpoint_mesh::{MeshSink, PolygonMesh};
/// use glam::DVec3;
///
/// let mut mesh = PolygonMesh::new();
/// mesh.add_vertex(DVec3::new(1.0, 2.0, 3.0));
/// mesh.add_vertex(DVec3::new(-1.0, 0.0, 5.0));
/// assert_eq!(mesh.bounding_box(), (DVec3::new(-1.0, 0.0, 3.0), DVec3::new(1.0, 2.0, 5.0)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PolygonMesh {
    vertices: Vec<DVec3>,
    normals: Vec<DVec3>,
    cells: Vec<Option<CellCorners>>,
    edges: Vec<PillarEdge>,
    polygons: Vec<Polygon>,
    segments: Vec<Segment>,
    triangles: Vec<Triangle>,
    bounds: Option<(DVec3, DVec3)>,
    skip_triangulation: bool,
}

impl PolygonMesh {
    // =========================================================================
    // CONSTRUCTORS
    // =========================================================================

    /// Creates an empty mesh that triangulates when processed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty mesh honouring `config.triangulate`.
    pub fn with_config(config: &GlobalConfig) -> Self {
        Self {
            skip_triangulation: !config.triangulate,
            ..Self::default()
        }
    }

    // =========================================================================
    // QUERY METHODS
    // =========================================================================

    /// All vertex positions.
    #[inline]
    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    /// All normals.
    #[inline]
    pub fn normals(&self) -> &[DVec3] {
        &self.normals
    }

    /// Number of declared cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Corners of a cell, if it has been set.
    pub fn cell(&self, index: u32) -> Option<&CellCorners> {
        self.cells.get(index as usize).and_then(Option::as_ref)
    }

    /// Pillar edges recorded by the sweep.
    #[inline]
    pub fn edges(&self) -> &[PillarEdge] {
        &self.edges
    }

    /// Number of polygons.
    #[inline]
    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    /// All polygons.
    #[inline]
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Corners of one polygon.
    pub fn polygon_segments(&self, polygon: &Polygon) -> &[Segment] {
        &self.segments[polygon.segments.clone()]
    }

    /// Vertex loop of one polygon.
    pub fn polygon_loop(&self, polygon: &Polygon) -> Vec<u32> {
        self.polygon_segments(polygon)
            .iter()
            .map(|s| s.vertex)
            .collect()
    }

    /// Polygons with `cell` on either side.
    pub fn polygons_of_cell(&self, cell: u32) -> impl Iterator<Item = &Polygon> + '_ {
        self.polygons
            .iter()
            .filter(move |p| p.interface.references(cell))
    }

    /// Number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// All triangles.
    #[inline]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    // =========================================================================
    // PROCESSING
    // =========================================================================

    /// Replaces the triangle list with a fresh triangulation of every polygon.
    pub fn triangulate(&mut self) {
        let mut triangulator = Triangulator::new();
        let mut triangles = Vec::with_capacity(self.triangles.capacity());
        let mut points = Vec::new();

        for polygon in &self.polygons {
            let segments = &self.segments[polygon.segments.clone()];
            points.clear();
            points.extend(segments.iter().map(|s| self.vertices[s.vertex as usize]));
            triangulator.triangulate_segments(segments, &points, |corners| {
                triangles.push(Triangle::new(polygon.interface, corners));
            });
        }
        self.triangles = triangles;
    }

    /// Checks that every cell was set and every polygon references known
    /// cells.
    pub fn validate(&self) -> MeshResult<()> {
        if let Some(missing) = self.cells.iter().position(Option::is_none) {
            return Err(MeshError::validation(format!(
                "cell {missing} was never set ({} cells declared)",
                self.cells.len()
            )));
        }
        for (n, polygon) in self.polygons.iter().enumerate() {
            for cell in polygon.interface.cells {
                if cell != ILLEGAL_INDEX && cell as usize >= self.cells.len() {
                    return Err(MeshError::validation(format!(
                        "polygon {n} references unknown cell {cell}"
                    )));
                }
            }
        }
        Ok(())
    }

    fn check_vertex(&self, index: u32) -> MeshResult<()> {
        if (index as usize) < self.vertices.len() {
            Ok(())
        } else {
            Err(MeshError::InvalidVertex {
                index,
                count: self.vertices.len(),
            })
        }
    }
}

impl MeshSink for PolygonMesh {
    fn add_vertex(&mut self, position: DVec3) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        self.bounds = Some(match self.bounds {
            Some((min, max)) => (min.min(position), max.max(position)),
            None => (position, position),
        });
        index
    }

    fn vertex(&self, index: u32) -> DVec3 {
        self.vertices[index as usize]
    }

    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn add_normal(&mut self, normal: DVec3) -> u32 {
        let index = self.normals.len() as u32;
        self.normals.push(normal);
        index
    }

    fn reserve(&mut self, vertices: usize, edges: usize, triangles: usize) {
        self.vertices.reserve(vertices);
        self.edges.reserve(edges);
        self.triangles.reserve(triangles);
    }

    fn set_cell_count(&mut self, count: u32) -> MeshResult<()> {
        if count > MAX_CELL_INDEX {
            return Err(MeshError::CellOverflow {
                count,
                max: MAX_CELL_INDEX,
            });
        }
        self.cells = vec![None; count as usize];
        Ok(())
    }

    fn set_cell(&mut self, index: u32, corners: CellCorners) -> MeshResult<()> {
        for &v in &corners.vertices {
            self.check_vertex(v)?;
        }
        let count = self.cells.len();
        let slot = self
            .cells
            .get_mut(index as usize)
            .ok_or_else(|| MeshError::invalid_cell(index, format!("only {count} cells declared")))?;
        if slot.is_some() {
            return Err(MeshError::invalid_cell(index, "cell set twice"));
        }
        *slot = Some(corners);
        Ok(())
    }

    fn add_edge(&mut self, v0: u32, v1: u32, cells: [u32; 4]) {
        self.edges.push(PillarEdge {
            vertices: [v0, v1],
            cells,
        });
    }

    fn add_polygon(&mut self, interface: Interface, segments: &[Segment]) -> MeshResult<()> {
        if segments.len() < 3 {
            return Err(MeshError::DegeneratePolygon {
                count: segments.len(),
            });
        }
        for s in segments {
            self.check_vertex(s.vertex)?;
        }

        let points: Vec<DVec3> = segments.iter().map(|s| self.vertex(s.vertex)).collect();
        let convex = is_convex(&points);
        let start = self.segments.len();
        self.segments.extend_from_slice(segments);
        self.polygons.push(Polygon {
            interface: Interface {
                flags: interface.flags.with_convex(convex),
                ..interface
            },
            segments: start..self.segments.len(),
        });
        Ok(())
    }

    fn add_triangle(&mut self, interface: Interface, corners: [Segment; 3]) {
        self.triangles.push(Triangle::new(interface, corners));
    }

    fn bounding_box(&self) -> (DVec3, DVec3) {
        self.bounds.unwrap_or((DVec3::ZERO, DVec3::ZERO))
    }

    fn process(&mut self) -> MeshResult<()> {
        if !self.skip_triangulation {
            self.triangulate();
        }
        self.validate()?;
        let (min, max) = self.bounding_box();
        info!(
            vertices = self.vertices.len(),
            cells = self.cells.len(),
            polygons = self.polygons.len(),
            triangles = self.triangles.len(),
            "Mesh processed"
        );
        debug!(?min, ?max, "Mesh bounds");
        Ok(())
    }
}

/// Approximate convexity test: for every edge, all other corners must lie on
/// the inner side of the half-plane through that edge and the polygon normal.
fn is_convex(points: &[DVec3]) -> bool {
    let normal = newell_normal(points);
    let scale = normal.length();
    if scale == 0.0 {
        return false;
    }
    let n = points.len();
    (0..n).all(|e| {
        let a = points[e];
        let edge = points[(e + 1) % n] - a;
        (0..n)
            .filter(|&c| c != e && c != (e + 1) % n)
            .all(|c| normal.dot(edge.cross(points[c] - a)) >= -1e-12 * scale * edge.length())
    })
}
