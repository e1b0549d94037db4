//! # Polygon Triangulation
//!
//! Decomposes interface polygons of any size into triangles.
//!
//! ## Algorithm
//!
//! - **3 corners**: passed through unchanged
//! - **4 corners**: split along the diagonal whose two triangle normals agree
//!   best (largest dot product)
//! - **more corners**: project onto the plane of the Newell normal and clip
//!   ears until four corners remain, then split the quad as above
//!
//! An ear is a strictly convex corner whose circumcircle holds no other
//! remaining corner. Among valid ears the one with the largest circumradius
//! is clipped first. If no corner qualifies (degenerate or self-intersecting
//! input) an ear with an empty triangle is used, and failing that the most
//! convex corner, with a warning.

use crate::interface::{Segment, SegmentFlags};
use config::constants::EAR_CIRCLE_TOLERANCE;
use glam::{DVec2, DVec3};
use robust::{orient2d, Coord};
use tracing::{debug, warn};


/// Approximate normal of a (possibly non-planar) polygon loop by Newell's
/// method. The length is twice the projected area; the direction follows the
/// right-hand rule on the loop order.
///
/// ## Example
///
/// ```rust
/// use cornerpoint_mesh::newell_normal;
/// use glam::DVec3;
///
/// let square = [
///     DVec3::new(0.0, 0.0, 0.0),
///     DVec3::new(1.0, 0.0, 0.0),
///     DVec3::new(1.0, 1.0, 0.0),
///     DVec3::new(0.0, 1.0, 0.0),
/// ];
/// assert_eq!(newell_normal(&square), DVec3::new(0.0, 0.0, 2.0));
/// ```
pub fn newell_normal(points: &[DVec3]) -> DVec3 {
    let mut normal = DVec3::ZERO;
    for (i, cur) in points.iter().enumerate() {
        let next = points[(i + 1) % points.len()];
        normal.x += (cur.y - next.y) * (cur.z + next.z);
        normal.y += (cur.z - next.z) * (cur.x + next.x);
        normal.z += (cur.x - next.x) * (cur.y + next.y);
    }
    normal
}

/// Reusable ear-clipping triangulator.
///
/// Scratch buffers are kept between calls so a whole polygon stream can be
/// processed without per-polygon allocation.
///
/// ## Example
///
/// ```rust
/// use cornerpoint_mesh::Triangulator;
/// use glam::DVec3;
///
/// let pentagon: Vec<DVec3> = (0..5)
///     .map(|i| {
///         let a = i as f64 * std::f64::consts::TAU / 5.0;
///         DVec3::new(a.cos(), a.sin(), 0.0)
///     })
///     .collect();
/// let mut triangulator = Triangulator::new();
/// assert_eq!(triangulator.triangulate(&pentagon).len(), 3);
/// ```
#[derive(Debug, Default)]
pub struct Triangulator {
    /// Corners projected onto the polygon plane
    projected: Vec<DVec2>,
    /// Corners not yet clipped, in loop order
    ring: Vec<usize>,
    /// Output triangles as local corner indices
    triangles: Vec<[usize; 3]>,
}

impl Triangulator {
    /// Creates a triangulator with empty scratch buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Triangulates a polygon loop.
    ///
    /// Returns triangles as indices into `points`, wound like the loop.
    /// A loop of `n >= 3` corners always yields `n - 2` triangles.
    pub fn triangulate(&mut self, points: &[DVec3]) -> &[[usize; 3]] {
        self.triangles.clear();
        match points.len() {
            0..=2 => {
                warn!(corners = points.len(), "Skipping degenerate polygon");
            }
            3 => self.triangles.push([0, 1, 2]),
            4 => {
                let split = best_quad_split(points, [0, 1, 2, 3]);
                self.triangles.extend_from_slice(&split);
            }
            _ => self.clip_ears(points),
        }
        &self.triangles
    }

    /// Triangulates a polygon given as sink segments.
    ///
    /// `points[n]` must be the position of `segments[n].vertex`. Each emitted
    /// triangle keeps the draw flag of an original polygon edge; diagonals
    /// are hidden.
    pub fn triangulate_segments(
        &mut self,
        segments: &[Segment],
        points: &[DVec3],
        mut emit: impl FnMut([Segment; 3]),
    ) {
        let count = segments.len();
        self.triangulate(points);
        for tri in &self.triangles {
            let corner = |e: usize| {
                let from = tri[e];
                let to = tri[(e + 1) % 3];
                let original = segments[from];
                let flags = if to == (from + 1) % count && original.flags.draws_edge() {
                    SegmentFlags::drawn()
                } else {
                    SegmentFlags::hidden()
                };
                Segment { flags, ..original }
            };
            emit([corner(0), corner(1), corner(2)]);
        }
    }

    // =========================================================================
    // EAR CLIPPING
    // =========================================================================

    fn clip_ears(&mut self, points: &[DVec3]) {
        if !self.project(points) {
            warn!(corners = points.len(), "Polygon has no area, using a fan");
            for i in 1..points.len() - 1 {
                self.triangles.push([0, i, i + 1]);
            }
            return;
        }

        self.ring.clear();
        self.ring.extend(0..points.len());

        while self.ring.len() > 4 {
            let pos = self.select_ear();
            let n = self.ring.len();
            let prev = self.ring[(pos + n - 1) % n];
            let next = self.ring[(pos + 1) % n];
            self.triangles.push([prev, self.ring[pos], next]);
            self.ring.remove(pos);
        }

        let quad = [self.ring[0], self.ring[1], self.ring[2], self.ring[3]];
        self.triangles
            .extend_from_slice(&best_quad_split(points, quad));
    }

    /// Projects the loop onto the plane through its barycenter perpendicular
    /// to the Newell normal. Returns false if the normal vanishes.
    fn project(&mut self, points: &[DVec3]) -> bool {
        let normal = newell_normal(points).normalize_or_zero();
        if normal == DVec3::ZERO {
            return false;
        }
        let center = points.iter().copied().sum::<DVec3>() / points.len() as f64;
        let u = normal.any_orthonormal_vector();
        let v = normal.cross(u);

        self.projected.clear();
        self.projected.extend(points.iter().map(|p| {
            let d = *p - center;
            DVec2::new(d.dot(u), d.dot(v))
        }));
        true
    }

    /// Picks the ring position of the next ear to clip.
    fn select_ear(&self) -> usize {
        let n = self.ring.len();
        let mut best: Option<(usize, f64)> = None;
        let mut empty_triangle: Option<usize> = None;
        let mut most_convex: Option<(usize, f64)> = None;

        for pos in 0..n {
            let [a, b, c] = self.corner(pos);
            let turn = orient2d(coord(a), coord(b), coord(c));
            if turn <= 0.0 {
                continue;
            }
            if most_convex.map_or(true, |(_, t)| turn > t) {
                most_convex = Some((pos, turn));
            }

            let Some((center, radius)) = circumcircle(a, b, c) else {
                continue;
            };
            if self.circle_is_empty(pos, center, radius) {
                if best.map_or(true, |(_, r)| radius > r) {
                    best = Some((pos, radius));
                }
            } else if empty_triangle.is_none() && self.triangle_is_empty(pos) {
                empty_triangle = Some(pos);
            }
        }

        if let Some((pos, _)) = best {
            return pos;
        }
        if let Some(pos) = empty_triangle {
            debug!(corners = n, "No Delaunay ear, clipping an empty triangle");
            return pos;
        }
        warn!(corners = n, "No valid ear found, clipping an arbitrary corner");
        most_convex.map_or(0, |(pos, _)| pos)
    }

    /// Projected corners `(prev, pos, next)` around a ring position.
    fn corner(&self, pos: usize) -> [DVec2; 3] {
        let n = self.ring.len();
        [
            self.projected[self.ring[(pos + n - 1) % n]],
            self.projected[self.ring[pos]],
            self.projected[self.ring[(pos + 1) % n]],
        ]
    }

    /// Ring corners other than the ear at `pos` and its two neighbours.
    fn others(&self, pos: usize) -> impl Iterator<Item = DVec2> + '_ {
        let n = self.ring.len();
        (2..n - 1).map(move |offset| self.projected[self.ring[(pos + offset) % n]])
    }

    fn circle_is_empty(&self, pos: usize, center: DVec2, radius: f64) -> bool {
        let limit = radius * (1.0 - EAR_CIRCLE_TOLERANCE);
        self.others(pos).all(|p| p.distance(center) >= limit)
    }

    fn triangle_is_empty(&self, pos: usize) -> bool {
        let [a, b, c] = self.corner(pos);
        self.others(pos).all(|p| {
            let inside = orient2d(coord(a), coord(b), coord(p)) > 0.0
                && orient2d(coord(b), coord(c), coord(p)) > 0.0
                && orient2d(coord(c), coord(a), coord(p)) > 0.0;
            !inside
        })
    }
}

// =============================================================================
// GEOMETRY HELPERS
// =============================================================================

fn coord(p: DVec2) -> Coord<f64> {
    Coord { x: p.x, y: p.y }
}

/// Circumcenter and circumradius of a 2D triangle, computed relative to `a`.
fn circumcircle(a: DVec2, b: DVec2, c: DVec2) -> Option<(DVec2, f64)> {
    let ab = b - a;
    let ac = c - a;
    let d = 2.0 * ab.perp_dot(ac);
    if d == 0.0 {
        return None;
    }
    let offset = DVec2::new(
        ac.y * ab.length_squared() - ab.y * ac.length_squared(),
        ab.x * ac.length_squared() - ac.x * ab.length_squared(),
    ) / d;
    let radius = offset.length();
    radius.is_finite().then_some((a + offset, radius))
}

/// Splits a quad along the diagonal whose triangle normals agree best.
fn best_quad_split(points: &[DVec3], quad: [usize; 4]) -> [[usize; 3]; 2] {
    let [q0, q1, q2, q3] = quad;
    let first = [[q0, q1, q2], [q0, q2, q3]];
    let second = [[q0, q1, q3], [q1, q2, q3]];
    if split_agreement(points, &first) >= split_agreement(points, &second) {
        first
    } else {
        second
    }
}

/// Dot product of the unit normals of two triangles; degenerate triangles
/// score below any real split.
fn split_agreement(points: &[DVec3], split: &[[usize; 3]; 2]) -> f64 {
    let normal = |t: &[usize; 3]| {
        (points[t[1]] - points[t[0]])
            .cross(points[t[2]] - points[t[0]])
            .normalize_or_zero()
    };
    let n0 = normal(&split[0]);
    let n1 = normal(&split[1]);
    if n0 == DVec3::ZERO || n1 == DVec3::ZERO {
        return -2.0;
    }
    n0.dot(n1)
}
