//! # Corner-Point Grid
//!
//! Read-only grid source: pillars (`COORD`), per-cell corner depths
//! (`ZCORN`) and activity flags (`ACTNUM`).
//!
//! ## Layouts
//!
//! - `COORD`: `(nx + 1) * (ny + 1)` pillars of `(x1, y1, z1, x2, y2, z2)`,
//!   `i` fastest
//! - `ZCORN`: `2nx * 2ny * 2nz` depths, corner `(ii, jj, kk)` of cell
//!   `(i, j, k)` at `(2k + kk) * 4nx*ny + (2j + jj) * 2nx + 2i + ii`
//! - `ACTNUM`: `nx * ny * nz` flags, nonzero = active

use crate::error::{TessellationError, TessellationResult};
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// A straight line through two points along which corner depths are
/// interpolated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pillar {
    /// First `COORD` point.
    pub top: DVec3,
    /// Second `COORD` point.
    pub bottom: DVec3,
}

impl Pillar {
    /// Creates a pillar from its two `COORD` points.
    pub fn new(top: DVec3, bottom: DVec3) -> Self {
        Self { top, bottom }
    }

    /// Point on the pillar at depth `z`.
    ///
    /// A pillar without vertical extent is treated as vertical through its
    /// first point.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use cornerpoint_tessellator::Pillar;
    /// use glam::DVec3;
    ///
    /// let pillar = Pillar::new(DVec3::new(0.0, 0.0, 0.0), DVec3::new(2.0, 0.0, 10.0));
    /// assert_eq!(pillar.point_at_z(5.0), DVec3::new(1.0, 0.0, 5.0));
    /// ```
    pub fn point_at_z(&self, z: f64) -> DVec3 {
        let dz = self.bottom.z - self.top.z;
        if dz == 0.0 {
            return DVec3::new(self.top.x, self.top.y, z);
        }
        let t = (z - self.top.z) / dz;
        let p = self.top.lerp(self.bottom, t);
        DVec3::new(p.x, p.y, z)
    }

    /// Unit direction from `top` to `bottom`, or `+Z` for a point pillar.
    pub fn axis(&self) -> DVec3 {
        (self.bottom - self.top).try_normalize().unwrap_or(DVec3::Z)
    }

    /// Returns true if the pillar spans laterally but not vertically, so
    /// no depth can be mapped onto it.
    pub fn is_degenerate(&self) -> bool {
        self.bottom.z == self.top.z && self.bottom.truncate() != self.top.truncate()
    }
}

/// Corner-point grid with `nx * ny * nz` cells.
///
/// ## Example
///
/// ```rust
/// use cornerpoint_tessellator::CornerPointGrid;
/// use glam::DVec3;
///
/// let mut grid = CornerPointGrid::regular([2, 2, 3], DVec3::ONE);
/// grid.set_active(1, 1, 2, false);
/// assert_eq!(grid.active_cell_count(), 11);
/// assert_eq!(grid.corner_z(0, 0, 2, 0, 0, 1), 3.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct CornerPointGrid {
    dims: [usize; 3],
    pillars: Vec<Pillar>,
    zcorn: Vec<f64>,
    actnum: Vec<bool>,
}

impl CornerPointGrid {
    // =========================================================================
    // CONSTRUCTORS
    // =========================================================================

    /// Builds a grid from raw `COORD`, `ZCORN` and `ACTNUM` arrays.
    ///
    /// # Errors
    ///
    /// [`TessellationError::InvalidGrid`] if a dimension is zero or an array
    /// length does not match the dimensions.
    pub fn new(
        dims: [usize; 3],
        coord: &[f32],
        zcorn: &[f32],
        actnum: &[i32],
    ) -> TessellationResult<Self> {
        if coord.len() % 6 != 0 {
            return Err(TessellationError::invalid_grid(format!(
                "COORD has {} values, not a multiple of 6",
                coord.len()
            )));
        }
        check_lengths(dims, coord.len() / 6, zcorn.len(), actnum.len())?;

        let pillars = coord
            .chunks_exact(6)
            .map(|c| {
                Pillar::new(
                    DVec3::new(c[0].into(), c[1].into(), c[2].into()),
                    DVec3::new(c[3].into(), c[4].into(), c[5].into()),
                )
            })
            .collect();

        Ok(Self {
            dims,
            pillars,
            zcorn: zcorn.iter().map(|&z| f64::from(z)).collect(),
            actnum: actnum.iter().map(|&a| a != 0).collect(),
        })
    }

    /// Builds an axis-aligned, fully active box grid with cells of size
    /// `spacing`. Layer `k` spans depths `k * spacing.z ..= (k + 1) * spacing.z`.
    pub fn regular(dims: [usize; 3], spacing: DVec3) -> Self {
        let [nx, ny, nz] = dims;
        let depth = nz as f64 * spacing.z;
        let mut pillars = Vec::with_capacity((nx + 1) * (ny + 1));
        for j in 0..=ny {
            for i in 0..=nx {
                let x = i as f64 * spacing.x;
                let y = j as f64 * spacing.y;
                pillars.push(Pillar::new(DVec3::new(x, y, 0.0), DVec3::new(x, y, depth)));
            }
        }

        let mut zcorn = vec![0.0; 8 * nx * ny * nz];
        for k in 0..nz {
            for kk in 0..2 {
                let z = (k + kk) as f64 * spacing.z;
                let start = (2 * k + kk) * 4 * nx * ny;
                zcorn[start..start + 4 * nx * ny].fill(z);
            }
        }

        Self {
            dims,
            pillars,
            zcorn,
            actnum: vec![true; nx * ny * nz],
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Cell counts `[nx, ny, nz]`.
    #[inline]
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Pillar at grid corner `(i, j)`, `i <= nx`, `j <= ny`.
    #[inline]
    pub fn pillar(&self, i: usize, j: usize) -> &Pillar {
        &self.pillars[j * (self.dims[0] + 1) + i]
    }

    /// Depth of corner `(ii, jj, kk)` of cell `(i, j, k)`.
    #[inline]
    pub fn corner_z(&self, i: usize, j: usize, k: usize, ii: usize, jj: usize, kk: usize) -> f64 {
        self.zcorn[self.zcorn_index(i, j, k, ii, jj, kk)]
    }

    /// Returns true if cell `(i, j, k)` is active.
    #[inline]
    pub fn is_active(&self, i: usize, j: usize, k: usize) -> bool {
        self.actnum[self.global_index(i, j, k)]
    }

    /// Number of active cells.
    pub fn active_cell_count(&self) -> usize {
        self.actnum.iter().filter(|&&a| a).count()
    }

    /// Linear index of cell `(i, j, k)`, `i` fastest.
    #[inline]
    pub fn global_index(&self, i: usize, j: usize, k: usize) -> usize {
        let [nx, ny, _] = self.dims;
        (k * ny + j) * nx + i
    }

    /// Activity flags in global index order.
    pub fn actnum(&self) -> &[bool] {
        &self.actnum
    }

    // =========================================================================
    // MUTATORS
    // =========================================================================

    /// Activates or deactivates cell `(i, j, k)`.
    ///
    /// # Panics
    ///
    /// Panics if `(i, j, k)` lies outside the grid.
    pub fn set_active(&mut self, i: usize, j: usize, k: usize, active: bool) {
        let index = self.global_index(i, j, k);
        self.actnum[index] = active;
    }

    /// Overrides the depth of one cell corner.
    ///
    /// # Panics
    ///
    /// Panics if the cell lies outside the grid or `ii`, `jj`, `kk` is not
    /// 0 or 1.
    #[allow(clippy::too_many_arguments)]
    pub fn set_corner_z(&mut self, i: usize, j: usize, k: usize, ii: usize, jj: usize, kk: usize, z: f64) {
        let index = self.zcorn_index(i, j, k, ii, jj, kk);
        self.zcorn[index] = z;
    }

    /// Replaces pillar `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if `i > nx` or `j > ny`.
    pub fn set_pillar(&mut self, i: usize, j: usize, pillar: Pillar) {
        let index = j * (self.dims[0] + 1) + i;
        self.pillars[index] = pillar;
    }

    fn zcorn_index(&self, i: usize, j: usize, k: usize, ii: usize, jj: usize, kk: usize) -> usize {
        let [nx, ny, _] = self.dims;
        (2 * k + kk) * 4 * nx * ny + (2 * j + jj) * 2 * nx + 2 * i + ii
    }
}

/// Serialized form of [`CornerPointGrid`], validated on the way in.
#[derive(Deserialize)]
struct RawGrid {
    dims: [usize; 3],
    pillars: Vec<Pillar>,
    zcorn: Vec<f64>,
    actnum: Vec<bool>,
}

impl TryFrom<RawGrid> for CornerPointGrid {
    type Error = TessellationError;

    fn try_from(raw: RawGrid) -> TessellationResult<Self> {
        check_lengths(raw.dims, raw.pillars.len(), raw.zcorn.len(), raw.actnum.len())?;
        Ok(Self {
            dims: raw.dims,
            pillars: raw.pillars,
            zcorn: raw.zcorn,
            actnum: raw.actnum,
        })
    }
}

fn check_lengths(dims: [usize; 3], pillars: usize, zcorn: usize, actnum: usize) -> TessellationResult<()> {
    let [nx, ny, nz] = dims;
    if nx == 0 || ny == 0 || nz == 0 {
        return Err(TessellationError::invalid_grid(format!(
            "dimensions must be positive, got {nx}x{ny}x{nz}"
        )));
    }
    check_len("COORD", 6 * pillars, 6 * (nx + 1) * (ny + 1))?;
    check_len("ZCORN", zcorn, 8 * nx * ny * nz)?;
    check_len("ACTNUM", actnum, nx * ny * nz)
}

fn check_len(name: &str, actual: usize, expected: usize) -> TessellationResult<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(TessellationError::invalid_grid(format!(
            "{name} has {actual} values, expected {expected}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_validates_lengths() {
        let coord = vec![0.0f32; 6 * 4];
        let zcorn = vec![0.0f32; 8];
        let actnum = vec![1; 1];
        assert!(CornerPointGrid::new([1, 1, 1], &coord, &zcorn, &actnum).is_ok());

        let err = CornerPointGrid::new([1, 1, 1], &coord[..18], &zcorn, &actnum).unwrap_err();
        assert!(err.to_string().contains("COORD"));
        let err = CornerPointGrid::new([1, 1, 1], &coord, &zcorn[..7], &actnum).unwrap_err();
        assert!(err.to_string().contains("ZCORN"));
        let err = CornerPointGrid::new([1, 1, 2], &coord, &zcorn, &actnum).unwrap_err();
        assert!(matches!(err, TessellationError::InvalidGrid { .. }));
        assert!(CornerPointGrid::new([0, 1, 1], &[], &[], &[]).is_err());
    }

    #[test]
    fn test_deserialize_validates_lengths() {
        let grid = CornerPointGrid::regular([2, 1, 1], DVec3::ONE);
        let json = serde_json::to_string(&grid).unwrap();
        let back: CornerPointGrid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, grid);

        let short = r#"{"dims":[2,2,2],"pillars":[],"zcorn":[],"actnum":[true]}"#;
        let err = serde_json::from_str::<CornerPointGrid>(short).unwrap_err();
        assert!(err.to_string().contains("Invalid grid"));

        let mut value = serde_json::to_value(&grid).unwrap();
        value["zcorn"].as_array_mut().unwrap().pop();
        let err = serde_json::from_value::<CornerPointGrid>(value).unwrap_err();
        assert!(err.to_string().contains("ZCORN"));

        let zero = r#"{"dims":[0,1,1],"pillars":[],"zcorn":[],"actnum":[]}"#;
        assert!(serde_json::from_str::<CornerPointGrid>(zero).is_err());
    }

    #[test]
    fn test_zcorn_layout() {
        let [nx, ny, nz] = [2, 1, 1];
        let zcorn: Vec<f32> = (0..8 * nx * ny * nz).map(|v| v as f32).collect();
        let grid = CornerPointGrid::new(
            [nx, ny, nz],
            &vec![0.0f32; 6 * 3 * 2],
            &zcorn,
            &[1, 0],
        )
        .unwrap();
        // Row of 2nx = 4 depths per (2j + jj), 4nx*ny = 8 per (2k + kk)
        assert_eq!(grid.corner_z(0, 0, 0, 0, 0, 0), 0.0);
        assert_eq!(grid.corner_z(1, 0, 0, 1, 0, 0), 3.0);
        assert_eq!(grid.corner_z(0, 0, 0, 0, 1, 0), 4.0);
        assert_eq!(grid.corner_z(1, 0, 0, 0, 1, 1), 14.0);
        assert!(grid.is_active(0, 0, 0));
        assert!(!grid.is_active(1, 0, 0));
        assert_eq!(grid.active_cell_count(), 1);
    }

    #[test]
    fn test_regular_grid() {
        let grid = CornerPointGrid::regular([2, 3, 4], DVec3::new(10.0, 20.0, 5.0));
        assert_eq!(grid.dims(), [2, 3, 4]);
        assert_eq!(grid.active_cell_count(), 24);
        assert_eq!(grid.pillar(2, 3).top, DVec3::new(20.0, 60.0, 0.0));
        assert_eq!(grid.pillar(2, 3).bottom.z, 20.0);
        assert_eq!(grid.corner_z(1, 2, 3, 1, 1, 0), 15.0);
        assert_eq!(grid.corner_z(1, 2, 3, 1, 1, 1), 20.0);
        assert_eq!(grid.global_index(1, 2, 3), 3 * 6 + 2 * 2 + 1);
    }

    #[test]
    fn test_pillar_interpolation() {
        let pillar = Pillar::new(DVec3::new(0.0, 0.0, 100.0), DVec3::new(4.0, 2.0, 200.0));
        let p = pillar.point_at_z(125.0);
        assert_relative_eq!(p.x, 1.0);
        assert_relative_eq!(p.y, 0.5);
        assert_relative_eq!(p.z, 125.0);
        assert_relative_eq!(pillar.axis().length(), 1.0);
        assert!(!pillar.is_degenerate());

        let flat = Pillar::new(DVec3::new(0.0, 0.0, 1.0), DVec3::new(1.0, 0.0, 1.0));
        assert!(flat.is_degenerate());
        let point = Pillar::new(DVec3::new(3.0, 4.0, 1.0), DVec3::new(3.0, 4.0, 1.0));
        assert!(!point.is_degenerate());
        assert_eq!(point.point_at_z(7.0), DVec3::new(3.0, 4.0, 7.0));
        assert_eq!(point.axis(), DVec3::Z);
    }

    #[test]
    fn test_mutators() {
        let mut grid = CornerPointGrid::regular([1, 1, 2], DVec3::ONE);
        grid.set_corner_z(0, 0, 1, 1, 1, 1, 2.5);
        assert_eq!(grid.corner_z(0, 0, 1, 1, 1, 1), 2.5);
        grid.set_active(0, 0, 0, false);
        assert_eq!(grid.active_cell_count(), 1);
    }

    #[test]
    #[should_panic]
    fn test_set_active_out_of_range_panics() {
        let mut grid = CornerPointGrid::regular([1, 1, 1], DVec3::ONE);
        grid.set_active(0, 0, 1, false);
    }

    #[test]
    #[should_panic]
    fn test_set_corner_z_out_of_range_panics() {
        let mut grid = CornerPointGrid::regular([1, 1, 1], DVec3::ONE);
        grid.set_corner_z(0, 1, 0, 0, 0, 0, 1.0);
    }
}
