//! End-to-end tests: grid in, tagged polygons out.

use config::constants::{GlobalConfig, ILLEGAL_INDEX};
use cornerpoint_mesh::{open_edges, MeshSink, Orientation, PolygonMesh};
use cornerpoint_tessellator::{tessellate, tessellate_with_config, CornerPointGrid, TessellationError};
use glam::DVec3;

fn run(grid: &CornerPointGrid) -> (PolygonMesh, cornerpoint_tessellator::TessellationStats) {
    let mut mesh = PolygonMesh::new();
    let stats = tessellate(grid, &mut mesh).unwrap();
    (mesh, stats)
}

fn assert_closed(mesh: &PolygonMesh) {
    assert_eq!(mesh.check_closure(), vec![], "edges used more than twice");
    assert_eq!(open_edges(mesh), vec![], "edges used once");
}

fn count_orientation(mesh: &PolygonMesh, orientation: Orientation) -> usize {
    mesh.polygons()
        .iter()
        .filter(|p| p.interface.orientation() == orientation)
        .count()
}

/// Two columns side by side whose tops cross on the shared wall `x = 1`:
/// cell 0 rises from z = 1 to z = 3 along the wall, cell 1 stays at z = 2.
fn crossing_tops() -> CornerPointGrid {
    let mut grid = CornerPointGrid::regular([2, 1, 1], DVec3::ONE);
    grid.set_corner_z(0, 0, 0, 1, 0, 1, 1.0);
    grid.set_corner_z(0, 0, 0, 1, 1, 1, 3.0);
    for ii in 0..2 {
        for jj in 0..2 {
            grid.set_corner_z(1, 0, 0, ii, jj, 1, 2.0);
        }
    }
    grid
}

// =============================================================================
// Regular grids
// =============================================================================

#[test]
fn test_unit_cube() {
    let grid = CornerPointGrid::regular([1, 1, 1], DVec3::ONE);
    let (mesh, stats) = run(&grid);

    assert_eq!(mesh.vertices().len(), 8);
    assert_eq!(mesh.polygon_count(), 6);
    assert_eq!(mesh.triangle_count(), 12);
    assert_eq!(mesh.edges().len(), 4);
    assert_eq!(stats.intersections, 0);
    assert_eq!(stats.fault_polygons, 0);

    for orientation in [Orientation::I, Orientation::J, Orientation::K] {
        assert_eq!(count_orientation(&mesh, orientation), 2);
    }
    for polygon in mesh.polygons() {
        assert!(polygon.interface.is_boundary());
        assert!(polygon.interface.references(0));
        assert!(polygon.interface.flags.is_convex());
        assert_eq!(mesh.polygon_segments(polygon).len(), 4);
    }
    assert_closed(&mesh);
}

#[test]
fn test_unit_cube_cell_corners() {
    let grid = CornerPointGrid::regular([1, 1, 1], DVec3::new(2.0, 3.0, 4.0));
    let (mesh, _) = run(&grid);

    let cell = mesh.cell(0).unwrap();
    assert_eq!(cell.global_index, 0);
    for kk in 0..2 {
        for jj in 0..2 {
            for ii in 0..2 {
                let p = mesh.vertex(cell.corner(ii, jj, kk));
                let expected = DVec3::new(2.0 * ii as f64, 3.0 * jj as f64, 4.0 * kk as f64);
                assert_eq!(p, expected, "corner ({ii}, {jj}, {kk})");
            }
        }
    }
}

#[test]
fn test_regular_grid_counts() {
    let grid = CornerPointGrid::regular([3, 2, 2], DVec3::ONE);
    let (mesh, stats) = run(&grid);

    assert_eq!(stats.active_cells, 12);
    assert_eq!(stats.vertices, 4 * 3 * 3);
    assert_eq!(count_orientation(&mesh, Orientation::I), 4 * 2 * 2);
    assert_eq!(count_orientation(&mesh, Orientation::J), 3 * 3 * 2);
    assert_eq!(count_orientation(&mesh, Orientation::K), 3 * 2 * 3);
    assert_eq!(stats.polygons, mesh.polygon_count());
    assert_eq!(stats.fault_polygons, 0);
    assert_closed(&mesh);

    // interior faces separate two cells
    let interior = mesh.polygons().iter().filter(|p| !p.interface.is_boundary()).count();
    assert_eq!(interior, 2 * 2 * 2 + 3 * 1 * 2 + 3 * 2 * 1);
}

#[test]
fn test_each_cell_has_six_faces() {
    let grid = CornerPointGrid::regular([2, 2, 2], DVec3::ONE);
    let (mesh, _) = run(&grid);
    for cell in 0..8 {
        assert_eq!(mesh.polygons_of_cell(cell).count(), 6, "cell {cell}");
    }
}

#[test]
fn test_inactive_cell_is_hole() {
    let mut grid = CornerPointGrid::regular([2, 2, 1], DVec3::ONE);
    grid.set_active(1, 1, 0, false);
    let (mesh, stats) = run(&grid);

    assert_eq!(stats.active_cells, 3);
    assert_eq!(mesh.cell_count(), 3);
    assert_eq!(mesh.cell(2).unwrap().global_index, 2);
    // caps, outer walls, and the two walls facing the hole
    let boundary = mesh.polygons().iter().filter(|p| p.interface.is_boundary()).count();
    assert_eq!(boundary, 6 + 6 + 2);
    assert_closed(&mesh);
}

#[test]
fn test_no_triangulation() {
    let grid = CornerPointGrid::regular([1, 1, 1], DVec3::ONE);
    let config = GlobalConfig {
        triangulate: false,
        ..GlobalConfig::default()
    };
    let mut mesh = PolygonMesh::with_config(&config);
    tessellate_with_config(&grid, &config, &mut mesh).unwrap();
    assert_eq!(mesh.polygon_count(), 6);
    assert_eq!(mesh.triangle_count(), 0);
}

#[test]
fn test_empty_grid() {
    let mut grid = CornerPointGrid::regular([1, 1, 1], DVec3::ONE);
    grid.set_active(0, 0, 0, false);
    let (mesh, stats) = run(&grid);
    assert_eq!(stats, Default::default());
    assert_eq!(mesh.polygon_count(), 0);
    assert!(mesh.vertices().is_empty());
}

// =============================================================================
// Faults
// =============================================================================

#[test]
fn test_crossing_tops_split_wall() {
    let (mesh, stats) = run(&crossing_tops());

    assert_eq!(stats.intersections, 1);
    assert_eq!(stats.vertices, 4 * 2 + 2 * 3 + 1);
    assert_eq!(stats.fault_polygons, 1);
    assert_eq!(stats.polygons, 13);

    let on_fault: Vec<_> = mesh
        .polygons()
        .iter()
        .filter(|p| {
            p.interface.orientation() == Orientation::I
                && mesh.polygon_loop(p).iter().all(|&v| mesh.vertex(v).x == 1.0)
        })
        .collect();
    assert_eq!(on_fault.len(), 3);

    let single: Vec<_> = on_fault
        .iter()
        .filter(|p| p.interface.cells.iter().filter(|&&c| c != ILLEGAL_INDEX).count() == 1)
        .collect();
    assert_eq!(single.len(), 2);
    assert!(single.iter().any(|p| p.interface.cells == [0, ILLEGAL_INDEX]));
    assert!(single.iter().any(|p| p.interface.cells == [ILLEGAL_INDEX, 1]));
    assert!(single.iter().all(|p| mesh.polygon_loop(p).len() == 3));

    let shared = on_fault.iter().find(|p| p.interface.cells == [0, 1]).unwrap();
    assert!(shared.interface.is_fault());
    assert_eq!(mesh.polygon_loop(shared).len(), 5);

    assert_closed(&mesh);
}

#[test]
fn test_crossing_vertex_position() {
    let (mesh, _) = run(&crossing_tops());
    // the crossing is the only vertex between pillars
    let between: Vec<_> = mesh.vertices().iter().filter(|p| p.y > 0.0 && p.y < 1.0).collect();
    assert_eq!(between, vec![&DVec3::new(1.0, 0.5, 2.0)]);
}

#[test]
fn test_throw_without_crossing() {
    // the right column is shifted down by half a layer: every wall line is
    // unmatched but none cross
    let mut grid = CornerPointGrid::regular([2, 1, 2], DVec3::ONE);
    for k in 0..2 {
        for kk in 0..2 {
            for jj in 0..2 {
                for ii in 0..2 {
                    grid.set_corner_z(1, 0, k, ii, jj, kk, (k + kk) as f64 + 0.5);
                }
            }
        }
    }
    let (mesh, stats) = run(&grid);

    assert_eq!(stats.intersections, 0);
    // across x = 1: (0, -), (0, 1), (2, 1), (2, 3), (-, 3)
    let faults = mesh.polygons().iter().filter(|p| p.interface.is_fault()).count();
    assert_eq!(faults, 3);
    assert_eq!(stats.fault_polygons, 3);
    assert_closed(&mesh);
}

#[test]
fn test_pinched_inactive_layer_gives_k_fault() {
    let mut grid = CornerPointGrid::regular([1, 1, 3], DVec3::ONE);
    grid.set_active(0, 0, 1, false);
    for ii in 0..2 {
        for jj in 0..2 {
            grid.set_corner_z(0, 0, 1, ii, jj, 1, 1.0);
            grid.set_corner_z(0, 0, 2, ii, jj, 0, 1.0);
        }
    }
    let (mesh, stats) = run(&grid);

    assert_eq!(stats.active_cells, 2);
    assert_eq!(stats.vertices, 4 * 3);
    assert_eq!(count_orientation(&mesh, Orientation::K), 3);
    assert_eq!(stats.fault_polygons, 1);

    let shared = mesh
        .polygons()
        .iter()
        .find(|p| p.interface.cells == [0, 1])
        .unwrap();
    assert_eq!(shared.interface.orientation(), Orientation::K);
    assert!(shared.interface.is_fault());
    assert_closed(&mesh);
}

#[test]
fn test_collapsed_cell_has_no_faces() {
    let mut grid = CornerPointGrid::regular([1, 1, 3], DVec3::ONE);
    for ii in 0..2 {
        for jj in 0..2 {
            grid.set_corner_z(0, 0, 1, ii, jj, 1, 1.0);
            grid.set_corner_z(0, 0, 2, ii, jj, 0, 1.0);
        }
    }
    let (mesh, stats) = run(&grid);

    assert_eq!(stats.active_cells, 3);
    assert_eq!(mesh.polygons_of_cell(1).count(), 0);
    let collapsed = mesh.cell(1).unwrap();
    assert_eq!(collapsed.corner(0, 0, 0), collapsed.corner(0, 0, 1));
    assert!(mesh.polygons().iter().any(|p| p.interface.cells == [0, 2]));
    assert_closed(&mesh);
}

#[test]
fn test_pillar_vertices_increase_with_depth() {
    let (mesh, _) = run(&crossing_tops());
    for edge in mesh.edges() {
        let [a, b] = edge.vertices;
        assert_eq!(b, a + 1);
        assert!(mesh.vertex(a).z < mesh.vertex(b).z);
    }
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_mixed_z_order_is_located() {
    let mut grid = CornerPointGrid::regular([2, 1, 1], DVec3::ONE);
    for ii in 0..2 {
        for jj in 0..2 {
            grid.set_corner_z(1, 0, 0, ii, jj, 0, 1.0);
            grid.set_corner_z(1, 0, 0, ii, jj, 1, 0.0);
        }
    }
    let mut mesh = PolygonMesh::new();
    let err = tessellate(&grid, &mut mesh).unwrap_err();

    assert!(matches!(err, TessellationError::AtColumn { i: 1, j: 0, .. }));
    assert!(matches!(err.root(), TessellationError::MixedZOrder { i: 1, j: 0 }));
}

#[test]
fn test_invalid_config_rejected() {
    let grid = CornerPointGrid::regular([1, 1, 1], DVec3::ONE);
    let config = GlobalConfig {
        merge_epsilon: -1.0,
        ..GlobalConfig::default()
    };
    let mut mesh = PolygonMesh::new();
    let err = tessellate_with_config(&grid, &config, &mut mesh).unwrap_err();
    assert!(matches!(err, TessellationError::Config(_)));
    assert_eq!(mesh.vertex_count(), 0);
}

#[test]
fn test_invalid_grid_rejected() {
    let err = CornerPointGrid::new([1, 1, 1], &[0.0; 24], &[0.0; 7], &[1]).unwrap_err();
    assert!(err.to_string().contains("ZCORN"));

    let err = CornerPointGrid::new([0, 1, 1], &[], &[], &[]).unwrap_err();
    assert!(matches!(err, TessellationError::InvalidGrid { .. }));
}
