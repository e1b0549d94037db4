use super::*;
use approx::assert_relative_eq;
use cornerpoint_mesh::PolygonMesh;
use glam::DVec3;

const A: u32 = 0;
const B: u32 = 1;

/// Wall from `(0, 0)` to `(0, 1)` with vertical pillars; vertices are added
/// for the given depths on `P0` first, then on `P1`.
fn wall_mesh(p0: &[f64], p1: &[f64]) -> (PolygonMesh, [Pillar; 2]) {
    let mut mesh = PolygonMesh::new();
    for &z in p0 {
        mesh.add_vertex(DVec3::new(0.0, 0.0, z));
    }
    for &z in p1 {
        mesh.add_vertex(DVec3::new(0.0, 1.0, z));
    }
    let pillars = [
        Pillar::new(DVec3::new(0.0, 0.0, 10.0), DVec3::new(0.0, 0.0, -10.0)),
        Pillar::new(DVec3::new(0.0, 1.0, 10.0), DVec3::new(0.0, 1.0, -10.0)),
    ];
    (mesh, pillars)
}

fn cell(cell: u32, bottom: [u32; 2], top: [u32; 2]) -> SideCell {
    SideCell { cell, bottom, top }
}

// =============================================================================
// Extraction and merge
// =============================================================================

#[test]
fn test_stacked_cells_share_line() {
    let cells = [cell(7, [0, 10], [1, 11]), cell(8, [1, 11], [2, 12])];
    let (lines, refs) = extract_side_lines(0, &cells);

    assert_eq!(lines.len(), 3);
    assert_eq!(refs, vec![[0, 1], [1, 2]]);
    assert_eq!(lines[1].below[0], 7);
    assert_eq!(lines[1].above[0], 8);
    assert_eq!(lines[0].below[0], ILLEGAL_INDEX);
    assert_eq!(lines[2].above[0], ILLEGAL_INDEX);
    assert!(lines.iter().all(|l| l.side == LineSide::LEFT));
}

#[test]
fn test_gap_between_cells() {
    let cells = [cell(0, [0, 10], [1, 11]), cell(1, [2, 12], [3, 13])];
    let (lines, refs) = extract_side_lines(1, &cells);

    assert_eq!(lines.len(), 4);
    assert_eq!(refs, vec![[0, 1], [2, 3]]);
    assert_eq!(lines[1].above[1], ILLEGAL_INDEX);
    assert_eq!(lines[2].below[1], ILLEGAL_INDEX);
    assert!(lines.iter().all(|l| l.side == LineSide::RIGHT));
}

#[test]
fn test_collapsed_cell_has_single_line() {
    let cells = [
        cell(0, [0, 10], [1, 11]),
        cell(1, [1, 11], [1, 11]),
        cell(2, [1, 11], [2, 12]),
    ];
    let (lines, refs) = extract_side_lines(0, &cells);

    assert_eq!(lines.len(), 3);
    assert_eq!(refs, vec![[0, 1], [1, 1], [1, 2]]);
    assert_eq!(lines[1].below[0], 0);
    assert_eq!(lines[1].above[0], 2);
}

#[test]
fn test_merge_marks_shared_lines() {
    let (left, _) = extract_side_lines(0, &[cell(A, [0, 10], [1, 11])]);
    let (right, _) = extract_side_lines(1, &[cell(B, [0, 10], [2, 12])]);
    let (merged, [left_map, right_map]) = merge_wall_lines(&left, &right);

    let keys: Vec<_> = merged.iter().map(WallLine::key).collect();
    assert_eq!(keys, vec![(0, 10), (1, 11), (2, 12)]);
    assert_eq!(merged[0].side, LineSide::BOTH);
    assert_eq!(merged[0].above, [A, B]);
    assert_eq!(merged[1].side, LineSide::LEFT);
    assert_eq!(merged[2].side, LineSide::RIGHT);
    assert_eq!(left_map, vec![0, 1]);
    assert_eq!(right_map, vec![0, 2]);
}

#[test]
fn test_line_side_bits() {
    assert!(LineSide::BOTH.has(0) && LineSide::BOTH.has(1));
    assert!(LineSide::LEFT.has(0) && !LineSide::LEFT.has(1));
    assert!(!LineSide::RIGHT.has(0) && LineSide::RIGHT.has(1));
    assert_eq!(LineSide::of(1), LineSide::RIGHT);
    assert!(!LineSide::LEFT.is_matched());
}

#[test]
fn test_crosses() {
    let a = WallLine::new([1, 5], 0);
    let b = WallLine::new([2, 4], 1);
    let c = WallLine::new([2, 6], 1);
    assert!(a.crosses(&b));
    assert!(b.crosses(&a));
    assert!(!a.crosses(&c));
    assert!(!a.crosses(&a));
}

// =============================================================================
// Intersections
// =============================================================================

#[test]
fn test_cutoff_is_suffix_minimum() {
    let (mut mesh, pillars) = wall_mesh(&[0.0, 1.0, 2.0, 3.0], &[0.0, 1.0, 2.0, 3.0]);
    let mut lines = vec![
        WallLine::new([0, 5], 0),
        WallLine::new([1, 7], 0),
        WallLine::new([2, 4], 1),
        WallLine::new([3, 6], 1),
    ];
    let axes = [pillars[0].axis(), pillars[1].axis()];
    let found = intersect_wall_lines(&mut lines, axes, &mut mesh);

    let cutoffs: Vec<_> = lines.iter().map(|l| l.cutoff).collect();
    assert_eq!(cutoffs, vec![4, 4, 4, 6]);

    let pairs: Vec<_> = found.iter().map(|x| (x.upward, x.downward)).collect();
    assert_eq!(pairs, vec![(0, 2), (1, 2), (1, 3)]);
    assert_eq!(mesh.vertex_count(), 8 + 3);
}

#[test]
fn test_link_chains_order() {
    let crossing = |upward, downward| Intersection {
        vertex: 0,
        upward,
        downward,
        next_upward: NO_INTERSECTION,
        next_downward: NO_INTERSECTION,
    };
    let mut found = vec![crossing(0, 2), crossing(1, 2), crossing(1, 3)];
    let first = intersect::link_chains(4, &mut found).unwrap();

    // line 1 climbs through 2 then 3
    assert_eq!(first[1], 1);
    assert_eq!(found[1].next_upward, 2);
    assert_eq!(found[2].next_upward, NO_INTERSECTION);
    // line 2 descends through 1 before 0
    assert_eq!(first[2], 1);
    assert_eq!(found[1].next_downward, 0);
    assert_eq!(found[0].next_downward, NO_INTERSECTION);
    assert_eq!(first[0], 0);
    assert_eq!(first[3], 2);
}

#[test]
fn test_parallel_lines_meet_at_midpoint() {
    // combinatorially crossing, geometrically coincident
    let (mut mesh, pillars) = wall_mesh(&[0.0, 0.0], &[0.0, 0.0]);
    let mut lines = vec![WallLine::new([0, 3], 0), WallLine::new([1, 2], 1)];
    let axes = [pillars[0].axis(), pillars[1].axis()];
    let found = intersect_wall_lines(&mut lines, axes, &mut mesh);

    assert_eq!(found.len(), 1);
    let p = mesh.vertex(found[0].vertex);
    assert_relative_eq!(p.y, 0.5, epsilon = 1e-12);
    assert_relative_eq!(p.z, 0.0, epsilon = 1e-12);
}

// =============================================================================
// Resolution and faces
// =============================================================================

#[test]
fn test_matched_wall_has_one_face() {
    let (mut mesh, pillars) = wall_mesh(&[0.0, 1.0], &[0.0, 1.0]);
    let sides = [[cell(A, [0, 2], [1, 3])], [cell(B, [0, 2], [1, 3])]];
    let wall = WallResolution::resolve([&pillars[0], &pillars[1]], [&sides[0], &sides[1]], &mut mesh).unwrap();

    assert!(wall.intersections().is_empty());
    let faces = wall.faces().unwrap();
    assert_eq!(faces.len(), 1);
    assert_eq!(faces[0].cells, [A, B]);
    assert!(!faces[0].fault);
    assert_eq!(faces[0].vertices, vec![0, 2, 3, 1]);
}

#[test]
fn test_boundary_wall() {
    let (mut mesh, pillars) = wall_mesh(&[0.0, 1.0, 2.0], &[0.0, 1.0, 2.0]);
    let sides = [vec![cell(A, [0, 3], [1, 4]), cell(5, [1, 4], [2, 5])], vec![]];
    let wall = WallResolution::resolve([&pillars[0], &pillars[1]], [&sides[0], &sides[1]], &mut mesh).unwrap();

    let faces = wall.faces().unwrap();
    assert_eq!(faces.len(), 2);
    assert_eq!(faces[0].cells, [A, ILLEGAL_INDEX]);
    assert_eq!(faces[1].cells, [5, ILLEGAL_INDEX]);
    assert!(faces.iter().all(|f| !f.fault));
    assert_eq!(wall.cell_path(0, 1, 1), &[2, 5]);
}

#[test]
fn test_pillar_vertices_between_lines_are_kept() {
    // both cells span z = 0..2; the z = 1 vertices belong to other columns
    let (mut mesh, pillars) = wall_mesh(&[0.0, 1.0, 2.0], &[0.0, 1.0, 2.0]);
    let sides = [[cell(A, [0, 3], [2, 5])], [cell(B, [0, 3], [2, 5])]];
    let wall = WallResolution::resolve([&pillars[0], &pillars[1]], [&sides[0], &sides[1]], &mut mesh).unwrap();

    let faces = wall.faces().unwrap();
    assert_eq!(faces.len(), 1);
    assert_eq!(faces[0].vertices, vec![0, 3, 4, 5, 2, 1]);
}

#[test]
fn test_fault_wall_splits_faces() {
    // P0: v0 z=0, v1 z=1, v2 z=2; P1: v3 z=0, v4 z=2, v5 z=3
    let (mut mesh, pillars) = wall_mesh(&[0.0, 1.0, 2.0], &[0.0, 2.0, 3.0]);
    let sides = [[cell(A, [0, 3], [1, 5])], [cell(B, [0, 3], [2, 4])]];
    let wall = WallResolution::resolve([&pillars[0], &pillars[1]], [&sides[0], &sides[1]], &mut mesh).unwrap();

    assert_eq!(wall.intersections().len(), 1);
    let crossing = wall.intersections()[0];
    assert_eq!(crossing.vertex, 6);
    assert_eq!((crossing.upward, crossing.downward), (1, 2));
    let p = mesh.vertex(6);
    assert_relative_eq!(p.x, 0.0, epsilon = 1e-12);
    assert_relative_eq!(p.y, 0.5, epsilon = 1e-12);
    assert_relative_eq!(p.z, 2.0, epsilon = 1e-12);

    assert_eq!(wall.path(1), &[1, 6, 5]);
    assert_eq!(wall.path(2), &[2, 6, 4]);
    assert_eq!(wall.cell_path(0, 0, 1), &[1, 6, 5]);
    assert_eq!(wall.cell_path(1, 0, 0), &[0, 3]);

    let faces = wall.faces().unwrap();
    assert_eq!(faces.len(), 3);

    assert_eq!(faces[0].cells, [A, B]);
    assert!(faces[0].fault);
    assert_eq!(faces[0].vertices, vec![0, 3, 4, 6, 1]);

    assert_eq!(faces[1].cells, [ILLEGAL_INDEX, B]);
    assert!(!faces[1].fault);
    assert_eq!(faces[1].vertices, vec![1, 6, 2]);

    assert_eq!(faces[2].cells, [A, ILLEGAL_INDEX]);
    assert_eq!(faces[2].vertices, vec![6, 4, 5]);
}

#[test]
fn test_empty_wall() {
    let (mut mesh, pillars) = wall_mesh(&[], &[]);
    let wall = WallResolution::resolve([&pillars[0], &pillars[1]], [&[], &[]], &mut mesh).unwrap();
    assert!(wall.lines().is_empty());
    assert!(wall.faces().unwrap().is_empty());
}

#[cfg(feature = "check-invariants")]
#[test]
fn test_invariants_hold_on_fault_wall() {
    let (mut mesh, pillars) = wall_mesh(&[0.0, 1.0, 2.0], &[0.0, 2.0, 3.0]);
    let sides = [[cell(A, [0, 3], [1, 5])], [cell(B, [0, 3], [2, 4])]];
    let wall = WallResolution::resolve([&pillars[0], &pillars[1]], [&sides[0], &sides[1]], &mut mesh).unwrap();
    wall.check_invariants().unwrap();
}
