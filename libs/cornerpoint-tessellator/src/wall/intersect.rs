//! Crossing detection between merged wall lines.

use super::WallLine;
use crate::error::{TessellationError, TessellationResult};
use config::constants::{ILLEGAL_INDEX, INTERSECTION_EPSILON};
use cornerpoint_mesh::MeshSink;
use glam::DVec3;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Chain terminator.
pub const NO_INTERSECTION: u32 = u32::MAX;

/// Crossing of two wall lines.
///
/// Of the two lines, `upward` is below the other at `P0` and above it at
/// `P1`; `downward` is the opposite. The `next_*` links continue each line's
/// chain of crossings towards `P1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intersection {
    /// Crossing vertex in the sink.
    pub vertex: u32,
    /// Merged index of the line climbing through the other.
    pub upward: usize,
    /// Merged index of the line descending through the other.
    pub downward: usize,
    /// Next crossing along `upward`.
    pub next_upward: u32,
    /// Next crossing along `downward`.
    pub next_downward: u32,
}

impl Intersection {
    /// Next crossing along `line`, which must be one of the two lines.
    #[inline]
    pub fn next_on(&self, line: usize) -> u32 {
        if line == self.upward {
            self.next_upward
        } else {
            self.next_downward
        }
    }

    /// The other line through this crossing.
    #[inline]
    pub fn partner(&self, line: usize) -> usize {
        if line == self.upward {
            self.downward
        } else {
            self.upward
        }
    }

    fn set_next_on(&mut self, line: usize, next: u32) {
        if line == self.upward {
            self.next_upward = next;
        } else {
            self.next_downward = next;
        }
    }
}

/// Finds every crossing pair among lexicographically sorted `lines`.
///
/// Also fills each line's `cutoff`. Lines `t < u` cross iff
/// `lines[t].p1 > lines[u].p1`; the scan for partners of `t` stops at the
/// first `u` whose cutoff reaches `lines[t].p1`, since no later line can end
/// below it. Crossing vertices are added to `sink` as they are found.
pub fn intersect_wall_lines<S: MeshSink + ?Sized>(
    lines: &mut [WallLine],
    axes: [DVec3; 2],
    sink: &mut S,
) -> Vec<Intersection> {
    let mut cutoff = ILLEGAL_INDEX;
    for line in lines.iter_mut().rev() {
        cutoff = cutoff.min(line.p1);
        line.cutoff = cutoff;
    }

    let mut intersections = Vec::new();
    for lower in 0..lines.len() {
        let reach = lines[lower].p1;
        for upper in lower + 1..lines.len() {
            if lines[upper].cutoff >= reach {
                break;
            }
            if lines[upper].p1 >= reach {
                continue;
            }
            let position = crossing_point(&*sink, axes, &lines[lower], &lines[upper]);
            let vertex = sink.add_vertex(position);
            intersections.push(Intersection {
                vertex,
                upward: lower,
                downward: upper,
                next_upward: NO_INTERSECTION,
                next_downward: NO_INTERSECTION,
            });
        }
    }
    intersections
}

/// Links the crossings of every line into a chain ordered from `P0` to `P1`
/// and returns the head of each chain.
///
/// Crossings are generated with the upward line as outer loop, so an upward
/// line sees its partners in ascending order (they cross it further and
/// further along). A downward line sees them ascending too, but meets them
/// in descending order.
pub(crate) fn link_chains(line_count: usize, intersections: &mut [Intersection]) -> TessellationResult<Vec<u32>> {
    let mut on_line: Vec<Vec<u32>> = vec![Vec::new(); line_count];
    for (q, crossing) in intersections.iter().enumerate() {
        let q = TessellationError::index("intersections", q)?;
        on_line[crossing.upward].push(q);
        on_line[crossing.downward].push(q);
    }

    let mut first = vec![NO_INTERSECTION; line_count];
    for (line, chain) in on_line.iter_mut().enumerate() {
        let Some(&head) = chain.first() else {
            continue;
        };
        if intersections[head as usize].downward == line {
            chain.reverse();
        }
        first[line] = chain[0];
        for pair in chain.windows(2) {
            intersections[pair[0] as usize].set_next_on(line, pair[1]);
        }
    }
    Ok(first)
}

/// Places the crossing of `upward` and `downward`.
///
/// Each pillar contributes the signed offset of the upward line relative to
/// the downward one, measured along the pillar from their midpoint. The
/// offsets change sign between the pillars; the crossing parameter is where
/// the linear interpolation of the offset reaches zero.
fn crossing_point<S: MeshSink + ?Sized>(
    sink: &S,
    axes: [DVec3; 2],
    upward: &WallLine,
    downward: &WallLine,
) -> DVec3 {
    let (a0, a1) = (sink.vertex(upward.p0), sink.vertex(upward.p1));
    let (b0, b1) = (sink.vertex(downward.p0), sink.vertex(downward.p1));

    let h0 = offset_along(a0, b0, axes[0]);
    let h1 = offset_along(a1, b1, axes[1]);
    let denominator = h0 - h1;

    let mut s = if denominator.abs() < INTERSECTION_EPSILON {
        warn!(h0, h1, "Crossing lines are parallel, using wall midpoint");
        0.5
    } else {
        h0 / denominator
    };
    if !s.is_finite() {
        warn!(h0, h1, "Non-finite crossing parameter, using wall midpoint");
        s = 0.5;
    } else if !(0.0..=1.0).contains(&s) {
        warn!(s, "Crossing outside the wall, clamping");
        s = s.clamp(0.0, 1.0);
    }

    0.5 * (a0.lerp(a1, s) + b0.lerp(b1, s))
}

/// Offset of `a` above `b` along `axis`, both measured from their midpoint.
fn offset_along(a: DVec3, b: DVec3, axis: DVec3) -> f64 {
    let mid = 0.5 * (a + b);
    (a - mid).dot(axis) - (b - mid).dot(axis)
}
