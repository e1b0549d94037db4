//! Face walk over a resolved wall.
//!
//! Every face of the overlay is bounded below by a chain starting on its
//! lower line and above by a chain starting on its upper line. A face starts
//! either on `P0` between two consecutive merged lines, or at a crossing,
//! opening to the right of it. Both chains are followed towards `P1`; at each
//! crossing a chain either closes the face (the two chains meet) or switches
//! onto the crossing line and continues.

use super::{WallResolution, NO_INTERSECTION};
use crate::error::{TessellationError, TessellationResult};
use config::constants::ILLEGAL_INDEX;
use tracing::debug;

/// One closed face of a wall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallFace {
    /// Cell on side 0 and side 1, [`ILLEGAL_INDEX`] where there is none.
    pub cells: [u32; 2],
    /// Both cells exist but their outlines do not match.
    pub fault: bool,
    /// Loop running along the lower boundary from `P0` towards `P1` and back
    /// along the upper boundary.
    pub vertices: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Start {
    Pillar(usize),
    Crossing(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum End {
    Pillar(u32),
    Crossing(u32),
}

impl WallResolution {
    /// Closes every face of the wall that has a cell on at least one side.
    pub fn faces(&self) -> TessellationResult<Vec<WallFace>> {
        let mut faces = Vec::with_capacity(self.lines.len() + self.intersections.len());

        let mut region = [ILLEGAL_INDEX; 2];
        for t in 0..self.lines.len().saturating_sub(1) {
            let line = &self.lines[t];
            for side in 0..2 {
                if line.side.has(side) {
                    region[side] = line.above[side];
                }
            }
            if region != [ILLEGAL_INDEX; 2] {
                self.close_face(region, Start::Pillar(t), &mut faces)?;
            }
        }

        for (q, crossing) in self.intersections.iter().enumerate() {
            let upward = &self.lines[crossing.upward];
            let downward = &self.lines[crossing.downward];
            let mut cells = [ILLEGAL_INDEX; 2];
            for (side, cell) in cells.iter_mut().enumerate() {
                *cell = if upward.side.has(side) {
                    upward.below[side]
                } else {
                    downward.above[side]
                };
            }
            if cells != [ILLEGAL_INDEX; 2] {
                self.close_face(cells, Start::Crossing(q), &mut faces)?;
            }
        }
        Ok(faces)
    }

    fn close_face(&self, cells: [u32; 2], start: Start, faces: &mut Vec<WallFace>) -> TessellationResult<()> {
        let (lower_line, lower_next, upper_line, upper_next) = match start {
            Start::Pillar(t) => (t, self.first[t], t + 1, self.first[t + 1]),
            Start::Crossing(q) => {
                let x = &self.intersections[q];
                (x.downward, x.next_downward, x.upward, x.next_upward)
            }
        };

        let (mut lower, mut upper) = match start {
            Start::Pillar(_) => (vec![self.lines[lower_line].p0], vec![self.lines[upper_line].p0]),
            Start::Crossing(q) => {
                let v = self.intersections[q].vertex;
                (vec![v], vec![v])
            }
        };

        let mut matched = true;
        let lower_end = self.walk(lower_line, lower_next, true, &mut lower, &mut matched)?;
        let upper_end = self.walk(upper_line, upper_next, false, &mut upper, &mut matched)?;

        match (lower_end, upper_end) {
            (End::Pillar(a), End::Pillar(b)) if a <= b => lower.extend(a + 1..b),
            (End::Crossing(a), End::Crossing(b)) if a == b => {}
            _ => {
                return Err(TessellationError::invariant(format!(
                    "wall face chains end apart: {lower_end:?} and {upper_end:?}"
                )))
            }
        }

        let mut vertices = lower;
        for &v in upper.iter().rev() {
            if vertices.last() != Some(&v) {
                vertices.push(v);
            }
        }
        if let Start::Pillar(t) = start {
            let (a, b) = (self.lines[t].p0, self.lines[t + 1].p0);
            vertices.extend((a + 1..b).rev());
        }
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }

        if vertices.len() < 3 {
            debug!(?cells, count = vertices.len(), "Skipping degenerate wall face");
            return Ok(());
        }

        let fault = cells[0] != ILLEGAL_INDEX && cells[1] != ILLEGAL_INDEX && !matched;
        faces.push(WallFace {
            cells,
            fault,
            vertices,
        });
        Ok(())
    }

    /// Follows a boundary chain until it closes the face or reaches `P1`.
    ///
    /// The lower chain closes at a crossing where it is the upward line, the
    /// upper chain where it is the downward line; otherwise the chain turns
    /// onto the crossing line.
    fn walk(
        &self,
        mut line: usize,
        mut next: u32,
        lower: bool,
        out: &mut Vec<u32>,
        matched: &mut bool,
    ) -> TessellationResult<End> {
        for _ in 0..=self.intersections.len() {
            *matched &= self.lines[line].side.is_matched();
            if next == NO_INTERSECTION {
                let p1 = self.lines[line].p1;
                out.push(p1);
                return Ok(End::Pillar(p1));
            }
            let crossing = &self.intersections[next as usize];
            out.push(crossing.vertex);
            if lower == (crossing.upward == line) {
                return Ok(End::Crossing(next));
            }
            line = crossing.partner(line);
            next = crossing.next_on(line);
        }
        Err(TessellationError::invariant(format!(
            "wall chain from line {line} does not terminate"
        )))
    }
}
