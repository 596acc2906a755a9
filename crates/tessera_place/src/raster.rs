//! Scanline fill of the board outline into the occupancy grid.
//!
//! Each grid row is bounded by two horizontal scanlines: its top edge and its
//! bottom edge. Both are intersected with every outline edge under a
//! half-open rule, so a vertex shared by two edges is counted exactly once.
//! A cell is inside the board when its full horizontal span lies inside an
//! odd-even interval of both scanlines. For a rectangle of width `W` and
//! height `H` at pitch `P` that is exactly `floor(W/P) * floor(H/P)` cells.

use crate::board::{BoardOutline, Side};
use crate::matrix::{CellFlags, CellOp, PlacementMatrix};
use tessera_common::Point;

/// Errors from rasterizing a board outline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RasterError {
    /// A scanline crossed the outline an odd number of times, so the outline
    /// is not a set of closed contours.
    #[error("scanline at grid row {row} crosses the board outline {crossings} times")]
    OddCrossings {
        /// Grid row whose scanline failed.
        row: usize,
        /// Number of crossings found.
        crossings: usize,
    },
}

/// Which end of an edge's y extent a scanline may touch.
#[derive(Clone, Copy)]
enum Scanline {
    /// `min <= y < max`: the top edge of a row.
    Top,
    /// `min < y <= max`: the bottom edge of a row.
    Bottom,
}

impl Scanline {
    fn crosses(self, y: i64, a: Point, b: Point) -> bool {
        let (min, max) = (a.y.min(b.y), a.y.max(b.y));
        match self {
            Scanline::Top => min <= y && y < max,
            Scanline::Bottom => min < y && y <= max,
        }
    }
}

/// Sorted x coordinates where the line at `y` crosses the outline.
fn crossings(outline: &BoardOutline, y: i64, rule: Scanline) -> Vec<f64> {
    let mut xs: Vec<f64> = outline
        .contours
        .iter()
        .flat_map(|c| c.edges())
        .filter(|&(a, b)| a.y != b.y && rule.crosses(y, a, b))
        .map(|(a, b)| {
            let t = (y - a.y) as f64 / (b.y - a.y) as f64;
            a.x as f64 + t * (b.x - a.x) as f64
        })
        .collect();
    xs.sort_by(f64::total_cmp);
    xs
}

fn covers(intervals: &[f64], x0: f64, x1: f64) -> bool {
    intervals
        .chunks_exact(2)
        .any(|pair| pair[0] <= x0 && x1 <= pair[1])
}

/// Marks every cell inside `outline` as [`CellFlags::ZONE`] on both sides.
///
/// Returns the number of cells marked per side. On an odd crossing count the
/// fill stops at the offending row; rows above it stay marked.
///
/// A cell is inside only when its whole square `[c·P, (c+1)·P]` is, while
/// legality looks at sample points. When the board width or height is not a
/// multiple of the pitch, the last partial column or row has its sample
/// inside the board yet stays outside the zone. Units may then touch the
/// left and top edges but end up to one pitch short of the right and bottom
/// ones.
pub fn fill_board_zone(
    matrix: &mut PlacementMatrix,
    outline: &BoardOutline,
) -> Result<usize, RasterError> {
    let origin = matrix.origin();
    let pitch = matrix.pitch();
    let mut marked = 0;

    for row in 0..matrix.rows() {
        let top_y = origin.y + row as i64 * pitch;
        let mut bounds = [Vec::new(), Vec::new()];
        for (slot, (y, rule)) in [(top_y, Scanline::Top), (top_y + pitch, Scanline::Bottom)]
            .into_iter()
            .enumerate()
        {
            let xs = crossings(outline, y, rule);
            if xs.len() % 2 != 0 {
                log::warn!("outline scanline y={y} has {} crossings", xs.len());
                return Err(RasterError::OddCrossings {
                    row,
                    crossings: xs.len(),
                });
            }
            bounds[slot] = xs;
        }
        if bounds.iter().any(Vec::is_empty) {
            continue;
        }

        for col in 0..matrix.cols() {
            let x0 = (origin.x + col as i64 * pitch) as f64;
            let x1 = x0 + pitch as f64;
            if covers(&bounds[0], x0, x1) && covers(&bounds[1], x0, x1) {
                for side in Side::ALL {
                    matrix.apply_cell(row, col, side, CellFlags::ZONE, CellOp::Or);
                }
                marked += 1;
            }
        }
    }

    log::debug!(
        "rasterized outline: {marked} of {} cells inside",
        matrix.rows() * matrix.cols()
    );
    Ok(marked)
}
