//! Exhaustive grid search for the best position of one unit.
//!
//! Every pitch-aligned position whose footprint stays inside the grid bounds
//! is tried, rows outer and columns inner. A legal candidate scores its
//! ratsnest cost plus the keep-out cost under it; the lowest score wins and
//! ties keep the candidate found first.

use crate::board::{Pose, Unit};
use crate::connectivity::Connectivity;
use crate::matrix::{ceil_div, PlacementMatrix};
use crate::ratsnest::ratsnest_cost;
use tessera_common::{Angle, Point};

/// The search found no legal position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// Every candidate was out of the board or overlapped a placed unit.
    #[error("no legal position at orientation {orientation}")]
    NoLegalPosition {
        /// Orientation the search ran at.
        orientation: Angle,
    },
}

/// The winning candidate of a search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// Position and orientation.
    pub pose: Pose,
    /// Ratsnest cost plus keep-out cost.
    pub score: f64,
    /// Ratsnest part of the score.
    pub ratsnest: f64,
    /// Keep-out part of the score.
    pub keep_out: u64,
}

/// Counters gathered while searching, for tracing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Positions enumerated.
    pub tried: usize,
    /// Positions that passed the legality test.
    pub legal: usize,
}

/// First and last trial position per axis, both inclusive.
fn search_range(matrix: &PlacementMatrix, unit: &Unit, orientation: Angle) -> (Point, Point) {
    let rel = unit.footprint_rect_at(Pose::new(Point::ZERO, orientation));
    let bounds = matrix.bounds();
    let pitch = matrix.pitch();
    let start = Point::new(
        bounds.min.x + ceil_div(-rel.min.x, pitch) * pitch,
        bounds.min.y + ceil_div(-rel.min.y, pitch) * pitch,
    );
    let limit = Point::new(bounds.max.x - rel.max.x, bounds.max.y - rel.max.y);
    (start, limit)
}

/// Finds the lowest-scoring legal position for `unit` at `orientation`.
pub fn find_best_position<C: Connectivity + ?Sized>(
    matrix: &PlacementMatrix,
    connectivity: &C,
    unit: &Unit,
    orientation: Angle,
    keep_out_gain: u32,
) -> Result<(Candidate, SearchStats), SearchError> {
    let (start, limit) = search_range(matrix, unit, orientation);
    let pitch = matrix.pitch();
    let check_other_side = unit.has_through_terminals();
    let mut stats = SearchStats::default();
    let mut best: Option<Candidate> = None;

    let mut y = start.y;
    while y <= limit.y {
        let mut x = start.x;
        while x <= limit.x {
            stats.tried += 1;
            let pose = Pose::new(Point::new(x, y), orientation);
            if let Ok(keep_out) = matrix.test_unit_on_board(unit, pose, check_other_side, keep_out_gain) {
                stats.legal += 1;
                let ratsnest = ratsnest_cost(connectivity, unit, pose);
                let score = ratsnest + keep_out as f64;
                if best.map_or(true, |b| score < b.score) {
                    best = Some(Candidate {
                        pose,
                        score,
                        ratsnest,
                        keep_out,
                    });
                }
            }
            x += pitch;
        }
        y += pitch;
    }

    log::trace!(
        "{} at {orientation}: {} of {} positions legal",
        unit.reference,
        stats.legal,
        stats.tried
    );
    best.map(|c| (c, stats))
        .ok_or(SearchError::NoLegalPosition { orientation })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, BoardOutline, Side, Terminal};
    use crate::connectivity::NetConnectivity;
    use crate::matrix::{CellFlags, CellOp};
    use crate::raster::fill_board_zone;
    use tessera_common::{NetCode, Rect};

    const MM: i64 = 1_000_000;

    fn matrix(w: i64, h: i64) -> PlacementMatrix {
        let outline = BoardOutline::rect(Rect::from_origin_size(Point::ZERO, w * MM, h * MM));
        let mut m = PlacementMatrix::new(outline.bounding_box().unwrap(), MM).unwrap();
        fill_board_zone(&mut m, &outline).unwrap();
        m
    }

    fn small(reference: &str) -> Unit {
        Unit::new(
            reference,
            Point::new(-50 * MM, -50 * MM),
            Rect::from_corners(Point::new(-MM, -MM / 2), Point::new(MM, MM / 2)),
        )
    }

    #[test]
    fn range_snaps_to_grid() {
        let m = matrix(10, 10);
        let (start, limit) = search_range(&m, &small("U1"), Angle::ZERO);
        assert_eq!(start, Point::new(MM, MM));
        assert_eq!(limit, Point::new(9 * MM, 19 * MM / 2));
        let (start, limit) = search_range(&m, &small("U1"), Angle::DEG_90);
        assert_eq!(start, Point::new(MM, MM));
        assert_eq!(limit, Point::new(19 * MM / 2, 9 * MM));
    }

    #[test]
    fn first_legal_position_wins_ties() {
        let m = matrix(10, 10);
        let conn = NetConnectivity::new();
        let (best, stats) = find_best_position(&m, &conn, &small("U1"), Angle::ZERO, 16).unwrap();
        assert_eq!(best.pose.position, Point::new(MM, MM));
        assert_eq!(best.score, 0.0);
        assert!(stats.legal > 0 && stats.legal <= stats.tried);
    }

    #[test]
    fn occupied_cells_push_the_unit_along() {
        let mut m = matrix(10, 10);
        let blocked = Rect::from_corners(Point::ZERO, Point::new(3 * MM, 0));
        m.trace_filled_rectangle(&blocked, &[Side::Front], CellFlags::UNIT, CellOp::Or);
        let conn = NetConnectivity::new();
        let (best, _) = find_best_position(&m, &conn, &small("U1"), Angle::ZERO, 16).unwrap();
        // Candidates at y = 1 reach row 0 once grown by half a pitch, so the
        // first one clear of columns 0..=3 wins.
        assert_eq!(best.pose.position, Point::new(5 * MM, MM));
    }

    #[test]
    fn keep_out_cost_is_avoided() {
        let mut m = matrix(10, 10);
        m.create_keep_out_rectangle(
            &Rect::from_corners(Point::ZERO, Point::new(10 * MM, 3 * MM)),
            0,
            500,
            &Side::ALL,
        );
        let conn = NetConnectivity::new();
        let (best, _) = find_best_position(&m, &conn, &small("U1"), Angle::ZERO, 16).unwrap();
        // Rows 0 to 3 carry the band's full cost.
        assert_eq!(best.keep_out, 0);
        assert_eq!(best.pose.position, Point::new(MM, 4 * MM));
    }

    #[test]
    fn connected_unit_moves_towards_its_net() {
        let mut board = Board::new(BoardOutline::rect(Rect::from_origin_size(
            Point::ZERO,
            20 * MM,
            20 * MM,
        )));
        board.add_unit(
            Unit::new("J1", Point::new(15 * MM, 15 * MM), Rect::centered(Point::ZERO, MM, MM))
                .with_terminals(vec![Terminal::new("1", Point::ZERO, MM, MM).with_net(NetCode::from_raw(3))]),
        );
        let unit = small("R1").with_terminals(vec![
            Terminal::new("1", Point::ZERO, MM / 2, MM / 2).with_net(NetCode::from_raw(3))
        ]);
        let mut conn = NetConnectivity::new();
        conn.recalculate_ratsnest(&board, &board.bounding_box().unwrap());
        let m = matrix(20, 20);
        let (best, _) = find_best_position(&m, &conn, &unit, Angle::ZERO, 16).unwrap();
        assert_eq!(best.pose.position, Point::new(15 * MM, 15 * MM));
        assert_eq!(best.ratsnest, 0.0);
    }

    #[test]
    fn oversized_unit_has_no_position() {
        let m = matrix(10, 10);
        let huge = Unit::new("U9", Point::ZERO, Rect::centered(Point::ZERO, 20 * MM, 20 * MM));
        let conn = NetConnectivity::new();
        assert_eq!(
            find_best_position(&m, &conn, &huge, Angle::DEG_90, 16),
            Err(SearchError::NoLegalPosition {
                orientation: Angle::DEG_90
            })
        );
    }
}
