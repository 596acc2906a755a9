//! Wiring cost of a unit at a trial pose.

use crate::board::{Pose, Unit};
use crate::connectivity::Connectivity;
use tessera_common::Point;

/// Cost of one connection between `from` and `to`.
///
/// With `dx >= dy` the absolute deltas, the cost is `hypot(dx, 2 * dy)`, so a
/// diagonal run costs more than an axis-aligned one of the same length.
pub fn connection_cost(from: Point, to: Point) -> f64 {
    let mut dx = (from.x - to.x).abs() as f64;
    let mut dy = (from.y - to.y).abs() as f64;
    if dx < dy {
        std::mem::swap(&mut dx, &mut dy);
    }
    dx.hypot(2.0 * dy)
}

/// Summed connection cost of every terminal of `unit` at `pose`.
///
/// Each terminal is paired with the nearest same-net terminal on another
/// unit; terminals without one add nothing.
pub fn ratsnest_cost<C: Connectivity + ?Sized>(connectivity: &C, unit: &Unit, pose: Pose) -> f64 {
    unit.terminals
        .iter()
        .filter_map(|t| {
            let at = pose.apply(t.offset);
            connectivity
                .nearest_same_net_terminal(unit.id, t.net, at)
                .map(|nearest| connection_cost(at, nearest.position))
        })
        .sum()
}
