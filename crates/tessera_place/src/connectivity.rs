//! Net connectivity queries used to rank and score units.
//!
//! The engine only needs three things from a netlist service: a ratsnest
//! refresh, the number of unresolved connections touching a unit, and the
//! nearest terminal on the same net. [`Connectivity`] captures that seam;
//! [`NetConnectivity`] is the default, built from the board itself.

use crate::board::Board;
use petgraph::algo::min_spanning_tree;
use petgraph::data::Element;
use petgraph::graph::UnGraph;
use std::collections::BTreeMap;
use tessera_common::{NetCode, Point, Rect, UnitId};

/// A terminal located on the board.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TerminalRef {
    /// Owning unit.
    pub unit: UnitId,
    /// Index into the unit's terminal list.
    pub terminal: usize,
    /// Board position at the time of the last ratsnest refresh.
    pub position: Point,
}

/// Connectivity queries the placement engine depends on.
pub trait Connectivity {
    /// Rebuilds the ratsnest from the current unit poses.
    ///
    /// Only units whose position lies inside `placement_area` are candidates
    /// for [`nearest_same_net_terminal`](Connectivity::nearest_same_net_terminal).
    fn recalculate_ratsnest(&mut self, board: &Board, placement_area: &Rect);

    /// Number of ratsnest edges with exactly one end on `unit`.
    fn edges_for_unit(&self, unit: UnitId) -> usize;

    /// Nearest terminal on `net` that belongs to a unit other than `unit`.
    ///
    /// Returns `None` for unconnected nets (code `<= 0`) and when no other
    /// unit in the placement area has a terminal on the net.
    fn nearest_same_net_terminal(&self, unit: UnitId, net: NetCode, at: Point) -> Option<TerminalRef>;
}

/// Minimum-spanning-tree ratsnest over the board's own terminals.
#[derive(Debug, Default)]
pub struct NetConnectivity {
    edge_counts: Vec<usize>,
    anchors: BTreeMap<NetCode, Vec<TerminalRef>>,
}

impl NetConnectivity {
    /// Creates an empty provider; call
    /// [`recalculate_ratsnest`](Connectivity::recalculate_ratsnest) before querying.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every terminal on a connected net, grouped by net.
    fn terminals_by_net(board: &Board) -> BTreeMap<NetCode, Vec<TerminalRef>> {
        let mut nets: BTreeMap<NetCode, Vec<TerminalRef>> = BTreeMap::new();
        for unit in &board.units {
            let pose = unit.pose();
            for (i, t) in unit.terminals.iter().enumerate() {
                if !t.net.is_connected() {
                    continue;
                }
                nets.entry(t.net).or_default().push(TerminalRef {
                    unit: unit.id,
                    terminal: i,
                    position: pose.apply(t.offset),
                });
            }
        }
        nets
    }
}

impl Connectivity for NetConnectivity {
    fn recalculate_ratsnest(&mut self, board: &Board, placement_area: &Rect) {
        self.edge_counts = vec![0; board.unit_count()];
        let nets = Self::terminals_by_net(board);

        for terminals in nets.values() {
            if terminals.len() < 2 {
                continue;
            }
            let mut graph = UnGraph::<UnitId, f64>::with_capacity(terminals.len(), 0);
            let nodes: Vec<_> = terminals.iter().map(|t| graph.add_node(t.unit)).collect();
            for i in 0..terminals.len() {
                for j in (i + 1)..terminals.len() {
                    let d = terminals[i].position.distance(terminals[j].position);
                    graph.add_edge(nodes[i], nodes[j], d);
                }
            }
            for element in min_spanning_tree(&graph) {
                if let Element::Edge { source, target, .. } = element {
                    let (a, b) = (terminals[source].unit, terminals[target].unit);
                    if a != b {
                        self.edge_counts[a.index()] += 1;
                        self.edge_counts[b.index()] += 1;
                    }
                }
            }
        }

        self.anchors = nets
            .into_iter()
            .map(|(net, terminals)| {
                let inside = terminals
                    .into_iter()
                    .filter(|t| {
                        board
                            .unit(t.unit)
                            .is_some_and(|u| placement_area.contains(u.position))
                    })
                    .collect();
                (net, inside)
            })
            .collect();
    }

    fn edges_for_unit(&self, unit: UnitId) -> usize {
        self.edge_counts.get(unit.index()).copied().unwrap_or(0)
    }

    fn nearest_same_net_terminal(&self, unit: UnitId, net: NetCode, at: Point) -> Option<TerminalRef> {
        if !net.is_connected() {
            return None;
        }
        self.anchors
            .get(&net)?
            .iter()
            .filter(|t| t.unit != unit)
            .min_by(|a, b| at.distance(a.position).total_cmp(&at.distance(b.position)))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BoardOutline, Terminal, Unit};

    const MM: i64 = 1_000_000;

    fn two_pin(reference: &str, at: Point, nets: [i32; 2]) -> Unit {
        Unit::new(reference, at, Rect::centered(Point::ZERO, 2 * MM, MM)).with_terminals(vec![
            Terminal::new("1", Point::new(-MM, 0), MM / 2, MM / 2).with_net(NetCode::from_raw(nets[0])),
            Terminal::new("2", Point::new(MM, 0), MM / 2, MM / 2).with_net(NetCode::from_raw(nets[1])),
        ])
    }

    fn board() -> Board {
        let mut board = Board::new(BoardOutline::rect(Rect::from_origin_size(
            Point::ZERO,
            50 * MM,
            50 * MM,
        )));
        board.add_unit(two_pin("R1", Point::new(10 * MM, 10 * MM), [1, 2]));
        board.add_unit(two_pin("R2", Point::new(20 * MM, 10 * MM), [2, 3]));
        board.add_unit(two_pin("R3", Point::new(30 * MM, 10 * MM), [3, 0]));
        // Off the board: counted in the ratsnest but never a nearest anchor.
        board.add_unit(two_pin("R4", Point::new(-40 * MM, 10 * MM), [1, 3]));
        board
    }

    fn area(board: &Board) -> Rect {
        board.bounding_box().unwrap()
    }

    #[test]
    fn edge_counts_follow_spanning_tree() {
        let board = board();
        let mut conn = NetConnectivity::new();
        conn.recalculate_ratsnest(&board, &area(&board));
        // Net 1: R1-R4. Net 2: R1-R2. Net 3: R2-R3 and R2-R4.
        assert_eq!(conn.edges_for_unit(UnitId::from_raw(0)), 2);
        assert_eq!(conn.edges_for_unit(UnitId::from_raw(1)), 3);
        assert_eq!(conn.edges_for_unit(UnitId::from_raw(2)), 1);
        assert_eq!(conn.edges_for_unit(UnitId::from_raw(3)), 2);
        assert_eq!(conn.edges_for_unit(UnitId::from_raw(99)), 0);
    }

    #[test]
    fn internal_edges_are_not_counted() {
        let mut board = Board::new(BoardOutline::rect(Rect::from_origin_size(Point::ZERO, 10 * MM, 10 * MM)));
        board.add_unit(two_pin("C1", Point::new(5 * MM, 5 * MM), [4, 4]));
        let mut conn = NetConnectivity::new();
        conn.recalculate_ratsnest(&board, &area(&board));
        assert_eq!(conn.edges_for_unit(UnitId::from_raw(0)), 0);
    }

    #[test]
    fn nearest_excludes_self_and_offboard() {
        let board = board();
        let mut conn = NetConnectivity::new();
        conn.recalculate_ratsnest(&board, &area(&board));

        let hit = conn
            .nearest_same_net_terminal(UnitId::from_raw(2), NetCode::from_raw(3), Point::new(30 * MM, 10 * MM))
            .unwrap();
        assert_eq!(hit.unit, UnitId::from_raw(1));
        assert_eq!(hit.terminal, 1);
        assert_eq!(hit.position, Point::new(21 * MM, 10 * MM));

        // R4 is the only other net-1 terminal but sits off the board.
        assert!(conn
            .nearest_same_net_terminal(UnitId::from_raw(0), NetCode::from_raw(1), Point::ZERO)
            .is_none());
    }

    #[test]
    fn unconnected_net_has_no_neighbour() {
        let board = board();
        let mut conn = NetConnectivity::new();
        conn.recalculate_ratsnest(&board, &area(&board));
        assert!(conn
            .nearest_same_net_terminal(UnitId::from_raw(0), NetCode::UNCONNECTED, Point::ZERO)
            .is_none());
        assert!(conn
            .nearest_same_net_terminal(UnitId::from_raw(0), NetCode::from_raw(77), Point::ZERO)
            .is_none());
    }
}
