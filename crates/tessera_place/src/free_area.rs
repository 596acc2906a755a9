//! Polygonal record of the board area still free on each side.
//!
//! The tracker never decides legality; it follows the grid so a caller can
//! draw what space is left after each commit.

use crate::board::{BoardOutline, Pose, Side, Unit};
use geo::{Area, BooleanOps, Coord, LineString, MultiPolygon, Polygon};
use tessera_common::{Point, Rect};

fn coord(p: Point) -> Coord<f64> {
    Coord {
        x: p.x as f64,
        y: p.y as f64,
    }
}

fn polygon(points: &[Point]) -> Option<MultiPolygon<f64>> {
    if points.len() < 3 {
        return None;
    }
    let ring = LineString::new(points.iter().copied().map(coord).collect());
    Some(Polygon::new(ring, vec![]).into())
}

fn rect_polygon(rect: &Rect) -> MultiPolygon<f64> {
    geo::Rect::new(coord(rect.min), coord(rect.max)).to_polygon().into()
}

/// Per-side polygon sets.
#[derive(Clone, Debug, PartialEq)]
pub struct SideAreas {
    front: MultiPolygon<f64>,
    back: MultiPolygon<f64>,
}

impl Default for SideAreas {
    fn default() -> Self {
        Self {
            front: MultiPolygon::new(vec![]),
            back: MultiPolygon::new(vec![]),
        }
    }
}

impl SideAreas {
    /// Polygons on one side.
    pub fn side(&self, side: Side) -> &MultiPolygon<f64> {
        match side {
            Side::Front => &self.front,
            Side::Back => &self.back,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut MultiPolygon<f64> {
        match side {
            Side::Front => &mut self.front,
            Side::Back => &mut self.back,
        }
    }

    fn add(&mut self, side: Side, shape: &MultiPolygon<f64>) {
        let merged = self.side(side).union(shape);
        *self.side_mut(side) = merged;
    }

    /// Total area on one side, in square internal units.
    pub fn area(&self, side: Side) -> f64 {
        self.side(side).unsigned_area()
    }
}

/// The area each unit occupies, per side, with clearance.
///
/// Covers the courtyard on the unit's side, the footprint rectangle grown by
/// `pitch / 2 + clearance` on the unit's side, and every terminal grown by
/// `pitch / 2` plus its own clearance on the sides it reaches.
pub fn build_unit_areas(unit: &Unit, pose: Pose, clearance: i64, pitch: i64) -> SideAreas {
    let mut areas = SideAreas::default();
    if let Some(courtyard) = unit.courtyard_at(pose).as_deref().and_then(polygon) {
        areas.add(unit.side, &courtyard);
    }
    let body = unit.footprint_rect_at(pose).inflate(pitch / 2 + clearance);
    areas.add(unit.side, &rect_polygon(&body));

    for terminal in &unit.terminals {
        let rect = unit
            .terminal_rect(terminal, pose)
            .inflate(pitch / 2 + terminal.clearance);
        let shape = rect_polygon(&rect);
        if terminal.through {
            for side in Side::ALL {
                areas.add(side, &shape);
            }
        } else {
            areas.add(unit.side, &shape);
        }
    }
    areas
}

/// Free board area on both sides.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FreeArea {
    areas: SideAreas,
}

impl FreeArea {
    /// Starts from the board outline; nested contours cut holes.
    pub fn from_outline(outline: &BoardOutline) -> Self {
        let board = outline
            .contours
            .iter()
            .filter(|c| c.closed)
            .filter_map(|c| polygon(&c.points))
            .fold(MultiPolygon::new(vec![]), |acc, p| acc.xor(&p));
        Self {
            areas: SideAreas {
                front: board.clone(),
                back: board,
            },
        }
    }

    /// Free polygons on one side.
    pub fn side(&self, side: Side) -> &MultiPolygon<f64> {
        self.areas.side(side)
    }

    /// Free area on one side, in square internal units.
    pub fn area(&self, side: Side) -> f64 {
        self.areas.area(side)
    }

    /// Removes a unit's occupied areas.
    pub fn subtract(&mut self, occupied: &SideAreas) {
        for side in Side::ALL {
            let rest = self.side(side).difference(occupied.side(side));
            *self.areas.side_mut(side) = rest;
        }
    }
}
