//! Board model consumed and mutated by the placement engine.
//!
//! A [`Board`] is an outline made of closed contours, a list of graphic
//! [`Drawing`]s that become obstacles, and the placeable [`Unit`]s. Unit
//! geometry is stored in local coordinates and evaluated at an explicit
//! [`Pose`], so trial orientations never mutate the board.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use tessera_common::{Angle, NetCode, Point, Rect, UnitId};

/// One of the two board sides a unit can be mounted on.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Top copper side.
    #[default]
    Front,
    /// Bottom copper side.
    Back,
}

impl Side {
    /// Both sides, front first.
    pub const ALL: [Side; 2] = [Side::Front, Side::Back];

    /// Returns the other side.
    pub fn opposite(self) -> Side {
        match self {
            Side::Front => Side::Back,
            Side::Back => Side::Front,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Side::Front => 0,
            Side::Back => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Front => write!(f, "front"),
            Side::Back => write!(f, "back"),
        }
    }
}

/// How freely a unit may be rotated by a given quarter or half turn.
///
/// Serialized as the 0..=10 cost class: `0` forbids the rotation, `10`
/// allows it for free, and classes in between scale the trial's score by
/// [`penalty_factor`](RotationCost::penalty_factor).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RotationCost {
    /// The rotation is never tried.
    #[default]
    Forbidden,
    /// The rotation is tried with a penalty; the class is in `1..=9`.
    Penalized(u8),
    /// The rotation is tried without penalty.
    Free,
}

/// A rotation cost class outside `0..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("rotation cost class must be between 0 and 10, got {0}")]
pub struct InvalidRotationCost(pub u8);

impl RotationCost {
    /// Returns whether the rotation may be tried at all.
    pub fn is_allowed(self) -> bool {
        !matches!(self, RotationCost::Forbidden)
    }

    /// Multiplier applied to a rotated trial's score, or `None` if forbidden.
    ///
    /// Falls linearly from 1.9 at class 1 to 1.0 for [`Free`](RotationCost::Free).
    pub fn penalty_factor(self) -> Option<f64> {
        match self {
            RotationCost::Forbidden => None,
            RotationCost::Penalized(class) => Some(2.0 - 0.1 * f64::from(class)),
            RotationCost::Free => Some(1.0),
        }
    }
}

impl TryFrom<u8> for RotationCost {
    type Error = InvalidRotationCost;

    fn try_from(class: u8) -> Result<Self, Self::Error> {
        match class {
            0 => Ok(RotationCost::Forbidden),
            1..=9 => Ok(RotationCost::Penalized(class)),
            10 => Ok(RotationCost::Free),
            _ => Err(InvalidRotationCost(class)),
        }
    }
}

impl From<RotationCost> for u8 {
    fn from(cost: RotationCost) -> u8 {
        match cost {
            RotationCost::Forbidden => 0,
            RotationCost::Penalized(class) => class,
            RotationCost::Free => 10,
        }
    }
}

/// Pad outline shape.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminalShape {
    /// Round pad; the diameter is the larger of width and height.
    Circle,
    /// Rectangular pad.
    #[default]
    Rect,
    /// Stadium-shaped pad, treated as its bounding rectangle.
    Oval,
}

/// A connection point (pad) on a unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Terminal {
    /// Pad name, e.g. `"1"` or `"A3"`.
    pub name: String,
    /// Centre relative to the unit origin at zero orientation.
    pub offset: Point,
    /// Width along the unit's local x axis.
    pub width: i64,
    /// Height along the unit's local y axis.
    pub height: i64,
    /// Outline shape.
    #[serde(default)]
    pub shape: TerminalShape,
    /// Net the pad belongs to.
    #[serde(default)]
    pub net: NetCode,
    /// Whether the pad is plated through and present on both sides.
    #[serde(default)]
    pub through: bool,
    /// Pad-specific clearance.
    #[serde(default)]
    pub clearance: i64,
}

impl Terminal {
    /// Creates a surface-mount rectangular pad on no net.
    pub fn new(name: impl Into<String>, offset: Point, width: i64, height: i64) -> Self {
        Self {
            name: name.into(),
            offset,
            width,
            height,
            shape: TerminalShape::Rect,
            net: NetCode::UNCONNECTED,
            through: false,
            clearance: 0,
        }
    }

    /// Returns a copy on the given net.
    pub fn with_net(mut self, net: NetCode) -> Self {
        self.net = net;
        self
    }

    /// Returns a copy marked as plated through.
    pub fn through_hole(mut self) -> Self {
        self.through = true;
        self
    }

    /// Local pad rectangle at zero orientation.
    pub fn local_rect(&self) -> Rect {
        Rect::centered(self.offset, self.width, self.height)
    }
}

/// A position and orientation a unit is evaluated or committed at.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Pose {
    /// Board position of the unit origin.
    pub position: Point,
    /// Rotation about the unit origin.
    pub orientation: Angle,
}

impl Pose {
    /// Creates a new pose.
    pub fn new(position: Point, orientation: Angle) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Maps a local point to board coordinates.
    pub fn apply(&self, local: Point) -> Point {
        self.position + self.orientation.rotate(local)
    }

    /// Bounding box of a local rectangle mapped to board coordinates.
    pub fn apply_rect(&self, local: &Rect) -> Rect {
        let [a, b, c, d] = local.corners().map(|p| self.apply(p));
        Rect::from_corners(a, c).union_point(b).union_point(d)
    }
}

/// A placeable footprint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Index of the unit on its board, reassigned on load.
    #[serde(default = "unassigned_id")]
    pub id: UnitId,
    /// Reference designator, e.g. `"U3"`.
    pub reference: String,
    /// Board position of the unit origin.
    pub position: Point,
    /// Current rotation.
    #[serde(default)]
    pub orientation: Angle,
    /// Mounting side.
    #[serde(default)]
    pub side: Side,
    /// Body outline in local coordinates.
    pub body: Rect,
    /// Courtyard polygon in local coordinates, when the footprint has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub courtyard: Option<Vec<Point>>,
    /// Pads.
    #[serde(default)]
    pub terminals: Vec<Terminal>,
    /// Cost class for quarter-turn trials.
    #[serde(default)]
    pub rotation_90: RotationCost,
    /// Cost class for the half-turn trial.
    #[serde(default)]
    pub rotation_180: RotationCost,
    /// Set for units the current run still has to place.
    #[serde(default)]
    pub needs_placed: bool,
    /// Set once a run has committed the unit.
    #[serde(default)]
    pub is_placed: bool,
}

fn unassigned_id() -> UnitId {
    UnitId::from_raw(u32::MAX)
}

impl Unit {
    /// Creates a front-side unit with no terminals and rotation forbidden.
    pub fn new(reference: impl Into<String>, position: Point, body: Rect) -> Self {
        Self {
            id: unassigned_id(),
            reference: reference.into(),
            position,
            orientation: Angle::ZERO,
            side: Side::Front,
            body,
            courtyard: None,
            terminals: Vec::new(),
            rotation_90: RotationCost::Forbidden,
            rotation_180: RotationCost::Forbidden,
            needs_placed: false,
            is_placed: false,
        }
    }

    /// Returns a copy with the given terminals.
    pub fn with_terminals(mut self, terminals: Vec<Terminal>) -> Self {
        self.terminals = terminals;
        self
    }

    /// Returns a copy with the given rotation cost classes.
    pub fn with_rotation(mut self, rotation_90: RotationCost, rotation_180: RotationCost) -> Self {
        self.rotation_90 = rotation_90;
        self.rotation_180 = rotation_180;
        self
    }

    /// Returns a copy mounted on `side`.
    pub fn on_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    /// The unit's current pose.
    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.orientation)
    }

    /// Moves and rotates the unit.
    pub fn set_pose(&mut self, pose: Pose) {
        self.position = pose.position;
        self.orientation = pose.orientation;
    }

    /// Board position of terminal `index` at `pose`.
    pub fn terminal_position(&self, index: usize, pose: Pose) -> Option<Point> {
        self.terminals.get(index).map(|t| pose.apply(t.offset))
    }

    /// Bounding rectangle of a terminal at `pose`.
    pub fn terminal_rect(&self, terminal: &Terminal, pose: Pose) -> Rect {
        pose.apply_rect(&terminal.local_rect())
    }

    /// Bounding rectangle of body and terminals at `pose`.
    pub fn footprint_rect_at(&self, pose: Pose) -> Rect {
        self.terminals
            .iter()
            .fold(pose.apply_rect(&self.body), |acc, t| {
                acc.union(&self.terminal_rect(t, pose))
            })
    }

    /// Footprint rectangle at the current pose.
    pub fn footprint_rect(&self) -> Rect {
        self.footprint_rect_at(self.pose())
    }

    /// Footprint area at the current orientation, used for selection priority.
    pub fn area(&self) -> f64 {
        self.footprint_rect().area()
    }

    /// Courtyard polygon mapped to board coordinates at `pose`.
    pub fn courtyard_at(&self, pose: Pose) -> Option<Vec<Point>> {
        self.courtyard
            .as_ref()
            .map(|pts| pts.iter().map(|&p| pose.apply(p)).collect())
    }

    /// Returns whether any terminal reaches the opposite side.
    pub fn has_through_terminals(&self) -> bool {
        self.terminals.iter().any(|t| t.through)
    }
}

/// One closed (or, when malformed, open) outline chain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    /// Vertices in order.
    pub points: Vec<Point>,
    /// Whether the last vertex connects back to the first.
    #[serde(default = "default_closed")]
    pub closed: bool,
}

fn default_closed() -> bool {
    true
}

impl Contour {
    /// Creates a closed contour.
    pub fn closed(points: Vec<Point>) -> Self {
        Self {
            points,
            closed: true,
        }
    }

    /// Creates an open chain.
    pub fn open(points: Vec<Point>) -> Self {
        Self {
            points,
            closed: false,
        }
    }

    /// Iterates over the edges, including the closing edge of a closed contour.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.points.len();
        let count = match (self.closed, n) {
            (_, 0 | 1) => 0,
            (true, _) => n,
            (false, _) => n - 1,
        };
        (0..count).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }
}

/// The board outline: every contour on the edge-cuts layer.
///
/// Contours nest by the odd-even rule, so cut-outs are simply further
/// contours inside the outer one.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardOutline {
    /// Outline contours.
    pub contours: Vec<Contour>,
}

impl BoardOutline {
    /// A rectangular outline.
    pub fn rect(rect: Rect) -> Self {
        Self {
            contours: vec![Contour::closed(rect.corners().to_vec())],
        }
    }

    /// Bounding box of all contour vertices, or `None` if there are none.
    pub fn bounding_box(&self) -> Option<Rect> {
        Rect::bounding(self.contours.iter().flat_map(|c| c.points.iter().copied()))
    }
}

/// Layer a graphic drawing lives on.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawingLayer {
    /// Board edge; already part of the outline and never an obstacle.
    EdgeCuts,
    /// Front-side graphics.
    Front,
    /// Back-side graphics.
    Back,
    /// Any other layer; blocks both sides.
    Other,
}

impl DrawingLayer {
    /// Sides a drawing on this layer blocks.
    pub fn blocked_sides(self) -> &'static [Side] {
        match self {
            DrawingLayer::EdgeCuts => &[],
            DrawingLayer::Front => &[Side::Front],
            DrawingLayer::Back => &[Side::Back],
            DrawingLayer::Other => &Side::ALL,
        }
    }
}

/// Geometry of a graphic drawing. All shapes are stroked, not filled.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawingShape {
    /// Straight line.
    Segment {
        /// Start point.
        start: Point,
        /// End point.
        end: Point,
    },
    /// Rectangle outline.
    Rect {
        /// The rectangle.
        rect: Rect,
    },
    /// Circle outline.
    Circle {
        /// Centre.
        center: Point,
        /// Radius.
        radius: i64,
    },
    /// Circular arc swept counter-clockwise from `start` by `sweep`.
    Arc {
        /// Centre.
        center: Point,
        /// Start point on the arc.
        start: Point,
        /// Sweep angle.
        sweep: Angle,
    },
    /// Open polyline.
    Polyline {
        /// Vertices in order.
        points: Vec<Point>,
    },
}

/// A graphic item that becomes a placement obstacle unless on the edge layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    /// Layer.
    pub layer: DrawingLayer,
    /// Geometry.
    pub shape: DrawingShape,
    /// Stroke width.
    #[serde(default)]
    pub width: i64,
}

/// A board: outline, obstacle drawings and units.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Board {
    /// Edge-cuts outline.
    pub outline: BoardOutline,
    /// Graphic drawings.
    #[serde(default)]
    pub drawings: Vec<Drawing>,
    /// Placeable units, indexed by [`UnitId`].
    #[serde(default, deserialize_with = "deserialize_units")]
    pub units: Vec<Unit>,
}

/// Deserializes the unit list and renumbers ids to match list positions.
fn deserialize_units<'de, D>(deserializer: D) -> Result<Vec<Unit>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut units = Vec::<Unit>::deserialize(deserializer)?;
    for (i, unit) in units.iter_mut().enumerate() {
        unit.id = UnitId::from_raw(i as u32);
    }
    Ok(units)
}

impl Board {
    /// Creates a board with the given outline and nothing on it.
    pub fn new(outline: BoardOutline) -> Self {
        Self {
            outline,
            drawings: Vec::new(),
            units: Vec::new(),
        }
    }

    /// Adds a unit and returns its id.
    pub fn add_unit(&mut self, mut unit: Unit) -> UnitId {
        let id = UnitId::from_raw(self.units.len() as u32);
        unit.id = id;
        self.units.push(unit);
        id
    }

    /// Adds a drawing.
    pub fn add_drawing(&mut self, drawing: Drawing) {
        self.drawings.push(drawing);
    }

    /// Returns the unit with the given id.
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(id.index())
    }

    /// Returns a mutable reference to the unit with the given id.
    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(id.index())
    }

    /// Finds a unit by reference designator.
    pub fn find_unit(&self, reference: &str) -> Option<UnitId> {
        self.units
            .iter()
            .find(|u| u.reference == reference)
            .map(|u| u.id)
    }

    /// Bounding box of the edge-cuts outline.
    pub fn bounding_box(&self) -> Option<Rect> {
        self.outline.bounding_box()
    }

    /// Number of units.
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mm(v: f64) -> i64 {
        tessera_common::mm_to_iu(v)
    }

    fn resistor() -> Unit {
        Unit::new(
            "R1",
            Point::new(mm(10.0), mm(10.0)),
            Rect::from_corners(Point::new(-mm(1.0), -mm(0.5)), Point::new(mm(1.0), mm(0.5))),
        )
        .with_terminals(vec![
            Terminal::new("1", Point::new(-mm(1.5), 0), mm(1.0), mm(1.0)),
            Terminal::new("2", Point::new(mm(1.5), 0), mm(1.0), mm(1.0)),
        ])
    }

    #[test]
    fn rotation_cost_classes() {
        assert_eq!(RotationCost::try_from(0), Ok(RotationCost::Forbidden));
        assert_eq!(RotationCost::try_from(4), Ok(RotationCost::Penalized(4)));
        assert_eq!(RotationCost::try_from(10), Ok(RotationCost::Free));
        assert_eq!(RotationCost::try_from(11), Err(InvalidRotationCost(11)));
        assert_eq!(u8::from(RotationCost::Penalized(7)), 7);
    }

    #[test]
    fn penalty_factors() {
        assert_eq!(RotationCost::Forbidden.penalty_factor(), None);
        assert_eq!(RotationCost::Free.penalty_factor(), Some(1.0));
        let f = RotationCost::Penalized(5).penalty_factor().unwrap();
        assert!((f - 1.5).abs() < 1e-12);
        assert!(!RotationCost::Forbidden.is_allowed());
        assert!(RotationCost::Penalized(1).is_allowed());
    }

    #[test]
    fn rotation_cost_serde_as_class() {
        let json = serde_json::to_string(&RotationCost::Penalized(3)).unwrap();
        assert_eq!(json, "3");
        assert!(serde_json::from_str::<RotationCost>("12").is_err());
    }

    #[test]
    fn footprint_rect_includes_terminals() {
        let unit = resistor();
        let rect = unit.footprint_rect();
        assert_eq!(rect.min, Point::new(mm(8.0), mm(9.5)));
        assert_eq!(rect.max, Point::new(mm(12.0), mm(10.5)));
    }

    #[test]
    fn footprint_rect_rotated_quarter_turn() {
        let unit = resistor();
        let pose = Pose::new(Point::ZERO, Angle::DEG_90);
        let rect = unit.footprint_rect_at(pose);
        assert_eq!(rect.width(), mm(1.0));
        assert_eq!(rect.height(), mm(4.0));
        assert_eq!(
            unit.terminal_position(1, pose),
            Some(Point::new(0, mm(1.5)))
        );
    }

    #[test]
    fn contour_edges() {
        let pts = vec![Point::new(0, 0), Point::new(10, 0), Point::new(10, 10)];
        assert_eq!(Contour::closed(pts.clone()).edges().count(), 3);
        assert_eq!(Contour::open(pts).edges().count(), 2);
        assert_eq!(Contour::closed(vec![Point::ZERO]).edges().count(), 0);
    }

    #[test]
    fn add_unit_assigns_ids() {
        let mut board = Board::new(BoardOutline::rect(Rect::from_origin_size(
            Point::ZERO,
            mm(20.0),
            mm(10.0),
        )));
        let a = board.add_unit(resistor());
        let b = board.add_unit(resistor());
        assert_eq!(a, UnitId::from_raw(0));
        assert_eq!(b, UnitId::from_raw(1));
        assert_eq!(board.unit(b).map(|u| u.id), Some(b));
        assert_eq!(board.find_unit("R1"), Some(a));
        assert_eq!(
            board.bounding_box(),
            Some(Rect::from_origin_size(Point::ZERO, mm(20.0), mm(10.0)))
        );
    }

    #[test]
    fn json_load_renumbers_units() {
        let json = r#"{
            "outline": { "contours": [ { "points": [
                {"x": 0, "y": 0}, {"x": 1000, "y": 0}, {"x": 1000, "y": 1000}
            ] } ] },
            "units": [
                { "id": 7, "reference": "U1", "position": {"x": 0, "y": 0},
                  "body": {"min": {"x": -1, "y": -1}, "max": {"x": 1, "y": 1}} },
                { "reference": "U2", "position": {"x": 5, "y": 5},
                  "body": {"min": {"x": -1, "y": -1}, "max": {"x": 1, "y": 1}},
                  "rotation_90": 10, "side": "back" }
            ]
        }"#;
        let board: Board = serde_json::from_str(json).unwrap();
        assert!(board.outline.contours[0].closed);
        assert_eq!(board.units[0].id, UnitId::from_raw(0));
        assert_eq!(board.units[1].id, UnitId::from_raw(1));
        assert_eq!(board.units[1].rotation_90, RotationCost::Free);
        assert_eq!(board.units[1].side, Side::Back);
        assert_eq!(board.units[0].rotation_180, RotationCost::Forbidden);
    }

    #[test]
    fn drawing_shapes_are_tagged() {
        let d = Drawing {
            layer: DrawingLayer::Other,
            shape: DrawingShape::Circle {
                center: Point::new(1, 2),
                radius: 3,
            },
            width: 1,
        };
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.contains("\"kind\":\"circle\""));
        assert!(json.contains("\"layer\":\"other\""));
        let back: Drawing = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
        assert!(DrawingLayer::EdgeCuts.blocked_sides().is_empty());
        assert_eq!(DrawingLayer::Other.blocked_sides().len(), 2);
    }
}
