//! The placement occupancy grid.
//!
//! [`PlacementMatrix`] is a dense two-sided grid laid over the board bounding
//! box. Every cell carries a [`CellFlags`] bitmask and a keep-out cost
//! accumulator. Cell `(row, col)` samples the board point
//! `origin + (col * pitch, row * pitch)`: a rectangle covers exactly the cells
//! whose sample point lies inside it (edges included).

use crate::board::{Drawing, DrawingShape, Pose, Side, Terminal, TerminalShape, Unit};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign, BitXor, Not};
use tessera_common::{Angle, Point, Rect};

/// Obstacle bits stored in a grid cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellFlags(u8);

impl CellFlags {
    /// No flags.
    pub const EMPTY: CellFlags = CellFlags(0);
    /// A hole or graphic obstacle.
    pub const HOLE: CellFlags = CellFlags(0x01);
    /// Covered by a placed unit.
    pub const UNIT: CellFlags = CellFlags(0x02);
    /// On a board edge or graphic line.
    pub const EDGE: CellFlags = CellFlags(0x20);
    /// Same-net neighbour.
    pub const FRIEND: CellFlags = CellFlags(0x40);
    /// Inside the board outline.
    pub const ZONE: CellFlags = CellFlags(0x80);

    const NAMES: [(CellFlags, &'static str); 5] = [
        (CellFlags::HOLE, "HOLE"),
        (CellFlags::UNIT, "UNIT"),
        (CellFlags::EDGE, "EDGE"),
        (CellFlags::FRIEND, "FRIEND"),
        (CellFlags::ZONE, "ZONE"),
    ];

    /// Creates flags from raw bits.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns whether every bit of `other` is set.
    pub const fn contains(self, other: CellFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns whether any bit of `other` is set.
    pub const fn intersects(self, other: CellFlags) -> bool {
        self.0 & other.0 != 0
    }

    /// Returns whether no bit is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns whether a unit may be placed over this cell.
    pub const fn is_free(self) -> bool {
        self.contains(CellFlags::ZONE) && !self.intersects(CellFlags::UNIT)
    }
}

impl BitOr for CellFlags {
    type Output = CellFlags;

    fn bitor(self, rhs: CellFlags) -> CellFlags {
        CellFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for CellFlags {
    fn bitor_assign(&mut self, rhs: CellFlags) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for CellFlags {
    type Output = CellFlags;

    fn bitand(self, rhs: CellFlags) -> CellFlags {
        CellFlags(self.0 & rhs.0)
    }
}

impl BitXor for CellFlags {
    type Output = CellFlags;

    fn bitxor(self, rhs: CellFlags) -> CellFlags {
        CellFlags(self.0 ^ rhs.0)
    }
}

impl Not for CellFlags {
    type Output = CellFlags;

    fn not(self) -> CellFlags {
        CellFlags(!self.0)
    }
}

impl fmt::Debug for CellFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "CellFlags(EMPTY)");
        }
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "CellFlags({})", names.join(" | "))
    }
}

/// How new flags combine with a cell's existing flags.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CellOp {
    /// Replace the cell.
    Write,
    /// Set the given bits.
    Or,
    /// Toggle the given bits.
    Xor,
    /// Keep only the given bits.
    And,
}

impl CellOp {
    fn apply(self, cell: CellFlags, flags: CellFlags) -> CellFlags {
        match self {
            CellOp::Write => flags,
            CellOp::Or => cell | flags,
            CellOp::Xor => cell ^ flags,
            CellOp::And => cell & flags,
        }
    }
}

/// An inclusive block of grid cells.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CellRange {
    /// First row.
    pub row_min: usize,
    /// Last row.
    pub row_max: usize,
    /// First column.
    pub col_min: usize,
    /// Last column.
    pub col_max: usize,
}

impl CellRange {
    /// Iterates the cells row by row.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let (col_min, col_max) = (self.col_min, self.col_max);
        (self.row_min..=self.row_max)
            .flat_map(move |row| (col_min..=col_max).map(move |col| (row, col)))
    }

    /// Number of cells in the block.
    pub fn cell_count(&self) -> usize {
        (self.row_max - self.row_min + 1) * (self.col_max - self.col_min + 1)
    }
}

pub(crate) fn floor_div(a: i64, b: i64) -> i64 {
    a.div_euclid(b)
}

pub(crate) fn ceil_div(a: i64, b: i64) -> i64 {
    -(-a).div_euclid(b)
}

/// Distance from `p` to the segment `a`-`b`.
fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let (px, py) = (p.x as f64, p.y as f64);
    let (ax, ay) = (a.x as f64, a.y as f64);
    let (dx, dy) = ((b.x - a.x) as f64, (b.y - a.y) as f64);
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return (px - ax).hypot(py - ay);
    }
    let t = (((px - ax) * dx + (py - ay) * dy) / len2).clamp(0.0, 1.0);
    (px - (ax + t * dx)).hypot(py - (ay + t * dy))
}

/// Sweep step used to break arcs into segments, in tenths of a degree.
const ARC_STEP_DECIDEGREES: i32 = 100;

/// A dense occupancy and keep-out cost grid over the board, one layer per side.
#[derive(Clone, Debug)]
pub struct PlacementMatrix {
    origin: Point,
    pitch: i64,
    rows: usize,
    cols: usize,
    cells: [Vec<CellFlags>; 2],
    cost: [Vec<u32>; 2],
}

impl PlacementMatrix {
    /// Sizes a grid over `bbox` with the given pitch.
    ///
    /// Returns `None` when the box has zero width or height or the pitch is
    /// not positive. The grid has `ceil(width / pitch)` columns and
    /// `ceil(height / pitch)` rows, all cells cleared.
    pub fn new(bbox: Rect, pitch: i64) -> Option<Self> {
        if bbox.is_degenerate() || pitch <= 0 {
            return None;
        }
        let cols = ceil_div(bbox.width(), pitch) as usize;
        let rows = ceil_div(bbox.height(), pitch) as usize;
        let n = rows * cols;
        Some(Self {
            origin: bbox.min,
            pitch,
            rows,
            cols,
            cells: [vec![CellFlags::EMPTY; n], vec![CellFlags::EMPTY; n]],
            cost: [vec![0; n], vec![0; n]],
        })
    }

    /// Board coordinate of cell `(0, 0)`.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Cell edge length.
    pub fn pitch(&self) -> i64 {
        self.pitch
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The board area the grid covers: `rows * pitch` by `cols * pitch` from the origin.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(
            self.origin,
            self.cols as i64 * self.pitch,
            self.rows as i64 * self.pitch,
        )
    }

    /// Board coordinate sampled by a cell.
    pub fn cell_point(&self, row: usize, col: usize) -> Point {
        Point::new(
            self.origin.x + col as i64 * self.pitch,
            self.origin.y + row as i64 * self.pitch,
        )
    }

    fn index(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.rows && col < self.cols);
        row * self.cols + col
    }

    /// Flags of one cell.
    pub fn cell(&self, row: usize, col: usize, side: Side) -> CellFlags {
        self.cells[side.index()][self.index(row, col)]
    }

    /// Combines `flags` into one cell.
    pub fn apply_cell(&mut self, row: usize, col: usize, side: Side, flags: CellFlags, op: CellOp) {
        let i = self.index(row, col);
        let cell = &mut self.cells[side.index()][i];
        *cell = op.apply(*cell, flags);
    }

    /// Overwrites one cell.
    pub fn set_cell(&mut self, row: usize, col: usize, side: Side, flags: CellFlags) {
        self.apply_cell(row, col, side, flags, CellOp::Write);
    }

    /// Sets bits in one cell.
    pub fn or_cell(&mut self, row: usize, col: usize, side: Side, flags: CellFlags) {
        self.apply_cell(row, col, side, flags, CellOp::Or);
    }

    /// Keep-out cost accumulated in one cell.
    pub fn cost(&self, row: usize, col: usize, side: Side) -> u32 {
        self.cost[side.index()][self.index(row, col)]
    }

    /// Adds to a cell's keep-out cost, saturating.
    pub fn add_cost(&mut self, row: usize, col: usize, side: Side, value: u32) {
        let i = self.index(row, col);
        let cost = &mut self.cost[side.index()][i];
        *cost = cost.saturating_add(value);
    }

    /// Clears every flag and cost on both sides.
    pub fn clear(&mut self) {
        for side in &mut self.cells {
            side.fill(CellFlags::EMPTY);
        }
        for side in &mut self.cost {
            side.fill(0);
        }
    }

    /// Copies flags and costs of `from` onto `to`.
    pub fn copy_side(&mut self, from: Side, to: Side) {
        if from == to {
            return;
        }
        self.cells[to.index()] = self.cells[from.index()].clone();
        self.cost[to.index()] = self.cost[from.index()].clone();
    }

    /// Number of cells on `side` that carry all of `flags`.
    pub fn count_cells(&self, side: Side, flags: CellFlags) -> usize {
        self.cells[side.index()]
            .iter()
            .filter(|c| c.contains(flags))
            .count()
    }

    /// Cells whose sample point lies inside `rect`, clamped to the grid.
    ///
    /// Returns `None` when no cell qualifies.
    pub fn cell_range(&self, rect: &Rect) -> Option<CellRange> {
        let start = rect.min - self.origin;
        let end = rect.max - self.origin;
        let row_min = ceil_div(start.y, self.pitch).max(0);
        let col_min = ceil_div(start.x, self.pitch).max(0);
        let row_max = floor_div(end.y, self.pitch).min(self.rows as i64 - 1);
        let col_max = floor_div(end.x, self.pitch).min(self.cols as i64 - 1);
        if row_min > row_max || col_min > col_max {
            return None;
        }
        Some(CellRange {
            row_min: row_min as usize,
            row_max: row_max as usize,
            col_min: col_min as usize,
            col_max: col_max as usize,
        })
    }

    /// Applies `flags` to every cell whose sample point satisfies `inside`,
    /// within the cells covered by `bbox`.
    fn trace_where(
        &mut self,
        bbox: &Rect,
        sides: &[Side],
        flags: CellFlags,
        op: CellOp,
        inside: impl Fn(Point) -> bool,
    ) {
        let Some(range) = self.cell_range(bbox) else {
            return;
        };
        for (row, col) in range.cells() {
            if !inside(self.cell_point(row, col)) {
                continue;
            }
            for &side in sides {
                self.apply_cell(row, col, side, flags, op);
            }
        }
    }

    /// Applies `flags` to every cell covered by `rect`.
    pub fn trace_filled_rectangle(&mut self, rect: &Rect, sides: &[Side], flags: CellFlags, op: CellOp) {
        self.trace_where(rect, sides, flags, op, |_| true);
    }

    /// Applies `flags` to every cell within `radius` of `center`.
    pub fn trace_filled_circle(
        &mut self,
        center: Point,
        radius: i64,
        sides: &[Side],
        flags: CellFlags,
        op: CellOp,
    ) {
        let bbox = Rect::centered(center, 0, 0).inflate(radius);
        let r = radius as f64;
        self.trace_where(&bbox, sides, flags, op, |p| center.distance(p) <= r);
    }

    /// Applies `flags` to every cell within `half_width` of the segment `a`-`b`.
    pub fn trace_segment(
        &mut self,
        a: Point,
        b: Point,
        half_width: i64,
        sides: &[Side],
        flags: CellFlags,
        op: CellOp,
    ) {
        let bbox = Rect::from_corners(a, b).inflate(half_width);
        let hw = half_width as f64;
        self.trace_where(&bbox, sides, flags, op, |p| segment_distance(p, a, b) <= hw);
    }

    /// Applies `flags` to every cell within `half_width` of a circle outline.
    pub fn trace_ring(
        &mut self,
        center: Point,
        radius: i64,
        half_width: i64,
        sides: &[Side],
        flags: CellFlags,
        op: CellOp,
    ) {
        let bbox = Rect::centered(center, 0, 0).inflate(radius + half_width);
        let (r, hw) = (radius as f64, half_width as f64);
        self.trace_where(&bbox, sides, flags, op, |p| {
            (center.distance(p) - r).abs() <= hw
        });
    }

    /// Applies `flags` along an arc, broken into short segments.
    #[allow(clippy::too_many_arguments)]
    pub fn trace_arc(
        &mut self,
        center: Point,
        start: Point,
        sweep: Angle,
        half_width: i64,
        sides: &[Side],
        flags: CellFlags,
        op: CellOp,
    ) {
        // A zero sweep is a full circle.
        let total = match sweep.decidegrees() {
            0 => 3600,
            d => d,
        };
        let steps = (total + ARC_STEP_DECIDEGREES - 1) / ARC_STEP_DECIDEGREES;
        let radius = start - center;
        let mut prev = start;
        for i in 1..=steps {
            let angle = Angle::from_decidegrees(total * i / steps);
            let next = center + angle.rotate(radius);
            self.trace_segment(prev, next, half_width, sides, flags, op);
            prev = next;
        }
    }

    /// Traces a graphic drawing as an obstacle, stroked `margin` wider on each side.
    pub fn trace_drawing(&mut self, drawing: &Drawing, margin: i64, flags: CellFlags, op: CellOp) {
        let sides = drawing.layer.blocked_sides();
        if sides.is_empty() {
            return;
        }
        let hw = drawing.width / 2 + margin;
        match &drawing.shape {
            DrawingShape::Segment { start, end } => {
                self.trace_segment(*start, *end, hw, sides, flags, op);
            }
            DrawingShape::Rect { rect } => {
                let c = rect.corners();
                for i in 0..4 {
                    self.trace_segment(c[i], c[(i + 1) % 4], hw, sides, flags, op);
                }
            }
            DrawingShape::Circle { center, radius } => {
                self.trace_ring(*center, *radius, hw, sides, flags, op);
            }
            DrawingShape::Arc { center, start, sweep } => {
                self.trace_arc(*center, *start, *sweep, hw, sides, flags, op);
            }
            DrawingShape::Polyline { points } => {
                for pair in points.windows(2) {
                    self.trace_segment(pair[0], pair[1], hw, sides, flags, op);
                }
            }
        }
    }

    /// Stamps a terminal of `unit` at `pose`, grown by `margin`.
    ///
    /// Surface pads mark the unit's side; through pads mark both sides.
    pub fn place_terminal_footprint(
        &mut self,
        unit: &Unit,
        terminal: &Terminal,
        pose: Pose,
        margin: i64,
        flags: CellFlags,
        op: CellOp,
    ) {
        let sides: &[Side] = match (terminal.through, unit.side) {
            (true, _) => &Side::ALL,
            (false, Side::Front) => &[Side::Front],
            (false, Side::Back) => &[Side::Back],
        };
        match terminal.shape {
            TerminalShape::Circle => {
                let center = pose.apply(terminal.offset);
                let radius = terminal.width.max(terminal.height) / 2 + margin;
                self.trace_filled_circle(center, radius, sides, flags, op);
            }
            TerminalShape::Rect | TerminalShape::Oval => {
                let rect = unit.terminal_rect(terminal, pose).inflate(margin);
                self.trace_filled_rectangle(&rect, sides, flags, op);
            }
        }
    }

    /// Adds a keep-out cost band around `rect`.
    ///
    /// Cells covered by `rect` receive the full `keep_out` value. The band
    /// extends `ring = ceil(margin / pitch)` cells beyond them on each side. A
    /// cell `j` cells outside `rect` on an axis gets the fraction
    /// `(ring + 1 - j) / (ring + 1)` on that axis. The two axis gains
    /// multiply. Every band cell keeps a cost of at least one, and a wider
    /// margin never lowers a cell's cost.
    pub fn create_keep_out_rectangle(&mut self, rect: &Rect, margin: i64, keep_out: u32, sides: &[Side]) {
        if keep_out == 0 {
            return;
        }
        let Some(base) = self.cell_range(rect) else {
            return;
        };
        let ring = ceil_div(margin.max(0), self.pitch) as usize;
        let range = CellRange {
            row_min: base.row_min.saturating_sub(ring),
            row_max: (base.row_max + ring).min(self.rows - 1),
            col_min: base.col_min.saturating_sub(ring),
            col_max: (base.col_max + ring).min(self.cols - 1),
        };
        let steps = ring as u64 + 1;
        let gain = |pos: usize, min: usize, max: usize| -> u64 {
            let outside = min.saturating_sub(pos).max(pos.saturating_sub(max)) as u64;
            256 * (steps - outside) / steps
        };
        for (row, col) in range.cells() {
            let g = gain(row, base.row_min, base.row_max) * gain(col, base.col_min, base.col_max);
            let value = ((u64::from(keep_out) * g / 65536) as u32).max(1);
            for &side in sides {
                self.add_cost(row, col, side, value);
            }
        }
    }
}
