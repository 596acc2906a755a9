//! Legality and keep-out scoring of a unit at a trial pose.

use crate::board::{Pose, Side, Unit};
use crate::matrix::{CellFlags, PlacementMatrix};
use tessera_common::Rect;

/// Why a trial rectangle is not legal.
#[derive(Clone, Copy, PartialEq, Eq, Debug, thiserror::Error)]
pub enum Obstruction {
    /// Some covered cell lies outside the board zone, or nothing is covered.
    #[error("outside the board")]
    OutOfBoard,
    /// Some covered cell is already taken by a unit.
    #[error("overlaps a placed unit")]
    OccupiedByUnit,
}

impl PlacementMatrix {
    /// Checks that `rect`, grown by half a pitch, covers only free board cells.
    ///
    /// Cells are visited row by row and the first offending cell decides the
    /// verdict. Within a cell, a missing board zone wins over occupation.
    pub fn test_rectangle(&self, rect: &Rect, side: Side) -> Result<(), Obstruction> {
        let range = self
            .cell_range(&rect.inflate(self.pitch() / 2))
            .ok_or(Obstruction::OutOfBoard)?;
        for (row, col) in range.cells() {
            let cell = self.cell(row, col, side);
            if !cell.contains(CellFlags::ZONE) {
                return Err(Obstruction::OutOfBoard);
            }
            if cell.intersects(CellFlags::UNIT) {
                return Err(Obstruction::OccupiedByUnit);
            }
        }
        Ok(())
    }

    /// Sums the keep-out cost of every cell covered by `rect` on `side`.
    pub fn calculate_keep_out_area(&self, rect: &Rect, side: Side) -> u64 {
        let Some(range) = self.cell_range(rect) else {
            return 0;
        };
        range
            .cells()
            .map(|(row, col)| u64::from(self.cost(row, col, side)))
            .sum()
    }

    /// Tests `unit` at `pose` and returns its keep-out cost when legal.
    ///
    /// The footprint rectangle is tested on the unit's side and, when
    /// `check_other_side` is set, on the opposite side too. The cost is
    /// summed over the footprint grown by `pitch * terminals / keep_out_gain`
    /// on the unit's side.
    pub fn test_unit_on_board(
        &self,
        unit: &Unit,
        pose: Pose,
        check_other_side: bool,
        keep_out_gain: u32,
    ) -> Result<u64, Obstruction> {
        let rect = unit.footprint_rect_at(pose);
        self.test_rectangle(&rect, unit.side)?;
        if check_other_side {
            self.test_rectangle(&rect, unit.side.opposite())?;
        }
        let margin = keep_out_margin(self.pitch(), unit.terminals.len(), keep_out_gain);
        Ok(self.calculate_keep_out_area(&rect.inflate(margin), unit.side))
    }
}

/// Keep-out margin of a unit with `terminals` pads.
pub(crate) fn keep_out_margin(pitch: i64, terminals: usize, gain: u32) -> i64 {
    pitch * terminals as i64 / i64::from(gain.max(1))
}
