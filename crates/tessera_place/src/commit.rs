//! Undo records for units a run modifies.

use crate::board::{Board, Unit};
use tessera_common::UnitId;

/// Receives a unit's state just before a run first changes it.
pub trait CommitLog {
    /// Records `unit` as about to be modified.
    fn modify(&mut self, unit: &Unit);
}

/// Keeps one before-snapshot per modified unit.
#[derive(Clone, Debug, Default)]
pub struct BoardCommit {
    snapshots: Vec<Unit>,
}

impl BoardCommit {
    /// Creates an empty commit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Number of units recorded.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Ids of the recorded units, in recording order.
    pub fn modified(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.snapshots.iter().map(|u| u.id)
    }

    /// The recorded state of `id`, if it was modified.
    pub fn snapshot(&self, id: UnitId) -> Option<&Unit> {
        self.snapshots.iter().find(|u| u.id == id)
    }

    /// Restores every recorded unit on `board`.
    ///
    /// Returns the number of units restored; snapshots whose id no longer
    /// exists on the board are skipped.
    pub fn revert(&self, board: &mut Board) -> usize {
        let mut restored = 0;
        for snapshot in &self.snapshots {
            if let Some(unit) = board.unit_mut(snapshot.id) {
                *unit = snapshot.clone();
                restored += 1;
            }
        }
        log::debug!("reverted {restored} units");
        restored
    }
}

impl CommitLog for BoardCommit {
    fn modify(&mut self, unit: &Unit) {
        if self.snapshot(unit.id).is_none() {
            self.snapshots.push(unit.clone());
        }
    }
}
