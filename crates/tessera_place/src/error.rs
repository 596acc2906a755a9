//! Run-level errors and their diagnostic codes.

use crate::raster::RasterError;
use tessera_common::UnitId;
use tessera_diagnostics::{Category, Diagnostic, DiagnosticCode};

/// Stable diagnostic codes emitted by the placement engine.
pub mod codes {
    use super::{Category, DiagnosticCode};

    /// The board bounding box has zero width or height.
    pub const DEGENERATE_BOARD: DiagnosticCode = DiagnosticCode::new(Category::Error, 301);
    /// The outline could not be rasterized.
    pub const MALFORMED_OUTLINE: DiagnosticCode = DiagnosticCode::new(Category::Error, 302);
    /// A unit fits nowhere on the board.
    pub const NO_LEGAL_PLACEMENT: DiagnosticCode = DiagnosticCode::new(Category::Error, 303);
    /// A requested unit id is not on the board.
    pub const UNKNOWN_UNIT: DiagnosticCode = DiagnosticCode::new(Category::Error, 304);
    /// The grid pitch was raised to the minimum.
    pub const PITCH_CLAMPED: DiagnosticCode = DiagnosticCode::new(Category::Warning, 301);
    /// A malformed outline was tolerated.
    pub const MALFORMED_OUTLINE_TOLERATED: DiagnosticCode = DiagnosticCode::new(Category::Warning, 302);
    /// End-of-run summary.
    pub const RUN_SUMMARY: DiagnosticCode = DiagnosticCode::new(Category::Placement, 301);
}

/// Errors that end an autoplace run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AutoplaceError {
    /// The board outline spans no area.
    #[error("board bounding box is degenerate ({width} x {height})")]
    DegenerateBoard {
        /// Bounding box width in internal units.
        width: i64,
        /// Bounding box height in internal units.
        height: i64,
    },

    /// The outline is not a set of closed contours.
    #[error("board outline is malformed: {0}")]
    MalformedOutline(#[from] RasterError),

    /// A unit has no legal position in any allowed orientation.
    #[error("no legal position for {reference} in any allowed orientation")]
    NoLegalPlacement {
        /// Reference designator of the unit.
        reference: String,
    },

    /// A unit id passed to the run does not exist on the board.
    #[error("unit {0} is not on the board")]
    UnknownUnit(UnitId),
}

impl AutoplaceError {
    /// Diagnostic code for this error.
    pub fn code(&self) -> DiagnosticCode {
        match self {
            AutoplaceError::DegenerateBoard { .. } => codes::DEGENERATE_BOARD,
            AutoplaceError::MalformedOutline(_) => codes::MALFORMED_OUTLINE,
            AutoplaceError::NoLegalPlacement { .. } => codes::NO_LEGAL_PLACEMENT,
            AutoplaceError::UnknownUnit(_) => codes::UNKNOWN_UNIT,
        }
    }

    /// Returns whether the run was aborted after it had started placing.
    ///
    /// Earlier commits stay on the board in that case; every other variant is
    /// raised before any unit is touched.
    pub fn is_abort(&self) -> bool {
        matches!(self, AutoplaceError::NoLegalPlacement { .. })
    }

    /// Builds the error diagnostic for this failure.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code(), self.to_string());
        match self {
            AutoplaceError::NoLegalPlacement { reference } => diag
                .with_unit(reference.clone())
                .with_help("enlarge the board or enable more rotations for this unit"),
            AutoplaceError::MalformedOutline(_) => {
                diag.with_help("close every edge-cuts contour, or set `allow_malformed_outline`")
            }
            _ => diag,
        }
    }
}
