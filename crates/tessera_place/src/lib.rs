//! Automatic footprint placement for printed circuit boards.
//!
//! This crate takes a [`Board`] (outline, graphic obstacles and units) and
//! moves the requested units to legal, well-connected positions. The board is
//! laid onto a two-sided occupancy grid, then units are placed one at a time
//! by exhaustive grid search, each commit becoming an obstacle for the next.
//!
//! # Pipeline
//!
//! 1. **Grid**: size a [`PlacementMatrix`] over the board bounding box and
//!    rasterize the outline into board-zone cells ([`raster`])
//! 2. **Obstacles**: trace graphic drawings and stamp every unit that stays put
//! 3. **Select**: rank waiting units by area and ratsnest edges ([`Connectivity`])
//! 4. **Search**: score every grid position at every allowed orientation
//!    ([`search`], [`evaluate`], [`ratsnest`])
//! 5. **Commit**: move the unit, record it in the [`CommitLog`], stamp it
//!
//! # Usage
//!
//! ```ignore
//! use tessera_place::{Autoplacer, AutoplaceOptions, BoardCommit};
//!
//! let mut commit = BoardCommit::new();
//! let mut placer = Autoplacer::new(AutoplaceOptions::default());
//! let summary = placer.autoplace(&mut board, &units, &mut commit, &sink)?;
//! ```

#![warn(missing_docs)]

pub mod autoplacer;
pub mod board;
pub mod commit;
pub mod connectivity;
pub mod error;
pub mod evaluate;
pub mod free_area;
pub mod matrix;
pub mod options;
pub mod progress;
pub mod raster;
pub mod ratsnest;
pub mod search;

pub use autoplacer::{
    preview_grid, render_grid, Autoplacer, RefreshEvent, RunOutcome, RunState, RunSummary,
};
pub use board::{
    Board, BoardOutline, Contour, Drawing, DrawingLayer, DrawingShape, Pose, RotationCost, Side,
    Terminal, TerminalShape, Unit,
};
pub use commit::{BoardCommit, CommitLog};
pub use connectivity::{Connectivity, NetConnectivity, TerminalRef};
pub use error::AutoplaceError;
pub use evaluate::Obstruction;
pub use free_area::{build_unit_areas, FreeArea, SideAreas};
pub use matrix::{CellFlags, CellOp, CellRange, PlacementMatrix};
pub use options::{AutoplaceOptions, MIN_PITCH};
pub use progress::{CancelAfter, LogProgress, ProgressReporter};
pub use raster::{fill_board_zone, RasterError};
pub use ratsnest::{connection_cost, ratsnest_cost};
pub use search::{find_best_position, Candidate, SearchError, SearchStats};
