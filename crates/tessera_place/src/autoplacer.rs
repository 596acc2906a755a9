//! The autoplace orchestrator.
//!
//! An [`Autoplacer`] owns the occupancy grid and free-area polygons for one
//! run. It rasterizes the board, stamps every unit that stays put, then
//! repeatedly picks the most constrained unit still waiting, searches every
//! allowed orientation for its best position, and commits the winner as a
//! new obstacle.
//!
//! # Unit order
//!
//! Units are ranked by footprint area times terminal count, the ratsnest is
//! rebuilt, and the ranking is redone (stably) with area times ratsnest edge
//! count. The first waiting unit with at least one edge goes next; when no
//! waiting unit has edges, the first waiting unit does.
//!
//! # Orientations
//!
//! The unit is searched at its current orientation, then at +180° and at
//! +90°/+270° when its rotation cost classes allow them. Rotated scores are
//! multiplied by the class penalty and replace the best only when strictly
//! lower. The run aborts when no orientation has a legal position.

use crate::board::{Board, Side, Unit};
use crate::commit::CommitLog;
use crate::connectivity::{Connectivity, NetConnectivity};
use crate::error::{codes, AutoplaceError};
use crate::evaluate::keep_out_margin;
use crate::free_area::{build_unit_areas, FreeArea};
use crate::matrix::{CellFlags, CellOp, PlacementMatrix};
use crate::options::AutoplaceOptions;
use crate::progress::ProgressReporter;
use crate::raster::fill_board_zone;
use crate::search::{find_best_position, Candidate};
use tessera_common::{Angle, Rect, UnitId};
use tessera_diagnostics::{Diagnostic, DiagnosticSink};

/// Where a run currently is.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RunState {
    /// No run started yet.
    Idle,
    /// Board rasterized and fixed units stamped.
    GridBuilt,
    /// Choosing the next unit.
    SelectingUnit,
    /// Searching positions at one orientation.
    Evaluating(Angle),
    /// Moving a unit and stamping it.
    Committing,
    /// Every unit was placed.
    Done,
    /// The progress reporter asked to stop.
    Cancelled,
    /// The run ended with an error.
    Failed,
}

impl RunState {
    /// Returns whether the run has ended.
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Done | RunState::Cancelled | RunState::Failed)
    }
}

/// How a successful run ended.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RunOutcome {
    /// No unit is left waiting.
    Completed,
    /// Stopped by the progress reporter; earlier commits remain.
    Cancelled,
}

/// Result of a run that did not fail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// How the run ended.
    pub outcome: RunOutcome,
    /// Units committed, in commit order.
    pub placed: Vec<UnitId>,
}

/// Passed to the refresh callback after the grid is built and after each commit.
pub struct RefreshEvent<'e> {
    /// The unit just committed, or `None` for the initial refresh.
    pub unit: Option<&'e Unit>,
    /// Free board area remaining.
    pub free_area: &'e FreeArea,
    /// The occupancy grid.
    pub matrix: &'e PlacementMatrix,
}

/// Grid and polygons owned by one run.
struct RunContext {
    matrix: PlacementMatrix,
    free_area: FreeArea,
    bounds: Rect,
}

type RefreshFn<'a> = Box<dyn FnMut(&RefreshEvent<'_>) + 'a>;

/// Places units on a board one at a time.
pub struct Autoplacer<'a, C: Connectivity = NetConnectivity> {
    options: AutoplaceOptions,
    connectivity: C,
    progress: Option<&'a mut dyn ProgressReporter>,
    refresh: Option<RefreshFn<'a>>,
    state: RunState,
}

impl<'a> Autoplacer<'a, NetConnectivity> {
    /// Creates an autoplacer using the board's own netlist.
    pub fn new(options: AutoplaceOptions) -> Self {
        Self::with_connectivity(options, NetConnectivity::new())
    }
}

impl<'a, C: Connectivity> Autoplacer<'a, C> {
    /// Creates an autoplacer with a custom connectivity provider.
    pub fn with_connectivity(options: AutoplaceOptions, connectivity: C) -> Self {
        Self {
            options,
            connectivity,
            progress: None,
            refresh: None,
            state: RunState::Idle,
        }
    }

    /// Reports progress to `progress` and polls it for cancellation.
    pub fn with_progress(mut self, progress: &'a mut dyn ProgressReporter) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Calls `refresh` after the grid is built and after every commit.
    pub fn on_refresh(mut self, refresh: impl FnMut(&RefreshEvent<'_>) + 'a) -> Self {
        self.refresh = Some(Box::new(refresh));
        self
    }

    /// Current run state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// The run options.
    pub fn options(&self) -> &AutoplaceOptions {
        &self.options
    }

    /// The connectivity provider.
    pub fn connectivity(&self) -> &C {
        &self.connectivity
    }

    /// Places `units` (and off-board units when enabled) on `board`.
    ///
    /// Every unit about to move is passed to `commit` first. On
    /// [`AutoplaceError::NoLegalPlacement`] the units committed before the
    /// failing one keep their new poses.
    pub fn autoplace(
        &mut self,
        board: &mut Board,
        units: &[UnitId],
        commit: &mut dyn CommitLog,
        sink: &DiagnosticSink,
    ) -> Result<RunSummary, AutoplaceError> {
        self.set_state(RunState::Idle);
        if let Some(&missing) = units.iter().find(|id| board.unit(**id).is_none()) {
            return Err(self.fail(AutoplaceError::UnknownUnit(missing), sink));
        }

        let mut run = self.build_grid(board, sink)?;
        let waiting = self.mark_units(board, units, &run.bounds, commit);
        for unit in board.units.iter().filter(|u| !u.needs_placed) {
            self.stamp(&mut run, unit);
        }
        self.set_state(RunState::GridBuilt);
        log::info!(
            "autoplacing {waiting} of {} units on a {}x{} grid",
            board.unit_count(),
            run.matrix.cols(),
            run.matrix.rows()
        );

        if let Some(progress) = self.progress.as_deref_mut() {
            progress.report_stage("Autoplacing components");
            progress.set_max_progress(waiting);
        }
        self.notify(&run, None);

        let mut placed = Vec::new();
        let outcome = loop {
            self.set_state(RunState::SelectingUnit);
            let Some(id) = self.pick_unit(board, &run.bounds) else {
                break RunOutcome::Completed;
            };
            let Some(unit) = board.unit(id) else {
                return Err(self.fail(AutoplaceError::UnknownUnit(id), sink));
            };
            if let Some(progress) = self.progress.as_deref_mut() {
                progress.set_title(&unit.reference);
            }

            let Some(best) = self.best_candidate(&run, unit) else {
                let reference = unit.reference.clone();
                return Err(self.fail(AutoplaceError::NoLegalPlacement { reference }, sink));
            };

            self.set_state(RunState::Committing);
            let Some(unit) = board.unit_mut(id) else {
                return Err(self.fail(AutoplaceError::UnknownUnit(id), sink));
            };
            unit.set_pose(best.pose);
            unit.is_placed = true;
            unit.needs_placed = false;
            log::debug!(
                "placed {} at ({}, {}) {} score {:.1}",
                unit.reference,
                best.pose.position.x,
                best.pose.position.y,
                best.pose.orientation,
                best.score
            );
            let unit = &board.units[id.index()];
            self.stamp(&mut run, unit);
            placed.push(id);
            self.notify(&run, Some(unit));

            if let Some(progress) = self.progress.as_deref_mut() {
                progress.advance();
                if !progress.keep_going() {
                    break RunOutcome::Cancelled;
                }
            }
        };

        self.set_state(match outcome {
            RunOutcome::Completed => RunState::Done,
            RunOutcome::Cancelled => RunState::Cancelled,
        });
        let verb = match outcome {
            RunOutcome::Completed => "placed",
            RunOutcome::Cancelled => "cancelled after placing",
        };
        sink.emit(Diagnostic::note(
            codes::RUN_SUMMARY,
            format!("{verb} {} of {waiting} units", placed.len()),
        ));
        Ok(RunSummary { outcome, placed })
    }

    fn set_state(&mut self, state: RunState) {
        if self.state != state {
            log::trace!("autoplace: {:?} -> {:?}", self.state, state);
        }
        self.state = state;
    }

    fn fail(&mut self, err: AutoplaceError, sink: &DiagnosticSink) -> AutoplaceError {
        sink.emit(err.to_diagnostic());
        self.set_state(RunState::Failed);
        err
    }

    /// Sizes and rasterizes the grid and traces graphic obstacles.
    fn build_grid(&mut self, board: &Board, sink: &DiagnosticSink) -> Result<RunContext, AutoplaceError> {
        let pitch = self.options.effective_pitch(sink);
        let bbox = board.bounding_box();
        let Some(mut matrix) = bbox.and_then(|b| PlacementMatrix::new(b, pitch)) else {
            let (width, height) = bbox.map_or((0, 0), |b| (b.width(), b.height()));
            return Err(self.fail(AutoplaceError::DegenerateBoard { width, height }, sink));
        };

        match fill_board_zone(&mut matrix, &board.outline) {
            Ok(cells) => log::debug!("board zone covers {cells} cells per side"),
            Err(err) if self.options.allow_malformed_outline => {
                sink.emit(
                    Diagnostic::warning(codes::MALFORMED_OUTLINE_TOLERATED, err.to_string())
                        .with_note("placing on the partially filled grid"),
                );
            }
            Err(err) => return Err(self.fail(err.into(), sink)),
        }

        let obstacle = CellFlags::HOLE | CellFlags::EDGE;
        for drawing in &board.drawings {
            matrix.trace_drawing(drawing, pitch, obstacle, CellOp::Write);
        }

        let bounds = matrix.bounds();
        Ok(RunContext {
            matrix,
            free_area: FreeArea::from_outline(&board.outline),
            bounds,
        })
    }

    /// Flags the units this run places and records them in `commit`.
    fn mark_units(&self, board: &mut Board, units: &[UnitId], bounds: &Rect, commit: &mut dyn CommitLog) -> usize {
        let mut waiting = 0;
        for unit in &mut board.units {
            let wanted = units.contains(&unit.id)
                || (self.options.place_offboard && !bounds.contains(unit.position));
            if wanted {
                commit.modify(unit);
                waiting += 1;
            }
            unit.needs_placed = wanted;
        }
        waiting
    }

    /// Marks `unit` as an obstacle in the grid and the free area.
    fn stamp(&self, run: &mut RunContext, unit: &Unit) {
        let pitch = run.matrix.pitch();
        let pose = unit.pose();
        let footprint = unit.footprint_rect_at(pose).inflate(pitch / 2);
        if !run.bounds.overlaps(&footprint) {
            return;
        }
        let rect = footprint.clamp_to(&run.bounds);
        let sides = [unit.side];
        run.matrix
            .trace_filled_rectangle(&rect, &sides, CellFlags::UNIT, CellOp::Or);
        for terminal in &unit.terminals {
            let margin = pitch / 2 + terminal.clearance;
            run.matrix
                .place_terminal_footprint(unit, terminal, pose, margin, CellFlags::UNIT, CellOp::Or);
        }
        let margin = keep_out_margin(pitch, unit.terminals.len(), self.options.gain());
        run.matrix
            .create_keep_out_rectangle(&rect, margin, self.options.keep_out_peak, &sides);

        let occupied = build_unit_areas(unit, pose, margin.max(self.options.clearance), pitch);
        run.free_area.subtract(&occupied);
    }

    /// Chooses the next unit to place.
    fn pick_unit(&mut self, board: &Board, bounds: &Rect) -> Option<UnitId> {
        let weight = |unit: &Unit, count: usize| unit.area() * count as f64;
        let mut order: Vec<&Unit> = board.units.iter().collect();
        order.sort_by(|a, b| weight(*b, b.terminals.len()).total_cmp(&weight(*a, a.terminals.len())));

        self.connectivity.recalculate_ratsnest(board, bounds);
        let conn = &self.connectivity;
        order.sort_by(|a, b| {
            weight(*b, conn.edges_for_unit(b.id)).total_cmp(&weight(*a, conn.edges_for_unit(a.id)))
        });

        order
            .iter()
            .find(|u| u.needs_placed && conn.edges_for_unit(u.id) > 0)
            .or_else(|| order.iter().find(|u| u.needs_placed))
            .map(|u| u.id)
    }

    /// Best candidate over every allowed orientation, or `None` if none is legal.
    fn best_candidate(&mut self, run: &RunContext, unit: &Unit) -> Option<Candidate> {
        let mut trials = vec![(Angle::ZERO, 1.0)];
        if let Some(factor) = unit.rotation_180.penalty_factor() {
            trials.push((Angle::DEG_180, factor));
        }
        if let Some(factor) = unit.rotation_90.penalty_factor() {
            trials.push((Angle::DEG_90, factor));
            trials.push((Angle::DEG_270, factor));
        }

        let mut best: Option<Candidate> = None;
        for (delta, factor) in trials {
            let orientation = unit.orientation + delta;
            self.set_state(RunState::Evaluating(orientation));
            let found = find_best_position(
                &run.matrix,
                &self.connectivity,
                unit,
                orientation,
                self.options.gain(),
            );
            match found {
                Ok((mut candidate, _)) => {
                    candidate.score *= factor;
                    if best.map_or(true, |b| candidate.score < b.score) {
                        best = Some(candidate);
                    }
                }
                Err(err) => log::debug!("{}: {err}", unit.reference),
            }
        }
        best
    }

    fn notify(&mut self, run: &RunContext, unit: Option<&Unit>) {
        if let Some(refresh) = self.refresh.as_mut() {
            refresh(&RefreshEvent {
                unit,
                free_area: &run.free_area,
                matrix: &run.matrix,
            });
        }
    }
}

/// Renders one side of the grid as text, one line per row.
///
/// `U` marks unit cells, `#` holes and edges, `.` free board cells and a
/// space anything outside the board.
pub fn render_grid(matrix: &PlacementMatrix, side: Side) -> String {
    let mut out = String::with_capacity((matrix.cols() + 1) * matrix.rows());
    for row in 0..matrix.rows() {
        for col in 0..matrix.cols() {
            let cell = matrix.cell(row, col, side);
            out.push(if cell.intersects(CellFlags::UNIT) {
                'U'
            } else if cell.intersects(CellFlags::HOLE | CellFlags::EDGE) {
                '#'
            } else if cell.contains(CellFlags::ZONE) {
                '.'
            } else {
                ' '
            });
        }
        out.push('\n');
    }
    out
}

/// Builds the occupancy grid of `board` as a run would see it before placing.
///
/// Every unit is stamped at its current pose.
pub fn preview_grid(
    board: &Board,
    options: &AutoplaceOptions,
    sink: &DiagnosticSink,
) -> Result<PlacementMatrix, AutoplaceError> {
    let mut placer = Autoplacer::new(options.clone());
    let mut run = placer.build_grid(board, sink)?;
    for unit in &board.units {
        placer.stamp(&mut run, unit);
    }
    Ok(run.matrix)
}
