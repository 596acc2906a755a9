//! `tessera place`: runs the autoplacer on a board file.
//!
//! 1. Load the board and `tessera.toml`
//! 2. Apply `--pitch` / `--offboard` overrides
//! 3. Resolve `--units` references
//! 4. Place, render diagnostics, write the board

use std::path::Path;

use tessera_common::UnitId;
use tessera_diagnostics::DiagnosticSink;
use tessera_place::{AutoplaceOptions, Autoplacer, Board, BoardCommit, LogProgress, RunOutcome};

use crate::pipeline::{load_board, load_placer_config, render_diagnostics, write_board, CliError};
use crate::{GlobalArgs, PlaceArgs};

/// Exit code for a cancelled run.
pub const EXIT_CANCELLED: i32 = 2;

/// Runs the `tessera place` command.
///
/// Returns exit code 0 when every requested unit was placed, 2 when the run
/// was cancelled, and 1 when it aborted. An aborted run writes nothing.
pub fn run(args: &PlaceArgs, global: &GlobalArgs) -> Result<i32, CliError> {
    let board_path = Path::new(&args.board);
    let mut board = load_board(board_path)?;
    let config = load_placer_config(global, board_path)?;

    let sink = DiagnosticSink::new();
    let options = apply_overrides(AutoplaceOptions::from_config(&config, &sink), args);
    let units = resolve_units(&board, &args.units)?;

    if !global.quiet {
        eprintln!("   Placing {} ({} units)", args.board, units.len());
    }

    let mut progress = LogProgress::new();
    let mut commit = BoardCommit::new();
    let result = Autoplacer::new(options)
        .with_progress(&mut progress)
        .autoplace(&mut board, &units, &mut commit, &sink);
    render_diagnostics(&sink, global);

    let summary = match result {
        Ok(summary) => summary,
        Err(err) => {
            log::debug!("run aborted: {err}");
            return Ok(1);
        }
    };

    write_board(&board, args.output.as_deref().map(Path::new))?;
    if !global.quiet {
        eprintln!("   Moved {} units", commit.len());
    }
    Ok(exit_code(summary.outcome))
}

/// Maps a finished run to the process exit code.
pub fn exit_code(outcome: RunOutcome) -> i32 {
    match outcome {
        RunOutcome::Completed => 0,
        RunOutcome::Cancelled => EXIT_CANCELLED,
    }
}

/// Applies command-line overrides on top of the configured options.
fn apply_overrides(mut options: AutoplaceOptions, args: &PlaceArgs) -> AutoplaceOptions {
    if let Some(pitch) = args.pitch {
        options.pitch = pitch.iu();
    }
    if args.offboard {
        options.place_offboard = true;
    }
    options
}

/// Resolves `--units` references; an empty list selects every unit.
fn resolve_units(board: &Board, references: &[String]) -> Result<Vec<UnitId>, CliError> {
    if references.is_empty() {
        return Ok(board.units.iter().map(|u| u.id).collect());
    }
    references
        .iter()
        .map(|r| {
            board
                .find_unit(r)
                .ok_or_else(|| CliError::UnknownReference(r.clone()))
        })
        .collect()
}
