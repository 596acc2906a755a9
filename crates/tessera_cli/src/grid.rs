//! `tessera grid`: prints the occupancy grid of a board as ASCII.

use std::path::Path;

use tessera_diagnostics::DiagnosticSink;
use tessera_place::{preview_grid, render_grid, AutoplaceOptions, Side};

use crate::pipeline::{load_board, load_placer_config, render_diagnostics, CliError};
use crate::{GlobalArgs, GridArgs, SideChoice};

/// Runs the `tessera grid` command.
///
/// Returns exit code 0 when the grid was printed and 1 when it could not be
/// built.
pub fn run(args: &GridArgs, global: &GlobalArgs) -> Result<i32, CliError> {
    let board_path = Path::new(&args.board);
    let board = load_board(board_path)?;
    let config = load_placer_config(global, board_path)?;

    let sink = DiagnosticSink::new();
    let options = AutoplaceOptions::from_config(&config, &sink);
    let result = preview_grid(&board, &options, &sink);
    render_diagnostics(&sink, global);

    match result {
        Ok(matrix) => {
            if !global.quiet {
                eprintln!(
                    "   Grid {}x{} cells, {} side",
                    matrix.cols(),
                    matrix.rows(),
                    side(args.side)
                );
            }
            print!("{}", render_grid(&matrix, side(args.side)));
            Ok(0)
        }
        Err(_) => Ok(1),
    }
}

fn side(choice: SideChoice) -> Side {
    match choice {
        SideChoice::Front => Side::Front,
        SideChoice::Back => Side::Back,
    }
}
