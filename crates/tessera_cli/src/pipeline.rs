//! Shared helpers for CLI commands.
//!
//! Board file I/O, configuration lookup and diagnostic rendering used by both
//! `place` and `grid`.

use std::fs;
use std::path::{Path, PathBuf};

use tessera_config::{ConfigError, PlacerConfig, CONFIG_FILE_NAME};
use tessera_diagnostics::{DiagnosticRenderer, DiagnosticSink, TerminalRenderer};
use tessera_place::Board;

use crate::GlobalArgs;

/// Errors that stop a command before or after the placement run itself.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// A file could not be read or written.
    #[error("{path}: {source}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
    /// A board file is not valid board JSON.
    #[error("{path}: invalid board: {source}")]
    Board {
        /// The board file.
        path: PathBuf,
        /// The underlying error.
        source: serde_json::Error,
    },
    /// The configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// `--units` named a reference not on the board.
    #[error("no unit with reference `{0}` on the board")]
    UnknownReference(String),
}

/// Reads a board from a JSON file.
pub fn load_board(path: &Path) -> Result<Board, CliError> {
    let content = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CliError::Board {
        path: path.to_path_buf(),
        source,
    })
}

/// Serializes a board as pretty-printed JSON.
pub fn board_json(board: &Board) -> Result<String, CliError> {
    serde_json::to_string_pretty(board).map_err(|source| CliError::Board {
        path: PathBuf::from("<output>"),
        source,
    })
}

/// Writes a board to `path`, or to stdout when `path` is `None`.
pub fn write_board(board: &Board, path: Option<&Path>) -> Result<(), CliError> {
    let json = board_json(board)?;
    match path {
        Some(path) => fs::write(path, json + "\n").map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}

/// Loads the placer configuration for a board.
///
/// Uses `--config` when given. Otherwise looks for `tessera.toml` next to the
/// board file, then falls back to the defaults.
pub fn load_placer_config(global: &GlobalArgs, board_path: &Path) -> Result<PlacerConfig, CliError> {
    if let Some(ref config_path) = global.config {
        return Ok(tessera_config::load_config_file(Path::new(config_path))?);
    }
    let dir = board_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    if dir.join(CONFIG_FILE_NAME).is_file() {
        log::debug!("using {}", dir.join(CONFIG_FILE_NAME).display());
        return Ok(tessera_config::load_config(dir)?);
    }
    Ok(PlacerConfig::default())
}

/// Prints collected diagnostics to stderr.
///
/// Notes are hidden under `--quiet`; warnings and errors always print.
pub fn render_diagnostics(sink: &DiagnosticSink, global: &GlobalArgs) {
    let renderer = TerminalRenderer::new(global.color);
    for diag in sink.take_all() {
        if global.quiet && !diag.severity.shown_when_quiet() {
            continue;
        }
        eprint!("{}", renderer.render(&diag));
    }
}
