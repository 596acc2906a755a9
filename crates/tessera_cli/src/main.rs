//! Tessera CLI: the command-line front end for the footprint autoplacer.
//!
//! Provides `tessera place` to move units of a JSON board to legal,
//! well-connected positions and `tessera grid` to print the occupancy grid a
//! run would start from.

#![warn(missing_docs)]

mod grid;
mod pipeline;
mod place;

use std::io::IsTerminal;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tessera_common::Length;

/// Tessera: automatic footprint placement.
#[derive(Parser, Debug)]
#[command(name = "tessera", version, about = "Tessera footprint autoplacer")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a custom `tessera.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Place units of a board.
    Place(PlaceArgs),
    /// Print the occupancy grid of a board.
    Grid(GridArgs),
}

/// Arguments for the `tessera place` subcommand.
#[derive(Parser, Debug)]
pub struct PlaceArgs {
    /// Board file (JSON).
    pub board: String,

    /// Where to write the placed board. Defaults to stdout.
    #[arg(short, long)]
    pub output: Option<String>,

    /// References of the units to place (e.g., `--units R1 C3`). All units
    /// when omitted.
    #[arg(long, num_args = 1..)]
    pub units: Vec<String>,

    /// Also place units lying outside the board.
    #[arg(long)]
    pub offboard: bool,

    /// Grid pitch override (e.g., "0.5mm", "40mil").
    #[arg(long)]
    pub pitch: Option<Length>,
}

/// Arguments for the `tessera grid` subcommand.
#[derive(Parser, Debug)]
pub struct GridArgs {
    /// Board file (JSON).
    pub board: String,

    /// Board side to print.
    #[arg(long, value_enum, default_value_t = SideChoice::Front)]
    pub side: SideChoice,
}

/// Board side selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SideChoice {
    /// Top side.
    Front,
    /// Bottom side.
    Back,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::io::stderr().is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };
    init_logging(&global);

    let result = match cli.command {
        Command::Place(ref args) => place::run(args, &global),
        Command::Grid(ref args) => grid::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Log level for the given flags; `RUST_LOG` still overrides it.
fn log_level(global: &GlobalArgs) -> log::LevelFilter {
    if global.quiet {
        log::LevelFilter::Error
    } else if global.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    }
}

fn init_logging(global: &GlobalArgs) {
    env_logger::Builder::new()
        .filter_level(log_level(global))
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn global(quiet: bool, verbose: bool) -> GlobalArgs {
        GlobalArgs {
            quiet,
            verbose,
            color: false,
            config: None,
        }
    }

    #[test]
    fn parse_place_default() {
        let cli = Cli::parse_from(["tessera", "place", "board.json"]);
        match cli.command {
            Command::Place(ref args) => {
                assert_eq!(args.board, "board.json");
                assert!(args.output.is_none());
                assert!(args.units.is_empty());
                assert!(!args.offboard);
                assert!(args.pitch.is_none());
            }
            _ => panic!("expected Place command"),
        }
    }

    #[test]
    fn parse_place_with_args() {
        let cli = Cli::parse_from([
            "tessera",
            "place",
            "board.json",
            "-o",
            "out.json",
            "--units",
            "R1",
            "C3",
            "--offboard",
            "--pitch",
            "0.5mm",
        ]);
        match cli.command {
            Command::Place(ref args) => {
                assert_eq!(args.output.as_deref(), Some("out.json"));
                assert_eq!(args.units, vec!["R1", "C3"]);
                assert!(args.offboard);
                assert_eq!(args.pitch, Some(Length::from_mm(0.5)));
            }
            _ => panic!("expected Place command"),
        }
    }

    #[test]
    fn parse_place_rejects_bad_pitch() {
        let result = Cli::try_parse_from(["tessera", "place", "b.json", "--pitch", "wide"]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_grid_side() {
        let cli = Cli::parse_from(["tessera", "grid", "board.json"]);
        match cli.command {
            Command::Grid(ref args) => assert_eq!(args.side, SideChoice::Front),
            _ => panic!("expected Grid command"),
        }
        let cli = Cli::parse_from(["tessera", "grid", "board.json", "--side", "back"]);
        match cli.command {
            Command::Grid(ref args) => assert_eq!(args.side, SideChoice::Back),
            _ => panic!("expected Grid command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from([
            "tessera",
            "--quiet",
            "--color",
            "never",
            "--config",
            "cfg/tessera.toml",
            "grid",
            "b.json",
        ]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.color, ColorChoice::Never);
        assert_eq!(cli.config.as_deref(), Some("cfg/tessera.toml"));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["tessera", "place", "b.json", "--verbose"]);
        assert!(cli.verbose);
    }

    #[test]
    fn missing_subcommand_is_error() {
        assert!(Cli::try_parse_from(["tessera"]).is_err());
    }

    #[test]
    fn log_level_follows_flags() {
        assert_eq!(log_level(&global(true, true)), log::LevelFilter::Error);
        assert_eq!(log_level(&global(false, true)), log::LevelFilter::Debug);
        assert_eq!(log_level(&global(false, false)), log::LevelFilter::Warn);
    }
}
