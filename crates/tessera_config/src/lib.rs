//! Placer configuration loading from `tessera.toml`.
//!
//! The configuration tunes the occupancy grid pitch, the keep-out cost ramp
//! around placed units, and which units a run sweeps in. Every section is
//! optional; an empty file yields the defaults.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str, CONFIG_FILE_NAME};
pub use types::{GridConfig, KeepOutConfig, PlacementConfig, PlacerConfig};
