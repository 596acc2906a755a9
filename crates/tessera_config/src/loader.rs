//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::PlacerConfig;
use std::path::Path;

/// Name of the configuration file looked up in a project directory.
pub const CONFIG_FILE_NAME: &str = "tessera.toml";

/// Loads and validates a `tessera.toml` configuration from a project directory.
///
/// Reads `<project_dir>/tessera.toml`, parses it, and validates its values.
pub fn load_config(project_dir: &Path) -> Result<PlacerConfig, ConfigError> {
    load_config_file(&project_dir.join(CONFIG_FILE_NAME))
}

/// Loads and validates a configuration from an explicit file path.
pub fn load_config_file(path: &Path) -> Result<PlacerConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `tessera.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<PlacerConfig, ConfigError> {
    let config: PlacerConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that configuration values are within range.
fn validate_config(config: &PlacerConfig) -> Result<(), ConfigError> {
    if config.grid.pitch.iu() <= 0 {
        return Err(ConfigError::ValidationError {
            field: "grid.pitch",
            reason: format!("must be greater than zero, got {}", config.grid.pitch),
        });
    }
    if config.keep_out.gain == 0 {
        return Err(ConfigError::ValidationError {
            field: "keep_out.gain",
            reason: "must be greater than zero".to_string(),
        });
    }
    if config.placement.default_clearance.iu() < 0 {
        return Err(ConfigError::ValidationError {
            field: "placement.default_clearance",
            reason: format!(
                "must not be negative, got {}",
                config.placement.default_clearance
            ),
        });
    }
    Ok(())
}
