//! Configuration types deserialized from `tessera.toml`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use tessera_common::Length;

/// The top-level placer configuration parsed from `tessera.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct PlacerConfig {
    /// Occupancy grid settings.
    #[serde(default)]
    pub grid: GridConfig,
    /// Keep-out cost ramp around placed units.
    #[serde(default)]
    pub keep_out: KeepOutConfig,
    /// Which units a run touches and how strictly the outline is checked.
    #[serde(default)]
    pub placement: PlacementConfig,
}

/// Occupancy grid settings.
#[derive(Debug, Deserialize)]
pub struct GridConfig {
    /// Edge length of one grid cell, e.g. `"1mm"` or `"40mil"`.
    #[serde(default = "default_pitch", deserialize_with = "deserialize_length")]
    pub pitch: Length,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            pitch: default_pitch(),
        }
    }
}

/// Keep-out cost ramp settings.
#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct KeepOutConfig {
    /// Terminal count divisor used to size the keep-out margin of a unit.
    #[serde(default = "default_gain")]
    pub gain: u32,
    /// Keep-out cost on the cells a placed unit covers.
    #[serde(default = "default_peak_cost")]
    pub peak_cost: u32,
}

impl Default for KeepOutConfig {
    fn default() -> Self {
        Self {
            gain: default_gain(),
            peak_cost: default_peak_cost(),
        }
    }
}

/// Run-scope settings.
#[derive(Debug, Deserialize)]
pub struct PlacementConfig {
    /// Also place units whose position lies outside the board.
    #[serde(default)]
    pub place_offboard: bool,
    /// Continue on a partially rasterized grid when the outline is malformed.
    #[serde(default)]
    pub allow_malformed_outline: bool,
    /// Clearance around units used by the free-area tracker.
    #[serde(
        default = "default_clearance",
        deserialize_with = "deserialize_length"
    )]
    pub default_clearance: Length,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            place_offboard: false,
            allow_malformed_outline: false,
            default_clearance: default_clearance(),
        }
    }
}

fn default_pitch() -> Length {
    Length::from_mm(1.0)
}

fn default_gain() -> u32 {
    16
}

fn default_peak_cost() -> u32 {
    500
}

fn default_clearance() -> Length {
    Length::from_mm(0.2)
}

/// Deserializes a length given either as a string with a unit suffix or as a
/// bare number of millimetres.
///
/// Allows both `pitch = "0.5mm"` and `pitch = 0.5`.
fn deserialize_length<'de, D>(deserializer: D) -> Result<Length, D::Error>
where
    D: Deserializer<'de>,
{
    struct LengthVisitor;

    impl<'de> Visitor<'de> for LengthVisitor {
        type Value = Length;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a length such as \"1mm\" or a number of millimetres")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            v.parse().map_err(E::custom)
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            if v.is_finite() {
                Ok(Length::from_mm(v))
            } else {
                Err(E::custom(format!("invalid length: {v}")))
            }
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Length::from_mm(v as f64))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Length::from_mm(v as f64))
        }
    }

    deserializer.deserialize_any(LengthVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    #[test]
    fn defaults_for_empty_file() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.grid.pitch, Length::from_mm(1.0));
        assert_eq!(config.keep_out, KeepOutConfig { gain: 16, peak_cost: 500 });
        assert!(!config.placement.place_offboard);
        assert!(!config.placement.allow_malformed_outline);
        assert_eq!(config.placement.default_clearance, Length::from_mm(0.2));
    }

    #[test]
    fn pitch_with_units() {
        for (input, expected) in [
            ("\"0.5mm\"", Length::from_mm(0.5)),
            ("\"50mil\"", Length::from_mm(1.27)),
            ("\"0.05in\"", Length::from_mm(1.27)),
            ("2", Length::from_mm(2.0)),
            ("0.25", Length::from_mm(0.25)),
        ] {
            let toml = format!("[grid]\npitch = {input}\n");
            let config = load_config_from_str(&toml).unwrap();
            assert_eq!(config.grid.pitch, expected, "input {input}");
        }
    }

    #[test]
    fn bad_length_is_parse_error() {
        let err = load_config_from_str("[grid]\npitch = \"wide\"\n").unwrap_err();
        assert!(matches!(err, crate::ConfigError::ParseError(_)));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let toml = r#"
[keep_out]
peak_cost = 1000

[placement]
place_offboard = true
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.keep_out.gain, 16);
        assert_eq!(config.keep_out.peak_cost, 1000);
        assert!(config.placement.place_offboard);
        assert_eq!(config.placement.default_clearance, Length::from_mm(0.2));
    }
}
