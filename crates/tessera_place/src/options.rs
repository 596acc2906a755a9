//! Run options resolved from configuration.

use crate::error::codes;
use tessera_common::{iu_to_mm, mm_to_iu};
use tessera_config::PlacerConfig;
use tessera_diagnostics::{Diagnostic, DiagnosticSink};

/// Default grid pitch: 1 mm.
pub const DEFAULT_PITCH: i64 = 1_000_000;

/// Smallest grid pitch a run will use: 0.25 mm.
pub const MIN_PITCH: i64 = 250_000;

/// Default divisor turning a unit's terminal count into a keep-out margin.
pub const DEFAULT_KEEP_OUT_GAIN: u32 = 16;

/// Default keep-out cost on the cells a unit covers.
pub const DEFAULT_KEEP_OUT_PEAK: u32 = 500;

/// Settings for one autoplace run, in internal units.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AutoplaceOptions {
    /// Requested grid pitch; raised to [`MIN_PITCH`] when smaller.
    pub pitch: i64,
    /// Keep-out margin is `pitch * terminal_count / keep_out_gain`.
    pub keep_out_gain: u32,
    /// Keep-out cost on the cells a unit covers; its band falls off from here.
    pub keep_out_peak: u32,
    /// Also place units whose position lies outside the board.
    pub place_offboard: bool,
    /// Continue on a partially filled grid when the outline is malformed.
    pub allow_malformed_outline: bool,
    /// Minimum clearance around units in the free-area tracker; a larger
    /// keep-out margin takes precedence.
    pub clearance: i64,
}

impl Default for AutoplaceOptions {
    fn default() -> Self {
        Self {
            pitch: DEFAULT_PITCH,
            keep_out_gain: DEFAULT_KEEP_OUT_GAIN,
            keep_out_peak: DEFAULT_KEEP_OUT_PEAK,
            place_offboard: false,
            allow_malformed_outline: false,
            clearance: mm_to_iu(0.2),
        }
    }
}

impl AutoplaceOptions {
    /// Converts a validated configuration, clamping the pitch.
    pub fn from_config(config: &PlacerConfig, sink: &DiagnosticSink) -> Self {
        let options = Self {
            pitch: config.grid.pitch.iu(),
            keep_out_gain: config.keep_out.gain,
            keep_out_peak: config.keep_out.peak_cost,
            place_offboard: config.placement.place_offboard,
            allow_malformed_outline: config.placement.allow_malformed_outline,
            clearance: config.placement.default_clearance.iu(),
        };
        let pitch = options.effective_pitch(sink);
        Self { pitch, ..options }
    }

    /// The pitch a run will use, warning when the requested one is too fine.
    pub fn effective_pitch(&self, sink: &DiagnosticSink) -> i64 {
        if self.pitch >= MIN_PITCH {
            return self.pitch;
        }
        sink.emit(
            Diagnostic::warning(
                codes::PITCH_CLAMPED,
                format!(
                    "grid pitch {}mm is below the minimum, using {}mm",
                    iu_to_mm(self.pitch),
                    iu_to_mm(MIN_PITCH)
                ),
            )
            .with_note("finer grids grow the search quadratically"),
        );
        MIN_PITCH
    }

    /// Keep-out gain, never zero.
    pub(crate) fn gain(&self) -> u32 {
        self.keep_out_gain.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_config::load_config_from_str;

    #[test]
    fn defaults_match_config_defaults() {
        let sink = DiagnosticSink::new();
        let from_config = AutoplaceOptions::from_config(&PlacerConfig::default(), &sink);
        assert_eq!(from_config, AutoplaceOptions::default());
        assert_eq!(sink.warning_count(), 0);
    }

    #[test]
    fn config_values_carry_over() {
        let config = load_config_from_str(
            r#"
[grid]
pitch = "0.5mm"

[keep_out]
gain = 8
peak_cost = 300

[placement]
place_offboard = true
default_clearance = "0.1mm"
"#,
        )
        .unwrap();
        let sink = DiagnosticSink::new();
        let options = AutoplaceOptions::from_config(&config, &sink);
        assert_eq!(options.pitch, 500_000);
        assert_eq!(options.keep_out_gain, 8);
        assert_eq!(options.keep_out_peak, 300);
        assert!(options.place_offboard);
        assert!(!options.allow_malformed_outline);
        assert_eq!(options.clearance, 100_000);
    }

    #[test]
    fn fine_pitch_is_clamped_with_warning() {
        let config = load_config_from_str("[grid]\npitch = \"0.1mm\"\n").unwrap();
        let sink = DiagnosticSink::new();
        let options = AutoplaceOptions::from_config(&config, &sink);
        assert_eq!(options.pitch, MIN_PITCH);
        let diags = sink.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, codes::PITCH_CLAMPED);
    }

    #[test]
    fn minimum_pitch_is_kept() {
        let sink = DiagnosticSink::new();
        let options = AutoplaceOptions {
            pitch: MIN_PITCH,
            ..AutoplaceOptions::default()
        };
        assert_eq!(options.effective_pitch(&sink), MIN_PITCH);
        assert_eq!(sink.warning_count(), 0);
    }
}
