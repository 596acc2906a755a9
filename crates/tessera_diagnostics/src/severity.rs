//! Diagnostic severity levels ordered from least to most severe.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The severity level of a diagnostic message.
///
/// Ordered from least severe (`Note`) to most severe (`Error`).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational output about a run, such as a placement summary.
    Note,
    /// Something was adjusted or tolerated; the run still proceeded.
    Warning,
    /// The run could not complete as requested.
    Error,
}

impl Severity {
    /// Returns `true` if this severity is [`Error`](Severity::Error).
    pub fn is_error(self) -> bool {
        self == Severity::Error
    }

    /// Whether a diagnostic of this severity is printed under `--quiet`.
    ///
    /// Only notes are hidden; anything that changed or stopped a run shows.
    pub fn shown_when_quiet(self) -> bool {
        self >= Severity::Warning
    }

    /// The `log` level a diagnostic of this severity is mirrored at.
    pub fn log_level(self) -> log::Level {
        match self {
            Severity::Note => log::Level::Info,
            Severity::Warning => log::Level::Warn,
            Severity::Error => log::Level::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Note => write!(f, "note"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering() {
        assert!(Severity::Note < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn log_levels() {
        assert_eq!(Severity::Note.log_level(), log::Level::Info);
        assert_eq!(Severity::Warning.log_level(), log::Level::Warn);
        assert_eq!(Severity::Error.log_level(), log::Level::Error);
        assert!(Severity::Error.is_error());
        assert!(!Severity::Note.is_error());
    }

    #[test]
    fn quiet_hides_notes_only() {
        assert!(!Severity::Note.shown_when_quiet());
        assert!(Severity::Warning.shown_when_quiet());
        assert!(Severity::Error.shown_when_quiet());
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", Severity::Error), "error");
        assert_eq!(format!("{}", Severity::Warning), "warning");
        assert_eq!(format!("{}", Severity::Note), "note");
    }
}
