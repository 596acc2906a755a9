//! Board lengths with unit parsing and display.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Internal units per millimetre. One internal unit is one nanometre.
pub const IU_PER_MM: f64 = 1_000_000.0;

/// Converts millimetres to internal units, rounding to the nearest unit.
pub fn mm_to_iu(mm: f64) -> i64 {
    (mm * IU_PER_MM).round() as i64
}

/// Converts internal units to millimetres.
pub fn iu_to_mm(iu: i64) -> f64 {
    iu as f64 / IU_PER_MM
}

/// A length on the board, stored in internal units (nanometres).
///
/// Supports parsing from strings like "1mm", "0.25mm", "40mil", "0.1in",
/// "250um", and bare numeric values (interpreted as millimetres). Displays
/// in millimetres.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Length(i64);

impl Length {
    /// Creates a length from internal units.
    pub fn from_iu(iu: i64) -> Self {
        Self(iu)
    }

    /// Creates a length from millimetres.
    pub fn from_mm(mm: f64) -> Self {
        Self(mm_to_iu(mm))
    }

    /// Returns the length in internal units.
    pub fn iu(&self) -> i64 {
        self.0
    }

    /// Returns the length in millimetres.
    pub fn mm(&self) -> f64 {
        iu_to_mm(self.0)
    }

    /// Returns the length in thousandths of an inch.
    pub fn mils(&self) -> f64 {
        self.mm() / 0.0254
    }
}

impl fmt::Debug for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Length({self})")
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}mm", self.mm())
    }
}

/// Error type for parsing length strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLengthError {
    /// The input string that failed to parse.
    pub input: String,
}

impl fmt::Display for ParseLengthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid length: '{}'", self.input)
    }
}

impl std::error::Error for ParseLengthError {}

impl FromStr for Length {
    type Err = ParseLengthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ParseLengthError {
            input: s.to_string(),
        };

        let lower = s.to_ascii_lowercase();
        let (num, mm_per_unit) = if let Some(num) = lower.strip_suffix("mm") {
            (num, 1.0)
        } else if let Some(num) = lower.strip_suffix("um") {
            (num, 0.001)
        } else if let Some(num) = lower.strip_suffix("mil") {
            (num, 0.0254)
        } else if let Some(num) = lower.strip_suffix("in") {
            (num, 25.4)
        } else {
            (lower.as_str(), 1.0)
        };

        let val: f64 = num.trim().parse().map_err(|_| err())?;
        if !val.is_finite() {
            return Err(err());
        }
        Ok(Length::from_mm(val * mm_per_unit))
    }
}
