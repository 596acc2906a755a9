//! Stable diagnostic codes such as `E303` or `W301`.
//!
//! A code is a category letter plus a number. Codes serialize as their
//! display string so JSON consumers can match on `"E303"` directly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The category of a diagnostic code, determining its prefix letter.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Category {
    /// Run failures, prefixed with `E`.
    Error,
    /// Adjusted or tolerated input, prefixed with `W`.
    Warning,
    /// Placement progress and summaries, prefixed with `P`.
    Placement,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Error => 'E',
            Category::Warning => 'W',
            Category::Placement => 'P',
        }
    }

    /// Looks a category up by its prefix letter.
    pub fn from_prefix(c: char) -> Option<Self> {
        match c {
            'E' => Some(Category::Error),
            'W' => Some(Category::Warning),
            'P' => Some(Category::Placement),
            _ => None,
        }
    }
}

/// A category letter followed by a zero-padded 3-digit number.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DiagnosticCode {
    /// The category of this diagnostic.
    pub category: Category,
    /// The numeric identifier within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a new diagnostic code.
    pub const fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}

/// A string that is not a diagnostic code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid diagnostic code `{0}`")]
pub struct ParseCodeError(pub String);

impl FromStr for DiagnosticCode {
    type Err = ParseCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseCodeError(s.to_string());
        let mut chars = s.chars();
        let category = chars.next().and_then(Category::from_prefix).ok_or_else(err)?;
        let digits = chars.as_str();
        if digits.len() != 3 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let number = digits.parse().map_err(|_| err())?;
        Ok(Self::new(category, number))
    }
}

impl TryFrom<String> for DiagnosticCode {
    type Error = ParseCodeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<DiagnosticCode> for String {
    fn from(code: DiagnosticCode) -> String {
        code.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_zero_padded() {
        assert_eq!(DiagnosticCode::new(Category::Error, 303).to_string(), "E303");
        assert_eq!(DiagnosticCode::new(Category::Placement, 7).to_string(), "P007");
    }

    #[test]
    fn parse_known_prefixes() {
        assert_eq!("W301".parse(), Ok(DiagnosticCode::new(Category::Warning, 301)));
        assert_eq!("P007".parse(), Ok(DiagnosticCode::new(Category::Placement, 7)));
        for c in ['E', 'W', 'P'] {
            assert_eq!(Category::from_prefix(c).map(Category::prefix), Some(c));
        }
    }

    #[test]
    fn parse_rejects_malformed() {
        for bad in ["", "E", "X301", "E30", "E3011", "E+01", "e301"] {
            assert!(bad.parse::<DiagnosticCode>().is_err(), "{bad}");
        }
    }

    #[test]
    fn serializes_as_string() {
        let code = DiagnosticCode::new(Category::Error, 302);
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"E302\"");
        let back: DiagnosticCode = serde_json::from_str("\"E302\"").unwrap();
        assert_eq!(back, code);
        assert!(serde_json::from_str::<DiagnosticCode>("\"Q1\"").is_err());
    }
}
