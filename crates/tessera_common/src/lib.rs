//! Shared foundational types used across the tessera placement workspace.
//!
//! This crate provides integer board geometry, length values with unit
//! parsing, rotation angles in tenths of a degree, and opaque id newtypes.

#![warn(missing_docs)]

pub mod angle;
pub mod geom;
pub mod ids;
pub mod length;

pub use angle::Angle;
pub use geom::{Point, Rect};
pub use ids::{NetCode, UnitId};
pub use length::{iu_to_mm, mm_to_iu, Length, ParseLengthError, IU_PER_MM};
