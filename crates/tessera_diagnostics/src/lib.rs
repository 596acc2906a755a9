//! Diagnostic creation, severity management, and rendering.
//!
//! This crate provides structured [`Diagnostic`] messages with severity
//! levels, stable codes, the subject unit they concern, and follow-up notes.
//! The thread-safe [`DiagnosticSink`] accumulates diagnostics during a
//! placement run and mirrors each one to the `log` facade, and
//! [`DiagnosticRenderer`] implementations format them for a terminal or JSON.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode, ParseCodeError};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, JsonRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
