//! Diagnostic rendering backends for human-readable and machine-readable output.

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;

/// Trait for rendering diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string.
    fn render(&self, diag: &Diagnostic) -> String;
}

/// Renders diagnostics in a rustc-style terminal format.
///
/// Produces output like:
/// ```text
/// error[E303]: no legal position in any allowed orientation
///   --> unit U7
///    = note: footprint is 42mm x 30mm
/// ```
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn severity_label(&self, severity: Severity) -> String {
        if !self.color {
            return severity.to_string();
        }
        let ansi = match severity {
            Severity::Error => "31",
            Severity::Warning => "33",
            Severity::Note => "36",
        };
        format!("\x1b[1;{ansi}m{severity}\x1b[0m")
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        let mut out = format!(
            "{}[{}]: {}\n",
            self.severity_label(diag.severity),
            diag.code,
            diag.message
        );
        if let Some(unit) = &diag.unit {
            out.push_str(&format!("  --> unit {unit}\n"));
        }
        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        for help in &diag.help {
            out.push_str(&format!("   = help: {help}\n"));
        }
        out
    }
}

/// Renders each diagnostic as one line of JSON.
pub struct JsonRenderer;

impl DiagnosticRenderer for JsonRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        // Diagnostic holds only strings, enums and vectors, so serialization cannot fail.
        serde_json::to_string(diag).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Category, DiagnosticCode};

    #[test]
    fn render_error_with_unit() {
        let diag = Diagnostic::error(DiagnosticCode::new(Category::Error, 303), "no legal position")
            .with_unit("U7")
            .with_note("footprint is larger than the board");
        let out = TerminalRenderer::new(false).render(&diag);
        assert!(out.starts_with("error[E303]: no legal position\n"));
        assert!(out.contains("  --> unit U7\n"));
        assert!(out.contains("   = note: footprint is larger than the board\n"));
    }

    #[test]
    fn render_warning_with_help() {
        let diag = Diagnostic::warning(DiagnosticCode::new(Category::Warning, 301), "pitch clamped")
            .with_help("raise [grid] pitch");
        let out = TerminalRenderer::new(false).render(&diag);
        assert!(out.contains("warning[W301]"));
        assert!(out.contains("= help: raise [grid] pitch"));
        assert!(!out.contains("-->"));
    }

    #[test]
    fn color_wraps_severity() {
        let diag = Diagnostic::note(DiagnosticCode::new(Category::Placement, 301), "done");
        let out = TerminalRenderer::new(true).render(&diag);
        assert!(out.starts_with("\x1b[1;36mnote\x1b[0m[P301]"));
    }

    #[test]
    fn json_is_single_line() {
        let diag = Diagnostic::error(DiagnosticCode::new(Category::Error, 301), "degenerate board");
        let out = JsonRenderer.render(&diag);
        assert!(!out.contains('\n'));
        assert!(out.contains("\"severity\":\"error\""));
        assert!(out.contains("\"code\":\"E301\""));
        assert!(out.contains("degenerate board"));
    }
}
