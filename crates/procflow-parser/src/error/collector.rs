//! Collector for accumulating diagnostics during a parse.

use crate::error::{Diagnostic, ParseError};

/// Accumulates diagnostics so that one parse can report every bad line
/// instead of stopping at the first.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Finish collection.
    ///
    /// Returns `Err` with every diagnostic if anything was emitted.
    pub fn finish(self) -> Result<(), ParseError> {
        if !self.diagnostics.is_empty() {
            Err(ParseError::new(self.diagnostics))
        } else {
            Ok(())
        }
    }
}
