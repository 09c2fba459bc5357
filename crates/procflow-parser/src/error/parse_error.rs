//! The error returned from a failed parse.

use thiserror::Error;

use crate::error::Diagnostic;

/// Error type for notation parsing.
///
/// Wraps every diagnostic raised while reading the source, in source order.
/// Displays as the first diagnostic plus a count of the rest.
#[derive(Debug, Error)]
#[error("{}", summarize(.diagnostics))]
pub struct ParseError {
    diagnostics: Vec<Diagnostic>,
}

impl ParseError {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

fn summarize(diagnostics: &[Diagnostic]) -> String {
    match diagnostics {
        [] => String::new(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (+{} more)", rest.len()),
    }
}

impl From<Diagnostic> for ParseError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self::new(vec![diagnostic])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_display_single() {
        let err: ParseError = Diagnostic::error("no flow lines")
            .with_code(ErrorCode::E104)
            .into();
        assert_eq!(err.to_string(), "error[E104]: no flow lines");
    }

    #[test]
    fn test_display_multiple() {
        let err = ParseError::new(vec![
            Diagnostic::error("one").with_line(1),
            Diagnostic::error("two").with_line(2),
            Diagnostic::error("three").with_line(3),
        ]);
        assert_eq!(err.to_string(), "error: line 1: one (+2 more)");
    }
}
