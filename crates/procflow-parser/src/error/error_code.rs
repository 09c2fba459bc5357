//! Error codes for notation diagnostics.
//!
//! All notation errors live in the `E1xx` range.

use std::fmt;

/// Error codes for categorizing notation diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Missing arrow.
    ///
    /// A flow line (or a subprocess body line) contains no `->`.
    E100,

    /// Empty step.
    ///
    /// Nothing was written between two arrows or around `||`.
    E101,

    /// Unmatched subprocess header.
    ///
    /// A `Name: ...` flow line names a subprocess that no `[sub]Name` step
    /// declares.
    E102,

    /// Malformed step.
    ///
    /// Unbalanced parentheses, a `[sub]` marker without a name, a malformed
    /// actor mapping, or a condition on a step that has no outgoing flow.
    E103,

    /// Empty notation.
    ///
    /// The input contains no flow lines.
    E104,

    /// Ambiguous subprocess.
    ///
    /// The same `[sub]Name` is referenced from more than one scope, so its
    /// body line cannot be attributed to a single subprocess.
    E105,
}

impl ErrorCode {
    /// Returns the code as a string (e.g. "E100").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
            ErrorCode::E105 => "E105",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E100 => "missing arrow",
            ErrorCode::E101 => "empty step",
            ErrorCode::E102 => "unmatched subprocess header",
            ErrorCode::E103 => "malformed step",
            ErrorCode::E104 => "empty notation",
            ErrorCode::E105 => "ambiguous subprocess",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
