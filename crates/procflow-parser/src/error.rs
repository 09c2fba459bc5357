//! Diagnostics for the Procflow notation parser.
//!
//! Every problem found while reading notation text is reported as a
//! [`Diagnostic`]: an [`ErrorCode`], the 1-based line it occurred on,
//! labeled source spans, and optional help text. All diagnostics raised
//! during one parse are gathered and returned together in a [`ParseError`].
//!
//! # Example
//!
//! ```
//! # use procflow_parser::error::{Diagnostic, ErrorCode};
//! # use procflow_parser::Span;
//!
//! let diag = Diagnostic::error("missing `->` between steps")
//!     .with_code(ErrorCode::E100)
//!     .with_line(3)
//!     .with_label(Span::new(40..52), "expected a flow here")
//!     .with_help("join steps with `->`, e.g. `Start -> Review -> End`");
//!
//! assert_eq!(diag.to_string(), "error[E100]: line 3: missing `->` between steps");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
