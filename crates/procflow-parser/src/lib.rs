//! # Procflow Parser
//!
//! Parser for the Procflow process notation, a line-oriented way of writing
//! a process as chains of steps:
//!
//! ```text
//! Process: Order Handling
//! Actors: Customer, Warehouse
//! Start -> SubmitOrder(user) -> XOR_InStock -> [sub]Packing -> XOR_InStock_end -> End
//! XOR_InStock -> Backorder(service) -> XOR_InStock_end
//!   Packing: Start -> Pick || Wrap -> End
//! Customer: [SubmitOrder]
//! Warehouse: [Pick, Wrap]
//! ```
//!
//! The result is a draft [`ProcessDefinition`] whose elements carry
//! provisional ids. Assigning final ids and validating the structure are
//! later pipeline stages.
//!
//! ## Usage
//!
//! ```
//! # use procflow_parser::{parse, error::ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let notation = parse("Start -> Review -> End")?;
//!     assert_eq!(notation.definition().elements.len(), 3);
//!     Ok(())
//! }
//! ```
//!
//! [`ProcessDefinition`]: procflow_core::model::ProcessDefinition

mod builder;
pub mod error;
mod lines;
mod names;
mod parser;
mod span;

pub use names::sanitize_name;
pub use span::Span;

use log::debug;

use procflow_core::model::ProcessDefinition;

use builder::Builder;
use error::ParseError;

/// A parsed notation document.
#[derive(Debug, Clone, PartialEq)]
pub struct Notation {
    actors: Vec<String>,
    definition: ProcessDefinition,
}

impl Notation {
    fn new(actors: Vec<String>, definition: ProcessDefinition) -> Self {
        Self { actors, definition }
    }

    /// Participants declared on `Actors:` lines. Advisory only.
    pub fn actors(&self) -> &[String] {
        &self.actors
    }

    /// The draft process definition.
    pub fn definition(&self) -> &ProcessDefinition {
        &self.definition
    }

    pub fn into_definition(self) -> ProcessDefinition {
        self.definition
    }
}

/// Parse notation source text.
///
/// Every malformed line is reported in the returned [`ParseError`]. An actor
/// mapping that names an unknown activity is only logged as a warning.
///
/// # Example
///
/// ```
/// # use procflow_parser::parse;
/// let err = parse("Start -> -> End").unwrap_err();
/// assert_eq!(err.diagnostics()[0].line(), Some(1));
/// ```
pub fn parse(source: &str) -> Result<Notation, ParseError> {
    debug!(bytes = source.len(); "Parsing notation");
    Builder::new(source).build()
}
