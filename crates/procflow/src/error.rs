//! Error types for Procflow operations.
//!
//! This module provides the main error type [`ProcflowError`] which wraps
//! every failure a generation run can end in. Output is all-or-nothing: any
//! of these errors means no XML was produced.

use std::io;

use thiserror::Error;

use procflow_parser::error::ParseError;

use crate::{
    identify::IdentifyError, service::ServiceError, validate::ValidationError,
    verify::VerifyError,
};

/// The main error type for Procflow operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant contains structured error information with source code
/// spans. This provides detailed error information that can be used for rich
/// error reporting.
#[derive(Debug, Error)]
pub enum ProcflowError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Invalid process model: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Identify(#[from] IdentifyError),

    #[error("Validation failed ({pred}): {err}", pred = .0.predicate(), err = .0)]
    Validation(#[from] ValidationError),

    #[error("Layout error: {0}")]
    Layout(String),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error + Send + Sync>),

    #[error("Output integrity check failed: {0}")]
    OutputIntegrity(#[from] VerifyError),

    #[error("{0}")]
    Service(#[from] ServiceError),

    #[error("Layout edit requested without existing XML")]
    MissingExistingXml,
}

impl From<crate::export::Error> for ProcflowError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}

impl ProcflowError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }

    /// A short, stable name for the kind of failure.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Parse { .. } => "parse",
            Self::Json(_) => "json",
            Self::Identify(_) => "identify",
            Self::Validation(_) => "validation",
            Self::Layout(_) => "layout",
            Self::Export(_) => "export",
            Self::OutputIntegrity(_) => "output_integrity",
            Self::Service(_) => "service",
            Self::MissingExistingXml => "missing_existing_xml",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_names_predicate() {
        let err = ProcflowError::from(ValidationError::DuplicateId {
            id: "Task_1".to_string(),
        });
        let message = err.to_string();
        assert!(message.starts_with("Validation failed (unique_ids): "));
        assert!(message.contains("Task_1"));
    }
}
