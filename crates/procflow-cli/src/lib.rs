//! CLI logic for the Procflow BPMN generator.
//!
//! This module contains the core CLI logic: load configuration, run an
//! input file through the generation pipeline, and write the results.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, Format};

use std::fs;

use log::info;

use procflow::{ProcessBuilder, ProcflowError};

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub process_id: String,
    pub elements: usize,
    pub output: String,
}

/// Run the Procflow CLI application
///
/// This function processes the input file through the Procflow pipeline
/// and writes the resulting BPMN XML to the output file. Nothing is written
/// when any stage fails.
///
/// # Errors
///
/// Returns `ProcflowError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Parsing and validation errors
/// - Layout and export errors
pub fn run(args: &Args) -> Result<Summary, ProcflowError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing process description"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;

    let builder = ProcessBuilder::new(app_config);
    let generated = builder.generate(&source, args.format.into())?;

    if let Some(model_out) = &args.model_out {
        fs::write(model_out, generated.definition().to_json_pretty()?)?;
        info!(model_file = model_out; "Process model written");
    }

    fs::write(&args.output, generated.xml())?;

    let definition = generated.definition();
    Ok(Summary {
        process_id: definition.process_id.clone(),
        elements: definition.iter_elements().count(),
        output: args.output.clone(),
    })
}

/// Process exit status for a failed run.
///
/// Input problems the user can fix in the description get their own codes
/// so scripts can tell them apart from I/O and internal failures.
pub fn exit_code(err: &ProcflowError) -> u8 {
    match err {
        ProcflowError::Parse { .. } | ProcflowError::Json(_) | ProcflowError::Identify(_) => 2,
        ProcflowError::Validation(_) => 3,
        ProcflowError::Io(_) => 4,
        _ => 1,
    }
}
