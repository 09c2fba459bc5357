//! Command-line argument definitions for the Procflow CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, the input format,
//! configuration file selection, and logging verbosity.

use clap::{Parser, ValueEnum};

use procflow::InputFormat;

/// Command-line arguments for the Procflow BPMN generator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input notation or JSON file
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the output BPMN file
    #[arg(short, long, default_value = "out.bpmn")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// How the input should be read
    #[arg(long, value_enum, default_value_t = Format::Auto)]
    pub format: Format,

    /// Also write the identified process model as JSON to this path
    #[arg(long)]
    pub model_out: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Input format selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// JSON when the file starts with `{`, notation otherwise
    Auto,
    Notation,
    Json,
}

impl From<Format> for InputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Auto => InputFormat::Auto,
            Format::Notation => InputFormat::Notation,
            Format::Json => InputFormat::Json,
        }
    }
}
