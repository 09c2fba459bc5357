//! Procflow - generate BPMN 2.0 diagrams from process descriptions.
//!
//! A process is described either in the line-oriented Procflow notation or as
//! a structured JSON model. Procflow canonicalizes and identifies its
//! elements, checks its structure, lays it out left to right, and writes
//! BPMN XML with diagram interchange data.

pub mod config;
pub mod export;
pub mod identify;
pub mod layout;
pub mod service;
pub mod validate;
pub mod verify;

mod error;

pub use procflow_core::{geometry, model, registry, semantic};

pub use error::ProcflowError;

use log::{debug, info, trace};

use procflow_core::{model::ProcessDefinition, semantic::Process};

use config::AppConfig;
use export::{Exporter, xml::XmlExporter};
use identify::{IdAssigner, IdOrigin, IdPolicy};
use layout::{Layout, LayoutEngine};
use validate::Validator;

/// How source text should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    /// JSON when the text starts with `{`, notation otherwise.
    #[default]
    Auto,
    Notation,
    Json,
}

impl InputFormat {
    /// Resolve [`InputFormat::Auto`] against the given source.
    ///
    /// ```
    /// # use procflow::InputFormat;
    /// assert_eq!(InputFormat::Auto.resolve("  {\"elements\": []}"), InputFormat::Json);
    /// assert_eq!(InputFormat::Auto.resolve("Start -> End"), InputFormat::Notation);
    /// assert_eq!(InputFormat::Notation.resolve("{"), InputFormat::Notation);
    /// ```
    pub fn resolve(self, source: &str) -> InputFormat {
        match self {
            InputFormat::Auto if source.trim_start().starts_with('{') => InputFormat::Json,
            InputFormat::Auto => InputFormat::Notation,
            format => format,
        }
    }
}

/// The outcome of a full generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    definition: ProcessDefinition,
    xml: String,
}

impl Generated {
    /// The identified process definition the XML was generated from.
    pub fn definition(&self) -> &ProcessDefinition {
        &self.definition
    }

    pub fn xml(&self) -> &str {
        &self.xml
    }

    pub fn into_xml(self) -> String {
        self.xml
    }
}

/// Builder for generating BPMN diagrams.
///
/// This provides an API for running process descriptions through parsing,
/// identification, validation, layout, and XML emission. Every method takes
/// `&self`; each run builds its own intermediate values, so one builder can
/// serve many requests.
///
/// # Examples
///
/// ```rust
/// use procflow::{InputFormat, ProcessBuilder, config::AppConfig};
///
/// let builder = ProcessBuilder::new(AppConfig::default());
///
/// let generated = builder
///     .generate("Start -> Review(manual) -> End", InputFormat::Auto)
///     .expect("Failed to generate");
///
/// assert!(generated.xml().contains("<bpmn:manualTask"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProcessBuilder {
    config: AppConfig,
}

impl ProcessBuilder {
    /// Create a new process builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse notation into a draft process definition with provisional ids.
    ///
    /// # Errors
    ///
    /// Returns [`ProcflowError::Parse`] carrying every diagnostic and the
    /// source text.
    pub fn parse_notation(&self, source: &str) -> Result<ProcessDefinition, ProcflowError> {
        info!("Parsing notation");

        let notation = procflow_parser::parse(source)
            .map_err(|err| ProcflowError::new_parse_error(err, source))?;

        debug!(actors = notation.actors().len(); "Notation parsed successfully");
        trace!(definition:? = notation.definition(); "Parsed definition");

        Ok(notation.into_definition())
    }

    /// Read a structured process definition from JSON.
    pub fn parse_json(&self, source: &str) -> Result<ProcessDefinition, ProcflowError> {
        info!("Reading JSON model");
        Ok(ProcessDefinition::from_json(source)?)
    }

    /// Canonicalize types and assign ids in place.
    pub fn prepare(
        &self,
        definition: &mut ProcessDefinition,
        policy: IdPolicy,
    ) -> Result<IdOrigin, ProcflowError> {
        Ok(IdAssigner::new().assign(definition, policy)?)
    }

    /// Run the structural checks and elaborate the semantic model.
    pub fn validate(
        &self,
        definition: &ProcessDefinition,
        origin: IdOrigin,
    ) -> Result<Process, ProcflowError> {
        let process = Validator::new()
            .with_generated_ids(origin.is_generated())
            .validate(definition)?;
        info!(nodes = process.all_nodes().len(); "Process validated");
        Ok(process)
    }

    pub fn layout(&self, process: &Process) -> Result<Layout, ProcflowError> {
        LayoutEngine::new(self.config.layout().clone()).calculate(process)
    }

    /// Write BPMN XML and check its integrity.
    pub fn render_xml(&self, process: &Process, layout: &Layout) -> Result<String, ProcflowError> {
        let xml = XmlExporter::new(self.config.export().clone()).export(process, layout)?;
        verify::verify_output(&xml)?;
        info!(bytes = xml.len(); "XML rendered successfully");
        Ok(xml)
    }

    /// Run the whole pipeline on source text.
    ///
    /// Notation ids are always regenerated. JSON ids are kept when every
    /// element carries one.
    pub fn generate(&self, source: &str, format: InputFormat) -> Result<Generated, ProcflowError> {
        match format.resolve(source) {
            InputFormat::Json => {
                let definition = self.parse_json(source)?;
                self.generate_from_definition(definition)
            }
            _ => {
                let definition = self.parse_notation(source)?;
                self.run(definition, IdPolicy::Regenerate)
            }
        }
    }

    /// Run the pipeline on a structured definition, keeping any ids it
    /// already carries and numbering the rest.
    pub fn generate_from_definition(
        &self,
        definition: ProcessDefinition,
    ) -> Result<Generated, ProcflowError> {
        self.run(definition, IdPolicy::PreserveExternal)
    }

    fn run(
        &self,
        mut definition: ProcessDefinition,
        policy: IdPolicy,
    ) -> Result<Generated, ProcflowError> {
        let origin = self.prepare(&mut definition, policy)?;
        let process = self.validate(&definition, origin)?;
        let layout = self.layout(&process)?;
        let xml = self.render_xml(&process, &layout)?;
        Ok(Generated { definition, xml })
    }
}
