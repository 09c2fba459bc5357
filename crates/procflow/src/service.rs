//! Boundary to external collaborators.
//!
//! Procflow does not talk to language models itself. A caller supplies three
//! collaborators: a [`DescriptionSource`] that turns a request into notation
//! or a structured model, a [`RequestClassifier`] that tells new workflows
//! from layout edits, and a [`LayoutEditor`] that rewrites existing XML. The
//! [`Generator`] routes a [`Request`] through them and through the
//! generation pipeline.
//!
//! Every collaborator call is bounded by [`ServiceConfig::timeout`] and is
//! never retried. A failed call fails the request.
//!
//! [`ServiceConfig::timeout`]: crate::config::ServiceConfig::timeout

use std::{future::Future, time::Duration};

use async_trait::async_trait;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use procflow_core::model::ProcessDefinition;

use crate::{InputFormat, ProcessBuilder, error::ProcflowError, verify::verify_output};

/// Failures reported by collaborators, or imposed on them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("{operation} timed out after {seconds}s")]
    Timeout {
        operation: &'static str,
        seconds: u64,
    },

    #[error("collaborator returned malformed content: {0}")]
    Malformed(String),

    #[error("collaborator rate limit exceeded")]
    RateLimited,

    #[error("collaborator failed: {0}")]
    Other(String),
}

/// One turn of prior conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// A generation or edit request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub prompt: String,

    #[serde(default)]
    pub chat_history: Vec<ChatMessage>,

    /// XML of the diagram being edited, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_xml: Option<String>,
}

impl Request {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_history(mut self, chat_history: Vec<ChatMessage>) -> Self {
        self.chat_history = chat_history;
        self
    }

    pub fn with_existing_xml(mut self, xml: impl Into<String>) -> Self {
        self.existing_xml = Some(xml.into());
        self
    }
}

/// What a description source produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Description {
    Notation(String),
    Model(ProcessDefinition),
}

impl Description {
    /// Interpret raw collaborator output. Text that looks like a JSON object
    /// is parsed as a model; anything else is taken as notation.
    pub fn from_text(text: &str) -> Result<Self, ServiceError> {
        match InputFormat::Auto.resolve(text) {
            InputFormat::Json => ProcessDefinition::from_json(text)
                .map(Description::Model)
                .map_err(|err| ServiceError::Malformed(err.to_string())),
            _ => Ok(Description::Notation(text.to_string())),
        }
    }
}

/// How a request should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Workflow,
    LayoutEdit,
}

/// Result of a freeform layout edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutEdit {
    pub xml: String,
    pub changes: Vec<String>,
}

/// What the [`Generator`] hands back.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub xml: String,
    pub changes: Vec<String>,
    /// The intermediate description, for workflow requests.
    pub model: Option<Description>,
}

/// Turns a request into a process description.
#[async_trait]
pub trait DescriptionSource: Send + Sync {
    async fn describe(&self, request: &Request) -> Result<Description, ServiceError>;
}

/// Decides whether a request is a new workflow or a layout edit.
#[async_trait]
pub trait RequestClassifier: Send + Sync {
    async fn classify(&self, request: &Request) -> Result<RequestKind, ServiceError>;
}

/// Applies a freeform layout change to existing XML.
#[async_trait]
pub trait LayoutEditor: Send + Sync {
    async fn edit(&self, existing_xml: &str, request: &Request)
    -> Result<LayoutEdit, ServiceError>;
}

/// Routes requests through the collaborators and the pipeline.
pub struct Generator {
    builder: ProcessBuilder,
    source: Box<dyn DescriptionSource>,
    classifier: Box<dyn RequestClassifier>,
    editor: Box<dyn LayoutEditor>,
    timeout: Duration,
}

impl Generator {
    pub fn new(
        builder: ProcessBuilder,
        source: Box<dyn DescriptionSource>,
        classifier: Box<dyn RequestClassifier>,
        editor: Box<dyn LayoutEditor>,
    ) -> Self {
        let timeout = builder.config().service().timeout();
        Self {
            builder,
            source,
            classifier,
            editor,
            timeout,
        }
    }

    /// Handle one request.
    ///
    /// # Errors
    ///
    /// Returns [`ProcflowError::Service`] when a collaborator fails or times
    /// out, [`ProcflowError::MissingExistingXml`] for a layout edit without
    /// XML to edit, and any pipeline error for workflow requests.
    pub async fn handle(&self, request: &Request) -> Result<Response, ProcflowError> {
        let kind = bounded(self.timeout, "classify", self.classifier.classify(request)).await?;
        info!(kind:?; "Request classified");

        match kind {
            RequestKind::LayoutEdit => self.edit_layout(request).await,
            RequestKind::Workflow => self.generate_workflow(request).await,
        }
    }

    async fn edit_layout(&self, request: &Request) -> Result<Response, ProcflowError> {
        let existing = request
            .existing_xml
            .as_deref()
            .filter(|xml| !xml.trim().is_empty())
            .ok_or(ProcflowError::MissingExistingXml)?;

        let edit = bounded(self.timeout, "edit_layout", self.editor.edit(existing, request)).await?;
        verify_output(&edit.xml)?;

        info!(changes = edit.changes.len(); "Layout edit applied");
        Ok(Response {
            xml: edit.xml,
            changes: edit.changes,
            model: None,
        })
    }

    async fn generate_workflow(&self, request: &Request) -> Result<Response, ProcflowError> {
        let description = bounded(self.timeout, "describe", self.source.describe(request)).await?;

        let generated = match &description {
            Description::Notation(text) => self.builder.generate(text, InputFormat::Notation)?,
            Description::Model(definition) => {
                self.builder.generate_from_definition(definition.clone())?
            }
        };

        Ok(Response {
            xml: generated.into_xml(),
            changes: Vec::new(),
            model: Some(description),
        })
    }
}

/// Await a collaborator call, failing it once `limit` has passed.
async fn bounded<T, F>(limit: Duration, operation: &'static str, call: F) -> Result<T, ServiceError>
where
    F: Future<Output = Result<T, ServiceError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            let seconds = limit.as_secs();
            warn!(operation, seconds; "Collaborator call timed out");
            Err(ServiceError::Timeout { operation, seconds })
        }
    }
}
