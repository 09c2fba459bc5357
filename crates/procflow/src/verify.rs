//! Post-emission integrity check.
//!
//! Re-reads generated XML and confirms it is well formed and contains the
//! tags every BPMN document needs. This is a smoke test, not schema
//! validation.

use log::debug;
use quick_xml::{Reader, events::Event};
use thiserror::Error;

/// Tags that must appear in every emitted document.
pub const REQUIRED_TAGS: [&str; 4] = [
    "bpmn:definitions",
    "bpmn:process",
    "bpmndi:BPMNDiagram",
    "bpmndi:BPMNPlane",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("malformed XML: {0}")]
    Malformed(String),

    #[error("missing required tag `{0}`")]
    MissingTag(&'static str),
}

/// Check that `xml` parses and contains every tag in [`REQUIRED_TAGS`].
///
/// # Example
///
/// ```
/// # use procflow::verify::{verify_output, VerifyError};
/// let err = verify_output("<bpmn:definitions></bpmn:definitions>").unwrap_err();
/// assert_eq!(err, VerifyError::MissingTag("bpmn:process"));
/// ```
pub fn verify_output(xml: &str) -> Result<(), VerifyError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().check_end_names = true;

    let mut seen = [false; REQUIRED_TAGS.len()];
    let mut depth: usize = 0;
    let mut roots = 0;

    loop {
        let event = reader
            .read_event()
            .map_err(|err| VerifyError::Malformed(err.to_string()))?;

        let name = match &event {
            Event::Start(start) | Event::Empty(start) => Some(start.name()),
            _ => None,
        };
        if let Some(name) = name {
            if depth == 0 {
                roots += 1;
            }
            if let Some(index) = REQUIRED_TAGS
                .iter()
                .position(|tag| tag.as_bytes() == name.as_ref())
            {
                seen[index] = true;
            }
        }

        match event {
            Event::Start(_) => depth += 1,
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(VerifyError::Malformed(format!(
            "{depth} element(s) left unclosed"
        )));
    }
    if roots > 1 {
        return Err(VerifyError::Malformed(format!(
            "expected one root element, found {roots}"
        )));
    }
    if let Some(index) = seen.iter().position(|found| !found) {
        return Err(VerifyError::MissingTag(REQUIRED_TAGS[index]));
    }

    debug!(bytes = xml.len(); "Output integrity verified");
    Ok(())
}
