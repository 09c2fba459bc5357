//! Structural validation of process definitions.
//!
//! The [`Validator`] runs a fixed sequence of predicates over the whole tree
//! and stops at the first failure. Every predicate is a public free function
//! in [`predicates`] so each invariant can be exercised on its own. Once all
//! predicates pass, the wire model is elaborated into the typed
//! [`Process`](procflow_core::semantic::Process) consumed by layout and
//! export.
//!
//! ## Checks, in order
//!
//! 1. `required_fields`: all four top-level keys were present, and
//!    `process_id` and `process_name` are set
//! 2. `not_empty`: the process has elements
//! 3. `elements`: every element has an id, a name, and a canonical type
//! 4. `id_format`: generated ids carry their type's prefix
//! 5. `subprocesses_not_empty`: no sub-process is empty
//! 6. `unique_ids`: ids are unique across the whole tree
//! 7. `flow_references`: flow endpoints resolve within their scope
//! 8. `gateway_pairing`: splits and joins balance per scope
//! 9. `boundary_events`: the main process has a start and an end event

mod elaborate;
pub mod predicates;

use log::debug;
use thiserror::Error;

use procflow_core::{
    model::{Element, ProcessDefinition, SequenceFlow},
    registry::ElementType,
    semantic::{GatewayDirection, Process},
};

/// A failed structural check, with the offending payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },

    #[error("process has no elements")]
    EmptyProcess,

    #[error("invalid element `{element}`: {reason}")]
    InvalidElement { element: String, reason: String },

    #[error("id `{id}` does not start with `{expected_prefix}_`")]
    IdFormat {
        id: String,
        expected_prefix: &'static str,
    },

    #[error("sub-process `{id}` has no elements")]
    EmptySubprocess { id: String },

    #[error("duplicate id `{id}`")]
    DuplicateId { id: String },

    #[error("flow `{flow}` references unknown element `{reference}`")]
    DanglingReference { flow: String, reference: String },

    #[error("gateway split without matching join: {}", .ids.join(", "))]
    UnmatchedGateway { ids: Vec<String> },

    #[error("gateway join `{id}` has no open split")]
    UnmatchedJoin { id: String },

    #[error("main process has no {kind}")]
    MissingBoundaryEvent { kind: ElementType },
}

impl ValidationError {
    /// Name of the predicate that produced this error.
    pub fn predicate(&self) -> &'static str {
        match self {
            Self::MissingField { .. } => "required_fields",
            Self::EmptyProcess => "not_empty",
            Self::InvalidElement { .. } => "elements",
            Self::IdFormat { .. } => "id_format",
            Self::EmptySubprocess { .. } => "subprocesses_not_empty",
            Self::DuplicateId { .. } => "unique_ids",
            Self::DanglingReference { .. } => "flow_references",
            Self::UnmatchedGateway { .. } | Self::UnmatchedJoin { .. } => "gateway_pairing",
            Self::MissingBoundaryEvent { .. } => "boundary_events",
        }
    }
}

/// Runs every structural check and elaborates the semantic model.
#[derive(Debug, Clone, Copy)]
pub struct Validator {
    generated_ids: bool,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// A validator for a definition whose ids were generated.
    pub fn new() -> Self {
        Self {
            generated_ids: true,
        }
    }

    /// Whether ids were generated, which enables the id prefix check.
    pub fn with_generated_ids(mut self, generated_ids: bool) -> Self {
        self.generated_ids = generated_ids;
        self
    }

    /// Run all checks without elaborating.
    pub fn check(&self, definition: &ProcessDefinition) -> Result<(), ValidationError> {
        predicates::check_required_fields(definition)?;
        predicates::check_not_empty(definition)?;
        predicates::check_elements(definition)?;
        if self.generated_ids {
            predicates::check_id_format(definition)?;
        }
        predicates::check_subprocesses_not_empty(definition)?;
        predicates::check_unique_ids(definition)?;
        predicates::check_flow_references(definition)?;
        predicates::check_gateway_pairing(definition)?;
        predicates::check_boundary_events(definition)?;
        Ok(())
    }

    /// Check the definition and elaborate it into a [`Process`].
    ///
    /// # Errors
    ///
    /// Returns the first failing check. No partial model is produced.
    pub fn validate(&self, definition: &ProcessDefinition) -> Result<Process, ValidationError> {
        self.check(definition)?;
        debug!(process_id = definition.process_id.as_str(); "Structural checks passed");
        elaborate::elaborate(definition)
    }
}

/// Direction of a gateway: explicit when given, otherwise inferred from the
/// flows of its scope. More than one incoming and at most one outgoing flow
/// makes a join.
pub(crate) fn gateway_direction(element: &Element, flows: &[SequenceFlow]) -> GatewayDirection {
    if let Some(direction) = element.gateway_direction {
        return direction;
    }

    let incoming = flows
        .iter()
        .filter(|flow| flow.target_ref == element.id)
        .count();
    let outgoing = flows
        .iter()
        .filter(|flow| flow.source_ref == element.id)
        .count();

    if incoming > 1 && outgoing <= 1 {
        GatewayDirection::Converging
    } else {
        GatewayDirection::Diverging
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ProcessDefinition {
        let mut definition = ProcessDefinition::new("Process_1", "Valid");
        definition.elements = vec![
            Element::new("StartEvent_1", "start_event", "Start"),
            Element::new("Gateway_1", "exclusive_gateway", "XOR_Check")
                .with_direction(GatewayDirection::Diverging),
            Element::new("Task_1", "user_task", "Approve"),
            Element::new("Task_2", "user_task", "Reject"),
            Element::new("Gateway_2", "exclusive_gateway", "XOR_Check_end")
                .with_direction(GatewayDirection::Converging),
            Element::new("EndEvent_1", "end_event", "End"),
        ];
        definition.sequence_flows = vec![
            SequenceFlow::new("Flow_1", "StartEvent_1", "Gateway_1"),
            SequenceFlow::new("Flow_2", "Gateway_1", "Task_1"),
            SequenceFlow::new("Flow_3", "Gateway_1", "Task_2"),
            SequenceFlow::new("Flow_4", "Task_1", "Gateway_2"),
            SequenceFlow::new("Flow_5", "Task_2", "Gateway_2"),
            SequenceFlow::new("Flow_6", "Gateway_2", "EndEvent_1"),
        ];
        definition
    }

    #[test]
    fn test_valid_definition_elaborates() {
        let process = Validator::new().validate(&valid()).expect("valid definition");
        assert_eq!(process.id(), "Process_1");
        assert_eq!(process.scope().nodes().len(), 6);
        assert_eq!(process.scope().flows().len(), 6);
    }

    #[test]
    fn test_first_failure_wins() {
        let mut definition = valid();
        definition.process_name.clear();
        definition.elements.clear();

        let err = Validator::new().check(&definition).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingField {
                field: "process_name"
            }
        );
        assert_eq!(err.predicate(), "required_fields");
    }

    #[test]
    fn test_id_format_only_for_generated_ids() {
        let mut definition = valid();
        definition.elements[2].id = "approve".to_string();
        definition.sequence_flows[1].target_ref = "approve".to_string();
        definition.sequence_flows[3].source_ref = "approve".to_string();

        let err = Validator::new().check(&definition).unwrap_err();
        assert_eq!(err.predicate(), "id_format");

        Validator::new()
            .with_generated_ids(false)
            .check(&definition)
            .expect("external ids skip the prefix check");
    }

    #[test]
    fn test_gateway_direction_inference() {
        let definition = valid();
        let flows = &definition.sequence_flows;

        let split = Element::new("Gateway_1", "exclusive_gateway", "XOR");
        assert_eq!(gateway_direction(&split, flows), GatewayDirection::Diverging);

        let join = Element::new("Gateway_2", "exclusive_gateway", "XOR");
        assert_eq!(gateway_direction(&join, flows), GatewayDirection::Converging);

        // Explicit direction wins over the flows.
        let forced = join.with_direction(GatewayDirection::Diverging);
        assert_eq!(gateway_direction(&forced, flows), GatewayDirection::Diverging);
    }

    #[test]
    fn test_predicate_names() {
        let err = ValidationError::UnmatchedJoin {
            id: "Gateway_2".to_string(),
        };
        assert_eq!(err.predicate(), "gateway_pairing");
        assert_eq!(err.to_string(), "gateway join `Gateway_2` has no open split");

        let err = ValidationError::UnmatchedGateway {
            ids: vec!["Gateway_1".to_string(), "Gateway_3".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "gateway split without matching join: Gateway_1, Gateway_3"
        );
    }
}
