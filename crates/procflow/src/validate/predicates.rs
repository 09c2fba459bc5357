//! Individual structural checks.
//!
//! Each function checks one invariant over the whole tree and returns the
//! first violation it finds. They assume the checks before them in
//! [`Validator::check`](super::Validator::check) have passed; for example
//! [`check_gateway_pairing`] relies on every type being canonical.

use std::collections::HashSet;

use procflow_core::{
    model::{Element, ProcessDefinition, SequenceFlow},
    registry::ElementType,
};

use super::{ValidationError, gateway_direction};

/// One flow scope: the main process or the body of a sub-process.
struct ScopeRef<'a> {
    elements: &'a [Element],
    flows: &'a [SequenceFlow],
}

/// Every scope of the tree, main process first, then nested bodies in
/// depth-first order.
fn scopes(definition: &ProcessDefinition) -> Vec<ScopeRef<'_>> {
    fn collect<'a>(
        elements: &'a [Element],
        flows: &'a [SequenceFlow],
        out: &mut Vec<ScopeRef<'a>>,
    ) {
        out.push(ScopeRef { elements, flows });
        for element in elements.iter().filter(|element| element.elements.is_some()) {
            collect(element.children(), element.child_flows(), out);
        }
    }

    let mut out = Vec::new();
    collect(&definition.elements, &definition.sequence_flows, &mut out);
    out
}

fn label(element: &Element) -> String {
    if !element.id.is_empty() {
        element.id.clone()
    } else if !element.name.is_empty() {
        element.name.clone()
    } else {
        format!("<{}>", element.kind)
    }
}

fn invalid(element: &Element, reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidElement {
        element: label(element),
        reason: reason.into(),
    }
}

/// All four top-level keys must be present, and `process_id` and
/// `process_name` must be non-empty.
pub fn check_required_fields(definition: &ProcessDefinition) -> Result<(), ValidationError> {
    if let Some(&field) = definition.missing_keys().first() {
        return Err(ValidationError::MissingField { field });
    }
    if definition.process_id.trim().is_empty() {
        return Err(ValidationError::MissingField {
            field: "process_id",
        });
    }
    if definition.process_name.trim().is_empty() {
        return Err(ValidationError::MissingField {
            field: "process_name",
        });
    }
    Ok(())
}

/// The main process must contain at least one element.
pub fn check_not_empty(definition: &ProcessDefinition) -> Result<(), ValidationError> {
    if definition.elements.is_empty() {
        return Err(ValidationError::EmptyProcess);
    }
    Ok(())
}

/// Every element needs an id, a type, and a name, and its type must be
/// canonical. Only sub-processes may carry nested elements.
pub fn check_elements(definition: &ProcessDefinition) -> Result<(), ValidationError> {
    for element in definition.iter_elements() {
        if element.id.trim().is_empty() {
            return Err(invalid(element, "missing id"));
        }
        if element.kind.trim().is_empty() {
            return Err(invalid(element, "missing type"));
        }
        if element.name.trim().is_empty() {
            return Err(invalid(element, "missing name"));
        }

        let Some(kind) = ElementType::from_canonical(&element.kind) else {
            return Err(invalid(
                element,
                format!("type `{}` is not canonical", element.kind),
            ));
        };

        if kind != ElementType::SubProcess
            && (element.elements.is_some() || element.sequence_flows.is_some())
        {
            return Err(invalid(
                element,
                format!("{kind} cannot contain nested elements"),
            ));
        }
        if !kind.is_gateway() && element.gateway_direction.is_some() {
            return Err(invalid(
                element,
                format!("{kind} cannot have a gateway direction"),
            ));
        }
    }
    Ok(())
}

/// Generated ids must be `<Prefix>_<n>` for the element's type, and flow
/// ids must be `Flow_<n>`.
pub fn check_id_format(definition: &ProcessDefinition) -> Result<(), ValidationError> {
    for element in definition.iter_elements() {
        let Some(kind) = ElementType::from_canonical(&element.kind) else {
            continue;
        };
        if !has_numbered_prefix(&element.id, kind.id_prefix()) {
            return Err(ValidationError::IdFormat {
                id: element.id.clone(),
                expected_prefix: kind.id_prefix(),
            });
        }
    }

    for scope in scopes(definition) {
        for flow in scope.flows {
            if !has_numbered_prefix(&flow.id, "Flow") {
                return Err(ValidationError::IdFormat {
                    id: flow.id.clone(),
                    expected_prefix: "Flow",
                });
            }
        }
    }
    Ok(())
}

fn has_numbered_prefix(id: &str, prefix: &str) -> bool {
    id.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('_'))
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

/// Every sub-process must contain at least one nested element.
pub fn check_subprocesses_not_empty(
    definition: &ProcessDefinition,
) -> Result<(), ValidationError> {
    let empty = definition
        .iter_elements()
        .filter(|element| element.kind == ElementType::SubProcess.as_str())
        .find(|element| element.children().is_empty());

    match empty {
        Some(element) => Err(ValidationError::EmptySubprocess {
            id: element.id.clone(),
        }),
        None => Ok(()),
    }
}

/// Element ids are unique across the whole tree, and no flow shares an id
/// with an element or another flow.
pub fn check_unique_ids(definition: &ProcessDefinition) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();

    for element in definition.iter_elements() {
        if !seen.insert(element.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: element.id.clone(),
            });
        }
    }

    for scope in scopes(definition) {
        for flow in scope.flows.iter().filter(|flow| !flow.id.is_empty()) {
            if !seen.insert(flow.id.as_str()) {
                return Err(ValidationError::DuplicateId {
                    id: flow.id.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Every `sourceRef` and `targetRef` must name an element of the same scope.
pub fn check_flow_references(definition: &ProcessDefinition) -> Result<(), ValidationError> {
    for scope in scopes(definition) {
        let visible: HashSet<&str> = scope
            .elements
            .iter()
            .map(|element| element.id.as_str())
            .collect();

        for flow in scope.flows {
            for reference in [&flow.source_ref, &flow.target_ref] {
                if !visible.contains(reference.as_str()) {
                    return Err(ValidationError::DanglingReference {
                        flow: flow.id.clone(),
                        reference: reference.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Splits and joins must balance within each scope.
///
/// Gateways are walked in document order. A split opens a block; a join
/// closes the most recent open split of the same kind.
pub fn check_gateway_pairing(definition: &ProcessDefinition) -> Result<(), ValidationError> {
    for scope in scopes(definition) {
        let mut open: Vec<(ElementType, &str)> = Vec::new();

        for element in scope.elements {
            let Some(kind) = ElementType::from_canonical(&element.kind) else {
                continue;
            };
            if !kind.is_gateway() {
                continue;
            }

            if gateway_direction(element, scope.flows).is_split() {
                open.push((kind, element.id.as_str()));
                continue;
            }

            match open.iter().rposition(|(open_kind, _)| *open_kind == kind) {
                Some(index) => {
                    open.remove(index);
                }
                None => {
                    return Err(ValidationError::UnmatchedJoin {
                        id: element.id.clone(),
                    });
                }
            }
        }

        if !open.is_empty() {
            return Err(ValidationError::UnmatchedGateway {
                ids: open.into_iter().map(|(_, id)| id.to_string()).collect(),
            });
        }
    }
    Ok(())
}

/// The main process needs at least one start event and one end event.
pub fn check_boundary_events(definition: &ProcessDefinition) -> Result<(), ValidationError> {
    for kind in [ElementType::StartEvent, ElementType::EndEvent] {
        let present = definition
            .elements
            .iter()
            .any(|element| element.kind == kind.as_str());
        if !present {
            return Err(ValidationError::MissingBoundaryEvent { kind });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use procflow_core::semantic::GatewayDirection;

    use super::*;

    fn linear() -> ProcessDefinition {
        let mut definition = ProcessDefinition::new("Process_1", "Linear");
        definition.elements = vec![
            Element::new("StartEvent_1", "start_event", "Start"),
            Element::new("Task_1", "user_task", "Review"),
            Element::new("EndEvent_1", "end_event", "End"),
        ];
        definition.sequence_flows = vec![
            SequenceFlow::new("Flow_1", "StartEvent_1", "Task_1"),
            SequenceFlow::new("Flow_2", "Task_1", "EndEvent_1"),
        ];
        definition
    }

    fn with_subprocess(children: Vec<Element>, flows: Vec<SequenceFlow>) -> ProcessDefinition {
        let mut definition = linear();
        definition.elements.insert(
            2,
            Element::new("SubProcess_1", "sub_process", "Pack").with_children(children, flows),
        );
        definition
    }

    #[test]
    fn test_required_fields() {
        let mut definition = linear();
        definition.process_id = "  ".to_string();
        assert_eq!(
            check_required_fields(&definition),
            Err(ValidationError::MissingField {
                field: "process_id"
            })
        );
        assert!(check_required_fields(&linear()).is_ok());
    }

    #[test]
    fn test_required_keys_must_be_present() {
        let without_flows = ProcessDefinition::from_json(
            r#"{"process_id": "Process_1", "process_name": "P", "elements": []}"#,
        )
        .expect("valid json");
        assert_eq!(
            check_required_fields(&without_flows),
            Err(ValidationError::MissingField {
                field: "sequence_flows"
            })
        );

        let without_elements = ProcessDefinition::from_json(
            r#"{"process_id": "Process_1", "process_name": "P", "sequence_flows": []}"#,
        )
        .expect("valid json");
        assert_eq!(
            check_required_fields(&without_elements),
            Err(ValidationError::MissingField { field: "elements" })
        );
    }

    #[test]
    fn test_not_empty() {
        let definition = ProcessDefinition::new("Process_1", "Empty");
        assert_eq!(check_not_empty(&definition), Err(ValidationError::EmptyProcess));
    }

    #[test]
    fn test_elements_missing_fields() {
        let mut definition = linear();
        definition.elements[1].name.clear();
        assert_eq!(
            check_elements(&definition),
            Err(ValidationError::InvalidElement {
                element: "Task_1".to_string(),
                reason: "missing name".to_string(),
            })
        );

        let mut definition = linear();
        definition.elements[1].id.clear();
        assert_eq!(
            check_elements(&definition),
            Err(ValidationError::InvalidElement {
                element: "Review".to_string(),
                reason: "missing id".to_string(),
            })
        );
    }

    #[test]
    fn test_elements_non_canonical_type() {
        let mut definition = linear();
        definition.elements[1].kind = "userTask".to_string();
        let err = check_elements(&definition).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidElement {
                element: "Task_1".to_string(),
                reason: "type `userTask` is not canonical".to_string(),
            }
        );
    }

    #[test]
    fn test_elements_nested_outside_subprocess() {
        let mut definition = linear();
        definition.elements[1] = Element::new("Task_1", "user_task", "Review").with_children(
            vec![Element::new("Task_2", "user_task", "Inner")],
            Vec::new(),
        );
        assert!(matches!(
            check_elements(&definition),
            Err(ValidationError::InvalidElement { .. })
        ));
    }

    #[test]
    fn test_id_format() {
        let mut definition = linear();
        definition.elements[1].id = "ServiceTask_1".to_string();
        assert_eq!(
            check_id_format(&definition),
            Err(ValidationError::IdFormat {
                id: "ServiceTask_1".to_string(),
                expected_prefix: "Task",
            })
        );

        let mut definition = linear();
        definition.sequence_flows[0].id = "Edge_1".to_string();
        assert_eq!(
            check_id_format(&definition),
            Err(ValidationError::IdFormat {
                id: "Edge_1".to_string(),
                expected_prefix: "Flow",
            })
        );

        assert!(check_id_format(&linear()).is_ok());
    }

    #[test]
    fn test_has_numbered_prefix() {
        assert!(has_numbered_prefix("Task_12", "Task"));
        assert!(!has_numbered_prefix("Task_", "Task"));
        assert!(!has_numbered_prefix("Task_1a", "Task"));
        assert!(!has_numbered_prefix("Tasks_1", "Task"));
    }

    #[test]
    fn test_empty_subprocess() {
        let definition = with_subprocess(Vec::new(), Vec::new());
        assert_eq!(
            check_subprocesses_not_empty(&definition),
            Err(ValidationError::EmptySubprocess {
                id: "SubProcess_1".to_string()
            })
        );
    }

    #[test]
    fn test_duplicate_ids_across_nesting() {
        let definition = with_subprocess(
            vec![Element::new("Task_1", "user_task", "Inner")],
            Vec::new(),
        );
        assert_eq!(
            check_unique_ids(&definition),
            Err(ValidationError::DuplicateId {
                id: "Task_1".to_string()
            })
        );
    }

    #[test]
    fn test_flow_id_collides_with_element() {
        let mut definition = linear();
        definition.sequence_flows[1].id = "Task_1".to_string();
        assert_eq!(
            check_unique_ids(&definition),
            Err(ValidationError::DuplicateId {
                id: "Task_1".to_string()
            })
        );
    }

    #[test]
    fn test_dangling_reference() {
        let mut definition = linear();
        definition.sequence_flows[1].target_ref = "EndEvent_9".to_string();
        assert_eq!(
            check_flow_references(&definition),
            Err(ValidationError::DanglingReference {
                flow: "Flow_2".to_string(),
                reference: "EndEvent_9".to_string(),
            })
        );
    }

    #[test]
    fn test_flow_cannot_cross_scope() {
        let definition = with_subprocess(
            vec![
                Element::new("StartEvent_2", "start_event", "Start"),
                Element::new("EndEvent_2", "end_event", "End"),
            ],
            // Task_1 lives in the main process, not in the sub-process.
            vec![SequenceFlow::new("Flow_3", "StartEvent_2", "Task_1")],
        );
        assert_eq!(
            check_flow_references(&definition),
            Err(ValidationError::DanglingReference {
                flow: "Flow_3".to_string(),
                reference: "Task_1".to_string(),
            })
        );
    }

    #[test]
    fn test_unmatched_split() {
        let mut definition = linear();
        definition.elements.insert(
            1,
            Element::new("Gateway_1", "exclusive_gateway", "XOR_Check"),
        );
        definition.sequence_flows = vec![
            SequenceFlow::new("Flow_1", "StartEvent_1", "Gateway_1"),
            SequenceFlow::new("Flow_2", "Gateway_1", "Task_1"),
            SequenceFlow::new("Flow_3", "Gateway_1", "EndEvent_1"),
            SequenceFlow::new("Flow_4", "Task_1", "EndEvent_1"),
        ];
        assert_eq!(
            check_gateway_pairing(&definition),
            Err(ValidationError::UnmatchedGateway {
                ids: vec!["Gateway_1".to_string()]
            })
        );
    }

    #[test]
    fn test_unmatched_join() {
        let mut definition = linear();
        definition.elements.insert(
            2,
            Element::new("ParallelGateway_1", "parallel_gateway", "Join")
                .with_direction(GatewayDirection::Converging),
        );
        assert_eq!(
            check_gateway_pairing(&definition),
            Err(ValidationError::UnmatchedJoin {
                id: "ParallelGateway_1".to_string()
            })
        );
    }

    #[test]
    fn test_join_must_match_kind() {
        let mut definition = linear();
        definition.elements.splice(
            1..1,
            [
                Element::new("Gateway_1", "exclusive_gateway", "XOR")
                    .with_direction(GatewayDirection::Diverging),
                Element::new("ParallelGateway_1", "parallel_gateway", "AND_end")
                    .with_direction(GatewayDirection::Converging),
            ],
        );
        assert_eq!(
            check_gateway_pairing(&definition),
            Err(ValidationError::UnmatchedJoin {
                id: "ParallelGateway_1".to_string()
            })
        );
    }

    #[test]
    fn test_nested_blocks_balance() {
        let mut definition = linear();
        definition.elements.splice(
            1..1,
            [
                Element::new("ParallelGateway_1", "parallel_gateway", "Split")
                    .with_direction(GatewayDirection::Diverging),
                Element::new("Gateway_1", "exclusive_gateway", "XOR")
                    .with_direction(GatewayDirection::Diverging),
                Element::new("Gateway_2", "exclusive_gateway", "XOR_end")
                    .with_direction(GatewayDirection::Converging),
                Element::new("ParallelGateway_2", "parallel_gateway", "Join")
                    .with_direction(GatewayDirection::Converging),
            ],
        );
        assert!(check_gateway_pairing(&definition).is_ok());
    }

    #[test]
    fn test_pairing_is_per_scope() {
        let definition = with_subprocess(
            vec![
                Element::new("StartEvent_2", "start_event", "Start"),
                Element::new("Gateway_1", "exclusive_gateway", "XOR")
                    .with_direction(GatewayDirection::Diverging),
                Element::new("EndEvent_2", "end_event", "End"),
            ],
            Vec::new(),
        );
        assert_eq!(
            check_gateway_pairing(&definition),
            Err(ValidationError::UnmatchedGateway {
                ids: vec!["Gateway_1".to_string()]
            })
        );
    }

    #[test]
    fn test_boundary_events() {
        let mut definition = linear();
        definition.elements.pop();
        assert_eq!(
            check_boundary_events(&definition),
            Err(ValidationError::MissingBoundaryEvent {
                kind: ElementType::EndEvent
            })
        );

        // Events nested in a sub-process do not count for the main process.
        let mut definition = with_subprocess(
            vec![Element::new("StartEvent_2", "start_event", "Start")],
            Vec::new(),
        );
        definition.elements.remove(0);
        assert_eq!(
            check_boundary_events(&definition),
            Err(ValidationError::MissingBoundaryEvent {
                kind: ElementType::StartEvent
            })
        );
    }
}
