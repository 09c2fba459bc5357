//! Elaboration of a checked wire model into the semantic model.

use log::trace;

use procflow_core::{
    model::{Element, ProcessDefinition, SequenceFlow},
    registry::ElementType,
    semantic::{Flow, Node, Process, Scope},
};

use super::{ValidationError, gateway_direction};

/// Build the semantic [`Process`] for a definition that passed every check.
pub(super) fn elaborate(definition: &ProcessDefinition) -> Result<Process, ValidationError> {
    let scope = elaborate_scope(&definition.elements, &definition.sequence_flows)?;
    Ok(Process::new(
        definition.process_id.clone(),
        definition.process_name.clone(),
        scope,
    ))
}

fn elaborate_scope(
    elements: &[Element],
    flows: &[SequenceFlow],
) -> Result<Scope, ValidationError> {
    let mut semantic_flows: Vec<Flow> = flows
        .iter()
        .map(|flow| {
            Flow::new(&flow.id, &flow.source_ref, &flow.target_ref)
                .with_condition(non_empty(flow.condition_expression.as_deref()))
        })
        .collect();

    let mut nodes = Vec::with_capacity(elements.len());
    for element in elements {
        let kind = ElementType::from_canonical(&element.kind).ok_or_else(|| {
            ValidationError::InvalidElement {
                element: element.id.clone(),
                reason: format!("type `{}` is not canonical", element.kind),
            }
        })?;

        let mut node = Node::new(&element.id, kind, &element.name)
            .with_performer(element.performer.clone());

        if kind.is_gateway() {
            node = node.with_direction(Some(gateway_direction(element, flows)));
            if let Some(conditions) = &element.conditions {
                apply_conditions(&element.id, conditions, &mut semantic_flows);
            }
        }

        if kind == ElementType::SubProcess {
            let body = elaborate_scope(element.children(), element.child_flows())?;
            node = node
                .with_expanded(element.is_expanded.unwrap_or(true))
                .with_subprocess(body);
        }

        nodes.push(node);
    }

    Ok(Scope::new(nodes, semantic_flows))
}

/// Fill conditions on a gateway's outgoing flows, in flow order. A flow that
/// already has a condition keeps it.
fn apply_conditions(gateway: &str, conditions: &[String], flows: &mut [Flow]) {
    let outgoing = flows.iter_mut().filter(|flow| flow.source() == gateway);
    for (flow, condition) in outgoing.zip(conditions) {
        if flow.condition().is_none() {
            trace!(
                flow = flow.id(),
                condition = condition.as_str();
                "Applying gateway condition"
            );
            *flow = flow.clone().with_condition(non_empty(Some(condition.as_str())));
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
