//! Type canonicalization and id assignment.
//!
//! The [`IdAssigner`] rewrites every element `type` token to its canonical
//! name and gives elements `<Prefix>_<n>` ids. Counters are per canonical
//! type and run across the whole tree in depth-first pre-order. Flows are
//! then numbered `Flow_<n>`: a scope's own flows first, then the flows of
//! its nested sub-processes in element order.
//!
//! Under [`IdPolicy::PreserveExternal`] a supplied id is never touched, not
//! even when it is a duplicate; only elements and flows without an id are
//! numbered, skipping ids already in use. Duplicates are left for the
//! validator to report.
//!
//! An assigner is a plain value. Each generation builds its own, so no
//! counter state outlives a single run.

use std::collections::{HashMap, HashSet};

use log::debug;
use thiserror::Error;

use procflow_core::{
    model::{Element, ProcessDefinition, SequenceFlow},
    registry::ElementType,
};

const FLOW_PREFIX: &str = "Flow";

/// Errors raised while canonicalizing element types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifyError {
    #[error("element `{element}` has unknown type `{token}`")]
    UnknownType { element: String, token: String },
}

/// How existing ids in the input are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdPolicy {
    /// Always replace element ids. Used for notation, whose ids are provisional.
    #[default]
    Regenerate,
    /// Keep supplied ids and number only the elements and flows without one.
    PreserveExternal,
}

/// Where the final element ids came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdOrigin {
    /// Every element id was assigned here.
    Generated,
    /// At least one element id was supplied by the input.
    External,
}

impl IdOrigin {
    pub fn is_generated(self) -> bool {
        self == IdOrigin::Generated
    }
}

/// Per-invocation id generator.
#[derive(Debug, Default)]
pub struct IdAssigner {
    counters: HashMap<ElementType, usize>,
    flows: usize,
}

impl IdAssigner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonicalize types and assign ids in place.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifyError::UnknownType`] for the first element whose
    /// type token does not resolve. The definition may be partially rewritten
    /// in that case. An element with no type token at all is skipped; the
    /// validator reports it.
    pub fn assign(
        mut self,
        definition: &mut ProcessDefinition,
        policy: IdPolicy,
    ) -> Result<IdOrigin, IdentifyError> {
        let regenerate = policy == IdPolicy::Regenerate;
        let origin = if !regenerate && definition.has_supplied_ids() {
            IdOrigin::External
        } else {
            IdOrigin::Generated
        };

        let taken = if regenerate {
            HashSet::new()
        } else {
            definition
                .iter_elements()
                .filter(|element| !element.id.is_empty())
                .map(|element| element.id.clone())
                .collect()
        };
        self.identify_scope(
            &mut definition.elements,
            &mut definition.sequence_flows,
            regenerate,
            &taken,
        )?;

        let taken = if regenerate {
            HashSet::new()
        } else {
            collect_flow_ids(&definition.elements, &definition.sequence_flows)
        };
        self.number_flows(
            &mut definition.elements,
            &mut definition.sequence_flows,
            regenerate,
            &taken,
        );

        debug!(
            origin:?,
            elements = self.counters.values().sum::<usize>(),
            flows = self.flows;
            "Assigned ids"
        );
        Ok(origin)
    }

    fn identify_scope(
        &mut self,
        elements: &mut [Element],
        flows: &mut [SequenceFlow],
        regenerate: bool,
        taken: &HashSet<String>,
    ) -> Result<(), IdentifyError> {
        let mut renames = HashMap::new();

        for element in elements.iter_mut() {
            if !element.kind.trim().is_empty() {
                let kind = ElementType::canonicalize(&element.kind, element.task_type.as_deref())
                    .ok_or_else(|| IdentifyError::UnknownType {
                        element: describe(element),
                        token: element.kind.clone(),
                    })?;
                element.kind = kind.as_str().to_string();

                if regenerate || element.id.is_empty() {
                    let id = self.next_element_id(kind, taken);
                    let provisional = std::mem::replace(&mut element.id, id.clone());
                    if !provisional.is_empty() {
                        renames.insert(provisional, id);
                    }
                }
            }

            if let Some(children) = element.elements.as_mut() {
                let child_flows = element.sequence_flows.as_deref_mut().unwrap_or_default();
                self.identify_scope(children, child_flows, regenerate, taken)?;
            }
        }

        if !renames.is_empty() {
            for flow in flows.iter_mut() {
                if let Some(id) = renames.get(&flow.source_ref) {
                    flow.source_ref = id.clone();
                }
                if let Some(id) = renames.get(&flow.target_ref) {
                    flow.target_ref = id.clone();
                }
            }
        }

        Ok(())
    }

    fn number_flows(
        &mut self,
        elements: &mut [Element],
        flows: &mut [SequenceFlow],
        regenerate: bool,
        taken: &HashSet<String>,
    ) {
        for flow in flows.iter_mut() {
            if regenerate || flow.id.is_empty() {
                flow.id = self.next_flow_id(taken);
            }
        }

        for element in elements.iter_mut() {
            if let Some(children) = element.elements.as_mut() {
                let child_flows = element.sequence_flows.as_deref_mut().unwrap_or_default();
                self.number_flows(children, child_flows, regenerate, taken);
            }
        }
    }

    fn next_element_id(&mut self, kind: ElementType, taken: &HashSet<String>) -> String {
        let counter = self.counters.entry(kind).or_default();
        loop {
            *counter += 1;
            let id = format!("{}_{}", kind.id_prefix(), counter);
            if !taken.contains(&id) {
                return id;
            }
        }
    }

    fn next_flow_id(&mut self, taken: &HashSet<String>) -> String {
        loop {
            self.flows += 1;
            let id = format!("{FLOW_PREFIX}_{}", self.flows);
            if !taken.contains(&id) {
                return id;
            }
        }
    }
}

fn describe(element: &Element) -> String {
    if element.id.is_empty() {
        element.name.clone()
    } else {
        element.id.clone()
    }
}

fn collect_flow_ids(elements: &[Element], flows: &[SequenceFlow]) -> HashSet<String> {
    let mut ids: HashSet<String> = flows
        .iter()
        .filter(|flow| !flow.id.is_empty())
        .map(|flow| flow.id.clone())
        .collect();
    for element in elements {
        if element.elements.is_some() {
            ids.extend(collect_flow_ids(element.children(), element.child_flows()));
        }
    }
    ids
}
