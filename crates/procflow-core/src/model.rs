//! Wire model of a process definition.
//!
//! These types mirror the JSON shape exchanged with description sources and
//! produced by the notation parser:
//!
//! ```json
//! {
//!   "process_id": "Process_1",
//!   "process_name": "Order Handling",
//!   "elements": [
//!     { "id": "StartEvent_1", "type": "start_event", "name": "Start" },
//!     { "id": "Task_1", "type": "user_task", "name": "SubmitOrder", "performer": "Customer" }
//!   ],
//!   "sequence_flows": [
//!     { "id": "Flow_1", "sourceRef": "StartEvent_1", "targetRef": "Task_1" }
//!   ]
//! }
//! ```
//!
//! The wire model is deliberately permissive: missing scalar fields
//! deserialize as empty strings and `type` is kept as the raw token. The
//! structural validator reports what is missing or malformed, and only then
//! is the model elaborated into the typed [`semantic`](crate::semantic) tree.

use serde::{Deserialize, Serialize};

use crate::semantic::GatewayDirection;

/// Top-level keys every structured process must carry.
pub const REQUIRED_KEYS: [&str; 4] = ["process_id", "process_name", "elements", "sequence_flows"];

/// A complete process as exchanged on the wire.
///
/// Deserialization accepts documents with missing top-level keys and
/// records which ones were absent in [`missing_keys`](Self::missing_keys),
/// so the validator can report them by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireDefinition")]
pub struct ProcessDefinition {
    pub process_id: String,

    pub process_name: String,

    pub elements: Vec<Element>,

    pub sequence_flows: Vec<SequenceFlow>,

    #[serde(skip)]
    missing_keys: Vec<&'static str>,
}

impl ProcessDefinition {
    /// Create an empty process definition with the given id and name.
    pub fn new(process_id: impl Into<String>, process_name: impl Into<String>) -> Self {
        Self {
            process_id: process_id.into(),
            process_name: process_name.into(),
            elements: Vec::new(),
            sequence_flows: Vec::new(),
            missing_keys: Vec::new(),
        }
    }

    /// Deserialize a process definition from JSON text.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize this process definition as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Top-level keys absent from the document this definition was read
    /// from, in [`REQUIRED_KEYS`] order. Always empty for definitions
    /// built in code.
    pub fn missing_keys(&self) -> &[&'static str] {
        &self.missing_keys
    }

    /// Iterate over every element of the tree in depth-first pre-order.
    ///
    /// A sub-process is yielded before its nested elements.
    pub fn iter_elements(&self) -> Elements<'_> {
        Elements::new(&self.elements)
    }

    /// Returns true if any element in the tree carries a non-empty id.
    pub fn has_supplied_ids(&self) -> bool {
        self.iter_elements().any(|element| !element.id.is_empty())
    }
}

/// Deserialization shape of [`ProcessDefinition`], with every key optional.
#[derive(Deserialize)]
struct WireDefinition {
    process_id: Option<String>,
    process_name: Option<String>,
    elements: Option<Vec<Element>>,
    sequence_flows: Option<Vec<SequenceFlow>>,
}

impl From<WireDefinition> for ProcessDefinition {
    fn from(wire: WireDefinition) -> Self {
        let present = [
            wire.process_id.is_some(),
            wire.process_name.is_some(),
            wire.elements.is_some(),
            wire.sequence_flows.is_some(),
        ];
        let missing_keys = REQUIRED_KEYS
            .into_iter()
            .zip(present)
            .filter_map(|(key, present)| (!present).then_some(key))
            .collect();

        Self {
            process_id: wire.process_id.unwrap_or_default(),
            process_name: wire.process_name.unwrap_or_default(),
            elements: wire.elements.unwrap_or_default(),
            sequence_flows: wire.sequence_flows.unwrap_or_default(),
            missing_keys,
        }
    }
}

/// A single element of a process or sub-process scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(default)]
    pub id: String,

    /// Raw type token. Canonical after the id assigner has run.
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performer: Option<String>,

    #[serde(rename = "taskType", default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,

    /// Nested elements; only meaningful for sub-processes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elements: Option<Vec<Element>>,

    /// Nested sequence flows; only meaningful for sub-processes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_flows: Option<Vec<SequenceFlow>>,

    #[serde(rename = "isExpanded", default, skip_serializing_if = "Option::is_none")]
    pub is_expanded: Option<bool>,

    #[serde(
        rename = "gatewayDirection",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub gateway_direction: Option<GatewayDirection>,

    /// Conditions for a gateway's outgoing flows, applied in flow order to
    /// flows that carry no condition of their own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<String>>,
}

impl Element {
    /// Create a new element with the given id, type token, and name.
    pub fn new(id: impl Into<String>, kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_performer(mut self, performer: impl Into<String>) -> Self {
        self.performer = Some(performer.into());
        self
    }

    pub fn with_task_type(mut self, task_type: impl Into<String>) -> Self {
        self.task_type = Some(task_type.into());
        self
    }

    pub fn with_direction(mut self, direction: GatewayDirection) -> Self {
        self.gateway_direction = Some(direction);
        self
    }

    /// Attach a nested scope, turning this element into a sub-process body.
    pub fn with_children(mut self, elements: Vec<Element>, flows: Vec<SequenceFlow>) -> Self {
        self.elements = Some(elements);
        self.sequence_flows = Some(flows);
        self
    }

    /// Nested elements, or an empty slice when there are none.
    pub fn children(&self) -> &[Element] {
        self.elements.as_deref().unwrap_or_default()
    }

    /// Nested sequence flows, or an empty slice when there are none.
    pub fn child_flows(&self) -> &[SequenceFlow] {
        self.sequence_flows.as_deref().unwrap_or_default()
    }
}

/// A directed connection between two elements of the same scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SequenceFlow {
    #[serde(default)]
    pub id: String,

    #[serde(rename = "sourceRef", default)]
    pub source_ref: String,

    #[serde(rename = "targetRef", default)]
    pub target_ref: String,

    #[serde(
        rename = "conditionExpression",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub condition_expression: Option<String>,
}

impl SequenceFlow {
    /// Create a new unconditional flow.
    pub fn new(
        id: impl Into<String>,
        source_ref: impl Into<String>,
        target_ref: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source_ref: source_ref.into(),
            target_ref: target_ref.into(),
            condition_expression: None,
        }
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition_expression = Some(condition.into());
        self
    }
}

/// Depth-first pre-order iterator over a tree of [`Element`]s.
#[derive(Debug)]
pub struct Elements<'a> {
    stack: Vec<std::slice::Iter<'a, Element>>,
}

impl<'a> Elements<'a> {
    fn new(elements: &'a [Element]) -> Self {
        Self {
            stack: vec![elements.iter()],
        }
    }
}

impl<'a> Iterator for Elements<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let iter = self.stack.last_mut()?;
            match iter.next() {
                Some(element) => {
                    if let Some(children) = &element.elements {
                        self.stack.push(children.iter());
                    }
                    return Some(element);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested_definition() -> ProcessDefinition {
        let mut definition = ProcessDefinition::new("Process_1", "Nested");
        definition.elements = vec![
            Element::new("StartEvent_1", "start_event", "Start"),
            Element::new("SubProcess_1", "sub_process", "Fulfil").with_children(
                vec![
                    Element::new("StartEvent_2", "start_event", "Start"),
                    Element::new("EndEvent_2", "end_event", "End"),
                ],
                vec![SequenceFlow::new("Flow_2", "StartEvent_2", "EndEvent_2")],
            ),
            Element::new("EndEvent_1", "end_event", "End"),
        ];
        definition
    }

    #[test]
    fn test_from_json_with_wire_names() {
        let json = r#"{
            "process_id": "Process_1",
            "process_name": "Orders",
            "elements": [
                {"id": "Task_1", "type": "userTask", "name": "Submit", "performer": "Customer", "taskType": "user"},
                {"id": "Gateway_1", "type": "exclusiveGateway", "name": "XOR", "gatewayDirection": "Diverging", "conditions": ["ok"]}
            ],
            "sequence_flows": [
                {"id": "Flow_1", "sourceRef": "Task_1", "targetRef": "Gateway_1", "conditionExpression": "x > 1"}
            ]
        }"#;

        let definition = ProcessDefinition::from_json(json).expect("valid json");
        assert_eq!(definition.process_name, "Orders");
        assert_eq!(definition.elements[0].kind, "userTask");
        assert_eq!(definition.elements[0].performer.as_deref(), Some("Customer"));
        assert_eq!(definition.elements[0].task_type.as_deref(), Some("user"));
        assert_eq!(
            definition.elements[1].gateway_direction,
            Some(GatewayDirection::Diverging)
        );
        assert_eq!(
            definition.sequence_flows[0].condition_expression.as_deref(),
            Some("x > 1")
        );
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let definition = ProcessDefinition::from_json(r#"{"elements": [{"type": "task"}]}"#)
            .expect("valid json");
        assert!(definition.process_id.is_empty());
        assert!(definition.elements[0].id.is_empty());
        assert!(definition.elements[0].name.is_empty());
        assert!(definition.sequence_flows.is_empty());
        assert_eq!(
            definition.missing_keys(),
            ["process_id", "process_name", "sequence_flows"]
        );
    }

    #[test]
    fn test_complete_document_has_no_missing_keys() {
        let json = r#"{"process_id": "P", "process_name": "P", "elements": [], "sequence_flows": []}"#;
        let definition = ProcessDefinition::from_json(json).expect("valid json");
        assert!(definition.missing_keys().is_empty());
        assert!(ProcessDefinition::new("P", "P").missing_keys().is_empty());
    }

    #[test]
    fn test_round_trip_keeps_every_key() {
        let json = ProcessDefinition::new("Process_1", "P")
            .to_json_pretty()
            .expect("serializable");
        assert!(!json.contains("missing_keys"));
        let definition = ProcessDefinition::from_json(&json).expect("valid json");
        assert!(definition.missing_keys().is_empty());
    }

    #[test]
    fn test_serialization_skips_absent_options() {
        let mut definition = ProcessDefinition::new("Process_1", "P");
        definition
            .elements
            .push(Element::new("StartEvent_1", "start_event", "Start"));
        let json = definition.to_json_pretty().expect("serializable");
        assert!(json.contains("\"type\": \"start_event\""));
        assert!(!json.contains("performer"));
        assert!(!json.contains("isExpanded"));
    }

    #[test]
    fn test_iter_elements_is_pre_order() {
        let definition = nested_definition();
        let ids: Vec<_> = definition
            .iter_elements()
            .map(|element| element.id.as_str())
            .collect();
        assert_eq!(
            ids,
            [
                "StartEvent_1",
                "SubProcess_1",
                "StartEvent_2",
                "EndEvent_2",
                "EndEvent_1"
            ]
        );
    }

    #[test]
    fn test_has_supplied_ids() {
        let mut definition = nested_definition();
        assert!(definition.has_supplied_ids());

        for element in definition.elements.iter_mut() {
            element.id.clear();
        }
        // Nested ids still count.
        assert!(definition.has_supplied_ids());

        definition.elements[1]
            .elements
            .as_mut()
            .expect("sub-process children")
            .iter_mut()
            .for_each(|child| child.id.clear());
        assert!(!definition.has_supplied_ids());

        assert!(!ProcessDefinition::default().has_supplied_ids());
    }

    #[test]
    fn test_children_accessors() {
        let definition = nested_definition();
        assert_eq!(definition.elements[1].children().len(), 2);
        assert_eq!(definition.elements[1].child_flows().len(), 1);
        assert!(definition.elements[0].children().is_empty());
    }
}
