//! Semantic process model.
//!
//! This module contains the typed representation of a process after the
//! structural validator has accepted it. Every element kind is canonical,
//! every flow endpoint resolves inside its scope, and ids are unique across
//! the whole tree.
//!
//! # Pipeline Position
//!
//! ```text
//! Notation text / JSON
//!     ↓ parser (or serde)
//! Wire model (ProcessDefinition)
//!     ↓ identify + validate
//! Semantic model (these types)
//!     ↓ layout
//! Layout (id → bounds, flow → waypoints)
//!     ↓ export
//! BPMN XML
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::registry::ElementType;

/// Whether a gateway opens (splits) or closes (joins) a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GatewayDirection {
    Diverging,
    Converging,
}

impl GatewayDirection {
    /// Returns the BPMN `gatewayDirection` attribute value.
    pub fn as_str(self) -> &'static str {
        match self {
            GatewayDirection::Diverging => "Diverging",
            GatewayDirection::Converging => "Converging",
        }
    }

    pub fn is_split(self) -> bool {
        self == GatewayDirection::Diverging
    }
}

impl fmt::Display for GatewayDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated process.
#[derive(Debug, Clone, PartialEq)]
pub struct Process {
    id: String,
    name: String,
    scope: Scope,
}

impl Process {
    pub fn new(id: impl Into<String>, name: impl Into<String>, scope: Scope) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            scope,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The top-level scope of the process.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Every node of the tree in depth-first pre-order.
    pub fn all_nodes(&self) -> Vec<&Node> {
        let mut nodes = Vec::new();
        self.scope.collect_nodes(&mut nodes);
        nodes
    }

    /// Every flow of the tree, scope by scope: a scope's own flows come
    /// before the flows of its nested sub-processes.
    pub fn all_flows(&self) -> Vec<&Flow> {
        let mut flows = Vec::new();
        self.scope.collect_flows(&mut flows);
        flows
    }
}

/// An ordered collection of nodes and the flows connecting them.
///
/// The top level of a process is a scope, and so is the body of every
/// sub-process. Flows only connect nodes of the same scope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    nodes: Vec<Node>,
    flows: Vec<Flow>,
}

impl Scope {
    pub fn new(nodes: Vec<Node>, flows: Vec<Flow>) -> Self {
        Self { nodes, flows }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn flows(&self) -> &[Flow] {
        &self.flows
    }

    /// Find a direct child node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id() == id)
    }

    fn collect_nodes<'a>(&'a self, out: &mut Vec<&'a Node>) {
        for node in &self.nodes {
            out.push(node);
            if let Some(body) = node.subprocess() {
                body.collect_nodes(out);
            }
        }
    }

    fn collect_flows<'a>(&'a self, out: &mut Vec<&'a Flow>) {
        out.extend(self.flows.iter());
        for body in self.nodes.iter().filter_map(Node::subprocess) {
            body.collect_flows(out);
        }
    }
}

/// A typed process element.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: String,
    kind: ElementType,
    name: String,
    performer: Option<String>,
    direction: Option<GatewayDirection>,
    expanded: bool,
    subprocess: Option<Scope>,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: ElementType, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            performer: None,
            direction: None,
            expanded: true,
            subprocess: None,
        }
    }

    pub fn with_performer(mut self, performer: Option<String>) -> Self {
        self.performer = performer;
        self
    }

    pub fn with_direction(mut self, direction: Option<GatewayDirection>) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_expanded(mut self, expanded: bool) -> Self {
        self.expanded = expanded;
        self
    }

    pub fn with_subprocess(mut self, body: Scope) -> Self {
        self.subprocess = Some(body);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> ElementType {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn performer(&self) -> Option<&str> {
        self.performer.as_deref()
    }

    /// The gateway direction; `None` for non-gateways.
    pub fn direction(&self) -> Option<GatewayDirection> {
        self.direction
    }

    /// Whether a sub-process is drawn expanded.
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// The body of a sub-process; `None` for every other kind.
    pub fn subprocess(&self) -> Option<&Scope> {
        self.subprocess.as_ref()
    }
}

/// A typed sequence flow.
#[derive(Debug, Clone, PartialEq)]
pub struct Flow {
    id: String,
    source: String,
    target: String,
    condition: Option<String>,
}

impl Flow {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            condition: None,
        }
    }

    pub fn with_condition(mut self, condition: Option<String>) -> Self {
        self.condition = condition;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn condition(&self) -> Option<&str> {
        self.condition.as_deref()
    }
}
