//! BPMN 2.0 XML exporter.
//!
//! Emits one `bpmn:definitions` document holding the process model and a
//! diagram-interchange plane with a shape per element and an edge per flow.
//! Output depends only on the process, the layout, and the
//! [`ExportConfig`], so the same input always yields the same bytes.

use std::io::Cursor;

use log::debug;
use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use procflow_core::{
    geometry::Point,
    registry::ElementType,
    semantic::{Flow, Node, Process, Scope},
};

use super::{Error, Exporter};
use crate::{config::ExportConfig, layout::Layout};

const NS_BPMN: &str = "http://www.omg.org/spec/BPMN/20100524/MODEL";
const NS_BPMNDI: &str = "http://www.omg.org/spec/BPMN/20100524/DI";
const NS_DC: &str = "http://www.omg.org/spec/DD/20100524/DC";
const NS_DI: &str = "http://www.omg.org/spec/DD/20100524/DI";
const NS_XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";
const NS_CAMUNDA: &str = "http://camunda.org/schema/1.0/bpmn";

const DIAGRAM_ID: &str = "BPMNDiagram_1";
const PLANE_ID: &str = "BPMNPlane_1";

type XmlWriter = Cursor<Vec<u8>>;

/// Writes BPMN XML.
#[derive(Debug, Clone, Default)]
pub struct XmlExporter {
    config: ExportConfig,
}

impl XmlExporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    fn writer(&self) -> Writer<XmlWriter> {
        let sink = Cursor::new(Vec::new());
        match self.config.indent() {
            0 => Writer::new(sink),
            indent => Writer::new_with_indent(sink, b' ', indent),
        }
    }

    /// Whether `camunda:assignee` attributes are written for this process.
    fn writes_assignees(&self, process: &Process) -> bool {
        self.config.performer_annotations()
            && process
                .all_nodes()
                .iter()
                .any(|node| node.kind().is_task() && node.performer().is_some())
    }
}

impl Exporter for XmlExporter {
    fn export(&self, process: &Process, layout: &Layout) -> Result<String, Error> {
        let mut document = Document {
            writer: self.writer(),
            layout,
            assignees: self.writes_assignees(process),
        };

        document
            .writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        document.write_definitions(process, self.config.target_namespace())?;

        let bytes = document.writer.into_inner().into_inner();
        debug!(bytes = bytes.len(); "BPMN XML written");
        String::from_utf8(bytes).map_err(|err| Error::Render(err.to_string()))
    }
}

/// State for writing a single document.
struct Document<'a> {
    writer: Writer<XmlWriter>,
    layout: &'a Layout,
    assignees: bool,
}

impl Document<'_> {
    fn write_definitions(
        &mut self,
        process: &Process,
        target_namespace: &str,
    ) -> Result<(), Error> {
        let definitions_id = format!("Definitions_{}", clean_text(process.id()));
        let mut attrs = vec![
            ("xmlns:bpmn", NS_BPMN),
            ("xmlns:bpmndi", NS_BPMNDI),
            ("xmlns:dc", NS_DC),
            ("xmlns:di", NS_DI),
            ("xmlns:xsi", NS_XSI),
        ];
        if self.assignees {
            attrs.push(("xmlns:camunda", NS_CAMUNDA));
        }
        let target_namespace = clean_text(target_namespace);
        attrs.push(("id", definitions_id.as_str()));
        attrs.push(("targetNamespace", target_namespace.as_str()));
        write_tag_start_with_attrs(&mut self.writer, "bpmn:definitions", &attrs)?;

        let id = clean_text(process.id());
        let name = clean_text(process.name());
        write_tag_start_with_attrs(
            &mut self.writer,
            "bpmn:process",
            &[
                ("id", id.as_str()),
                ("name", name.as_str()),
                ("isExecutable", "true"),
            ],
        )?;
        self.write_scope(process.scope())?;
        write_tag_end(&mut self.writer, "bpmn:process")?;

        self.write_diagram(process, &id)?;

        write_tag_end(&mut self.writer, "bpmn:definitions")
    }

    fn write_scope(&mut self, scope: &Scope) -> Result<(), Error> {
        for node in scope.nodes() {
            self.write_node(node)?;
        }
        for flow in scope.flows() {
            self.write_flow(flow)?;
        }
        Ok(())
    }

    fn write_node(&mut self, node: &Node) -> Result<(), Error> {
        let tag = format!("bpmn:{}", node.kind().tag());
        let id = clean_text(node.id());
        let name = clean_text(node.name());
        let assignee = node
            .performer()
            .filter(|_| self.assignees && node.kind().is_task())
            .map(clean_text);

        let mut attrs = vec![("id", id.as_str()), ("name", name.as_str())];
        if let Some(direction) = node.direction() {
            attrs.push(("gatewayDirection", direction.as_str()));
        }
        if let Some(assignee) = &assignee {
            attrs.push(("camunda:assignee", assignee.as_str()));
        }

        if node.kind() == ElementType::SubProcess {
            attrs.push(("triggeredByEvent", "false"));
        }

        match node.subprocess() {
            Some(body) => {
                write_tag_start_with_attrs(&mut self.writer, &tag, &attrs)?;
                self.write_scope(body)?;
                write_tag_end(&mut self.writer, &tag)
            }
            None => write_empty_tag_with_attrs(&mut self.writer, &tag, &attrs),
        }
    }

    fn write_flow(&mut self, flow: &Flow) -> Result<(), Error> {
        let id = clean_text(flow.id());
        let source = clean_text(flow.source());
        let target = clean_text(flow.target());
        let attrs = [
            ("id", id.as_str()),
            ("sourceRef", source.as_str()),
            ("targetRef", target.as_str()),
        ];

        match flow.condition().map(clean_text) {
            Some(condition) => {
                write_tag_start_with_attrs(&mut self.writer, "bpmn:sequenceFlow", &attrs)?;
                write_tag_start_with_attrs(
                    &mut self.writer,
                    "bpmn:conditionExpression",
                    &[("xsi:type", "bpmn:tFormalExpression")],
                )?;
                write_tag_text(&mut self.writer, &condition)?;
                write_tag_end(&mut self.writer, "bpmn:conditionExpression")?;
                write_tag_end(&mut self.writer, "bpmn:sequenceFlow")
            }
            None => write_empty_tag_with_attrs(&mut self.writer, "bpmn:sequenceFlow", &attrs),
        }
    }

    fn write_diagram(&mut self, process: &Process, process_id: &str) -> Result<(), Error> {
        write_tag_start_with_attrs(
            &mut self.writer,
            "bpmndi:BPMNDiagram",
            &[("id", DIAGRAM_ID)],
        )?;
        write_tag_start_with_attrs(
            &mut self.writer,
            "bpmndi:BPMNPlane",
            &[("id", PLANE_ID), ("bpmnElement", process_id)],
        )?;

        for node in process.all_nodes() {
            self.write_shape(node)?;
        }
        for flow in process.all_flows() {
            self.write_edge(flow)?;
        }

        write_tag_end(&mut self.writer, "bpmndi:BPMNPlane")?;
        write_tag_end(&mut self.writer, "bpmndi:BPMNDiagram")
    }

    fn write_shape(&mut self, node: &Node) -> Result<(), Error> {
        let bounds = self
            .layout
            .shape(node.id())
            .ok_or_else(|| Error::Render(format!("no shape for element `{}`", node.id())))?;

        let id = clean_text(node.id());
        let shape_id = format!("{id}_di");
        let mut attrs = vec![("id", shape_id.as_str()), ("bpmnElement", id.as_str())];
        if node.kind() == ElementType::SubProcess {
            attrs.push(("isExpanded", bool_attr(node.is_expanded())));
        }
        write_tag_start_with_attrs(&mut self.writer, "bpmndi:BPMNShape", &attrs)?;

        let x = format_coord(bounds.min_x());
        let y = format_coord(bounds.min_y());
        let width = format_coord(bounds.width());
        let height = format_coord(bounds.height());
        write_empty_tag_with_attrs(
            &mut self.writer,
            "dc:Bounds",
            &[
                ("x", x.as_str()),
                ("y", y.as_str()),
                ("width", width.as_str()),
                ("height", height.as_str()),
            ],
        )?;

        write_tag_end(&mut self.writer, "bpmndi:BPMNShape")
    }

    fn write_edge(&mut self, flow: &Flow) -> Result<(), Error> {
        let waypoints = self
            .layout
            .edge(flow.id())
            .ok_or_else(|| Error::Render(format!("no edge for flow `{}`", flow.id())))?;

        let id = clean_text(flow.id());
        let edge_id = format!("{id}_di");
        write_tag_start_with_attrs(
            &mut self.writer,
            "bpmndi:BPMNEdge",
            &[("id", edge_id.as_str()), ("bpmnElement", id.as_str())],
        )?;
        for point in waypoints {
            write_waypoint(&mut self.writer, *point)?;
        }
        write_tag_end(&mut self.writer, "bpmndi:BPMNEdge")
    }
}

fn write_waypoint(writer: &mut Writer<XmlWriter>, point: Point) -> Result<(), Error> {
    let x = format_coord(point.x());
    let y = format_coord(point.y());
    write_empty_tag_with_attrs(
        writer,
        "di:waypoint",
        &[("x", x.as_str()), ("y", y.as_str())],
    )
}

fn write_tag_start_with_attrs(
    writer: &mut Writer<XmlWriter>,
    tag_name: &str,
    attrs: &[(&str, &str)],
) -> Result<(), Error> {
    let mut elem = BytesStart::new(tag_name);
    for attr in attrs {
        elem.push_attribute(*attr);
    }
    writer.write_event(Event::Start(elem))?;
    Ok(())
}

fn write_empty_tag_with_attrs(
    writer: &mut Writer<XmlWriter>,
    tag_name: &str,
    attrs: &[(&str, &str)],
) -> Result<(), Error> {
    let mut elem = BytesStart::new(tag_name);
    for attr in attrs {
        elem.push_attribute(*attr);
    }
    writer.write_event(Event::Empty(elem))?;
    Ok(())
}

fn write_tag_end(writer: &mut Writer<XmlWriter>, tag_name: &str) -> Result<(), Error> {
    writer.write_event(Event::End(BytesEnd::new(tag_name)))?;
    Ok(())
}

fn write_tag_text(writer: &mut Writer<XmlWriter>, content: &str) -> Result<(), Error> {
    writer.write_event(Event::Text(BytesText::new(content)))?;
    Ok(())
}

fn bool_attr(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// Coordinates are written without a trailing `.0` for whole numbers.
fn format_coord(value: f32) -> String {
    format!("{value}")
}

/// Normalize a value before it is written as an attribute or text.
///
/// Literal `\n`, `\r`, and `\t` sequences left over from escaped input are
/// removed and `\"` becomes `"`. Control characters become spaces and runs
/// of whitespace collapse to one space.
pub fn clean_text(value: &str) -> String {
    let unescaped = value
        .replace("\\\"", "\"")
        .replace("\\r", "")
        .replace("\\t", "")
        .replace("\\n", "");

    unescaped
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
