//! Assembly of classified lines into a draft process definition.
//!
//! The [`Builder`] owns one [`ScopeDraft`] per scope: index `0` is the main
//! process and every `[sub]Name` reference allocates another. Steps are looked
//! up by key within their scope, so a name written on several lines refers to
//! the same element. Elements carry provisional ids (their keys) that the id
//! assigner replaces later.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, trace, warn};

use procflow_core::{
    model::{Element, ProcessDefinition, SequenceFlow},
    registry::{ElementType, TaskType},
    semantic::GatewayDirection,
};

use crate::{
    Notation,
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    lines::{Line, LineKind, classify_lines},
    names::{self, StepKind, sanitize_name},
    parser::{RawStep, parse_flow},
    span::Span,
};

const MAIN_SCOPE: usize = 0;
const DEFAULT_PROCESS_ID: &str = "Process_1";
const DEFAULT_PROCESS_NAME: &str = "Process";

/// Elements and flows of one scope, in document order.
#[derive(Debug, Default)]
struct ScopeDraft {
    elements: Vec<Element>,
    flows: Vec<SequenceFlow>,
    lookup: HashMap<String, usize>,
}

impl ScopeDraft {
    fn insert(&mut self, key: Option<&str>, element: Element) {
        if let Some(key) = key {
            self.lookup.insert(key.to_string(), self.elements.len());
        }
        self.elements.push(element);
    }

    /// Add a flow unless the same connection already exists.
    fn connect(&mut self, source: &str, target: &str, condition: Option<&str>) {
        let exists = self
            .flows
            .iter()
            .any(|flow| flow.source_ref == source && flow.target_ref == target);
        if exists {
            trace!(source, target; "Skipping duplicate flow");
            return;
        }

        let mut flow = SequenceFlow::new("", source, target);
        flow.condition_expression = condition.map(str::to_string);
        self.flows.push(flow);
    }
}

/// Where a `[sub]Name` was first referenced and which scope holds its body.
#[derive(Debug)]
struct SubprocessRef {
    owner: usize,
    body: usize,
    span: Span,
}

/// An `Actor: [a, b]` line, applied once every flow is built.
#[derive(Debug)]
struct ActorMapping<'src> {
    actor: &'src str,
    activities: Vec<&'src str>,
    line: usize,
    span: Span,
}

/// Builds a [`ProcessDefinition`] from notation lines.
pub(crate) struct Builder<'src> {
    source: &'src str,
    scopes: Vec<ScopeDraft>,
    subprocesses: IndexMap<String, SubprocessRef>,
    parallel_blocks: usize,
    diagnostics: DiagnosticCollector,
}

impl<'src> Builder<'src> {
    pub(crate) fn new(source: &'src str) -> Self {
        Self {
            source,
            scopes: vec![ScopeDraft::default()],
            subprocesses: IndexMap::new(),
            parallel_blocks: 0,
            diagnostics: DiagnosticCollector::new(),
        }
    }

    /// Run the whole build.
    pub(crate) fn build(mut self) -> Result<Notation, ParseError> {
        let (lines, line_diagnostics) = classify_lines(self.source);
        for diagnostic in line_diagnostics {
            self.diagnostics.emit(diagnostic);
        }

        let mut process_name = None;
        let mut actors = Vec::new();
        let mut mappings = Vec::new();
        let mut main_lines = Vec::new();
        let mut body_lines = Vec::new();

        for line in &lines {
            match &line.kind {
                LineKind::ProcessName(name) => process_name = Some(name.to_string()),
                LineKind::Actors(names) => actors.extend(names.iter().map(|name| name.to_string())),
                LineKind::ActorMap { actor, activities } => mappings.push(ActorMapping {
                    actor: *actor,
                    activities: activities.clone(),
                    line: line.number,
                    span: line.span,
                }),
                LineKind::Flow { header: None, body } => main_lines.push((line, *body)),
                LineKind::Flow {
                    header: Some(header),
                    body,
                } => body_lines.push((line, *header, *body)),
            }
        }

        if main_lines.is_empty() && body_lines.is_empty() {
            self.diagnostics.emit(
                Diagnostic::error("notation contains no flow lines")
                    .with_code(ErrorCode::E104)
                    .with_help("describe the process as steps, e.g. `Start -> Review -> End`"),
            );
        }

        for (line, body) in main_lines {
            self.add_flow_line(MAIN_SCOPE, line, body);
        }
        self.add_subprocess_bodies(body_lines);

        for mapping in &mappings {
            self.apply_mapping(mapping, &actors);
        }

        let diagnostics = std::mem::take(&mut self.diagnostics);
        diagnostics.finish()?;

        let (elements, flows) = self.assemble(MAIN_SCOPE);
        debug!(
            elements = elements.len(),
            flows = flows.len(),
            subprocesses = self.subprocesses.len();
            "Built process from notation"
        );

        let mut definition = ProcessDefinition::new(
            DEFAULT_PROCESS_ID,
            process_name.unwrap_or_else(|| DEFAULT_PROCESS_NAME.to_string()),
        );
        definition.elements = elements;
        definition.sequence_flows = flows;

        Ok(Notation::new(actors, definition))
    }

    /// Attach body lines to their subprocesses.
    ///
    /// A body line may itself reference further subprocesses, so lines are
    /// retried until a pass makes no progress. Whatever remains names no
    /// known subprocess.
    fn add_subprocess_bodies(&mut self, mut pending: Vec<(&Line<'src>, &'src str, &'src str)>) {
        loop {
            let before = pending.len();
            pending.retain(|&(line, header, body)| {
                let target = self
                    .subprocesses
                    .get(&sanitize_name(header))
                    .map(|sub| sub.body);
                match target {
                    Some(scope) => {
                        self.add_flow_line(scope, line, body);
                        false
                    }
                    None => true,
                }
            });
            if pending.len() == before {
                break;
            }
        }

        for (line, header, _) in pending {
            let span = Span::of(self.source, header);
            self.diagnostics.emit(
                Diagnostic::error(format!(
                    "subprocess header `{header}` has no matching `[sub]{header}` step"
                ))
                .with_code(ErrorCode::E102)
                .with_line(line.number)
                .with_label(span, "no step declares this subprocess")
                .with_help(format!(
                    "reference it from a flow first, e.g. `Start -> [sub]{header} -> End`"
                )),
            );
        }
    }

    fn add_flow_line(&mut self, scope: usize, line: &Line<'src>, body: &'src str) {
        let groups = match parse_flow(self.source, body) {
            Ok(groups) => groups,
            Err(diagnostics) => {
                for diagnostic in diagnostics {
                    self.diagnostics.emit(diagnostic.with_line(line.number));
                }
                return;
            }
        };

        let mut previous: Option<(String, Option<&'src str>)> = None;
        let last = groups.len().saturating_sub(1);

        for (index, group) in groups.iter().enumerate() {
            let Some((exit, condition)) = self.add_group(scope, line, group, previous.take())
            else {
                return;
            };

            if let (true, Some(condition), Some(step)) = (index == last, condition, group.first()) {
                self.diagnostics.emit(
                    Diagnostic::error(format!(
                        "condition `{condition}` on `{}` has no outgoing flow",
                        step.name
                    ))
                    .with_code(ErrorCode::E103)
                    .with_line(line.number)
                    .with_label(step.span, "last step on this line")
                    .with_help("move the condition to a step that is followed by `->`"),
                );
            }

            previous = Some((exit, condition));
        }
    }

    /// Add one `->` segment and connect `incoming` to its entry.
    ///
    /// Returns the exit key and the condition for the exit's outgoing flow.
    fn add_group(
        &mut self,
        scope: usize,
        line: &Line<'src>,
        group: &[RawStep<'src>],
        incoming: Option<(String, Option<&'src str>)>,
    ) -> Option<(String, Option<&'src str>)> {
        if let [step] = group {
            let (key, condition) = self.add_step(scope, line, step)?;
            if let Some((source, incoming_condition)) = incoming {
                self.scopes[scope].connect(&source, &key, incoming_condition);
            }
            return Some((key, condition));
        }

        self.parallel_blocks += 1;
        let split = format!("#split{}", self.parallel_blocks);
        let join = format!("#join{}", self.parallel_blocks);

        self.scopes[scope].insert(
            None,
            Element::new(&split, ElementType::ParallelGateway.as_str(), "Split")
                .with_direction(GatewayDirection::Diverging),
        );

        let mut branches = Vec::with_capacity(group.len());
        for step in group {
            branches.push(self.add_step(scope, line, step)?);
        }

        self.scopes[scope].insert(
            None,
            Element::new(&join, ElementType::ParallelGateway.as_str(), "Join")
                .with_direction(GatewayDirection::Converging),
        );

        let draft = &mut self.scopes[scope];
        if let Some((source, incoming_condition)) = incoming {
            draft.connect(&source, &split, incoming_condition);
        }
        for (key, condition) in &branches {
            draft.connect(&split, key, None);
            draft.connect(key, &join, *condition);
        }

        Some((join, None))
    }

    /// Resolve a step to an element key, creating the element on first use.
    ///
    /// Returns the key and the condition the step places on its outgoing flow.
    fn add_step(
        &mut self,
        scope: usize,
        line: &Line<'src>,
        step: &RawStep<'src>,
    ) -> Option<(String, Option<&'src str>)> {
        let kind = names::classify(step.name, step.is_sub);

        let (task_type, condition) = match (kind, step.paren) {
            (StepKind::Task, Some(paren)) => match paren.parse::<TaskType>() {
                Ok(task_type) => (Some(task_type), None),
                Err(_) => (None, Some(paren)),
            },
            (_, paren) => (None, paren),
        };

        let key = if kind.is_reserved() {
            step.name.to_string()
        } else {
            sanitize_name(step.name)
        };
        if key.is_empty() {
            self.diagnostics.emit(
                Diagnostic::error(format!("step `{}` has no usable name", step.name))
                    .with_code(ErrorCode::E103)
                    .with_line(line.number)
                    .with_label(step.span, "malformed step")
                    .with_help("names need at least one letter or digit"),
            );
            return None;
        }

        if let Some(&index) = self.scopes[scope].lookup.get(&key) {
            let existing = &mut self.scopes[scope].elements[index];
            let existing_is_sub = existing.kind == ElementType::SubProcess.as_str();
            if step.is_sub != existing_is_sub {
                self.diagnostics.emit(
                    Diagnostic::error(format!(
                        "`{key}` is used both as a subprocess and as a plain step"
                    ))
                    .with_code(ErrorCode::E103)
                    .with_line(line.number)
                    .with_label(step.span, "conflicting reference")
                    .with_help("give the subprocess and the step different names"),
                );
                return None;
            }
            if let Some(task_type) = task_type {
                refine_task_type(existing, task_type);
            }
            return Some((key, condition));
        }

        let element = match kind {
            StepKind::Start => Element::new(&key, ElementType::StartEvent.as_str(), names::START),
            StepKind::End => Element::new(&key, ElementType::EndEvent.as_str(), names::END),
            StepKind::Gateway(gateway, direction) => {
                Element::new(&key, gateway.as_str(), step.name).with_direction(direction)
            }
            StepKind::SubProcess => {
                self.register_subprocess(scope, line, step, &key)?;
                Element::new(&key, ElementType::SubProcess.as_str(), &key)
            }
            StepKind::Task => {
                let element_type = task_type.unwrap_or_default().element_type();
                let element = Element::new(&key, element_type.as_str(), &key);
                match task_type {
                    Some(task_type) => element.with_task_type(task_type.as_str()),
                    None => element,
                }
            }
        };

        trace!(scope, key = key.as_str(), kind = element.kind.as_str(); "Added element");
        self.scopes[scope].insert(Some(&key), element);
        Some((key, condition))
    }

    fn register_subprocess(
        &mut self,
        scope: usize,
        line: &Line<'src>,
        step: &RawStep<'src>,
        key: &str,
    ) -> Option<()> {
        if let Some(existing) = self.subprocesses.get(key) {
            if existing.owner != scope {
                self.diagnostics.emit(
                    Diagnostic::error(format!(
                        "subprocess `{key}` is referenced from more than one scope"
                    ))
                    .with_code(ErrorCode::E105)
                    .with_line(line.number)
                    .with_label(step.span, "second reference")
                    .with_secondary_label(existing.span, "first referenced here")
                    .with_help("give each subprocess a distinct name"),
                );
                return None;
            }
            return Some(());
        }

        let body = self.scopes.len();
        self.scopes.push(ScopeDraft::default());
        self.subprocesses.insert(
            key.to_string(),
            SubprocessRef {
                owner: scope,
                body,
                span: step.span,
            },
        );
        Some(())
    }

    /// Fill unset performers for every element matching the mapping.
    fn apply_mapping(&mut self, mapping: &ActorMapping<'src>, declared: &[String]) {
        if !declared.is_empty() && !declared.iter().any(|actor| actor == mapping.actor) {
            debug!(actor = mapping.actor, line = mapping.line; "Mapping names an undeclared actor");
        }

        for activity in &mapping.activities {
            let key = sanitize_name(activity);
            let mut matched = false;

            for element in self.scopes.iter_mut().flat_map(|scope| scope.elements.iter_mut()) {
                if element.name != key && element.name != *activity {
                    continue;
                }
                matched = true;
                if element.performer.is_none() {
                    element.performer = Some(mapping.actor.to_string());
                }
            }

            if !matched {
                warn!(
                    actor = mapping.actor,
                    activity,
                    line = mapping.line,
                    span:? = mapping.span;
                    "Actor mapping names an unknown activity"
                );
            }
        }
    }

    /// Move the drafts of `scope` and its nested subprocesses into wire form.
    fn assemble(&mut self, scope: usize) -> (Vec<Element>, Vec<SequenceFlow>) {
        let draft = std::mem::take(&mut self.scopes[scope]);
        let mut elements = Vec::with_capacity(draft.elements.len());

        for element in draft.elements {
            let body = (element.kind == ElementType::SubProcess.as_str())
                .then(|| self.subprocesses.get(&element.id).map(|sub| sub.body))
                .flatten();
            match body {
                Some(body) => {
                    let (children, flows) = self.assemble(body);
                    elements.push(element.with_children(children, flows));
                }
                None => elements.push(element),
            }
        }

        (elements, draft.flows)
    }
}

/// Apply an explicit task type to an element first written without one.
fn refine_task_type(element: &mut Element, task_type: TaskType) {
    match element.task_type.as_deref() {
        None => {
            element.kind = task_type.element_type().as_str().to_string();
            element.task_type = Some(task_type.as_str().to_string());
        }
        Some(existing) if existing != task_type.as_str() => {
            warn!(
                step = element.name.as_str(),
                kept = existing,
                ignored = task_type.as_str();
                "Conflicting task types; keeping the first"
            );
        }
        Some(_) => {}
    }
}
