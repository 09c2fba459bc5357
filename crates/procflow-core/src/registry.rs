//! Element type registry.
//!
//! The registry is the single source of truth for every element kind Procflow
//! understands: its canonical name, the BPMN tag it is emitted as, the prefix
//! used for generated ids, and the default shape dimensions used by layout.
//!
//! | Canonical           | Tag                | Id prefix         | Size      |
//! |---------------------|--------------------|-------------------|-----------|
//! | `start_event`       | `startEvent`       | `StartEvent`      | 36 × 36   |
//! | `end_event`         | `endEvent`         | `EndEvent`        | 36 × 36   |
//! | `user_task`         | `userTask`         | `Task`            | 100 × 80  |
//! | `service_task`      | `serviceTask`      | `ServiceTask`     | 100 × 80  |
//! | `manual_task`       | `manualTask`       | `ManualTask`      | 100 × 80  |
//! | `exclusive_gateway` | `exclusiveGateway` | `Gateway`         | 50 × 50   |
//! | `parallel_gateway`  | `parallelGateway`  | `ParallelGateway` | 50 × 50   |
//! | `sub_process`       | `subProcess`       | `SubProcess`      | 350 × 200 |

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::geometry::Size;

const EVENT_SIZE: Size = Size::new(36.0, 36.0);
const TASK_SIZE: Size = Size::new(100.0, 80.0);
const GATEWAY_SIZE: Size = Size::new(50.0, 50.0);
const SUB_PROCESS_SIZE: Size = Size::new(350.0, 200.0);

/// The canonical element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    StartEvent,
    EndEvent,
    UserTask,
    ServiceTask,
    ManualTask,
    ExclusiveGateway,
    ParallelGateway,
    SubProcess,
}

impl ElementType {
    /// Every canonical type, in registry order.
    pub const ALL: [ElementType; 8] = [
        ElementType::StartEvent,
        ElementType::EndEvent,
        ElementType::UserTask,
        ElementType::ServiceTask,
        ElementType::ManualTask,
        ElementType::ExclusiveGateway,
        ElementType::ParallelGateway,
        ElementType::SubProcess,
    ];

    /// Returns the canonical name (e.g. `"user_task"`).
    pub fn as_str(self) -> &'static str {
        match self {
            ElementType::StartEvent => "start_event",
            ElementType::EndEvent => "end_event",
            ElementType::UserTask => "user_task",
            ElementType::ServiceTask => "service_task",
            ElementType::ManualTask => "manual_task",
            ElementType::ExclusiveGateway => "exclusive_gateway",
            ElementType::ParallelGateway => "parallel_gateway",
            ElementType::SubProcess => "sub_process",
        }
    }

    /// Returns the BPMN model tag name, without namespace prefix.
    pub fn tag(self) -> &'static str {
        match self {
            ElementType::StartEvent => "startEvent",
            ElementType::EndEvent => "endEvent",
            ElementType::UserTask => "userTask",
            ElementType::ServiceTask => "serviceTask",
            ElementType::ManualTask => "manualTask",
            ElementType::ExclusiveGateway => "exclusiveGateway",
            ElementType::ParallelGateway => "parallelGateway",
            ElementType::SubProcess => "subProcess",
        }
    }

    /// Returns the prefix used for generated ids (`<prefix>_<n>`).
    pub fn id_prefix(self) -> &'static str {
        match self {
            ElementType::StartEvent => "StartEvent",
            ElementType::EndEvent => "EndEvent",
            ElementType::UserTask => "Task",
            ElementType::ServiceTask => "ServiceTask",
            ElementType::ManualTask => "ManualTask",
            ElementType::ExclusiveGateway => "Gateway",
            ElementType::ParallelGateway => "ParallelGateway",
            ElementType::SubProcess => "SubProcess",
        }
    }

    /// Returns the default shape size for this type.
    pub fn size(self) -> Size {
        match self {
            ElementType::StartEvent | ElementType::EndEvent => EVENT_SIZE,
            ElementType::UserTask | ElementType::ServiceTask | ElementType::ManualTask => {
                TASK_SIZE
            }
            ElementType::ExclusiveGateway | ElementType::ParallelGateway => GATEWAY_SIZE,
            ElementType::SubProcess => SUB_PROCESS_SIZE,
        }
    }

    pub fn is_event(self) -> bool {
        matches!(self, ElementType::StartEvent | ElementType::EndEvent)
    }

    pub fn is_task(self) -> bool {
        matches!(
            self,
            ElementType::UserTask | ElementType::ServiceTask | ElementType::ManualTask
        )
    }

    pub fn is_gateway(self) -> bool {
        matches!(
            self,
            ElementType::ExclusiveGateway | ElementType::ParallelGateway
        )
    }

    /// Parses an exact canonical name. Variant spellings are rejected.
    ///
    /// ```
    /// # use procflow_core::registry::ElementType;
    /// assert_eq!(ElementType::from_canonical("user_task"), Some(ElementType::UserTask));
    /// assert_eq!(ElementType::from_canonical("userTask"), None);
    /// ```
    pub fn from_canonical(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Resolves a free-form type token to its canonical type.
    ///
    /// Matching ignores case, underscores, hyphens, and spaces, so `Task`,
    /// `userTask`, `user_task` and `User Task` all resolve the same way. A
    /// generic task token is refined by `task_type` when one is given.
    ///
    /// ```
    /// # use procflow_core::registry::ElementType;
    /// assert_eq!(ElementType::canonicalize("startEvent", None), Some(ElementType::StartEvent));
    /// assert_eq!(ElementType::canonicalize("Task", Some("service")), Some(ElementType::ServiceTask));
    /// assert_eq!(ElementType::canonicalize("timer", None), None);
    /// ```
    pub fn canonicalize(token: &str, task_type: Option<&str>) -> Option<Self> {
        let normalized = normalize_token(token);
        let kind = VARIANTS
            .iter()
            .find(|(_, variants)| variants.contains(&normalized.as_str()))
            .map(|(kind, _)| *kind)?;

        if normalized == "task" {
            if let Some(task_type) = task_type.and_then(|t| t.parse::<TaskType>().ok()) {
                return Some(task_type.element_type());
            }
        }

        Some(kind)
    }
}

/// Variant spellings per canonical type, in normalized form.
const VARIANTS: &[(ElementType, &[&str])] = &[
    (ElementType::StartEvent, &["startevent", "start"]),
    (ElementType::EndEvent, &["endevent", "end"]),
    (ElementType::UserTask, &["usertask", "task", "user"]),
    (ElementType::ServiceTask, &["servicetask", "service"]),
    (ElementType::ManualTask, &["manualtask", "manual"]),
    (
        ElementType::ExclusiveGateway,
        &[
            "exclusivegateway",
            "gateway",
            "xor",
            "or",
            "inclusivegateway",
        ],
    ),
    (
        ElementType::ParallelGateway,
        &["parallelgateway", "parallel", "and"],
    ),
    (ElementType::SubProcess, &["subprocess", "sub"]),
];

fn normalize_token(token: &str) -> String {
    token
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Performer type of a task, as written in notation (`Name(service)`) or in
/// the `taskType` wire field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    #[default]
    User,
    Service,
    Manual,
}

impl TaskType {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::User => "user",
            TaskType::Service => "service",
            TaskType::Manual => "manual",
        }
    }

    /// Returns the task element type this performer type maps to.
    pub fn element_type(self) -> ElementType {
        match self {
            TaskType::User => ElementType::UserTask,
            TaskType::Service => ElementType::ServiceTask,
            TaskType::Manual => ElementType::ManualTask,
        }
    }
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(TaskType::User),
            "service" => Ok(TaskType::Service),
            "manual" => Ok(TaskType::Manual),
            other => Err(format!("unknown task type `{other}`")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_round_trip() {
        for kind in ElementType::ALL {
            assert_eq!(ElementType::from_canonical(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_registry_table() {
        assert_eq!(ElementType::UserTask.tag(), "userTask");
        assert_eq!(ElementType::UserTask.id_prefix(), "Task");
        assert_eq!(ElementType::ExclusiveGateway.id_prefix(), "Gateway");
        assert_eq!(ElementType::SubProcess.size(), Size::new(350.0, 200.0));
        assert_eq!(ElementType::EndEvent.size(), Size::new(36.0, 36.0));
        assert_eq!(ElementType::ParallelGateway.size(), Size::new(50.0, 50.0));
    }

    #[test]
    fn test_canonicalize_variants() {
        let cases = [
            ("startEvent", ElementType::StartEvent),
            ("StartEvent", ElementType::StartEvent),
            ("end", ElementType::EndEvent),
            ("Task", ElementType::UserTask),
            ("userTask", ElementType::UserTask),
            ("serviceTask", ElementType::ServiceTask),
            ("manual_task", ElementType::ManualTask),
            ("ExclusiveGateway", ElementType::ExclusiveGateway),
            ("inclusiveGateway", ElementType::ExclusiveGateway),
            ("parallelGateway", ElementType::ParallelGateway),
            ("subProcess", ElementType::SubProcess),
            ("sub-process", ElementType::SubProcess),
        ];

        for (token, expected) in cases {
            assert_eq!(
                ElementType::canonicalize(token, None),
                Some(expected),
                "token `{token}`"
            );
        }
    }

    #[test]
    fn test_canonicalize_task_type_refines_generic_task() {
        assert_eq!(
            ElementType::canonicalize("task", Some("manual")),
            Some(ElementType::ManualTask)
        );
        assert_eq!(
            ElementType::canonicalize("task", Some("bogus")),
            Some(ElementType::UserTask)
        );
        // An explicit task kind wins over taskType.
        assert_eq!(
            ElementType::canonicalize("userTask", Some("service")),
            Some(ElementType::UserTask)
        );
    }

    #[test]
    fn test_canonicalize_unknown() {
        assert_eq!(ElementType::canonicalize("timerEvent", None), None);
        assert_eq!(ElementType::canonicalize("", None), None);
    }

    #[test]
    fn test_task_type_from_str() {
        assert_eq!("Service".parse::<TaskType>(), Ok(TaskType::Service));
        assert_eq!(" manual ".parse::<TaskType>(), Ok(TaskType::Manual));
        assert!("robot".parse::<TaskType>().is_err());
        assert_eq!(TaskType::default().element_type(), ElementType::UserTask);
    }

    #[test]
    fn test_kind_predicates() {
        assert!(ElementType::StartEvent.is_event());
        assert!(ElementType::ManualTask.is_task());
        assert!(ElementType::ParallelGateway.is_gateway());
        assert!(!ElementType::SubProcess.is_task());
    }
}
