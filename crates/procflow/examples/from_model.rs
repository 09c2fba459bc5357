//! Example: Generating BPMN from a structured process model
//!
//! This example builds a process definition in code, without any notation
//! source, and runs it through the generation pipeline.

use procflow::{
    ProcessBuilder,
    config::AppConfig,
    model::{Element, ProcessDefinition, SequenceFlow},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut definition = ProcessDefinition::new("Onboarding", "Employee Onboarding");

    // A sub-process holds its own scope of elements and flows
    let setup = Element::new("SubProcess_1", "sub_process", "Workstation setup").with_children(
        vec![
            Element::new("StartEvent_2", "start_event", "Start"),
            Element::new("ServiceTask_1", "service_task", "Create accounts"),
            Element::new("ManualTask_1", "manual_task", "Hand out laptop"),
            Element::new("EndEvent_2", "end_event", "End"),
        ],
        vec![
            SequenceFlow::new("Flow_10", "StartEvent_2", "ServiceTask_1"),
            SequenceFlow::new("Flow_11", "ServiceTask_1", "ManualTask_1"),
            SequenceFlow::new("Flow_12", "ManualTask_1", "EndEvent_2"),
        ],
    );

    definition.elements = vec![
        Element::new("StartEvent_1", "start_event", "Hired"),
        Element::new("Task_1", "user_task", "Sign contract").with_performer("HR"),
        setup,
        Element::new("EndEvent_1", "end_event", "Ready"),
    ];
    definition.sequence_flows = vec![
        SequenceFlow::new("Flow_1", "StartEvent_1", "Task_1"),
        SequenceFlow::new("Flow_2", "Task_1", "SubProcess_1"),
        SequenceFlow::new("Flow_3", "SubProcess_1", "EndEvent_1"),
    ];

    let builder = ProcessBuilder::new(AppConfig::default());
    let generated = builder.generate_from_definition(definition)?;

    println!("{}", generated.xml());

    Ok(())
}
