use std::{fs, path::PathBuf};

use tempfile::tempdir;

use procflow_cli::{Args, Format, run};

/// Collects all .flow and .json files from a directory
fn collect_inputs(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && matches!(
                        path.extension().and_then(|s| s.to_str()),
                        Some("flow" | "json")
                    )
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

fn demos_path() -> PathBuf {
    // Demos are at workspace root, relative to workspace not the crate
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

fn args_for(input: &PathBuf, output: PathBuf) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: output.to_string_lossy().to_string(),
        config: None,
        format: Format::Auto,
        model_out: None,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let valid_demos = collect_inputs(demos_path());

    assert!(!valid_demos.is_empty(), "No valid demos found in demos/");

    let mut failed_demos = Vec::new();

    for demo_path in &valid_demos {
        let output_filename = format!(
            "{}.bpmn",
            demo_path.file_stem().unwrap().to_string_lossy()
        );
        let output_path = temp_dir.path().join(output_filename);

        match run(&args_for(demo_path, output_path.clone())) {
            Ok(summary) => {
                assert_eq!(summary.output, output_path.to_string_lossy());
                assert!(summary.elements > 0, "{}", demo_path.display());
                let xml = fs::read_to_string(&output_path).expect("output written");
                assert!(xml.starts_with("<?xml"), "{}", demo_path.display());
                assert!(xml.contains("<bpmndi:BPMNPlane"), "{}", demo_path.display());
            }
            Err(e) => failed_demos.push((demo_path.clone(), e)),
        }
    }

    if !failed_demos.is_empty() {
        eprintln!("\nValid demos that failed:");
        for (path, err) in &failed_demos {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} valid demo(s) failed unexpectedly", failed_demos.len());
    }
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let error_demos = collect_inputs(demos_path().join("errors"));

    assert!(
        !error_demos.is_empty(),
        "No error demos found in demos/errors/"
    );

    let mut unexpectedly_succeeded = Vec::new();

    for demo_path in &error_demos {
        let output_filename = format!(
            "error_{}.bpmn",
            demo_path.file_stem().unwrap().to_string_lossy()
        );
        let output_path = temp_dir.path().join(output_filename);

        if run(&args_for(demo_path, output_path.clone())).is_ok() {
            unexpectedly_succeeded.push(demo_path.clone());
        }
        // Output is all-or-nothing
        assert!(!output_path.exists(), "{}", demo_path.display());
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError demos that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error demo(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }
}

#[test]
fn e2e_model_out_writes_identified_json() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = demos_path().join("order.flow");
    let model_path = temp_dir.path().join("order.json");

    let mut args = args_for(&input, temp_dir.path().join("order.bpmn"));
    args.format = Format::Notation;
    args.model_out = Some(model_path.to_string_lossy().to_string());
    let summary = run(&args).expect("order demo generates");
    assert_eq!(summary.process_id, "Process_1");

    let model = fs::read_to_string(&model_path).expect("model written");
    assert!(model.contains(r#""id": "Task_1""#));
    assert!(model.contains(r#""performer": "Customer""#));

    // The written model is itself a valid input
    let args = args_for(&model_path, temp_dir.path().join("again.bpmn"));
    run(&args).expect("model round trip generates");
}
