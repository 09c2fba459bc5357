//! Procflow CLI entry point.

use std::{process::ExitCode, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use procflow_cli::{Args, error_adapter::to_reportables, exit_code};

fn main() -> ExitCode {
    miette::set_panic_hook();

    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!("Unknown log level `{}`, falling back to warn", args.log_level);
        LevelFilter::Warn
    });
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    debug!(args:?; "Parsed arguments");

    match procflow_cli::run(&args) {
        Ok(summary) => {
            info!(
                process_id = summary.process_id,
                elements = summary.elements,
                output_file = summary.output;
                "BPMN written"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            let reporter = miette::GraphicalReportHandler::new();
            for reportable in to_reportables(&err) {
                let mut rendered = String::new();
                if reporter.render_report(&mut rendered, &reportable).is_err() {
                    rendered = reportable.to_string();
                }
                error!(kind = err.kind(); "{rendered}");
            }
            ExitCode::from(exit_code(&err))
        }
    }
}
