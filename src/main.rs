//! raceway CLI: build a pipeline from a YAML blueprint and run it.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;

use raceway::{init_tracing, shutdown_signal, Blueprint, NodeRegistry};

#[derive(Debug, Parser)]
#[command(name = "raceway", about = "Run a dataflow pipeline from a YAML blueprint")]
struct CliArgs {
    /// Path to the blueprint file.
    blueprint: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let args = CliArgs::parse();

    let blueprint = match Blueprint::from_path(&args.blueprint) {
        Ok(blueprint) => blueprint,
        Err(e) => {
            eprintln!("Failed to load blueprint: {e}");
            return ExitCode::FAILURE;
        }
    };

    let registry = NodeRegistry::with_builtin_nodes();
    let pipeline = match registry.build(&blueprint) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("Failed to build pipeline: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        pipeline = pipeline.name().unwrap_or("unnamed"),
        nodes = pipeline.node_count(),
        "Starting pipeline"
    );

    let running = std::sync::Arc::new(pipeline).start();
    let abort = running.abort_handle();
    tokio::select! {
        result = running.wait() => match result {
            Ok(()) => {
                info!("Pipeline complete");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Pipeline failed: {e}");
                ExitCode::FAILURE
            }
        },
        _ = shutdown_signal() => {
            info!("Shutting down");
            abort.abort();
            ExitCode::FAILURE
        }
    }
}
