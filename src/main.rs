//! Chromaflow CLI - headless composition graph sessions
//!
//! Builds a graph from a session file or a preset, settles it, replays the
//! scripted control edits and prints the resulting graph state as JSON.

use anyhow::{bail, Context, Result};
use chromaflow::prelude::*;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("chromaflow");

    let Some(command) = args.get(1) else {
        print_usage(program);
        return Ok(());
    };

    match command.as_str() {
        "list" => list_filters(),
        "info" => {
            let Some(id) = args.get(2) else {
                bail!("Please specify a filter ID");
            };
            filter_info(id)?;
        }
        "run" => {
            let Some(path) = args.get(2) else {
                bail!("Please specify a session file");
            };
            let config = SessionConfig::from_path(path)
                .with_context(|| format!("Failed to load session {}", path))?;
            run_session(&config)?;
        }
        "demo" => {
            let preset = args.get(2).map(String::as_str).unwrap_or("split_lut_merge");
            run_session(&SessionConfig::for_preset(preset))?;
        }
        "help" | "--help" | "-h" => print_usage(program),
        other => {
            print_usage(program);
            bail!("Unknown command: {}", other);
        }
    }

    Ok(())
}

fn print_usage(program: &str) {
    println!("Chromaflow v{}", chromaflow::VERSION);
    println!();
    println!("Usage: {} <command> [options]", program);
    println!();
    println!("Commands:");
    println!("  list              List all available filters");
    println!("  info <filter>     Show detailed info about a filter");
    println!("  run <session>     Run a TOML session file");
    println!("  demo [preset]     Run a preset ({})", PRESETS.join(", "));
    println!("  help              Show this help message");
}

fn list_filters() {
    let registry = FilterRegistry::with_builtins();

    println!("Available filters ({} total):", registry.len());
    println!();
    for (category, filters) in registry.grouped_by_category() {
        println!("  {}", category.display_name());
        for info in filters {
            println!("      {:<16} {}", info.id, info.description);
        }
        println!();
    }
}

fn filter_info(id: &str) -> Result<()> {
    let registry = FilterRegistry::with_builtins();
    let Some(info) = registry.info(id) else {
        bail!("Filter not found: {} (use 'list' to see available filters)", id);
    };

    println!("Filter: {}", info.name);
    println!("ID: {}", info.id);
    println!("Category: {}", info.category.display_name());
    println!("Input: {}", info.input);
    println!("Output: {}", info.output);
    println!();
    println!("  {}", info.description);
    Ok(())
}

fn run_session(config: &SessionConfig) -> Result<()> {
    let registry = FilterRegistry::with_builtins();

    let observer: RecomputeObserver = Box::new(|event| match event {
        RecomputeEvent::NodeEvaluated {
            node_name,
            duration_ms,
            ..
        } => log::info!("  {} ({}ms)", node_name, duration_ms),
        RecomputeEvent::NodeFailed {
            node_name, message, ..
        } => log::error!("  {} failed: {}", node_name, message),
        RecomputeEvent::Completed { stats } => log::info!(
            "Pass complete in {}ms: {} evaluated, {} failed, {} skipped",
            stats.duration_ms,
            stats.evaluated,
            stats.failed,
            stats.skipped
        ),
        _ => {}
    });

    let run = config.run_observed(&registry, Some(observer))?;
    if !run.unapplied.is_empty() {
        log::warn!("Edits never applied: {}", run.unapplied.join(", "));
    }

    let snapshot = serde_json::to_string_pretty(&run.graph.snapshot())?;
    println!("{}", snapshot);

    if let Some(path) = &config.output {
        save_output(&run.graph, path)?;
    }
    Ok(())
}

fn save_output(graph: &CompositionGraph, path: &Path) -> Result<()> {
    let Some(output) = graph.final_output() else {
        bail!("The terminal node has no current output");
    };
    let Some(image) = output.downcast_ref::<Image>() else {
        bail!("The terminal node produces {}, not an image", output.tag());
    };

    image
        .save(path)
        .with_context(|| format!("Failed to save {}", path.display()))?;
    log::info!("Image saved to {}", path.display());
    Ok(())
}
