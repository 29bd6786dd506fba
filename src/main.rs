use anyhow::{Context, Result};
use salesgraph::projection::export_catalog;
use salesgraph::snapshot::write_snapshot;
use salesgraph::{GraphStore, Pipeline, PipelineConfig, PipelineReport};
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("Salesgraph v{}", salesgraph::version());
    println!("==========================================");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let config = PipelineConfig::load().context("loading configuration")?;
    println!("Data directory: {}", config.data_dir.display());

    let mut store = GraphStore::new();
    let outcome = Pipeline::new(&mut store, &config).run();

    // A failed run is still snapshotted so the partial graph can be inspected
    if let Some(path) = &config.snapshot_path {
        match write_snapshot(&store, path) {
            Ok(info) => println!(
                "Snapshot: {} nodes, {} edges -> {}",
                info.nodes,
                info.edges,
                path.display()
            ),
            Err(e) if outcome.is_err() => warn!("Snapshot after failed run not written: {}", e),
            Err(e) => return Err(e).with_context(|| format!("writing snapshot {}", path.display())),
        }
    }

    let report = outcome?;
    print_report(&report, &store);

    if let Some(dir) = &config.export_dir {
        for view in export_catalog(&store, &config.catalog(), dir)? {
            println!(
                "  view {:<20} {:>6} nodes {:>8} adjacencies -> {}",
                view.name,
                view.nodes,
                view.edges,
                view.path.display()
            );
        }
    }
    Ok(())
}

fn print_report(report: &PipelineReport, store: &GraphStore) {
    println!();
    for stage in &report.stages {
        println!("✓ {:<36} {} ({} ms)", stage.stage.to_string(), stage.outcome, stage.elapsed_ms);
    }
    println!();
    println!(
        "Graph: {} nodes, {} edges ({} ms)",
        store.node_count(),
        store.edge_count(),
        report.elapsed_ms
    );
}
