use std::env;
use std::path::Path;
use trail_detector::batch::{run_batch, RunList};
use trail_detector::config::detect_trails::DetectTrailsConfig;
use trail_detector::detector::DetectionPipeline;
use trail_detector::field::{FieldOrchestrator, FsCatalogProvider, FsImageProvider, RowSink};
use trail_detector::masking::ObjectMasker;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = DetectTrailsConfig::load(Path::new(&config_path)).map_err(|e| e.to_string())?;

    configure_threads(config.threads)?;

    let runs = RunList::load(&config.run_list).map_err(|e| e.to_string())?;
    let frames = config.selection.expand(&runs).map_err(|e| e.to_string())?;

    let orchestrator = FieldOrchestrator::new(
        FsImageProvider::new(&config.image_root, &config.output.dump_dir),
        FsCatalogProvider::new(&config.catalog_root),
        ObjectMasker::new(config.masking.to_masking_params()),
        DetectionPipeline::new(config.bright.to_pipeline_config(&config.debug)),
        DetectionPipeline::new(config.dim.to_pipeline_config(&config.debug)),
    );

    let results = RowSink::append_to(&config.output.results)
        .map_err(|e| format!("Failed to open {}: {e}", config.output.results.display()))?;
    let errors = RowSink::append_to(&config.output.errors)
        .map_err(|e| format!("Failed to open {}: {e}", config.output.errors.display()))?;

    let summary = run_batch(&orchestrator, &frames, &results, &errors);

    println!(
        "Processed {} fields: {} trails ({} bright, {} dim), {} failed",
        summary.processed,
        summary.detected(),
        summary.bright,
        summary.dim,
        summary.failed
    );
    println!(
        "Results in {}, errors in {}",
        config.output.results.display(),
        config.output.errors.display()
    );
    Ok(())
}

#[cfg(feature = "parallel")]
fn configure_threads(threads: usize) -> Result<(), String> {
    if threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|e| format!("Failed to configure {threads} worker threads: {e}"))?;
    }
    Ok(())
}

#[cfg(not(feature = "parallel"))]
fn configure_threads(threads: usize) -> Result<(), String> {
    if threads > 1 {
        log::warn!("built without the parallel feature, ignoring threads={threads}");
    }
    Ok(())
}

fn usage() -> String {
    "Usage: detect_trails <config.json>".to_string()
}
