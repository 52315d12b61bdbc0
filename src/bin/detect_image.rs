use serde::Serialize;
use std::env;
use std::path::Path;
use trail_detector::config::detect_image::DetectImageConfig;
use trail_detector::detector::DetectionPipeline;
use trail_detector::diagnostics::PassReport;
use trail_detector::image::io::{load_grayscale_image, write_json_file};
use trail_detector::image::ImageF32;
use trail_detector::types::LineEndpoints;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = DetectImageConfig::load(Path::new(&config_path)).map_err(|e| e.to_string())?;

    let gray = load_grayscale_image(&config.input)?;
    let image = ImageF32::from_u8(&gray);
    let tag = config
        .input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned());

    let bright = DetectionPipeline::new(config.bright.to_pipeline_config(&config.debug));
    let dim = DetectionPipeline::new(config.dim.to_pipeline_config(&config.debug));

    let bright_result = bright.run_tagged(image.clone(), tag.as_deref());
    let (detection, dim_report) = match bright_result.outcome.endpoints() {
        Some(line) => (Some(line), None),
        None => {
            let dim_result = dim.run_tagged(image, tag.as_deref());
            (dim_result.outcome.endpoints(), Some(dim_result.report))
        }
    };

    let summary = ImageSummary {
        width: gray.w,
        height: gray.h,
        detection,
        bright: bright_result.report,
        dim: dim_report,
    };
    write_json_file(&config.report, &summary)?;

    match detection {
        Some(line) => println!(
            "Trail from ({}, {}) to ({}, {})",
            line.x1, line.y1, line.x2, line.y2
        ),
        None => println!("No trail detected"),
    }
    println!("Saved report to {}", config.report.display());
    Ok(())
}

fn usage() -> String {
    "Usage: detect_image <config.json>".to_string()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageSummary {
    width: usize,
    height: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    detection: Option<LineEndpoints>,
    bright: PassReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    dim: Option<PassReport>,
}
