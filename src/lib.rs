#![doc = include_str!("../README.md")]

// Detection core
pub mod colinearity;
pub mod detector;
pub mod diagnostics;
pub mod hough;
pub mod masking;
pub mod rectangles;

// Per-field processing and batch driver
pub mod batch;
pub mod catalog;
pub mod config;
pub mod field;

// Building blocks
pub mod contrast;
pub mod edges;
pub mod image;
pub mod morphology;
pub mod types;

// --- High-level re-exports -------------------------------------------------

pub use crate::detector::{DetectionPipeline, PassOutcome, PipelineConfig};
pub use crate::field::{DetectionOutcome, FieldError, FieldOrchestrator};
pub use crate::types::{DetectionResult, FrameId, LineEndpoints};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use trail_detector::prelude::*;
///
/// # fn main() {
/// let mut frame = ImageF32::new(512, 512);
/// for i in 100..400 {
///     frame.set(i, i, 120.0);
/// }
///
/// let result = DetectionPipeline::bright().run(frame);
/// match result.outcome {
///     PassOutcome::Detected(line) => println!("trail {line:?}"),
///     PassOutcome::NoDetection(reason) => println!("nothing: {reason:?}"),
/// }
/// # }
/// ```
pub mod prelude {
    pub use crate::image::{ImageF32, ImageU8};
    pub use crate::{DetectionPipeline, PassOutcome, PipelineConfig};
}
