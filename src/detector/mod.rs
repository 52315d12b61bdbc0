//! Bright and dim detection passes.
//!
//! A pass is one [`DetectionPipeline`] parameterized by a [`Preprocessor`]:
//!
//! - Bright: clip negatives, 8-bit conversion, histogram equalization, dilation.
//! - Dim: flux floor and boost, 8-bit conversion, equalization, opening.
//!
//! Both then fit rectangles, bail out with no detection when none is found,
//! fit Hough lines to the processed image (set A) and to the rectangle mask
//! (set B), cross-validate the two sets and project the top line of A to
//! image-plane endpoints.
//!
//! With [`DebugConfig::enabled`] every stage image, the line overlays and the
//! JSON [`PassReport`](crate::diagnostics::PassReport) are written below the
//! debug output directory.

mod config;
mod debug;
mod pipeline;
mod preprocess;
mod state;

pub use config::{DebugConfig, PipelineConfig};
pub use pipeline::{DetectionPipeline, PassResult};
pub use preprocess::Preprocessor;
pub use state::{NoDetectionReason, PassOutcome, PassState};
