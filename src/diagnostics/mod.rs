//! Serializable diagnostics of detection passes.
//!
//! A [`PassReport`] records the states a pass went through, the rectangles
//! and line sets it produced, the colinearity measurements and per-stage
//! timings. Reports are written as JSON by the debug sink and by the
//! `detect_image` tool.

pub mod pass;
pub mod timing;

pub use pass::{InputDescriptor, LineStage, PassReport, RectangleStage};
pub use timing::{elapsed_ms, StageTiming, TimingBreakdown};
