use crate::colinearity::ColinearityTest;
use crate::types::LineEndpoints;
use serde::Serialize;

/// States of a detection pass.
///
/// `Start → Preprocessed → MorphologyApplied → RectanglesFit → LinesFit →
/// Validated → Detected`, with `NoDetection` reachable from `RectanglesFit`
/// and `Validated`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PassState {
    Start,
    Preprocessed,
    MorphologyApplied,
    RectanglesFit,
    LinesFit,
    Validated,
    Detected,
    NoDetection,
}

/// Why a pass ended without a detection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum NoDetectionReason {
    NoRectangles,
    Rejected { test: ColinearityTest },
    NoLines,
}

/// Terminal outcome of a pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassOutcome {
    Detected(LineEndpoints),
    NoDetection(NoDetectionReason),
}

impl PassOutcome {
    pub fn endpoints(&self) -> Option<LineEndpoints> {
        match self {
            PassOutcome::Detected(line) => Some(*line),
            PassOutcome::NoDetection(_) => None,
        }
    }

    pub fn is_detected(&self) -> bool {
        matches!(self, PassOutcome::Detected(_))
    }
}
