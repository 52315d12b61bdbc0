use crate::colinearity::ColinearityVerdict;
use crate::detector::{NoDetectionReason, PassState};
use crate::diagnostics::TimingBreakdown;
use crate::hough::LineSet;
use crate::rectangles::RectangleCandidate;
use crate::types::{LineEndpoints, PassKind};
use serde::Serialize;

/// Trace of one bright or dim pass over an image.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassReport {
    pub pass: PassKind,
    pub input: InputDescriptor,
    /// States entered, in order. The last one is terminal.
    pub states: Vec<PassState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_detection: Option<NoDetectionReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rectangles: Option<RectangleStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<LineStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colinearity: Option<ColinearityVerdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<LineEndpoints>,
    pub timings: TimingBreakdown,
}

impl PassReport {
    pub fn new(pass: PassKind, width: usize, height: usize) -> Self {
        Self {
            pass,
            input: InputDescriptor { width, height },
            states: vec![PassState::Start],
            no_detection: None,
            rectangles: None,
            lines: None,
            colinearity: None,
            endpoints: None,
            timings: TimingBreakdown::default(),
        }
    }

    pub fn enter(&mut self, state: PassState) {
        self.states.push(state);
    }

    pub fn terminal_state(&self) -> PassState {
        self.states.last().copied().unwrap_or(PassState::Start)
    }

    pub fn summary(&self) -> String {
        let rects = self
            .rectangles
            .as_ref()
            .map(|r| format!("{}/{}", r.rectangles.len(), r.contours))
            .unwrap_or_else(|| "-".to_string());
        let lines = self
            .lines
            .as_ref()
            .map(|l| format!("{}/{}", l.processed.len(), l.mask.len()))
            .unwrap_or_else(|| "-".to_string());
        format!(
            "{} pass: {:?} rectangles={} lines={} in {:.1} ms",
            self.pass,
            self.terminal_state(),
            rects,
            lines,
            self.timings.total_ms
        )
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub width: usize,
    pub height: usize,
}

/// Accepted rectangles out of the contours examined.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RectangleStage {
    pub contours: usize,
    pub rectangles: Vec<RectangleCandidate>,
}

/// Hough lines of the processed image and of the rectangle mask.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineStage {
    pub processed: LineSet,
    pub mask: LineSet,
}
