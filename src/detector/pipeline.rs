use super::debug::{DebugSink, BLUE, RED};
use super::{NoDetectionReason, PassOutcome, PassState, PipelineConfig};
use crate::colinearity::{ColinearityValidator, ColinearityVerdict};
use crate::diagnostics::{elapsed_ms, LineStage, PassReport, RectangleStage};
use crate::hough::{project_endpoints, LineFitter};
use crate::image::ImageF32;
use crate::rectangles::RectangleFitter;
use crate::types::PassKind;
use log::{debug, info};
use std::time::Instant;

/// Outcome and trace of one pass.
#[derive(Clone, Debug)]
pub struct PassResult {
    pub outcome: PassOutcome,
    pub report: PassReport,
}

/// One bright or dim detection pass.
///
/// The preprocessing strategy comes from the config; rectangle fitting, line
/// fitting and validation are shared by both kinds of pass.
#[derive(Clone, Debug)]
pub struct DetectionPipeline {
    config: PipelineConfig,
    rectangles: RectangleFitter,
    lines: LineFitter,
    validator: ColinearityValidator,
}

impl DetectionPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let rectangles = RectangleFitter::new(config.rectangles.clone());
        let lines = LineFitter::new(config.hough.clone());
        let validator =
            ColinearityValidator::new(config.colinearity.clone()).verbose(config.debug.enabled);
        Self {
            config,
            rectangles,
            lines,
            validator,
        }
    }

    pub fn bright() -> Self {
        Self::new(PipelineConfig::bright())
    }

    pub fn dim() -> Self {
        Self::new(PipelineConfig::dim())
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn kind(&self) -> PassKind {
        self.config.kind()
    }

    /// Run the pass on `image`, which the pass consumes.
    pub fn run(&self, image: ImageF32) -> PassResult {
        self.run_tagged(image, None)
    }

    /// Like [`run`](Self::run); debug dumps go to a `tag` subdirectory of the
    /// debug output directory.
    pub fn run_tagged(&self, image: ImageF32, tag: Option<&str>) -> PassResult {
        let total = Instant::now();
        let kind = self.kind();
        let (w, h) = (image.w, image.h);
        let mut report = PassReport::new(kind, w, h);
        let sink = DebugSink::new(&self.config.debug, kind, tag);
        let pre = &self.config.preprocessor;

        let t = Instant::now();
        let equalized = pre.normalize(image);
        report.timings.lap("preprocess", t);
        report.enter(PassState::Preprocessed);
        sink.image("equalized", &equalized);

        let t = Instant::now();
        let processed = pre.morphology(&equalized);
        report.timings.lap("morphology", t);
        report.enter(PassState::MorphologyApplied);
        sink.image("morphology", &processed);

        let t = Instant::now();
        let fit = self.rectangles.fit(&processed);
        report.timings.lap("rectangles", t);
        report.enter(PassState::RectanglesFit);
        sink.image("rectangles", &fit.mask);
        let detected = fit.detected();
        report.rectangles = Some(RectangleStage {
            contours: fit.contours,
            rectangles: fit.rectangles,
        });
        if !detected {
            return self.finish(report, &sink, total, NoDetectionReason::NoRectangles);
        }

        let t = Instant::now();
        let set_a = self.lines.fit(&processed);
        let set_b = self.lines.fit(&fit.mask);
        report.timings.lap("hough", t);
        report.enter(PassState::LinesFit);
        let top_n = self.config.colinearity.top_n;
        sink.overlay("lines-processed", &processed, &set_a, top_n, RED);
        sink.overlay("lines-mask", &fit.mask, &set_b, top_n, BLUE);

        let t = Instant::now();
        let verdict = self.validator.validate(&set_a, &set_b);
        report.timings.lap("colinearity", t);
        report.enter(PassState::Validated);

        let top = set_a.first().copied();
        report.lines = Some(LineStage {
            processed: set_a,
            mask: set_b,
        });
        let failed = match &verdict {
            ColinearityVerdict::Rejected { failed, .. } => Some(*failed),
            ColinearityVerdict::Accepted { .. } => None,
        };
        report.colinearity = Some(verdict);
        if let Some(test) = failed {
            return self.finish(report, &sink, total, NoDetectionReason::Rejected { test });
        }
        let Some(top) = top else {
            return self.finish(report, &sink, total, NoDetectionReason::NoLines);
        };

        let endpoints = project_endpoints(&top, w, h);
        report.endpoints = Some(endpoints);
        report.enter(PassState::Detected);
        report.timings.total_ms = elapsed_ms(total);
        sink.report(&report);
        self.log(&report);
        PassResult {
            outcome: PassOutcome::Detected(endpoints),
            report,
        }
    }

    fn finish(
        &self,
        mut report: PassReport,
        sink: &DebugSink,
        total: Instant,
        reason: NoDetectionReason,
    ) -> PassResult {
        report.enter(PassState::NoDetection);
        report.no_detection = Some(reason);
        report.timings.total_ms = elapsed_ms(total);
        sink.report(&report);
        self.log(&report);
        PassResult {
            outcome: PassOutcome::NoDetection(reason),
            report,
        }
    }

    fn log(&self, report: &PassReport) {
        if self.config.debug.enabled {
            info!("{}", report.summary());
        } else {
            debug!("{}", report.summary());
        }
    }
}
