use crate::diagnostics::elapsed_ms;
use crate::field::{CatalogProvider, FieldOrchestrator, FieldStatus, ImageProvider, RowSink};
use crate::types::{FrameId, PassKind};
use log::info;
use serde::Serialize;
use std::io::Write;
use std::time::Instant;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Field counts of a finished batch.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub processed: usize,
    pub bright: usize,
    pub dim: usize,
    pub no_detection: usize,
    pub failed: usize,
    pub elapsed_ms: f64,
}

impl BatchSummary {
    fn record(&mut self, status: FieldStatus) {
        self.processed += 1;
        match status {
            FieldStatus::Detected(PassKind::Bright) => self.bright += 1,
            FieldStatus::Detected(PassKind::Dim) => self.dim += 1,
            FieldStatus::NoDetection => self.no_detection += 1,
            FieldStatus::Failed => self.failed += 1,
        }
    }

    pub fn detected(&self) -> usize {
        self.bright + self.dim
    }
}

/// Process every frame, one worker per core with the `parallel` feature.
///
/// Field failures end up in `errors` and never stop the batch.
pub fn run_batch<I, C, R, E>(
    orchestrator: &FieldOrchestrator<I, C>,
    frames: &[FrameId],
    results: &RowSink<R>,
    errors: &RowSink<E>,
) -> BatchSummary
where
    I: ImageProvider,
    C: CatalogProvider,
    R: Write + Send,
    E: Write + Send,
{
    let start = Instant::now();
    info!("processing {} fields", frames.len());

    #[cfg(feature = "parallel")]
    let statuses: Vec<FieldStatus> = frames
        .par_iter()
        .map(|frame| orchestrator.process_into(frame, results, errors))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let statuses: Vec<FieldStatus> = frames
        .iter()
        .map(|frame| orchestrator.process_into(frame, results, errors))
        .collect();

    let mut summary = BatchSummary::default();
    for status in statuses {
        summary.record(status);
    }
    summary.elapsed_ms = elapsed_ms(start);
    info!(
        "batch done: {} fields, {} bright, {} dim, {} without trail, {} failed in {:.1} ms",
        summary.processed,
        summary.bright,
        summary.dim,
        summary.no_detection,
        summary.failed,
        summary.elapsed_ms
    );
    summary
}
