use crate::detector::{DetectionPipeline, PassOutcome, PassResult};
use crate::field::{CatalogProvider, FieldError, ImageProvider, RowSink};
use crate::masking::ObjectMasker;
use crate::types::{DetectionResult, FrameId, PassKind};
use log::{debug, error, info};
use std::any::Any;
use std::io::Write;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// What one field produced.
#[derive(Clone, Debug, PartialEq)]
pub enum DetectionOutcome {
    Detected(DetectionResult),
    NoDetection,
}

/// Terminal status of a field after sinks were written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldStatus {
    Detected(PassKind),
    NoDetection,
    Failed,
}

/// Runs masking and the bright then dim pass over one field at a time.
pub struct FieldOrchestrator<I, C> {
    images: I,
    catalogs: C,
    masker: ObjectMasker,
    bright: DetectionPipeline,
    dim: DetectionPipeline,
}

impl<I: ImageProvider, C: CatalogProvider> FieldOrchestrator<I, C> {
    pub fn new(
        images: I,
        catalogs: C,
        masker: ObjectMasker,
        bright: DetectionPipeline,
        dim: DetectionPipeline,
    ) -> Self {
        Self {
            images,
            catalogs,
            masker,
            bright,
            dim,
        }
    }

    /// Acquire, mask, flip and detect. Any ephemeral image copy is removed
    /// before this returns, whatever the outcome.
    pub fn process(&self, frame: &FrameId) -> Result<DetectionOutcome, FieldError> {
        let acquired = self.images.acquire(frame)?;
        let (mut image, header, _artifact) = acquired.into_parts();
        let catalog = self.catalogs.catalog(frame)?;

        let masked = self.masker.apply_in_place(&mut image, &catalog, frame.filter);
        debug!(
            "{frame}: masked {} of {} catalog entries ({} malformed)",
            masked.masked,
            catalog.len(),
            masked.malformed
        );

        // Catalog positions and stored pixels use opposite row order.
        image.flip_vertical();

        let tag = frame.frame_stem();
        let bright = self.bright.run_tagged(image.clone(), Some(&tag));
        let (pass, outcome) = match bright.outcome {
            PassOutcome::Detected(_) => (PassKind::Bright, bright.outcome),
            PassOutcome::NoDetection(reason) => {
                debug!("{frame}: no bright trail ({reason:?}), trying dim pass");
                let PassResult { outcome, .. } = self.dim.run_tagged(image, Some(&tag));
                (PassKind::Dim, outcome)
            }
        };

        Ok(match outcome {
            PassOutcome::Detected(line) => DetectionOutcome::Detected(DetectionResult {
                frame: *frame,
                header,
                line,
                pass,
            }),
            PassOutcome::NoDetection(_) => DetectionOutcome::NoDetection,
        })
    }

    /// [`process`](Self::process) with panics turned into
    /// [`FieldError::Panicked`].
    pub fn process_guarded(&self, frame: &FrameId) -> Result<DetectionOutcome, FieldError> {
        catch_unwind(AssertUnwindSafe(|| self.process(frame))).unwrap_or_else(|payload| {
            Err(FieldError::Panicked {
                message: panic_message(payload.as_ref()),
            })
        })
    }

    /// Process one field and append its result or error row.
    pub fn process_into<R: Write, E: Write>(
        &self,
        frame: &FrameId,
        results: &RowSink<R>,
        errors: &RowSink<E>,
    ) -> FieldStatus {
        match self.process_guarded(frame) {
            Ok(DetectionOutcome::Detected(result)) => {
                info!("{frame}: {} trail {:?}", result.pass, result.line);
                if let Err(err) = results.append(&format!("{}\n", result.to_row())) {
                    error!("{frame}: could not write result row: {err}");
                }
                FieldStatus::Detected(result.pass)
            }
            Ok(DetectionOutcome::NoDetection) => {
                debug!("{frame}: no trail");
                FieldStatus::NoDetection
            }
            Err(err) => {
                error!("{frame}: {err}");
                if let Err(io_err) = errors.append(&error_row(frame, &err)) {
                    error!("{frame}: could not write error row: {io_err}");
                }
                FieldStatus::Failed
            }
        }
    }
}

/// `run,camcol,field,filter` line, error context, then the message and a blank line.
pub fn error_row(frame: &FrameId, err: &FieldError) -> String {
    format!(
        "{},{},{},{}\n{}\n{}\n\n",
        frame.run,
        frame.camcol,
        frame.field,
        frame.filter,
        err.context(),
        err
    )
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
