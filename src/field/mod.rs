//! Per-field processing and its failure containment.
//!
//! [`FieldOrchestrator`] acquires a frame through an [`ImageProvider`],
//! masks catalogued sources from a [`CatalogProvider`], flips the image,
//! runs the bright pass and falls back to the dim pass. A detection becomes
//! one result row; any [`FieldError`] (panics included) becomes one error
//! row and the caller moves on to the next field.

mod error;
pub mod fs;
mod orchestrator;
mod provider;
mod sink;

pub use error::FieldError;
pub use fs::{FrameHeaderFile, FsCatalogProvider, FsImageProvider};
pub use orchestrator::{error_row, DetectionOutcome, FieldOrchestrator, FieldStatus};
pub use provider::{AcquiredFrame, CatalogProvider, EphemeralFile, ImageProvider};
pub use sink::RowSink;
