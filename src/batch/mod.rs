//! Batch processing of a field selection.
//!
//! A [`FieldSelection`] is expanded against a [`RunList`] into frame
//! identifiers; selection errors abort before any field is touched.
//! [`run_batch`] then processes the frames, writing result and error rows
//! as fields complete, and returns a [`BatchSummary`].

mod runner;
mod selection;

pub use runner::{run_batch, BatchSummary};
pub use selection::{FieldSelection, RunList, RunRecord, SelectionError, CAMCOLS};
