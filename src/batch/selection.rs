//! Run list and expansion of a field selection into frame identifiers.
use crate::types::{Band, FrameId};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CAMCOLS: [u8; 6] = [1, 2, 3, 4, 5, 6];

/// Errors in the selection itself. These abort the batch.
#[derive(Error, Debug)]
pub enum SelectionError {
    #[error("cannot read run list {path}")]
    RunListUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed run list {path}: {reason}")]
    RunListMalformed { path: PathBuf, reason: String },

    #[error("run {run} not found in the run list")]
    RunNotListed { run: u32 },

    #[error("nonexisting camcol {camcol}, expected 1 to 6")]
    InvalidCamcol { camcol: u8 },

    #[error("run list is empty")]
    EmptyRunList,
}

/// Field range of one run; `end_field` is exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    pub run: u32,
    pub start_field: u32,
    pub end_field: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunList {
    records: Vec<RunRecord>,
}

impl RunList {
    pub fn new(records: Vec<RunRecord>) -> Self {
        Self { records }
    }

    /// Read a JSON array of [`RunRecord`]s.
    pub fn load(path: &Path) -> Result<Self, SelectionError> {
        let text = fs::read_to_string(path).map_err(|source| SelectionError::RunListUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let records: Vec<RunRecord> =
            serde_json::from_str(&text).map_err(|e| SelectionError::RunListMalformed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(Self::new(records))
    }

    pub fn runs(&self) -> impl Iterator<Item = u32> + '_ {
        self.records.iter().map(|r| r.run)
    }

    pub fn fields(&self, run: u32) -> Result<Range<u32>, SelectionError> {
        self.records
            .iter()
            .find(|r| r.run == run)
            .map(|r| r.start_field..r.end_field)
            .ok_or(SelectionError::RunNotListed { run })
    }
}

/// Which frames a batch processes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum FieldSelection {
    /// Every camcol, filter and field of a run.
    Run { run: u32 },
    /// Every filter and field of one camcol of a run.
    RunCamcol { run: u32, camcol: u8 },
    /// Every camcol and field of a run in one filter.
    RunFilter { run: u32, filter: Band },
    RunCamcolFilter { run: u32, camcol: u8, filter: Band },
    /// One camcol and filter across every listed run.
    CamcolFilter { camcol: u8, filter: Band },
    /// Every filter of one frame.
    CamcolFrame { run: u32, camcol: u8, field: u32 },
    Field { run: u32, camcol: u8, filter: Band, field: u32 },
}

fn check_camcol(camcol: u8) -> Result<u8, SelectionError> {
    if CAMCOLS.contains(&camcol) {
        Ok(camcol)
    } else {
        Err(SelectionError::InvalidCamcol { camcol })
    }
}

impl FieldSelection {
    /// Frames of the selection in processing order.
    pub fn expand(&self, runs: &RunList) -> Result<Vec<FrameId>, SelectionError> {
        let mut frames = Vec::new();
        match *self {
            FieldSelection::Run { run } => {
                let fields = runs.fields(run)?;
                for camcol in CAMCOLS {
                    for filter in Band::ALL {
                        frames.extend(fields.clone().map(|f| FrameId::new(run, camcol, filter, f)));
                    }
                }
            }
            FieldSelection::RunCamcol { run, camcol } => {
                let camcol = check_camcol(camcol)?;
                let fields = runs.fields(run)?;
                for filter in Band::ALL {
                    frames.extend(fields.clone().map(|f| FrameId::new(run, camcol, filter, f)));
                }
            }
            FieldSelection::RunFilter { run, filter } => {
                let fields = runs.fields(run)?;
                for camcol in CAMCOLS {
                    frames.extend(fields.clone().map(|f| FrameId::new(run, camcol, filter, f)));
                }
            }
            FieldSelection::RunCamcolFilter {
                run,
                camcol,
                filter,
            } => {
                let camcol = check_camcol(camcol)?;
                frames.extend(runs.fields(run)?.map(|f| FrameId::new(run, camcol, filter, f)));
            }
            FieldSelection::CamcolFilter { camcol, filter } => {
                let camcol = check_camcol(camcol)?;
                if runs.records.is_empty() {
                    return Err(SelectionError::EmptyRunList);
                }
                for run in runs.runs() {
                    frames.extend(runs.fields(run)?.map(|f| FrameId::new(run, camcol, filter, f)));
                }
            }
            FieldSelection::CamcolFrame { run, camcol, field } => {
                let camcol = check_camcol(camcol)?;
                frames.extend(Band::ALL.map(|filter| FrameId::new(run, camcol, filter, field)));
            }
            FieldSelection::Field {
                run,
                camcol,
                filter,
                field,
            } => {
                let camcol = check_camcol(camcol)?;
                frames.push(FrameId::new(run, camcol, filter, field));
            }
        }
        Ok(frames)
    }
}
