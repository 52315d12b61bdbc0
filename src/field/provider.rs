//! Boundaries to the storage layer.
use crate::catalog::CatalogEntry;
use crate::field::FieldError;
use crate::image::ImageF32;
use crate::types::{FrameHeader, FrameId};
use log::{trace, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Supplies the pixels and header of a frame.
pub trait ImageProvider: Send + Sync {
    fn acquire(&self, frame: &FrameId) -> Result<AcquiredFrame, FieldError>;
}

/// Supplies the catalogued sources of a field.
pub trait CatalogProvider: Send + Sync {
    fn catalog(&self, frame: &FrameId) -> Result<Vec<CatalogEntry>, FieldError>;
}

/// A frame ready for processing.
///
/// If the pixels were read from a decompressed working copy, the copy is
/// removed when the frame is dropped.
#[derive(Debug)]
pub struct AcquiredFrame {
    pub image: ImageF32,
    pub header: FrameHeader,
    artifact: Option<EphemeralFile>,
}

impl AcquiredFrame {
    pub fn new(image: ImageF32, header: FrameHeader) -> Self {
        Self {
            image,
            header,
            artifact: None,
        }
    }

    pub fn with_artifact(mut self, artifact: EphemeralFile) -> Self {
        self.artifact = Some(artifact);
        self
    }

    pub fn artifact_path(&self) -> Option<&Path> {
        self.artifact.as_ref().map(EphemeralFile::path)
    }

    /// Split into pixels, header and the cleanup guard.
    pub fn into_parts(self) -> (ImageF32, FrameHeader, Option<EphemeralFile>) {
        (self.image, self.header, self.artifact)
    }
}

/// File deleted on drop.
#[derive(Debug)]
pub struct EphemeralFile {
    path: PathBuf,
}

impl EphemeralFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for EphemeralFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => trace!("removed {}", self.path.display()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => warn!("could not remove {}: {err}", self.path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ephemeral_file_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scratch.f32");
        fs::write(&path, [0u8; 4]).unwrap();
        let frame = AcquiredFrame::new(ImageF32::new(1, 1), FrameHeader::default())
            .with_artifact(EphemeralFile::new(&path));
        assert_eq!(frame.artifact_path(), Some(path.as_path()));
        drop(frame);
        assert!(!path.exists());
    }

    #[test]
    fn missing_ephemeral_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        drop(EphemeralFile::new(dir.path().join("never-written")));
    }
}
