//! Filesystem-backed providers.
//!
//! Frame layout below the image root, per frame stem
//! `frame-<filter>-<run:06>-<camcol>-<field:04>`:
//!
//! - `<stem>.json`: header with `NAXIS1`, `NAXIS2`, `TAI`, `CRPIX1/2`,
//!   `CRVAL1/2`, `CD1_1`, `CD1_2`, `CD2_1`, `CD2_2`;
//! - `<stem>.f32`: row-major little-endian `f32` pixels, or
//! - `<stem>.f32.gz`: the same, gzip-compressed.
//!
//! A compressed frame is unpacked to `<dump_dir>/worker-<label>/<stem>.f32`,
//! unique per worker thread, and deleted once the field is done. Rayon workers
//! are labelled by pool index, other threads by process id and a per-process
//! thread counter. Catalogs
//! are `photoObj-<run:06>-<camcol>-<field:04>.json` below the catalog root.
use crate::catalog::{parse_catalog_records, CatalogEntry};
use crate::field::{AcquiredFrame, CatalogProvider, EphemeralFile, FieldError, ImageProvider};
use crate::image::ImageF32;
use crate::types::{FrameHeader, FrameId};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::debug;
use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// On-disk frame header.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct FrameHeaderFile {
    pub naxis1: usize,
    pub naxis2: usize,
    pub tai: f64,
    pub crpix1: f64,
    pub crpix2: f64,
    pub crval1: f64,
    pub crval2: f64,
    pub cd1_1: f64,
    pub cd1_2: f64,
    pub cd2_1: f64,
    pub cd2_2: f64,
}

impl FrameHeaderFile {
    pub fn new(width: usize, height: usize, header: &FrameHeader) -> Self {
        Self {
            naxis1: width,
            naxis2: height,
            tai: header.tai,
            crpix1: header.crpix.x,
            crpix2: header.crpix.y,
            crval1: header.crval.x,
            crval2: header.crval.y,
            cd1_1: header.cd[(0, 0)],
            cd1_2: header.cd[(0, 1)],
            cd2_1: header.cd[(1, 0)],
            cd2_2: header.cd[(1, 1)],
        }
    }

    pub fn to_header(&self) -> FrameHeader {
        FrameHeader {
            tai: self.tai,
            crpix: Vector2::new(self.crpix1, self.crpix2),
            crval: Vector2::new(self.crval1, self.crval2),
            cd: Matrix2::new(self.cd1_1, self.cd1_2, self.cd2_1, self.cd2_2),
        }
    }
}

static NEXT_THREAD_LABEL: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    static THREAD_LABEL: String = format!(
        "{}-t{}",
        std::process::id(),
        NEXT_THREAD_LABEL.fetch_add(1, Ordering::Relaxed)
    );
}

/// Label of a thread outside the rayon pool, unique within the process.
fn thread_label() -> String {
    THREAD_LABEL.with(Clone::clone)
}

#[cfg(feature = "parallel")]
fn worker_label() -> String {
    rayon::current_thread_index().map_or_else(thread_label, |i| i.to_string())
}

#[cfg(not(feature = "parallel"))]
fn worker_label() -> String {
    thread_label()
}

/// Frames stored as header JSON plus raw or gzip-compressed pixels.
#[derive(Clone, Debug)]
pub struct FsImageProvider {
    root: PathBuf,
    dump_dir: PathBuf,
}

impl FsImageProvider {
    pub fn new(root: impl Into<PathBuf>, dump_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            dump_dir: dump_dir.into(),
        }
    }

    pub fn header_path(&self, frame: &FrameId) -> PathBuf {
        self.root.join(format!("{}.json", frame.frame_stem()))
    }

    pub fn pixels_path(&self, frame: &FrameId) -> PathBuf {
        self.root.join(format!("{}.f32", frame.frame_stem()))
    }

    pub fn compressed_path(&self, frame: &FrameId) -> PathBuf {
        self.root.join(format!("{}.f32.gz", frame.frame_stem()))
    }

    /// Where the calling worker unpacks a compressed frame.
    pub fn scratch_path(&self, frame: &FrameId) -> PathBuf {
        self.dump_dir
            .join(format!("worker-{}", worker_label()))
            .join(format!("{}.f32", frame.frame_stem()))
    }

    /// Write `image` and `header` in the layout [`acquire`](ImageProvider::acquire) reads.
    pub fn store(
        &self,
        frame: &FrameId,
        header: &FrameHeader,
        image: &ImageF32,
        compress: bool,
    ) -> io::Result<()> {
        fs::create_dir_all(&self.root)?;
        let file = FrameHeaderFile::new(image.w, image.h, header);
        let json = serde_json::to_string_pretty(&file).map_err(io::Error::other)?;
        fs::write(self.header_path(frame), json)?;

        let bytes: Vec<u8> = image.data.iter().flat_map(|v| v.to_le_bytes()).collect();
        if compress {
            let out = BufWriter::new(File::create(self.compressed_path(frame))?);
            let mut enc = GzEncoder::new(out, Compression::default());
            enc.write_all(&bytes)?;
            enc.finish()?.flush()
        } else {
            fs::write(self.pixels_path(frame), bytes)
        }
    }

    fn read_header(&self, path: &Path) -> Result<FrameHeaderFile, FieldError> {
        let text = fs::read_to_string(path).map_err(|e| FieldError::io(path, e))?;
        serde_json::from_str(&text).map_err(|e| FieldError::MalformedHeader {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    fn unpack(&self, compressed: &Path, target: &Path) -> Result<(), FieldError> {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| FieldError::io(parent, e))?;
        }
        let input = File::open(compressed).map_err(|e| FieldError::io(compressed, e))?;
        let mut decoder = GzDecoder::new(BufReader::new(input));
        let mut output = BufWriter::new(File::create(target).map_err(|e| FieldError::io(target, e))?);
        io::copy(&mut decoder, &mut output)
            .and_then(|_| output.flush())
            .map_err(|source| FieldError::Decompress {
                path: compressed.to_path_buf(),
                source,
            })?;
        debug!("unpacked {} to {}", compressed.display(), target.display());
        Ok(())
    }
}

fn read_pixels(path: &Path, width: usize, height: usize) -> Result<ImageF32, FieldError> {
    let expected = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| FieldError::MalformedImage {
            path: path.to_path_buf(),
            reason: format!("{width}x{height} pixels overflow the addressable size"),
        })?;
    let bytes = fs::read(path).map_err(|e| FieldError::io(path, e))?;
    if bytes.len() != expected {
        return Err(FieldError::MalformedImage {
            path: path.to_path_buf(),
            reason: format!(
                "expected {expected} bytes for {width}x{height} pixels, found {}",
                bytes.len()
            ),
        });
    }
    let data = bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    ImageF32::from_vec(width, height, data).ok_or_else(|| FieldError::MalformedImage {
        path: path.to_path_buf(),
        reason: "pixel count does not match the header".to_string(),
    })
}

impl ImageProvider for FsImageProvider {
    fn acquire(&self, frame: &FrameId) -> Result<AcquiredFrame, FieldError> {
        let raw = self.pixels_path(frame);
        let compressed = self.compressed_path(frame);

        let (source, artifact) = if raw.exists() {
            (raw, None)
        } else if compressed.exists() {
            let scratch = self.scratch_path(frame);
            let guard = EphemeralFile::new(&scratch);
            self.unpack(&compressed, &scratch)?;
            (scratch, Some(guard))
        } else {
            return Err(FieldError::ImageNotFound { path: raw });
        };

        let header_path = self.header_path(frame);
        if !header_path.exists() {
            return Err(FieldError::MalformedHeader {
                path: header_path,
                reason: "header file is missing".to_string(),
            });
        }
        let header = self.read_header(&header_path)?;
        let image = read_pixels(&source, header.naxis1, header.naxis2)?;

        let acquired = AcquiredFrame::new(image, header.to_header());
        Ok(match artifact {
            Some(guard) => acquired.with_artifact(guard),
            None => acquired,
        })
    }
}

/// Catalogs stored as JSON record arrays.
#[derive(Clone, Debug)]
pub struct FsCatalogProvider {
    root: PathBuf,
}

impl FsCatalogProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn catalog_path(&self, frame: &FrameId) -> PathBuf {
        self.root.join(format!("{}.json", frame.catalog_stem()))
    }
}

impl CatalogProvider for FsCatalogProvider {
    fn catalog(&self, frame: &FrameId) -> Result<Vec<CatalogEntry>, FieldError> {
        let path = self.catalog_path(frame);
        if !path.exists() {
            return Err(FieldError::CatalogNotFound { path });
        }
        let text = fs::read_to_string(&path).map_err(|e| FieldError::io(&path, e))?;
        parse_catalog_records(&text).map_err(|reason| FieldError::MalformedCatalog { path, reason })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Band;

    fn frame() -> FrameId {
        FrameId::new(94, 1, Band::R, 101)
    }

    fn sample_image() -> ImageF32 {
        let data = (0..12).map(|v| v as f32 * 0.5 - 1.0).collect();
        ImageF32::from_vec(4, 3, data).unwrap()
    }

    fn header() -> FrameHeader {
        FrameHeader {
            tai: 4.5e9,
            crpix: Vector2::new(1025.0, 745.0),
            crval: Vector2::new(10.5, -1.25),
            cd: Matrix2::new(1e-4, 2e-5, -2e-5, 1e-4),
        }
    }

    #[test]
    fn raw_frame_round_trips_and_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let provider = FsImageProvider::new(dir.path().join("frames"), dir.path().join("dump"));
        provider.store(&frame(), &header(), &sample_image(), false).unwrap();

        let acquired = provider.acquire(&frame()).unwrap();
        assert_eq!(acquired.image, sample_image());
        assert_eq!(acquired.header, header());
        assert!(acquired.artifact_path().is_none());
        drop(acquired);
        assert!(provider.pixels_path(&frame()).exists());
    }

    #[test]
    fn compressed_frame_is_unpacked_then_removed() {
        let dir = tempfile::tempdir().unwrap();
        let provider = FsImageProvider::new(dir.path().join("frames"), dir.path().join("dump"));
        provider.store(&frame(), &header(), &sample_image(), true).unwrap();
        assert!(!provider.pixels_path(&frame()).exists());

        let acquired = provider.acquire(&frame()).unwrap();
        let scratch = acquired.artifact_path().unwrap().to_path_buf();
        assert!(scratch.starts_with(dir.path().join("dump")));
        assert!(scratch.exists());
        assert_eq!(acquired.image, sample_image());
        drop(acquired);
        assert!(!scratch.exists());
        assert!(provider.compressed_path(&frame()).exists());
    }

    #[test]
    fn missing_frame_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let provider = FsImageProvider::new(dir.path(), dir.path().join("dump"));
        let err = provider.acquire(&frame()).unwrap_err();
        assert!(matches!(err, FieldError::ImageNotFound { .. }));
    }

    #[test]
    fn truncated_pixels_are_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let provider = FsImageProvider::new(dir.path(), dir.path().join("dump"));
        provider.store(&frame(), &header(), &sample_image(), false).unwrap();
        fs::write(provider.pixels_path(&frame()), [0u8; 10]).unwrap();
        let err = provider.acquire(&frame()).unwrap_err();
        assert!(matches!(err, FieldError::MalformedImage { .. }));
    }

    #[test]
    fn oversized_header_dimensions_are_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let provider = FsImageProvider::new(dir.path(), dir.path().join("dump"));
        provider.store(&frame(), &header(), &sample_image(), false).unwrap();
        let huge = FrameHeaderFile::new(usize::MAX / 2, 3, &header());
        fs::write(provider.header_path(&frame()), serde_json::to_vec(&huge).unwrap()).unwrap();
        match provider.acquire(&frame()).unwrap_err() {
            FieldError::MalformedImage { reason, .. } => assert!(reason.contains("overflow"), "{reason}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn threads_outside_the_pool_get_their_own_scratch() {
        let dir = tempfile::tempdir().unwrap();
        let provider = FsImageProvider::new(dir.path(), dir.path().join("dump"));
        let here = provider.scratch_path(&frame());
        assert_eq!(here, provider.scratch_path(&frame()));

        let other = provider.clone();
        let there = std::thread::spawn(move || other.scratch_path(&frame()))
            .join()
            .unwrap();
        assert_ne!(here, there);
        assert_eq!(here.file_name(), there.file_name());
    }

    #[test]
    fn corrupt_archive_fails_and_leaves_no_scratch() {
        let dir = tempfile::tempdir().unwrap();
        let provider = FsImageProvider::new(dir.path(), dir.path().join("dump"));
        provider.store(&frame(), &header(), &sample_image(), false).unwrap();
        fs::remove_file(provider.pixels_path(&frame())).unwrap();
        fs::write(provider.compressed_path(&frame()), b"not gzip at all").unwrap();
        let err = provider.acquire(&frame()).unwrap_err();
        assert!(matches!(err, FieldError::Decompress { .. }));
        assert!(!provider.scratch_path(&frame()).exists());
    }

    #[test]
    fn catalogs_are_read_leniently() {
        let dir = tempfile::tempdir().unwrap();
        let provider = FsCatalogProvider::new(dir.path());
        let err = provider.catalog(&frame()).unwrap_err();
        assert!(matches!(err, FieldError::CatalogNotFound { .. }));

        let json = r#"[
            {"rowc": [1,1,1,1,1], "colc": [2,2,2,2,2], "psfMag": [20,20,20,20,20],
             "petroR90": [1,1,1,1,1], "objcType": 6, "nObserve": 1, "nDetect": 1},
            {"rowc": "bad", "nObserve": 1, "nDetect": 1}
        ]"#;
        fs::write(provider.catalog_path(&frame()), json).unwrap();
        assert_eq!(provider.catalog(&frame()).unwrap().len(), 1);

        fs::write(provider.catalog_path(&frame()), "{}").unwrap();
        let err = provider.catalog(&frame()).unwrap_err();
        assert!(matches!(err, FieldError::MalformedCatalog { .. }));
    }
}
