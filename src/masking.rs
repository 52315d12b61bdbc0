//! Blanking of catalogued sources before trail detection.
//!
//! Each qualifying source is replaced by a square of zeros centred on its
//! catalog position. A source qualifies in the frame's band when
//! - its PSF magnitude in that band is brighter than the band cap,
//! - at most `max_mag_count` of its pairwise ugriz magnitude differences
//!   exceed `max_mag_diff` (sources bright in one band only are likely
//!   spurious), and
//! - it was detected every time its area was observed.
//!
//! The square half-width follows the Petrosian-90 radius when one is known
//! and falls back to `default_half_width` otherwise or when the derived size
//! exceeds `max_half_width`.
use crate::catalog::{BandMeasurements, CatalogEntry};
use crate::image::ImageF32;
use crate::types::{Band, BandValues};
use log::trace;
use serde::{Deserialize, Serialize};

/// Pixels added to the Petrosian-derived half-width.
const PETRO_PADDING_PX: f64 = 10.0;

/// Catalog positions further than this from the origin are treated as corrupt.
const MAX_CENTRE_PX: f64 = 1.0e6;

/// Tunables of the object masker. Immutable for a pipeline run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaskingParams {
    /// Half-width used when no usable radius is known.
    pub default_half_width: i64,
    /// Largest half-width accepted from the radius; larger ones use the default.
    pub max_half_width: i64,
    /// Sources at or above the cap in the frame's band are left alone.
    pub magnitude_caps: BandValues<f64>,
    /// Arcsec per pixel.
    pub pixel_scale: f64,
    /// Maximal number of band pairs allowed to differ by more than `max_mag_diff`.
    pub max_mag_count: usize,
    pub max_mag_diff: f64,
}

impl Default for MaskingParams {
    fn default() -> Self {
        Self {
            default_half_width: 20,
            max_half_width: 60,
            magnitude_caps: BandValues {
                u: 22.0,
                g: 22.2,
                r: 22.2,
                i: 21.3,
                z: 20.5,
            },
            pixel_scale: 0.396,
            max_mag_count: 3,
            max_mag_diff: 3.0,
        }
    }
}

/// Outcome counters of one masking run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaskingSummary {
    pub masked: usize,
    pub rejected: usize,
    pub malformed: usize,
}

#[derive(Clone, Debug, Default)]
pub struct ObjectMasker {
    params: MaskingParams,
}

impl ObjectMasker {
    pub fn new(params: MaskingParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &MaskingParams {
        &self.params
    }

    /// Mask qualifying entries and hand the image back.
    pub fn apply(&self, mut image: ImageF32, entries: &[CatalogEntry], band: Band) -> ImageF32 {
        self.apply_in_place(&mut image, entries, band);
        image
    }

    /// Zero a square around every entry qualifying in `band`.
    pub fn apply_in_place(
        &self,
        image: &mut ImageF32,
        entries: &[CatalogEntry],
        band: Band,
    ) -> MaskingSummary {
        let mut summary = MaskingSummary::default();
        for (idx, entry) in entries.iter().enumerate() {
            let Some(m) = entry.measurements.as_ref() else {
                trace!("catalog entry {idx}: no band measurements");
                summary.rejected += 1;
                continue;
            };
            if !m.is_usable(band) {
                trace!("catalog entry {idx}: non-finite band value, skipped");
                summary.malformed += 1;
                continue;
            }
            if !self.qualifies(entry, m, band) {
                summary.rejected += 1;
                continue;
            }

            let (row, col) = (m.row.get(band), m.col.get(band));
            if row.abs() > MAX_CENTRE_PX || col.abs() > MAX_CENTRE_PX {
                trace!("catalog entry {idx}: centre ({col}, {row}) out of range, skipped");
                summary.malformed += 1;
                continue;
            }

            let half = self.half_width(m.petro_r90.get(band));
            let row = row.ceil() as i64;
            let col = col.ceil() as i64;
            image.fill_rect(
                col.saturating_sub(half),
                row.saturating_sub(half),
                col.saturating_add(half),
                row.saturating_add(half),
                0.0,
            );
            summary.masked += 1;
        }
        summary
    }

    /// Whether `entry` passes the magnitude, colour-consistency and
    /// detection-count tests for `band`.
    pub fn qualifies(&self, entry: &CatalogEntry, m: &BandMeasurements, band: Band) -> bool {
        if m.psf_mag.get(band) >= self.params.magnitude_caps.get(band) {
            return false;
        }
        if count_large_differences(&m.psf_mag.to_array(), self.params.max_mag_diff)
            > self.params.max_mag_count
        {
            return false;
        }
        entry.n_observe == entry.n_detect
    }

    /// Half-width of the masking square for a Petrosian-90 radius in arcsec.
    ///
    /// The size is derived in floating point and only converted once it is
    /// known to lie within `[0, max_half_width]`.
    pub fn half_width(&self, petro_r90: f64) -> i64 {
        let p = &self.params;
        if petro_r90.is_nan() || petro_r90 <= 0.0 {
            return p.default_half_width;
        }
        let half = (petro_r90 / p.pixel_scale).trunc() + PETRO_PADDING_PX;
        if half.is_finite() && half >= 0.0 && half <= p.max_half_width as f64 {
            half as i64
        } else {
            p.default_half_width
        }
    }
}

fn count_large_differences(mags: &[f64; 5], max_diff: f64) -> usize {
    let mut count = 0;
    for j in 0..mags.len() {
        for k in j + 1..mags.len() {
            if (mags[j] - mags[k]).abs() > max_diff {
                count += 1;
            }
        }
    }
    count
}
