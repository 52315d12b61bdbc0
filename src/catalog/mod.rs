//! Catalogued sources of a field and their lenient decoding.
//!
//! A catalog row either carries the full set of per-band measurements
//! (pixel row/column, PSF magnitude, Petrosian-90 radius) or none of them.
//! Rows are decoded one at a time so a single unreadable record is skipped
//! instead of invalidating the whole field.
use crate::types::{Band, BandValues};
use log::warn;
use serde::{Deserialize, Serialize};

/// Per-band measurements of one source; every band is present.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BandMeasurements {
    /// Pixel row of the source centre per band.
    pub row: BandValues<f64>,
    /// Pixel column of the source centre per band.
    pub col: BandValues<f64>,
    /// PSF magnitude per band.
    pub psf_mag: BandValues<f64>,
    /// Radius containing 90% of the Petrosian flux, arcsec.
    pub petro_r90: BandValues<f64>,
}

impl BandMeasurements {
    /// True when every value needed to mask `band` is a finite number.
    pub fn is_usable(&self, band: Band) -> bool {
        self.psf_mag.to_array().iter().all(|m| m.is_finite())
            && self.row.get(band).is_finite()
            && self.col.get(band).is_finite()
            && self.petro_r90.get(band).is_finite()
    }
}

/// One detected source from a prior object catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub measurements: Option<BandMeasurements>,
    /// Survey object type code.
    pub obj_type: i32,
    /// Number of times the area containing the object was observed.
    pub n_observe: u32,
    /// Number of times the object was detected.
    pub n_detect: u32,
}

/// On-disk record layout: ugriz arrays plus counters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogRecord {
    rowc: Option<[f64; 5]>,
    colc: Option<[f64; 5]>,
    psf_mag: Option<[f64; 5]>,
    petro_r90: Option<[f64; 5]>,
    #[serde(default)]
    objc_type: i32,
    n_observe: u32,
    n_detect: u32,
}

impl TryFrom<CatalogRecord> for CatalogEntry {
    type Error = String;

    fn try_from(rec: CatalogRecord) -> Result<Self, Self::Error> {
        let measurements = match (rec.rowc, rec.colc, rec.psf_mag, rec.petro_r90) {
            (Some(row), Some(col), Some(mag), Some(r90)) => Some(BandMeasurements {
                row: BandValues::from_array(row),
                col: BandValues::from_array(col),
                psf_mag: BandValues::from_array(mag),
                petro_r90: BandValues::from_array(r90),
            }),
            (None, None, None, None) => None,
            _ => return Err("per-band measurements are only partially present".to_string()),
        };
        Ok(CatalogEntry {
            measurements,
            obj_type: rec.objc_type,
            n_observe: rec.n_observe,
            n_detect: rec.n_detect,
        })
    }
}

/// Decode a JSON array of catalog records, skipping rows that fail to decode.
///
/// Only a document that is not an array at all is an error.
pub fn parse_catalog_records(json: &str) -> Result<Vec<CatalogEntry>, String> {
    let rows: Vec<serde_json::Value> =
        serde_json::from_str(json).map_err(|e| format!("catalog is not a record array: {e}"))?;
    let mut entries = Vec::with_capacity(rows.len());
    for (idx, row) in rows.into_iter().enumerate() {
        let decoded = serde_json::from_value::<CatalogRecord>(row)
            .map_err(|e| e.to_string())
            .and_then(CatalogEntry::try_from);
        match decoded {
            Ok(entry) => entries.push(entry),
            Err(err) => warn!("skipping catalog row {idx}: {err}"),
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_rows_are_skipped_individually() {
        let json = r#"[
            {"rowc":[10,10,10,10,10],"colc":[20,20,20,20,20],
             "psfMag":[20,20,20,20,20],"petroR90":[1,1,1,1,1],
             "objcType":6,"nObserve":1,"nDetect":1},
            {"rowc":[10,10,"x",10,10],"colc":[20,20,20,20,20],
             "psfMag":[20,20,20,20,20],"petroR90":[1,1,1,1,1],
             "objcType":6,"nObserve":1,"nDetect":1},
            {"rowc":[10,10,10,10,10],
             "objcType":3,"nObserve":2,"nDetect":2},
            {"objcType":0,"nObserve":1,"nDetect":0}
        ]"#;
        let entries = parse_catalog_records(json).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].obj_type, 6);
        assert!(entries[0].measurements.is_some());
        assert!(entries[1].measurements.is_none());
        assert_eq!(entries[1].n_detect, 0);
    }

    #[test]
    fn non_array_document_is_an_error() {
        assert!(parse_catalog_records("{\"objects\": 1}").is_err());
    }

    #[test]
    fn short_band_arrays_are_rejected() {
        let json = r#"[{"rowc":[1,2,3],"colc":[1,2,3],"psfMag":[1,2,3],
                        "petroR90":[1,2,3],"nObserve":1,"nDetect":1}]"#;
        assert!(parse_catalog_records(json).unwrap().is_empty());
    }
}
