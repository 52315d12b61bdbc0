use super::{load_config, BrightConfig, ConfigError, DimConfig, MaskingConfig};
use crate::batch::FieldSelection;
use crate::detector::DebugConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration of the `detect_trails` batch tool.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectTrailsConfig {
    pub selection: FieldSelection,
    /// JSON run list with the field range of every run.
    pub run_list: PathBuf,
    /// Directory holding frame headers and pixels.
    pub image_root: PathBuf,
    /// Directory holding the photoObj catalogs.
    pub catalog_root: PathBuf,
    #[serde(default)]
    pub output: OutputConfig,
    /// Worker threads; 0 uses one per logical core.
    #[serde(default)]
    pub threads: usize,
    #[serde(default)]
    pub debug: DebugConfig,
    #[serde(default)]
    pub bright: BrightConfig,
    #[serde(default)]
    pub dim: DimConfig,
    #[serde(default)]
    pub masking: MaskingConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OutputConfig {
    pub results: PathBuf,
    pub errors: PathBuf,
    /// Scratch space for unpacked frames.
    pub dump_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results: PathBuf::from("results.txt"),
            errors: PathBuf::from("errors.txt"),
            dump_dir: PathBuf::from("frame_dump"),
        }
    }
}

impl DetectTrailsConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let cfg: Self = load_config(path)?;
        let checks = [
            ("bright", cfg.bright.common.validate()),
            ("dim", cfg.dim.common.validate()),
            ("masking", cfg.masking.validate()),
        ];
        for (section, check) in checks {
            if let Err(reason) = check {
                return Err(ConfigError::Invalid {
                    path: path.to_path_buf(),
                    reason: format!("{section}: {reason}"),
                });
            }
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Band;

    #[test]
    fn minimal_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("detect.json");
        std::fs::write(
            &path,
            r#"{
                "selection": {"mode": "run", "run": 94},
                "runList": "runlist.json",
                "imageRoot": "frames",
                "catalogRoot": "catalogs",
                "bright": {"lwThresh": 4}
            }"#,
        )
        .unwrap();
        let cfg = DetectTrailsConfig::load(&path).unwrap();
        assert_eq!(cfg.selection, FieldSelection::Run { run: 94 });
        assert_eq!(cfg.output.results, PathBuf::from("results.txt"));
        assert_eq!(cfg.threads, 0);
        assert_eq!(cfg.bright.common.lw_thresh, 4.0);
        assert_eq!(cfg.dim.min_flux, 0.02);
        assert_eq!(cfg.masking.to_masking_params().magnitude_caps.get(Band::Z), 20.5);
    }

    #[test]
    fn zero_top_lines_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("detect.json");
        std::fs::write(
            &path,
            r#"{"selection": {"mode": "field", "run": 1, "camcol": 1, "filter": "r", "field": 2},
                "runList": "r.json", "imageRoot": ".", "catalogRoot": ".",
                "dim": {"topNLines": 0}}"#,
        )
        .unwrap();
        assert!(matches!(
            DetectTrailsConfig::load(&path),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            DetectTrailsConfig::load(&dir.path().join("missing.json")),
            Err(ConfigError::Read { .. })
        ));
    }

    fn load_with(dir: &Path, section: &str) -> Result<DetectTrailsConfig, ConfigError> {
        let path = dir.join("detect.json");
        let json = format!(
            r#"{{"selection": {{"mode": "run", "run": 94}},
                "runList": "r.json", "imageRoot": ".", "catalogRoot": ".",
                {section}}}"#
        );
        std::fs::write(&path, json).unwrap();
        DetectTrailsConfig::load(&path)
    }

    fn invalid_reason(result: Result<DetectTrailsConfig, ConfigError>) -> String {
        match result {
            Err(ConfigError::Invalid { reason, .. }) => reason,
            other => panic!("expected an invalid config, got {other:?}"),
        }
    }

    #[test]
    fn non_positive_rho_resolution_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let reason = invalid_reason(load_with(dir.path(), r#""bright": {"houghRhoResolution": 0}"#));
        assert!(reason.starts_with("bright: houghRhoResolution"), "{reason}");
        let reason = invalid_reason(load_with(dir.path(), r#""dim": {"houghRhoResolution": -20}"#));
        assert!(reason.starts_with("dim: houghRhoResolution"), "{reason}");
    }

    #[test]
    fn non_positive_theta_resolution_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let reason = invalid_reason(load_with(dir.path(), r#""bright": {"houghThetaResolution": -0.01}"#));
        assert!(reason.starts_with("bright: houghThetaResolution"), "{reason}");
        let reason = invalid_reason(load_with(dir.path(), r#""dim": {"houghThetaResolution": 0.0}"#));
        assert!(reason.starts_with("dim: houghThetaResolution"), "{reason}");
    }

    #[test]
    fn non_positive_pixel_scale_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let reason = invalid_reason(load_with(dir.path(), r#""masking": {"pixelScale": 0}"#));
        assert!(reason.starts_with("masking: pixelScale"), "{reason}");
        let reason = invalid_reason(load_with(dir.path(), r#""masking": {"pixelScale": -0.396}"#));
        assert!(reason.starts_with("masking: pixelScale"), "{reason}");
        assert!(load_with(dir.path(), r#""masking": {"pixelScale": 0.396}"#).is_ok());
    }
}
